use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Project, ProjectId, PLACEHOLDER_PREVIEW},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{projects_route, CreateProjectRequest, UpdateProjectRequest},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::StoreError,
    store::{Placement, ProjectStore},
    upload::UploadedFile,
};

#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Collection URL: `GET`/`POST` go here, `PUT` goes to `<base_url>/<id>`.
    pub base_url: String,
    /// No timeout when unset; a hung request stays pending.
    pub timeout: Option<Duration>,
}

impl RemoteStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Points at the `/projects` collection of a server root URL.
    pub fn for_server(server_url: &str) -> Self {
        Self::new(format!(
            "{}{}",
            server_url.trim_end_matches('/'),
            projects_route()
        ))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct RemoteProjectStore {
    http: Client,
    base_url: Url,
}

impl RemoteProjectStore {
    pub fn new(config: RemoteStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| StoreError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidBaseUrl(config.base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    fn project_url(&self, project_id: ProjectId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&project_id.to_string());
        }
        url
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let source = serde_json::from_str::<ApiError>(&body)
            .map(ApiException::from)
            .unwrap_or_else(|_| ApiException::new(ErrorCode::Internal, body));
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            source,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl ProjectStore for RemoteProjectStore {
    fn placement(&self) -> Placement {
        Placement::Prepend
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        let projects: Vec<Project> = decode_response(response).await?;
        debug!(count = projects.len(), "fetched projects");
        Ok(projects)
    }

    async fn create_project(
        &self,
        name: &str,
        file: &UploadedFile,
    ) -> Result<Project, StoreError> {
        let file_content = file.read_text().await?;
        let request = CreateProjectRequest {
            name: Some(name.to_string()),
            preview_url: Some(PLACEHOLDER_PREVIEW.to_string()),
            file_content: Some(file_content),
            file_name: Some(file.name().to_string()),
            file_size: Some(file.size()),
        };
        let response = self
            .http
            .post(self.base_url.clone())
            .json(&request)
            .send()
            .await?;
        let project: Project = decode_response(response).await?;
        info!(project_id = project.id.0, "project stored remotely");
        Ok(project)
    }

    async fn publish_project(
        &self,
        project_id: ProjectId,
        published_url: &str,
    ) -> Result<Project, StoreError> {
        let response = self
            .http
            .put(self.project_url(project_id))
            .json(&UpdateProjectRequest::publish(published_url))
            .send()
            .await?;
        decode_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_url_appends_id_segment() {
        let store =
            RemoteProjectStore::new(RemoteStoreConfig::new("http://127.0.0.1:9/projects/"))
                .expect("store");
        assert_eq!(
            store.project_url(ProjectId(12)).as_str(),
            "http://127.0.0.1:9/projects/12"
        );
    }

    #[test]
    fn for_server_targets_projects_collection() {
        let config = RemoteStoreConfig::for_server("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080/projects");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn rejects_non_http_base_urls() {
        for raw in ["not a url", "mailto:someone@example.com", "ftp://host/projects"] {
            let err = RemoteProjectStore::new(RemoteStoreConfig::new(raw))
                .err()
                .expect("should fail");
            assert!(matches!(err, StoreError::InvalidBaseUrl(_)), "{raw}");
        }
    }
}
