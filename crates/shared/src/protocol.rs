use serde::{Deserialize, Serialize};

/// Body of `POST /projects`. Absent fields fall back to store defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// Body of `PUT /projects/:id`; any subset of the mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,
}

impl UpdateProjectRequest {
    pub fn publish(published_url: impl Into<String>) -> Self {
        Self {
            name: None,
            published: Some(true),
            published_url: Some(published_url.into()),
        }
    }
}

pub fn projects_route() -> &'static str {
    "/projects"
}

pub fn project_route() -> &'static str {
    "/projects/:project_id"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_update_serializes_only_publish_fields() {
        let body = serde_json::to_value(UpdateProjectRequest::publish("https://a.dev"))
            .expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({ "published": true, "published_url": "https://a.dev" })
        );
    }

    #[test]
    fn create_request_accepts_partial_body() {
        let request: CreateProjectRequest =
            serde_json::from_str(r#"{ "file_name": "a.html" }"#).expect("json");
        assert_eq!(request.file_name.as_deref(), Some("a.html"));
        assert!(request.name.is_none());
        assert!(request.file_size.is_none());
    }
}
