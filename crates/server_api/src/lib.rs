use shared::{
    domain::{published_url, Project, ProjectId, DEFAULT_PROJECT_NAME, PLACEHOLDER_PREVIEW},
    error::{ApiError, ErrorCode},
    protocol::{CreateProjectRequest, UpdateProjectRequest},
};
use storage::{NewProject, ProjectChanges, Storage};
use tracing::info;

const MAX_NAME_BYTES: usize = 180;
const MAX_FILENAME_BYTES: usize = 255;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_projects(ctx: &ApiContext) -> Result<Vec<Project>, ApiError> {
    let projects = ctx.storage.list_projects().await.map_err(internal)?;
    Ok(projects.into_iter().map(Project::from).collect())
}

pub async fn get_project(ctx: &ApiContext, project_id: ProjectId) -> Result<Project, ApiError> {
    ctx.storage
        .get_project(project_id)
        .await
        .map_err(internal)?
        .map(Project::from)
        .ok_or_else(|| ApiError::not_found(project_id))
}

pub async fn create_project(
    ctx: &ApiContext,
    req: CreateProjectRequest,
) -> Result<Project, ApiError> {
    let name = req.name.unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
    validate_name(&name)?;

    let file_name = req.file_name.unwrap_or_default();
    if file_name.len() > MAX_FILENAME_BYTES {
        return Err(ApiError::new(ErrorCode::Validation, "file name is too long"));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "file name must not contain path separators",
        ));
    }

    let stored = ctx
        .storage
        .create_project(&NewProject {
            name,
            preview_url: req
                .preview_url
                .unwrap_or_else(|| PLACEHOLDER_PREVIEW.to_string()),
            file_content: req.file_content.unwrap_or_default(),
            file_name,
            file_size: req.file_size.unwrap_or(0),
        })
        .await
        .map_err(internal)?;
    info!(
        project_id = stored.project_id.0,
        file_size = stored.file_size,
        "project created"
    );
    Ok(stored.into())
}

/// Partial update that keeps `published_url` present exactly when `published`.
///
/// `published: true` without a URL derives one from the (possibly new) name,
/// and `published: false` clears it.
pub async fn update_project(
    ctx: &ApiContext,
    project_id: ProjectId,
    req: UpdateProjectRequest,
) -> Result<Project, ApiError> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    let existing = ctx
        .storage
        .get_project(project_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(project_id))?;

    let published_url = match (req.published, req.published_url) {
        (Some(false), Some(_)) => {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "published_url requires published = true",
            ))
        }
        (Some(false), None) => Some(None),
        (Some(true), Some(url)) | (None, Some(url)) if !url.trim().is_empty() => {
            if req.published.is_none() && !existing.published {
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    "cannot set published_url on a draft project",
                ));
            }
            Some(Some(url))
        }
        (_, Some(_)) => {
            return Err(ApiError::new(
                ErrorCode::Validation,
                "published_url must not be empty",
            ))
        }
        (Some(true), None) => {
            let name = req.name.as_deref().unwrap_or(&existing.name);
            Some(Some(published_url(name)))
        }
        (None, None) => None,
    };

    let changes = ProjectChanges {
        name: req.name,
        published: req.published,
        published_url,
    };
    let updated = ctx
        .storage
        .update_project(project_id, &changes)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(project_id))?;
    info!(
        project_id = project_id.0,
        published = updated.published,
        "project updated"
    );
    Ok(updated.into())
}

pub async fn delete_project(ctx: &ApiContext, project_id: ProjectId) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_project(project_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found(project_id));
    }
    info!(project_id = project_id.0, "project deleted");
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.len() > MAX_NAME_BYTES {
        return Err(ApiError::new(ErrorCode::Validation, "project name is too long"));
    }
    Ok(())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
