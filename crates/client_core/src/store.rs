use async_trait::async_trait;
use shared::domain::{Project, ProjectId};

use crate::{error::StoreError, upload::UploadedFile};

/// Where a freshly created project lands in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// Persistence boundary the controller talks to.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    fn placement(&self) -> Placement;

    /// Projects available synchronously when the controller is built.
    fn initial_projects(&self) -> Vec<Project> {
        Vec::new()
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn create_project(
        &self,
        name: &str,
        file: &UploadedFile,
    ) -> Result<Project, StoreError>;

    async fn publish_project(
        &self,
        project_id: ProjectId,
        published_url: &str,
    ) -> Result<Project, StoreError>;
}
