use std::{
    sync::{PoisonError, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use shared::domain::{Project, ProjectId};
use tracing::debug;

use crate::{
    error::StoreError,
    store::{Placement, ProjectStore},
    upload::UploadedFile,
};

struct MemoryState {
    projects: Vec<Project>,
    last_id: i64,
}

/// Session-local store. Nothing survives the process and no call can fail
/// except publishing an id it never handed out.
pub struct InMemoryProjectStore {
    state: RwLock<MemoryState>,
}

impl InMemoryProjectStore {
    pub fn empty() -> Self {
        Self::seeded(Vec::new())
    }

    /// The two gallery entries a fresh dashboard shows.
    pub fn with_fixtures() -> Self {
        let mut portfolio = Project::draft(ProjectId(1), "Мой сайт-портфолио");
        portfolio.published = true;
        portfolio.published_url = Some("https://mysite.dev".to_string());
        let corporate = Project::draft(ProjectId(2), "Корпоративный сайт");
        Self::seeded(vec![portfolio, corporate])
    }

    pub fn seeded(projects: Vec<Project>) -> Self {
        let last_id = projects.iter().map(|p| p.id.0).max().unwrap_or(0);
        Self {
            state: RwLock::new(MemoryState { projects, last_id }),
        }
    }

    fn snapshot(&self) -> Vec<Project> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .projects
            .clone()
    }
}

impl Default for InMemoryProjectStore {
    fn default() -> Self {
        Self::empty()
    }
}

/// Millisecond clock, bumped past the last issued id so two creations in
/// the same millisecond still get distinct ids.
fn next_local_id(last_id: i64) -> i64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    now_ms.max(last_id.saturating_add(1))
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    fn placement(&self) -> Placement {
        Placement::Append
    }

    fn initial_projects(&self) -> Vec<Project> {
        self.snapshot()
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.snapshot())
    }

    async fn create_project(
        &self,
        name: &str,
        file: &UploadedFile,
    ) -> Result<Project, StoreError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let id = next_local_id(state.last_id);
        state.last_id = id;
        let project = Project::draft(ProjectId(id), name);
        state.projects.push(project.clone());
        debug!(project_id = id, file = file.name(), "created local project");
        Ok(project)
    }

    async fn publish_project(
        &self,
        project_id: ProjectId,
        published_url: &str,
    ) -> Result<Project, StoreError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or(StoreError::NotFound(project_id))?;
        project.published = true;
        project.published_url = Some(published_url.to_string());
        Ok(project.clone())
    }
}
