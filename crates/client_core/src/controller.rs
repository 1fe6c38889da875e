//! Project State Controller: the working set of projects, the pending upload,
//! and the active dashboard tab.
//!
//! Store calls run without holding the state lock, so overlapping operations
//! are possible and the last response to arrive wins.

use std::sync::Arc;

use shared::domain::{Project, ProjectId};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::ControllerError,
    notify::{NotificationSink, Severity},
    store::{Placement, ProjectStore},
    upload::UploadedFile,
};

pub mod messages {
    pub const FILE_SELECTED_TITLE: &str = "✅ Файл загружен";
    pub const PROJECT_CREATED_TITLE: &str = "✅ Проект создан";
    pub const PROJECT_CREATED_DESCRIPTION: &str = "Готов к публикации";
    pub const PUBLISHED_TITLE: &str = "🚀 Сайт опубликован!";
    pub const PUBLISHED_DESCRIPTION: &str = "Ваш сайт доступен в интернете";
    pub const FAILURE_TITLE: &str = "Ошибка";
    pub const LIST_FAILED: &str = "Не удалось загрузить проекты";
    pub const CREATE_FAILED: &str = "Не удалось создать проект";
    pub const PUBLISH_FAILED: &str = "Не удалось опубликовать сайт";

    pub fn file_selected_description(file_name: &str) -> String {
        format!("{file_name} готов к публикации")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    Builder,
    Projects,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    ProjectsChanged(Vec<Project>),
    TabChanged(Tab),
    PendingUploadChanged { file_name: Option<String> },
    LoadingChanged(bool),
}

struct PendingUpload {
    selection: u64,
    file: UploadedFile,
}

struct ControllerState {
    projects: Vec<Project>,
    pending_upload: Option<PendingUpload>,
    selections: u64,
    active_tab: Tab,
    in_flight: usize,
}

pub struct ProjectController {
    store: Arc<dyn ProjectStore>,
    notifier: Arc<dyn NotificationSink>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ProjectController {
    /// Builds a controller over `store`, starting from whatever the store can
    /// hand out synchronously.
    pub fn new(store: Arc<dyn ProjectStore>, notifier: Arc<dyn NotificationSink>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let projects = store.initial_projects();
        Arc::new(Self {
            store,
            notifier,
            inner: Mutex::new(ControllerState {
                projects,
                pending_upload: None,
                selections: 0,
                active_tab: Tab::default(),
                in_flight: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.inner.lock().await.projects.clone()
    }

    pub async fn project(&self, project_id: ProjectId) -> Option<Project> {
        self.inner
            .lock()
            .await
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
    }

    pub async fn active_tab(&self) -> Tab {
        self.inner.lock().await.active_tab
    }

    pub async fn pending_upload(&self) -> Option<UploadedFile> {
        self.inner
            .lock()
            .await
            .pending_upload
            .as_ref()
            .map(|pending| pending.file.clone())
    }

    /// True while any store call is outstanding. Advisory only.
    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.in_flight > 0
    }

    pub async fn select_tab(&self, tab: Tab) {
        self.inner.lock().await.active_tab = tab;
        let _ = self.events.send(ControllerEvent::TabChanged(tab));
    }

    /// Replaces any previously selected file.
    pub async fn select_file(&self, file: UploadedFile) {
        let file_name = file.name().to_string();
        {
            let mut guard = self.inner.lock().await;
            guard.selections += 1;
            let selection = guard.selections;
            guard.pending_upload = Some(PendingUpload { selection, file });
        }
        self.notifier.notify(
            messages::FILE_SELECTED_TITLE,
            &messages::file_selected_description(&file_name),
            Severity::Default,
        );
        let _ = self.events.send(ControllerEvent::PendingUploadChanged {
            file_name: Some(file_name),
        });
    }

    /// Replaces the working set with the store's listing. On failure the
    /// working set is left untouched.
    pub async fn load_projects(&self) -> Result<(), ControllerError> {
        self.begin_store_call().await;
        let result = self.store.list_projects().await;
        self.end_store_call().await;

        match result {
            Ok(projects) => {
                info!(count = projects.len(), "projects loaded");
                self.inner.lock().await.projects = projects.clone();
                let _ = self.events.send(ControllerEvent::ProjectsChanged(projects));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load projects");
                self.fail(messages::LIST_FAILED);
                Err(err.into())
            }
        }
    }

    /// Turns the pending upload into a draft project. Returns `Ok(None)`
    /// when no file is selected. A failed attempt keeps the upload so the
    /// user can retry.
    pub async fn create_project(&self) -> Result<Option<Project>, ControllerError> {
        let Some((selection, file)) = self
            .inner
            .lock()
            .await
            .pending_upload
            .as_ref()
            .map(|pending| (pending.selection, pending.file.clone()))
        else {
            return Ok(None);
        };
        let name = file.project_name();

        self.begin_store_call().await;
        let result = self.store.create_project(&name, &file).await;
        self.end_store_call().await;

        let project = match result {
            Ok(project) => project,
            Err(err) => {
                warn!(error = %err, file = file.name(), "failed to create project");
                self.fail(messages::CREATE_FAILED);
                return Err(err.into());
            }
        };

        let (projects, upload_cleared) = {
            let mut guard = self.inner.lock().await;
            guard.projects.retain(|p| p.id != project.id);
            match self.store.placement() {
                Placement::Append => guard.projects.push(project.clone()),
                Placement::Prepend => guard.projects.insert(0, project.clone()),
            }
            guard.active_tab = Tab::Projects;
            let upload_cleared = guard
                .pending_upload
                .as_ref()
                .is_some_and(|pending| pending.selection == selection);
            if upload_cleared {
                guard.pending_upload = None;
            }
            (guard.projects.clone(), upload_cleared)
        };

        info!(project_id = project.id.0, name = %project.name, "project created");
        self.notifier.notify(
            messages::PROJECT_CREATED_TITLE,
            messages::PROJECT_CREATED_DESCRIPTION,
            Severity::Default,
        );
        let _ = self.events.send(ControllerEvent::ProjectsChanged(projects));
        let _ = self.events.send(ControllerEvent::TabChanged(Tab::Projects));
        if upload_cleared {
            let _ = self
                .events
                .send(ControllerEvent::PendingUploadChanged { file_name: None });
        }
        Ok(Some(project))
    }

    /// Publishes under `https://<slug>.dev`. Nothing is applied until the
    /// store confirms; re-publishing resubmits the same URL.
    pub async fn publish(&self, project_id: ProjectId) -> Result<Project, ControllerError> {
        let Some(current) = self.project(project_id).await else {
            warn!(project_id = project_id.0, "publish requested for unknown project");
            self.fail(messages::PUBLISH_FAILED);
            return Err(ControllerError::UnknownProject(project_id));
        };
        let published_url = current.derived_url();

        self.begin_store_call().await;
        let result = self.store.publish_project(project_id, &published_url).await;
        self.end_store_call().await;

        let updated = match result {
            Ok(updated) => updated,
            Err(err) => {
                warn!(project_id = project_id.0, error = %err, "failed to publish project");
                self.fail(messages::PUBLISH_FAILED);
                return Err(err.into());
            }
        };

        let projects = {
            let mut guard = self.inner.lock().await;
            if let Some(slot) = guard.projects.iter_mut().find(|p| p.id == project_id) {
                *slot = updated.clone();
            }
            guard.projects.clone()
        };

        info!(project_id = project_id.0, url = %published_url, "project published");
        self.notifier.notify(
            messages::PUBLISHED_TITLE,
            messages::PUBLISHED_DESCRIPTION,
            Severity::Default,
        );
        let _ = self.events.send(ControllerEvent::ProjectsChanged(projects));
        Ok(updated)
    }

    fn fail(&self, description: &str) {
        self.notifier
            .notify(messages::FAILURE_TITLE, description, Severity::Destructive);
    }

    async fn begin_store_call(&self) {
        let started = {
            let mut guard = self.inner.lock().await;
            guard.in_flight += 1;
            guard.in_flight == 1
        };
        if started {
            let _ = self.events.send(ControllerEvent::LoadingChanged(true));
        }
    }

    async fn end_store_call(&self) {
        let finished = {
            let mut guard = self.inner.lock().await;
            guard.in_flight = guard.in_flight.saturating_sub(1);
            guard.in_flight == 0
        };
        if finished {
            let _ = self.events.send(ControllerEvent::LoadingChanged(false));
        }
    }
}
