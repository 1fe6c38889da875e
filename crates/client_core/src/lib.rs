//! Client side of the website-builder dashboard: a controller that owns the
//! project gallery and syncs it with either a session-local store or the
//! remote project service.

pub mod controller;
pub mod error;
pub mod memory_store;
pub mod notify;
pub mod remote_store;
pub mod store;
pub mod upload;

pub use controller::{messages, ControllerEvent, ProjectController, Tab};
pub use error::{ControllerError, StoreError, UploadError};
pub use memory_store::InMemoryProjectStore;
pub use notify::{
    Notification, NotificationSink, RecordingNotificationSink, Severity, TracingNotificationSink,
};
pub use remote_store::{RemoteProjectStore, RemoteStoreConfig};
pub use store::{Placement, ProjectStore};
pub use upload::UploadedFile;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
