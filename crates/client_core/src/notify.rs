//! Transient user feedback emitted by the controller after each attempt.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, description: &str, severity: Severity);
}

/// Writes notifications to the log; useful when no view is attached.
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, title: &str, description: &str, severity: Severity) {
        match severity {
            Severity::Default => info!(%title, %description, "notification"),
            Severity::Destructive => warn!(%title, %description, "notification"),
        }
    }
}

/// Keeps every notification in order of arrival.
#[derive(Default)]
pub struct RecordingNotificationSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn destructive_count(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.severity == Severity::Destructive)
            .count()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify(&self, title: &str, description: &str, severity: Severity) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                title: title.to_string(),
                description: description.to_string(),
                severity,
            });
    }
}
