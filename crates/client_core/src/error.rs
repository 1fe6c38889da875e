use std::path::PathBuf;

use shared::{domain::ProjectId, error::ApiException};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read uploaded file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' has no file name", .0.display())]
    MissingFileName(PathBuf),
}

/// Everything a store call can fail with. Callers treat all variants alike.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("project store answered {status}: {source}")]
    Rejected {
        status: u16,
        #[source]
        source: ApiException,
    },
    #[error("invalid project store url '{0}'")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("project {0} not found in store")]
    NotFound(ProjectId),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("project {0} is not in the working set")]
    UnknownProject(ProjectId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
