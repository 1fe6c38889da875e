use std::path::{Path, PathBuf};

use shared::domain::project_name_from_file;

use crate::error::UploadError;

#[derive(Debug, Clone)]
enum FileSource {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// The file most recently picked by the user. Content is read lazily for
/// files that live on disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl UploadedFile {
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            source: FileSource::Memory(content),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::MissingFileName(path.to_path_buf()))?;
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            name,
            size: metadata.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Display name of the project created from this file.
    pub fn project_name(&self) -> String {
        project_name_from_file(&self.name)
    }

    /// Full content as text. Invalid UTF-8 is replaced, not rejected.
    pub async fn read_text(&self) -> Result<String, UploadError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            FileSource::Disk(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| UploadError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}
