use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading an attachment from disk.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The path has no final component to use as a filename.
    #[error("Invalid attachment path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A named blob attached to a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    data: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Reads the whole file at `path`, naming the attachment after the
    /// path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| AttachmentError::InvalidPath(path.to_path_buf()))?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| AttachmentError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { filename, data })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
