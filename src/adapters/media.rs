//! Uploaded file storage
//!
//! Files are written under `server.media_root`, one directory per record
//! type. Stored names are `<uuid>_<sanitized original name>` and the path
//! relative to the media root is what gets persisted.

use crate::domain::{ClinicError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Which record an upload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Prescription,
    TestResult,
}

impl MediaKind {
    /// Directory under the media root
    pub fn directory(&self) -> &'static str {
        match self {
            MediaKind::Prescription => "prescriptions",
            MediaKind::TestResult => "test_results",
        }
    }
}

/// An uploaded file held in memory until it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Writes uploads beneath a root directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the root and every per-kind directory
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub async fn ensure_directories(&self) -> Result<()> {
        for kind in [MediaKind::Prescription, MediaKind::TestResult] {
            let dir = self.root.join(kind.directory());
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                ClinicError::Storage(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Stores an upload and returns its path relative to the media root
    ///
    /// # Errors
    ///
    /// Returns `Validation` for empty or oversize files and `Storage` if the
    /// file cannot be written.
    pub async fn save(&self, kind: MediaKind, upload: &Upload) -> Result<String> {
        if upload.bytes.is_empty() {
            return Err(ClinicError::Validation(
                "file: The submitted file is empty.".to_string(),
            ));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(ClinicError::Validation(format!(
                "file: File too large. Maximum {}MB.",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let dir = self.root.join(kind.directory());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ClinicError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&upload.file_name));
        let path = dir.join(&stored_name);
        tokio::fs::write(&path, &upload.bytes).await.map_err(|e| {
            ClinicError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(
            kind = kind.directory(),
            file = %stored_name,
            size = upload.bytes.len(),
            "Stored upload"
        );

        Ok(format!("{}/{}", kind.directory(), stored_name))
    }
}

/// Strips path components and replaces characters outside `[A-Za-z0-9._-]`
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .filter(|&c| c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();

    let sanitized = sanitized.replace("..", "");
    let sanitized = sanitized.trim_start_matches('.').to_string();

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
