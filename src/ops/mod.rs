//! Operation handlers
//!
//! Each operation sequences invocation-builder, runner and parser calls.
//! Failure policy per step follows a fixed scheme: setup, import and
//! export steps are fatal, delete steps are best-effort (logged, then
//! carry on). Scratch artifacts (temporary labels and exchange files) are
//! cleaned up by drop guards so they go away on the error paths too.

pub mod appsettings;
pub mod delete;
pub mod export;
pub mod import;

use std::fs;
use std::path::PathBuf;

use crate::runner::FailurePolicy;
use crate::secrets::SecretError;
use crate::store::{Store, StoreError};

/// Operation-level errors
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Secrets(#[from] SecretError),

    #[error("cannot open file {path}")]
    ImportFileMissing { path: String },

    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed inherited key list on label {label}: {source}")]
    MalformedInherited {
        label: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize inherited key list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Deletes a temporary label when dropped, best-effort.
pub struct TempLabelGuard<'a> {
    store: &'a Store,
    label: String,
}

impl<'a> TempLabelGuard<'a> {
    pub fn new(store: &'a Store, label: String) -> Self {
        Self { store, label }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for TempLabelGuard<'_> {
    fn drop(&mut self) {
        println!("Cleaning up temporary label {}", self.label);
        let _ = self
            .store
            .delete_label(&self.label, FailurePolicy::BestEffort);
    }
}

/// Removes a scratch file when dropped.
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
