use std::path::PathBuf;
use thiserror::Error;

use crate::edit::EditFamily;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write backup {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Edit {index} is a {found} edit but the batch holds {expected} edits")]
    MixedFamilies {
        index: usize,
        expected: EditFamily,
        found: EditFamily,
    },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EditError {
    /// True for errors raised by filesystem access rather than by bad input.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EditError::Read { .. }
                | EditError::Write { .. }
                | EditError::Backup { .. }
                | EditError::CreateDir { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
