//! Structured error types for symport
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Rejections reported by a [`crate::program::ProgramModel`].
///
/// The resolver turns every one of these into a tally and a log line; none
/// of them abort an import.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("address {0} is not in the program's address space")]
    InvalidAddress(String),

    #[error("address {0:08X} is not inside any memory block")]
    NotInMemory(u32),

    #[error("name '{0}' already exists")]
    DuplicateName(String),

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("no such entity: {0}")]
    UnknownEntity(String),
}

/// Failures that end a run.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to load program database {path}: {reason}")]
    ProgramLoad { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
