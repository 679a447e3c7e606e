//! Error types for todolist
//!
//! None of these are fatal: the menu loop reports them and keeps running.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No task found with id {0}")]
    NotFound(u32),

    #[error("Deletion cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures reading or writing files (load, save, export).
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
