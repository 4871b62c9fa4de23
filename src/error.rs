use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No task at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{count} stored task(s) could not be read; not overwriting them")]
    UnreadableEntries { count: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
