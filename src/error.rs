use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RosterError {
    #[error("roster input could not be read")]
    Unreadable,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid payment data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;
