use reqwest::StatusCode;
use thiserror::Error;

/// Failure while fetching the playlist from the remote service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status(status) => Some(*status),
            FetchError::Transport(e) => e.status(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(#[from] FetchError),

    #[error("Local write failed: {0}")]
    LocalWrite(#[source] tokio_rusqlite::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// True for network-layer failures, including non-2xx responses.
    pub fn is_remote_fetch(&self) -> bool {
        matches!(self, AppError::RemoteFetch(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
