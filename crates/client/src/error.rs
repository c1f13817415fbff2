use engine::EngineError;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a call to the remote expense service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

/// Failure of a manage-expense submission.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] EngineError),
    #[error("no expense selected")]
    NotEditing,
    #[error("workflow closed")]
    Closed,
}
