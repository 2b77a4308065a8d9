use thiserror::Error;

use crate::adapter::RestError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The POST itself failed, or the reply could not be decoded.
    #[error("Error POSTing to API: {0}")]
    Transport(#[from] RestError),

    /// The service answered but its `status` field reports a failure.
    #[error("WikiTree API Error: {0}")]
    Application(String),

    #[error("unexpected API reply: {0}")]
    Response(String),

    #[error("login failed: {0}")]
    Login(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session store: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }
}
