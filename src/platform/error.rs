use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The service account lacks the permission the call needed.
    #[error("missing platform permission for {0}")]
    Forbidden(String),

    /// The object the call targeted does not exist.
    #[error("platform object not found")]
    NotFound,

    #[error("platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl PlatformError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, PlatformError::Forbidden(_))
    }
}
