use crate::platform::PlatformError;
use thiserror::Error;

/// Everything a room operation can fail with. User errors carry the message
/// shown to the actor verbatim; platform and store failures are logged at the
/// point of occurrence and rendered generically.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("You can only have {max} active rooms at a time!")]
    QuotaExceeded { max: i64 },

    #[error("Room category is full! Please contact an administrator.")]
    CategoryFull,

    #[error("I don't have permission to do that ({0})")]
    PermissionDenied(String),

    #[error("Only the room owner can use these controls!")]
    NotOwner,

    #[error("This room no longer exists.")]
    RoomNotFound,

    #[error("{0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("The room store is unavailable right now.")]
    Store,
}

impl RoomError {
    /// User errors are surfaced verbatim and never retried; anything else is
    /// rendered as a generic failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RoomError::QuotaExceeded { .. }
                | RoomError::CategoryFull
                | RoomError::NotOwner
                | RoomError::RoomNotFound
                | RoomError::ValidationFailed(_)
        )
    }
}
