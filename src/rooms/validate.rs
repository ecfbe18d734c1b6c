use crate::rooms::RoomError;
use once_cell::sync::Lazy;

pub const MAX_ROOM_NAME_LENGTH: usize = 32;

/// Substrings that would let a room name ping the whole guild or smuggle an
/// invite link into the channel list.
static FORBIDDEN_SUBSTRINGS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["@everyone", "@here", "discord.gg", ".gg/", "/invite"]);

/// Validate a requested room name before any platform call is made.
/// Returns the trimmed name on success.
pub fn validate_room_name(raw: &str) -> Result<String, RoomError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RoomError::ValidationFailed(
            "Room name cannot be empty!".to_string(),
        ));
    }
    if name.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(RoomError::ValidationFailed(format!(
            "Room name must be at most {} characters!",
            MAX_ROOM_NAME_LENGTH
        )));
    }
    let lowered = name.to_lowercase();
    if FORBIDDEN_SUBSTRINGS.iter().any(|word| lowered.contains(word)) {
        return Err(RoomError::ValidationFailed(
            "Room name contains forbidden content!".to_string(),
        ));
    }
    Ok(name.to_string())
}
