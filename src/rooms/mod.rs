pub mod error;
pub mod lifecycle;
pub mod sweeper;
pub mod validate;

pub use error::RoomError;
pub use lifecycle::{ControlAction, LifecycleController};
pub use sweeper::CleanupScheduler;

use crate::platform::{ChannelKind, Platform};

pub const LOG_CHANNEL_NAME: &str = "room-logs";

/// Resolve the guild's audit channel, if one exists.
async fn find_log_channel<P: Platform>(platform: &P, guild_id: &str) -> Option<String> {
    let channels = platform.list_guild_channels(guild_id).await.ok()?;
    channels
        .into_iter()
        .find(|channel| channel.kind == ChannelKind::Text && channel.name == LOG_CHANNEL_NAME)
        .map(|channel| channel.id)
}

/// Best-effort audit entry. A missing log channel or a failed post never
/// fails the operation being audited.
pub(crate) async fn audit<P: Platform>(platform: &P, guild_id: &str, text: &str) {
    let Some(channel_id) = find_log_channel(platform, guild_id).await else {
        tracing::debug!("no {} channel in guild {}", LOG_CHANNEL_NAME, guild_id);
        return;
    };
    if let Err(e) = platform.post_message(&channel_id, text).await {
        tracing::warn!("audit entry failed in guild {}: {}", guild_id, e);
    }
}
