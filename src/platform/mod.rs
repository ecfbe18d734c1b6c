pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::RestPlatformClient;
pub use error::PlatformError;
pub use types::{Channel, ChannelKind, Member, PermissionSubject, Permissions};

/// The outside chat-platform boundary. The controller and the cleanup sweep
/// depend only on this contract; the real implementation is
/// [`RestPlatformClient`].
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// The service account's own user id, used in permission overwrites.
    fn bot_user_id(&self) -> &str;

    /// Readiness probe. The cleanup sweep is not started until this succeeds.
    async fn ping(&self) -> Result<(), PlatformError>;

    /// Resolve a channel, `None` if it no longer exists.
    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, PlatformError>;

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>, PlatformError>;

    async fn create_voice_channel(
        &self,
        guild_id: &str,
        name: &str,
        parent_id: Option<&str>,
        overwrites: &[types::PermissionOverwrite],
    ) -> Result<Channel, PlatformError>;

    async fn create_category(&self, guild_id: &str, name: &str) -> Result<Channel, PlatformError>;

    async fn create_text_channel(
        &self,
        guild_id: &str,
        name: &str,
        overwrites: &[types::PermissionOverwrite],
    ) -> Result<Channel, PlatformError>;

    /// Deleting an already-deleted channel is success, so racing deleters
    /// (owner "end" vs. the sweep) both complete cleanly.
    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError>;

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), PlatformError>;

    async fn set_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
        allow: Permissions,
        deny: Permissions,
    ) -> Result<(), PlatformError>;

    async fn clear_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
    ) -> Result<(), PlatformError>;

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<Member>, PlatformError>;

    /// Force a member out of whatever voice channel they occupy.
    async fn disconnect_member(&self, guild_id: &str, user_id: &str) -> Result<(), PlatformError>;

    async fn create_thread(&self, channel_id: &str, name: &str) -> Result<Channel, PlatformError>;

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError>;

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), PlatformError>;
}
