use crate::db::guild_config::GuildConfigStore;
use crate::db::registry::RoomRegistry;
use crate::models::{GuildConfig, Room};
use crate::platform::types::PermissionOverwrite;
use crate::platform::{Channel, ChannelKind, Platform, PermissionSubject, Permissions};
use crate::rooms::validate::validate_room_name;
use crate::rooms::{audit, RoomError, LOG_CHANNEL_NAME};

pub const ROOM_NAME_PREFIX: &str = "🎮│";
pub const CONTROL_THREAD_NAME: &str = "Room Controls";

/// Provisioning calls rejected by the platform for lack of permission are a
/// distinct precondition failure; everything else stays a platform error.
fn map_provision_error(e: crate::platform::PlatformError) -> RoomError {
    if e.is_forbidden() {
        RoomError::PermissionDenied(e.to_string())
    } else {
        RoomError::from(e)
    }
}

/// An owner-gated control operation on a single room. The control surface
/// builds one of these from a button press or modal submit and hands it to
/// [`LifecycleController::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Lock,
    Unlock,
    Rename { name: String },
    Kick { target: String },
    End,
}

impl ControlAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ControlAction::Lock => "lock",
            ControlAction::Unlock => "unlock",
            ControlAction::Rename { .. } => "rename",
            ControlAction::Kick { .. } => "kick",
            ControlAction::End => "end",
        }
    }
}

/// Creates rooms and executes the owner-gated controls. Holds no mutable
/// state of its own: every read and write goes through the registry or the
/// platform, so concurrent actions race safely on idempotency.
#[derive(Clone)]
pub struct LifecycleController<P: Platform> {
    platform: P,
    registry: RoomRegistry,
    configs: GuildConfigStore,
}

impl<P: Platform> LifecycleController<P> {
    pub fn new(platform: P, registry: RoomRegistry, configs: GuildConfigStore) -> Self {
        Self {
            platform,
            registry,
            configs,
        }
    }

    /// Create a voice room for `owner_id` in `guild_id`.
    ///
    /// Preconditions are checked in order, each a hard stop with its own
    /// error: per-owner quota, category capacity, then the creation call
    /// itself. On success the channel exists with owner-only access, the
    /// controls have been delivered (thread, falling back to DM), and the
    /// room row is persisted.
    pub async fn create_room(
        &self,
        owner_id: &str,
        owner_name: &str,
        guild_id: &str,
    ) -> Result<Channel, RoomError> {
        let config = self.configs.for_guild(guild_id).await;

        let owned = self.registry.count_for_owner(owner_id, guild_id).await;
        if owned >= config.max_rooms_per_user {
            return Err(RoomError::QuotaExceeded {
                max: config.max_rooms_per_user,
            });
        }

        let (category, child_count) = self.resolve_category(guild_id, &config).await?;
        if child_count >= config.category_child_limit {
            return Err(RoomError::CategoryFull);
        }

        let overwrites = [
            PermissionOverwrite::deny(
                PermissionSubject::Everyone,
                Permissions::VIEW_CHANNEL | Permissions::CONNECT,
            ),
            PermissionOverwrite::allow(
                PermissionSubject::Member(owner_id.to_string()),
                Permissions::VIEW_CHANNEL
                    | Permissions::CONNECT
                    | Permissions::SPEAK
                    | Permissions::STREAM,
            ),
            PermissionOverwrite::allow(
                PermissionSubject::Member(self.platform.bot_user_id().to_string()),
                Permissions::VIEW_CHANNEL
                    | Permissions::CONNECT
                    | Permissions::MANAGE_CHANNELS
                    | Permissions::MANAGE_PERMISSIONS
                    | Permissions::MOVE_MEMBERS,
            ),
        ];

        let name = format!("{}{}'s Room", ROOM_NAME_PREFIX, owner_name);
        let channel = self
            .platform
            .create_voice_channel(guild_id, &name, Some(&category.id), &overwrites)
            .await
            .map_err(map_provision_error)?;

        self.deliver_controls(&channel, owner_id, &config).await;

        let room = Room::new(channel.id.clone(), owner_id.to_string(), guild_id.to_string());
        if !self.registry.insert(&room).await {
            // No partial state on the request path: the channel is rolled
            // back rather than left untracked.
            tracing::error!(
                channel_id = %channel.id,
                owner_id,
                "room row insert failed; rolling back channel"
            );
            if let Err(e) = self.platform.delete_channel(&channel.id).await {
                tracing::error!(channel_id = %channel.id, "rollback delete failed: {}", e);
            }
            return Err(RoomError::Store);
        }

        self.ensure_log_channel(guild_id).await;
        audit(
            &self.platform,
            guild_id,
            &format!("{} created room {}", owner_name, channel.name),
        )
        .await;

        tracing::info!(channel_id = %channel.id, owner_id, guild_id, "room created");
        Ok(channel)
    }

    /// Execute an owner-gated control. Every path re-resolves the live
    /// channel first: the sweep may have retired the room since the control
    /// surface rendered, and a stale reference must read as `RoomNotFound`,
    /// never a crash.
    pub async fn execute(
        &self,
        action: ControlAction,
        actor_id: &str,
        channel_id: &str,
    ) -> Result<(), RoomError> {
        let room = self
            .registry
            .get(channel_id)
            .await
            .ok_or(RoomError::RoomNotFound)?;
        if room.owner_id != actor_id {
            return Err(RoomError::NotOwner);
        }
        if self.platform.get_channel(channel_id).await?.is_none() {
            // Row without channel: the sweep reconciles it; this path only reports.
            return Err(RoomError::RoomNotFound);
        }

        match action {
            ControlAction::Lock => {
                self.platform
                    .set_permission(
                        channel_id,
                        &PermissionSubject::Everyone,
                        Permissions::empty(),
                        Permissions::CONNECT,
                    )
                    .await?;
                audit(&self.platform, &room.guild_id, &format!("{} locked room {}", actor_id, channel_id)).await;
            }
            ControlAction::Unlock => {
                self.platform
                    .clear_permission(channel_id, &PermissionSubject::Everyone)
                    .await?;
                audit(&self.platform, &room.guild_id, &format!("{} unlocked room {}", actor_id, channel_id)).await;
            }
            ControlAction::Rename { name } => {
                let name = validate_room_name(&name)?;
                self.platform
                    .rename_channel(channel_id, &format!("{}{}", ROOM_NAME_PREFIX, name))
                    .await?;
            }
            ControlAction::Kick { target } => {
                if target == actor_id {
                    return Err(RoomError::ValidationFailed(
                        "You cannot kick yourself! Use End Room instead.".to_string(),
                    ));
                }
                let members = self.platform.channel_members(channel_id).await?;
                if !members.iter().any(|member| member.id == target) {
                    return Err(RoomError::ValidationFailed(
                        "That user is not in this room!".to_string(),
                    ));
                }
                self.platform
                    .disconnect_member(&room.guild_id, &target)
                    .await?;
            }
            ControlAction::End => {
                // Row delete and channel delete are attempted independently
                // so a failure in one does not strand the other.
                let row_deleted = self.registry.delete(channel_id).await;
                if !row_deleted {
                    tracing::error!(channel_id, "room row delete failed; sweep will retry");
                }
                let channel_result = self.platform.delete_channel(channel_id).await;
                audit(&self.platform, &room.guild_id, &format!("{} ended room {}", actor_id, channel_id)).await;
                if let Err(e) = channel_result {
                    tracing::error!(channel_id, owner_id = %room.owner_id, "channel delete failed: {}", e);
                    return Err(e.into());
                }
                if !row_deleted {
                    return Err(RoomError::Store);
                }
            }
        }
        Ok(())
    }

    /// Find or create the grouping category and count its children, of any
    /// kind, against the capacity ceiling.
    async fn resolve_category(
        &self,
        guild_id: &str,
        config: &GuildConfig,
    ) -> Result<(Channel, i64), RoomError> {
        let channels = self
            .platform
            .list_guild_channels(guild_id)
            .await
            .map_err(map_provision_error)?;

        let category = channels
            .iter()
            .find(|channel| {
                channel.kind == ChannelKind::Category && channel.name == config.category_name
            })
            .cloned();

        match category {
            Some(category) => {
                let child_count = channels
                    .iter()
                    .filter(|channel| channel.parent_id.as_deref() == Some(category.id.as_str()))
                    .count() as i64;
                Ok((category, child_count))
            }
            None => {
                let category = self
                    .platform
                    .create_category(guild_id, &config.category_name)
                    .await
                    .map_err(map_provision_error)?;
                Ok((category, 0))
            }
        }
    }

    /// Deliver the owner controls: a thread under the channel, falling back
    /// to a DM. Room creation survives both failing; the degradation is only
    /// logged.
    async fn deliver_controls(&self, channel: &Channel, owner_id: &str, config: &GuildConfig) {
        let text = format!(
            "Controls for {}:\n\
             • lock / unlock — control who can join\n\
             • rename — change the room name\n\
             • kick — remove a user\n\
             • end — delete the room\n\
             Rooms are deleted after {} minutes of inactivity.",
            channel.name,
            config.idle_timeout_secs / 60
        );

        let thread_result = match self.platform.create_thread(&channel.id, CONTROL_THREAD_NAME).await {
            Ok(thread) => self.platform.post_message(&thread.id, &text).await,
            Err(e) => Err(e),
        };
        if let Err(e) = thread_result {
            tracing::warn!(channel_id = %channel.id, "control thread failed, falling back to DM: {}", e);
            if let Err(e) = self.platform.send_dm(owner_id, &text).await {
                tracing::warn!(channel_id = %channel.id, owner_id, "control DM failed too: {}", e);
            }
        }
    }

    /// Create the audit channel if the guild does not have one. Best-effort.
    async fn ensure_log_channel(&self, guild_id: &str) {
        let existing = match self.platform.list_guild_channels(guild_id).await {
            Ok(channels) => channels
                .into_iter()
                .any(|c| c.kind == ChannelKind::Text && c.name == LOG_CHANNEL_NAME),
            Err(e) => {
                tracing::warn!(guild_id, "could not list channels for log setup: {}", e);
                return;
            }
        };
        if existing {
            return;
        }
        let overwrites = [
            PermissionOverwrite {
                subject: PermissionSubject::Everyone,
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::SEND_MESSAGES,
            },
            PermissionOverwrite::allow(
                PermissionSubject::Member(self.platform.bot_user_id().to_string()),
                Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::MANAGE_CHANNELS,
            ),
        ];
        if let Err(e) = self
            .platform
            .create_text_channel(guild_id, LOG_CHANNEL_NAME, &overwrites)
            .await
        {
            tracing::warn!(guild_id, "could not create {} channel: {}", LOG_CHANNEL_NAME, e);
        }
    }
}
