use crate::db::guild_config::GuildConfigStore;
use crate::db::registry::RoomRegistry;
use crate::models::Room;
use crate::platform::Platform;
use crate::rooms::{audit, RoomError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// The periodic reconciliation sweep. Reads every room row, compares it with
/// live reality, and retires rooms that vanished out-of-band or have sat
/// empty past the guild's idle threshold.
pub struct CleanupScheduler<P: Platform> {
    platform: P,
    registry: RoomRegistry,
    configs: GuildConfigStore,
    period: Duration,
}

impl<P: Platform> CleanupScheduler<P> {
    pub fn new(
        platform: P,
        registry: RoomRegistry,
        configs: GuildConfigStore,
        period: Duration,
    ) -> Self {
        Self {
            platform,
            registry,
            configs,
            period,
        }
    }

    /// Run until `shutdown` flips to true. Rows are never left half-processed:
    /// the shutdown signal is only observed between sweeps.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("cleanup scheduler started (period {:?})", self.period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        tracing::info!("cleanup scheduler stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One reconciliation cycle. Per-row failures are contained: one bad row
    /// must never abort the sweep for the rest.
    pub async fn sweep_once(&self) {
        let rooms = self.registry.list().await;
        let now = chrono::Utc::now().timestamp();
        for room in rooms {
            if let Err(e) = self.sweep_room(&room, now).await {
                tracing::error!(
                    channel_id = %room.channel_id,
                    owner_id = %room.owner_id,
                    "sweep error: {}",
                    e
                );
            }
        }
    }

    async fn sweep_room(&self, room: &Room, now: i64) -> Result<(), RoomError> {
        let channel = match self.platform.get_channel(&room.channel_id).await? {
            Some(channel) => channel,
            None => {
                // Deleted out-of-band. The row is the only thing left to clean.
                tracing::info!(
                    channel_id = %room.channel_id,
                    owner_id = %room.owner_id,
                    "channel gone, dropping room row"
                );
                self.registry.delete(&room.channel_id).await;
                return Ok(());
            }
        };

        let members = self.platform.channel_members(&room.channel_id).await?;
        if members.iter().any(|member| !member.bot) {
            if !self.registry.touch(room, now).await {
                tracing::warn!(channel_id = %room.channel_id, "last_active update failed");
            }
            return Ok(());
        }

        let config = self.configs.for_guild(&room.guild_id).await;
        if room.idle_secs(now) <= config.idle_timeout_secs {
            return Ok(());
        }

        audit(
            &self.platform,
            &room.guild_id,
            &format!(
                "auto-deleting {} (inactive for {} minutes)",
                channel.name,
                config.idle_timeout_secs / 60
            ),
        )
        .await;

        // Channel first; the row only goes once the channel is gone, so a
        // failed delete keeps the room tracked and retried next cycle.
        self.platform.delete_channel(&room.channel_id).await?;
        if !self.registry.delete(&room.channel_id).await {
            tracing::warn!(channel_id = %room.channel_id, "row delete failed; retrying next cycle");
        }
        tracing::info!(channel_id = %room.channel_id, "idle room retired");
        Ok(())
    }
}
