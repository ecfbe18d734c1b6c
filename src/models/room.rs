use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted voice room: one row per live voice channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub channel_id: String,
    pub owner_id: String,
    pub guild_id: String,
    /// Unix seconds. Set once at creation, never updated.
    pub created_at: i64,
    /// Unix seconds. Advanced by the cleanup sweep whenever the channel is
    /// observed with at least one non-bot occupant. Never decreases.
    pub last_active: i64,
}

impl Room {
    pub fn new(channel_id: String, owner_id: String, guild_id: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            channel_id,
            owner_id,
            guild_id,
            created_at: now,
            last_active: now,
        }
    }

    /// Seconds since the sweep last saw an occupant.
    pub fn idle_secs(&self, now: i64) -> i64 {
        now - self.last_active
    }
}
