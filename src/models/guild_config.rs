use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-guild room settings, persisted alongside the rooms themselves so that
/// nothing lives in ambient process state. Guilds without a row get defaults.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuildConfig {
    pub guild_id: String,
    pub max_rooms_per_user: i64,
    pub idle_timeout_secs: i64,
    pub category_name: String,
    pub category_child_limit: i64,
}

impl GuildConfig {
    pub fn defaults_for(guild_id: &str) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            max_rooms_per_user: 3,
            idle_timeout_secs: 5 * 60,
            category_name: "Game Rooms".to_string(),
            category_child_limit: 50,
        }
    }
}
