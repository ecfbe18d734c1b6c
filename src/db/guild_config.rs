use crate::db::RetryPolicy;
use crate::models::GuildConfig;
use sqlx::SqlitePool;

/// Per-guild settings, read from the same store as the rooms. Guilds without
/// a row (or with the store unreachable) get defaults.
#[derive(Clone)]
pub struct GuildConfigStore {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl GuildConfigStore {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    pub async fn for_guild(&self, guild_id: &str) -> GuildConfig {
        let result = self
            .retry
            .run("config get", || {
                let pool = self.pool.clone();
                let guild_id = guild_id.to_string();
                async move {
                    sqlx::query_as::<_, GuildConfig>(
                        "SELECT * FROM guild_configs WHERE guild_id = ?",
                    )
                    .bind(&guild_id)
                    .fetch_optional(&pool)
                    .await
                }
            })
            .await;
        match result {
            Ok(Some(config)) => config,
            Ok(None) => GuildConfig::defaults_for(guild_id),
            Err(e) => {
                tracing::error!("config load for guild {} failed: {}", guild_id, e);
                GuildConfig::defaults_for(guild_id)
            }
        }
    }

    pub async fn put(&self, config: &GuildConfig) -> bool {
        let result = self
            .retry
            .run("config put", || {
                let pool = self.pool.clone();
                let config = config.clone();
                async move {
                    sqlx::query(
                        "INSERT OR REPLACE INTO guild_configs
                         (guild_id, max_rooms_per_user, idle_timeout_secs, category_name, category_child_limit)
                         VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(&config.guild_id)
                    .bind(config.max_rooms_per_user)
                    .bind(config.idle_timeout_secs)
                    .bind(&config.category_name)
                    .bind(config.category_child_limit)
                    .execute(&pool)
                    .await
                }
            })
            .await;
        result.is_ok()
    }
}
