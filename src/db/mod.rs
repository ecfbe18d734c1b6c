pub mod guild_config;
pub mod registry;
pub mod store;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
}

/// Connect and migrate, retrying the pair boundedly. Every other component
/// depends on the store, so exhausting this budget is fatal to startup.
pub async fn connect_with_retry(
    database_url: &str,
    retry: &RetryPolicy,
) -> anyhow::Result<SqlitePool> {
    let pool = retry
        .run("store init", || {
            let url = database_url.to_string();
            async move {
                let pool = create_pool(&url).await?;
                run_migrations(&pool).await?;
                Ok::<_, sqlx::Error>(pool)
            }
        })
        .await?;
    Ok(pool)
}

/// Bounded fixed-delay retry, declared once and shared by the store
/// bootstrap and every store primitive.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `f` until it succeeds or the attempt budget is spent. The final
    /// error is returned to the caller; intermediate failures are logged.
    pub async fn run<T, E, F, Fut>(&self, op: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!("{} attempt {} failed: {}", op, attempt, e);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("{} failed after {} attempts: {}", op, self.max_attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // One connection only: each in-memory SQLite connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
