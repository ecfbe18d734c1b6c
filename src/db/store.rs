use crate::db::RetryPolicy;
use crate::models::Room;
use sqlx::SqlitePool;

/// The persistent store for room rows. Every primitive runs inside the shared
/// retry policy; callers see degraded results, not raw storage errors:
/// exhausted reads come back empty, exhausted writes come back `false` and
/// must be checked.
#[derive(Clone)]
pub struct RoomStore {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl RoomStore {
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Upsert a room row. `false` means the write did not happen.
    pub async fn put(&self, room: &Room) -> bool {
        let result = self
            .retry
            .run("store put", || {
                let pool = self.pool.clone();
                let room = room.clone();
                async move {
                    sqlx::query(
                        "INSERT OR REPLACE INTO rooms (channel_id, owner_id, guild_id, created_at, last_active)
                         VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(&room.channel_id)
                    .bind(&room.owner_id)
                    .bind(&room.guild_id)
                    .bind(room.created_at)
                    .bind(room.last_active)
                    .execute(&pool)
                    .await
                }
            })
            .await;
        result.is_ok()
    }

    pub async fn get(&self, channel_id: &str) -> Option<Room> {
        let result = self
            .retry
            .run("store get", || {
                let pool = self.pool.clone();
                let channel_id = channel_id.to_string();
                async move {
                    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE channel_id = ?")
                        .bind(&channel_id)
                        .fetch_optional(&pool)
                        .await
                }
            })
            .await;
        match result {
            Ok(room) => room,
            Err(_) => None, // unknown, caller skips
        }
    }

    /// All room rows. An empty list on store failure is a safe outcome: the
    /// sweep simply does nothing that cycle.
    pub async fn list(&self) -> Vec<Room> {
        let result = self
            .retry
            .run("store list", || {
                let pool = self.pool.clone();
                async move {
                    sqlx::query_as::<_, Room>("SELECT * FROM rooms")
                        .fetch_all(&pool)
                        .await
                }
            })
            .await;
        result.unwrap_or_default()
    }

    /// Delete a room row. `false` means the row may still exist; the next
    /// sweep cycle will try again.
    pub async fn delete(&self, channel_id: &str) -> bool {
        let result = self
            .retry
            .run("store delete", || {
                let pool = self.pool.clone();
                let channel_id = channel_id.to_string();
                async move {
                    sqlx::query("DELETE FROM rooms WHERE channel_id = ?")
                        .bind(&channel_id)
                        .execute(&pool)
                        .await
                }
            })
            .await;
        result.is_ok()
    }

    pub async fn count_for_owner(&self, owner_id: &str, guild_id: &str) -> Result<i64, sqlx::Error> {
        self.retry
            .run("store count", || {
                let pool = self.pool.clone();
                let owner_id = owner_id.to_string();
                let guild_id = guild_id.to_string();
                async move {
                    sqlx::query_scalar::<_, i64>(
                        "SELECT COUNT(*) FROM rooms WHERE owner_id = ? AND guild_id = ?",
                    )
                    .bind(&owner_id)
                    .bind(&guild_id)
                    .fetch_one(&pool)
                    .await
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn put_get_list_delete_round_trip() {
        let store = RoomStore::new(test_pool().await, fast_retry());
        let room = Room::new("C1".into(), "U1".into(), "G1".into());

        assert!(store.put(&room).await);
        let fetched = store.get("C1").await.expect("row present");
        assert_eq!(fetched.owner_id, "U1");
        assert_eq!(fetched.created_at, fetched.last_active);

        assert_eq!(store.list().await.len(), 1);
        assert!(store.delete("C1").await);
        assert!(store.get("C1").await.is_none());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn put_is_an_upsert() {
        let store = RoomStore::new(test_pool().await, fast_retry());
        let mut room = Room::new("C1".into(), "U1".into(), "G1".into());
        assert!(store.put(&room).await);

        room.last_active += 60;
        assert!(store.put(&room).await);

        assert_eq!(store.list().await.len(), 1);
        let fetched = store.get("C1").await.unwrap();
        assert_eq!(fetched.last_active, room.last_active);
        assert_eq!(fetched.created_at, room.created_at);
    }

    #[tokio::test]
    async fn count_is_scoped_to_owner_and_guild() {
        let store = RoomStore::new(test_pool().await, fast_retry());
        store.put(&Room::new("C1".into(), "U1".into(), "G1".into())).await;
        store.put(&Room::new("C2".into(), "U1".into(), "G1".into())).await;
        store.put(&Room::new("C3".into(), "U1".into(), "G2".into())).await;
        store.put(&Room::new("C4".into(), "U2".into(), "G1".into())).await;

        assert_eq!(store.count_for_owner("U1", "G1").await.unwrap(), 2);
        assert_eq!(store.count_for_owner("U1", "G2").await.unwrap(), 1);
        assert_eq!(store.count_for_owner("U3", "G1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_ok() {
        let store = RoomStore::new(test_pool().await, fast_retry());
        assert!(store.delete("nope").await);
    }

    #[tokio::test]
    async fn closed_pool_degrades_reads_and_fails_writes() {
        let pool = test_pool().await;
        let store = RoomStore::new(pool.clone(), fast_retry());
        let room = Room::new("C1".into(), "U1".into(), "G1".into());
        assert!(store.put(&room).await);

        pool.close().await;

        // Writes report failure; reads degrade to "unknown, skip".
        assert!(!store.put(&room).await);
        assert!(!store.delete("C1").await);
        assert!(store.get("C1").await.is_none());
        assert!(store.list().await.is_empty());
        assert!(store.count_for_owner("U1", "G1").await.is_err());
    }
}
