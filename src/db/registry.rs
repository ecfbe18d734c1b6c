use crate::db::store::RoomStore;
use crate::models::Room;

/// The authoritative room-identity mapping. Pass-through to the store with no
/// caching, so registry and store cannot disagree.
#[derive(Clone)]
pub struct RoomRegistry {
    store: RoomStore,
}

impl RoomRegistry {
    pub fn new(store: RoomStore) -> Self {
        Self { store }
    }

    /// Used for the creation-time quota check. Degrades to 0 if the store is
    /// unreachable; the insert that follows still has to succeed, so a flaky
    /// store cannot mint untracked rows.
    pub async fn count_for_owner(&self, owner_id: &str, guild_id: &str) -> i64 {
        match self.store.count_for_owner(owner_id, guild_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("room count for {} in {} failed: {}", owner_id, guild_id, e);
                0
            }
        }
    }

    pub async fn insert(&self, room: &Room) -> bool {
        self.store.put(room).await
    }

    pub async fn get(&self, channel_id: &str) -> Option<Room> {
        self.store.get(channel_id).await
    }

    pub async fn list(&self) -> Vec<Room> {
        self.store.list().await
    }

    pub async fn delete(&self, channel_id: &str) -> bool {
        self.store.delete(channel_id).await
    }

    /// Advance `last_active`, keeping it monotone.
    pub async fn touch(&self, room: &Room, now: i64) -> bool {
        let mut updated = room.clone();
        updated.last_active = room.last_active.max(now);
        self.store.put(&updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, RetryPolicy};
    use std::time::Duration;

    async fn registry() -> (RoomRegistry, sqlx::SqlitePool) {
        let pool = test_pool().await;
        let store = RoomStore::new(pool.clone(), RetryPolicy::new(3, Duration::from_millis(1)));
        (RoomRegistry::new(store), pool)
    }

    #[tokio::test]
    async fn touch_never_rewinds_last_active() {
        let (registry, _pool) = registry().await;
        let mut room = Room::new("C1".into(), "U1".into(), "G1".into());
        room.last_active = 1_000;
        room.created_at = 900;
        assert!(registry.insert(&room).await);

        assert!(registry.touch(&room, 500).await);
        assert_eq!(registry.get("C1").await.unwrap().last_active, 1_000);

        assert!(registry.touch(&room, 2_000).await);
        assert_eq!(registry.get("C1").await.unwrap().last_active, 2_000);
    }

    #[tokio::test]
    async fn count_degrades_to_zero_when_store_is_down() {
        let (registry, pool) = registry().await;
        assert!(registry.insert(&Room::new("C1".into(), "U1".into(), "G1".into())).await);
        assert_eq!(registry.count_for_owner("U1", "G1").await, 1);

        pool.close().await;
        assert_eq!(registry.count_for_owner("U1", "G1").await, 0);
    }
}
