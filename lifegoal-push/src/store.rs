//! Push subscription persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// One browser push endpoint registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub user_id: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscription store unavailable: {0}")]
    Unavailable(String),
}

/// Repository for push subscriptions, keyed by `(user_id, endpoint)`.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace the row for the subscription's user and endpoint.
    async fn upsert(&self, subscription: PushSubscription) -> Result<UpsertOutcome, StoreError>;

    async fn for_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    rows: RwLock<HashMap<(String, String), PushSubscription>>,
}

impl MemorySubscriptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn upsert(&self, subscription: PushSubscription) -> Result<UpsertOutcome, StoreError> {
        let key = (subscription.user_id.clone(), subscription.endpoint.clone());
        let mut rows = self.rows.write().await;
        let outcome = if rows.insert(key, subscription).is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        };
        Ok(outcome)
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, StoreError> {
        let rows = self.rows.read().await;
        let mut found: Vec<PushSubscription> = rows
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        Ok(found)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rows.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(user: &str, endpoint: &str, auth: &str) -> PushSubscription {
        PushSubscription {
            user_id: user.to_string(),
            endpoint: endpoint.to_string(),
            keys: SubscriptionKeys {
                p256dh: "BNc".to_string(),
                auth: auth.to_string(),
            },
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_rows_with_the_same_key() {
        let store = MemorySubscriptionStore::new();
        let first = store
            .upsert(subscription("u1", "https://push.example/a", "one"))
            .await
            .unwrap();
        let second = store
            .upsert(subscription("u1", "https://push.example/a", "two"))
            .await
            .unwrap();
        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(store.count().await.unwrap(), 1);
        let rows = store.for_user("u1").await.unwrap();
        assert_eq!(rows[0].keys.auth, "two");
    }

    #[tokio::test]
    async fn rows_are_scoped_per_user() {
        let store = MemorySubscriptionStore::new();
        store
            .upsert(subscription("u1", "https://push.example/a", "k"))
            .await
            .unwrap();
        store
            .upsert(subscription("u2", "https://push.example/a", "k"))
            .await
            .unwrap();
        store
            .upsert(subscription("u1", "https://push.example/b", "k"))
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
        let endpoints: Vec<String> = store
            .for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.endpoint)
            .collect();
        assert_eq!(
            endpoints,
            vec!["https://push.example/a", "https://push.example/b"]
        );
    }
}
