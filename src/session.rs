//! # Sessions
//!
//! Server-side session store addressed by an opaque cookie.
//!
//! Sessions live in an in-process map. When a Redis connection is configured
//! the store writes every session through to Redis with the remaining TTL and
//! falls back to it on in-process misses, so a restart keeps users signed in.
//! Without Redis the store is purely in-process.
//!
//! An expired session is indistinguishable from a missing one: `fetch` drops
//! expired entries instead of returning them.
use std::{collections::HashMap, sync::Mutex, time::Duration};

use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::Role;

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub account_id: i32,
    pub role: Role,
    pub email: String,
    pub user_name: String,
    pub pending_order_id: Option<i32>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<HashMap<String, Session>>,
    redis: Option<ConnectionManager>,
}

impl SessionStore {
    pub fn new(ttl: Duration, redis: Option<ConnectionManager>) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
            redis,
        }
    }

    pub async fn create(
        &self,
        account_id: i32,
        role: Role,
        email: String,
        user_name: String,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            account_id,
            role,
            email,
            user_name,
            pending_order_id: None,
            expires_at: Utc::now() + self.ttl,
        };

        self.inner.lock().unwrap().insert(id.clone(), session.clone());
        self.persist(&id, &session).await;

        id
    }

    pub async fn fetch(&self, id: &str) -> Option<Session> {
        let cached = {
            let mut inner = self.inner.lock().unwrap();
            match inner.get(id) {
                Some(session) if session.expired() => {
                    inner.remove(id);
                    None
                }
                other => other.cloned(),
            }
        };

        if let Some(session) = cached {
            return Some(session);
        }

        let session = self.fetch_remote(id).await?;
        if session.expired() {
            return None;
        }

        self.inner
            .lock()
            .unwrap()
            .insert(id.to_string(), session.clone());
        Some(session)
    }

    /// Mutates the session in place; the change is visible to the next
    /// request. Returns false when the session is missing or expired.
    pub async fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        let updated = {
            let mut inner = self.inner.lock().unwrap();
            match inner.get_mut(id) {
                Some(session) if !session.expired() => {
                    f(session);
                    Some(session.clone())
                }
                _ => None,
            }
        };

        match updated {
            Some(session) => {
                self.persist(id, &session).await;
                true
            }
            None => false,
        }
    }

    pub async fn destroy(&self, id: &str) {
        self.inner.lock().unwrap().remove(id);

        if let Some(redis) = &self.redis {
            let mut redis = redis.clone();
            if let Err(e) = redis.del::<_, ()>(Self::key(id)).await {
                warn!("Failed to drop session from redis: {e}");
            }
        }
    }

    async fn persist(&self, id: &str, session: &Session) {
        let Some(redis) = &self.redis else {
            return;
        };

        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode session: {e}");
                return;
            }
        };

        let remaining = (session.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let mut redis = redis.clone();
        if let Err(e) = redis.set_ex::<_, _, ()>(Self::key(id), raw, remaining).await {
            warn!("Failed to persist session to redis: {e}");
        }
    }

    async fn fetch_remote(&self, id: &str) -> Option<Session> {
        let redis = self.redis.as_ref()?;
        let mut redis = redis.clone();

        let raw: Option<String> = redis
            .get(Self::key(id))
            .await
            .map_err(|e| {
                warn!("Failed to read session from redis: {e}");
            })
            .ok()?;

        serde_json::from_str(&raw?)
            .map_err(|e| {
                warn!("Failed to decode session: {e}");
            })
            .ok()
    }

    fn key(id: &str) -> String {
        format!("sess:{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new(ttl, None)
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let store = store(Duration::from_secs(60));
        let id = store
            .create(7, Role::Customer, "a@b.c".into(), "Ann".into())
            .await;

        let session = store.fetch(&id).await.expect("session");
        assert_eq!(session.account_id, 7);
        assert_eq!(session.role, Role::Customer);
        assert_eq!(session.pending_order_id, None);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = store(Duration::from_secs(60));
        let a = store
            .create(1, Role::Customer, "a@b.c".into(), "A".into())
            .await;
        let b = store
            .create(1, Role::Customer, "a@b.c".into(), "A".into())
            .await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn update_is_visible_to_next_fetch() {
        let store = store(Duration::from_secs(60));
        let id = store
            .create(7, Role::Customer, "a@b.c".into(), "Ann".into())
            .await;

        assert!(store.update(&id, |s| s.pending_order_id = Some(42)).await);
        assert_eq!(
            store.fetch(&id).await.unwrap().pending_order_id,
            Some(42)
        );
    }

    #[tokio::test]
    async fn expired_session_behaves_as_missing() {
        let store = store(Duration::ZERO);
        let id = store
            .create(7, Role::Customer, "a@b.c".into(), "Ann".into())
            .await;

        assert!(store.fetch(&id).await.is_none());
        assert!(!store.update(&id, |s| s.pending_order_id = Some(1)).await);
    }

    #[tokio::test]
    async fn destroy_removes_session() {
        let store = store(Duration::from_secs(60));
        let id = store
            .create(7, Role::Staff, "s@b.c".into(), "Sam".into())
            .await;

        store.destroy(&id).await;
        assert!(store.fetch(&id).await.is_none());
    }

    #[tokio::test]
    async fn fetch_of_unknown_id_misses() {
        let store = store(Duration::from_secs(60));
        assert!(store.fetch("nope").await.is_none());
    }
}
