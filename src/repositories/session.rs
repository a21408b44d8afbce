use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::session::Session;

/// Storage for issued sessions, keyed by token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `session` unless its token is already taken.
    ///
    /// Returns `false` when the token collides with an existing session.
    async fn insert(&self, session: &Session) -> Result<bool>;

    /// Looks up the session bound to `token`.
    async fn get(&self, token: &str) -> Result<Option<Session>>;

    /// Drops sessions that have expired, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize>;
}

/// A process-local session store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    /// Creates a new, empty `InMemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &Session) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.entry(session.token.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(true)
            }
        }
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }
}

/// A Redis-backed session store. Keys expire with the session.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    /// Creates a new `RedisSessionStore` on top of a connection manager.
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: &Session) -> Result<bool> {
        let session_json = sonic_rs::to_string(session)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let ttl_secs = (session.expires_at - session.created_at).num_seconds().max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(&session.token))
            .arg(&session_json)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut self.redis.clone())
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis SET NX failed: {}", e);
                AppError::Redis(e)
            })?;

        Ok(reply.is_some())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let session_json: Option<String> = self.redis.clone().get(Self::key(token)).await?;

        match session_json {
            Some(json) => {
                let session = sonic_rs::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Invalid session JSON: {}", e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn purge_expired(&self) -> Result<usize> {
        // Redis evicts keys on their own TTL.
        Ok(0)
    }
}
