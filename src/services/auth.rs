use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::crypto::token::generate_session_token;
use crate::error::{AppError, Result};
use crate::models::session::Session;
use crate::repositories::session::SessionStore;

/// How many fresh tokens to try before giving up on a colliding store.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Issues session tokens and resolves them back to sessions.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl Authenticator {
    /// Creates a new `Authenticator` owning `store`.
    pub fn new(store: Arc<dyn SessionStore>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    /// Issues a fresh session with a unique token.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Session`.
    pub async fn issue_token(&self) -> Result<Session> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let session = Session::new(generate_session_token(), self.session_ttl);

            if self.store.insert(&session).await? {
                tracing::info!("✅ Session issued: {}", session.id);
                return Ok(session);
            }

            tracing::warn!("⚠️  Session token collision, regenerating");
        }

        Err(AppError::Internal(
            "Could not allocate a unique session token".to_string(),
        ))
    }

    /// Resolves a credential to its session.
    ///
    /// # Arguments
    ///
    /// * `credential` - The token taken from the request, if any.
    ///
    /// # Returns
    ///
    /// The bound `Session`, or `AppError::Unauthenticated`.
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<Session> {
        let token = credential
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("Missing session token".to_string()))?;

        let session = self
            .store
            .get(token)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid session token".to_string()))?;

        if session.is_expired_at(Utc::now()) {
            tracing::warn!("❌ Session expired: {}", session.id);
            return Err(AppError::Unauthenticated("Session expired".to_string()));
        }

        tracing::debug!("✅ Session authenticated: {}", session.id);
        Ok(session)
    }

    /// Drops expired sessions from the store.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired().await
    }
}
