use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an authenticated client session.
///
/// The `token` is the opaque credential handed to the client in a cookie.
/// Places are owned by `id`, so the credential is never stored next to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The identifier places are scoped to.
    pub id: Uuid,
    /// The opaque session credential.
    pub token: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for `token` that lives for `ttl`.
    pub fn new(token: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            token,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the session has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_a_json_round_trip() {
        let session = Session::new("opaque-token".to_string(), Duration::days(30));

        let json = sonic_rs::to_string(&session).unwrap();
        let restored: Session = sonic_rs::from_str(&json).unwrap();

        assert_eq!(restored.id, session.id);
        assert_eq!(restored.token, session.token);
        assert_eq!(restored.created_at, session.created_at);
        assert_eq!(restored.expires_at, session.expires_at);
    }

    #[test]
    fn expiry_is_exclusive_of_the_deadline() {
        let session = Session::new("t".to_string(), Duration::hours(1));
        assert!(!session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.expires_at + Duration::seconds(1)));
    }
}
