use std::sync::Arc;

use chrono::Duration;
use redis::aio::ConnectionManager;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    place::{InMemoryPlaceRepository, PgPlaceRepository, PlaceRepository},
    session::{InMemorySessionStore, RedisSessionStore, SessionStore},
};
use crate::services::{auth::Authenticator, places::Registrar};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// Issues and resolves session tokens.
    pub authenticator: Authenticator,
    /// Creates favorite places.
    pub registrar: Registrar,
}

impl AppState {
    /// Creates a new `AppState`, connecting to the backends named in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let sessions: Arc<dyn SessionStore> = match &config.redis_url {
            Some(redis_url) => {
                let redis_client = redis::Client::open(redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized (sessions)");
                Arc::new(RedisSessionStore::new(redis))
            }
            None => {
                tracing::info!("✅ In-memory session store initialized");
                Arc::new(InMemorySessionStore::new())
            }
        };

        let places: Arc<dyn PlaceRepository> = match &config.database_url {
            Some(database_url) => {
                let db = crate::db::create_pool(database_url)?;
                crate::db::run_migrations(&db).await?;
                tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres (places)");
                Arc::new(PgPlaceRepository::new(db))
            }
            None => {
                tracing::info!("✅ In-memory place repository initialized");
                Arc::new(InMemoryPlaceRepository::new())
            }
        };

        Ok(Self::from_parts(config.clone(), sessions, places))
    }

    /// Assembles an `AppState` from already-built backends.
    pub fn from_parts(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        places: Arc<dyn PlaceRepository>,
    ) -> Self {
        let session_ttl = Duration::days(config.session_duration_days);

        AppState {
            config: Arc::new(config),
            authenticator: Authenticator::new(sessions, session_ttl),
            registrar: Registrar::new(places),
        }
    }

    /// An `AppState` backed entirely by in-memory stores.
    pub fn in_memory(config: Config) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryPlaceRepository::new()),
        )
    }
}
