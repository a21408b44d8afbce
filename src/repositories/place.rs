use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use tokio::sync::RwLock;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::place::{Color, FavoritePlace},
    validation::place::NewPlace,
};

/// Persistence for favorite places.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Stores a validated place for `session_id` as one atomic write.
    async fn insert(&self, session_id: Uuid, place: &NewPlace) -> Result<FavoritePlace>;
}

/// A process-local place repository.
#[derive(Clone)]
pub struct InMemoryPlaceRepository {
    next_id: Arc<AtomicI64>,
    places: Arc<RwLock<Vec<FavoritePlace>>>,
}

impl Default for InMemoryPlaceRepository {
    fn default() -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            places: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl InMemoryPlaceRepository {
    /// Creates a new, empty `InMemoryPlaceRepository`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The places stored for `session_id`, oldest first.
    #[cfg(test)]
    pub(crate) async fn owned_by(&self, session_id: Uuid) -> Vec<FavoritePlace> {
        let places = self.places.read().await;
        places
            .iter()
            .filter(|place| place.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlaceRepository for InMemoryPlaceRepository {
    async fn insert(&self, session_id: Uuid, place: &NewPlace) -> Result<FavoritePlace> {
        let stored = FavoritePlace {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            session_id,
            title: place.title.clone(),
            lat: place.lat,
            lon: place.lon,
            color: place.color,
            created_at: Utc::now(),
        };

        self.places.write().await.push(stored.clone());
        Ok(stored)
    }
}

/// Maps the nullable `color` column back to a tag.
fn color_from_column(raw: Option<String>) -> Result<Option<Color>> {
    raw.map(|raw| Color::from_str(&raw))
        .transpose()
        .map_err(|e| AppError::MissingData(format!("color: {}", e)))
}

/// A helper function to map a `tokio_postgres::Row` to a `FavoritePlace`.
fn row_to_place(row: &Row) -> Result<FavoritePlace> {
    let color = color_from_column(
        row.try_get("color")
            .map_err(|_| AppError::MissingData("color".to_string()))?,
    )?;

    Ok(FavoritePlace {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        session_id: row.try_get("session_id").map_err(|_| AppError::MissingData("session_id".to_string()))?,
        title: row.try_get("title").map_err(|_| AppError::MissingData("title".to_string()))?,
        lat: row.try_get("lat").map_err(|_| AppError::MissingData("lat".to_string()))?,
        lon: row.try_get("lon").map_err(|_| AppError::MissingData("lon".to_string()))?,
        color,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// A PostgreSQL-backed place repository.
#[derive(Clone)]
pub struct PgPlaceRepository {
    pool: Pool,
}

impl PgPlaceRepository {
    /// Creates a new `PgPlaceRepository` on top of a connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn insert(&self, session_id: Uuid, place: &NewPlace) -> Result<FavoritePlace> {
        let client = self.pool.get().await?;
        let color = place.color.map(|c| c.as_str());
        let row = client
            .query_one(
                r#"
                INSERT INTO favorite_places (session_id, title, lat, lon, color)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, session_id, title, lat, lon, color, created_at
                "#,
                &[&session_id, &place.title, &place.lat, &place.lon, &color],
            )
            .await?;
        row_to_place(&row)
    }
}
