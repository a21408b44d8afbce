use std::sync::Arc;

use crate::{
    error::Result,
    models::{place::FavoritePlace, session::Session},
    repositories::place::PlaceRepository,
    validation::place::{self as place_validation, PlaceForm},
};

/// Decodes, validates and stores favorite places for authenticated sessions.
#[derive(Clone)]
pub struct Registrar {
    places: Arc<dyn PlaceRepository>,
}

impl Registrar {
    /// Creates a new `Registrar` writing to `places`.
    pub fn new(places: Arc<dyn PlaceRepository>) -> Self {
        Self { places }
    }

    /// Creates a favorite place owned by `session`.
    ///
    /// Nothing is stored unless every field decodes and validates.
    ///
    /// # Arguments
    ///
    /// * `session` - The authenticated session.
    /// * `form` - The raw request fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `FavoritePlace`.
    pub async fn create(&self, session: &Session, form: PlaceForm) -> Result<FavoritePlace> {
        let new_place = place_validation::decode_and_validate(form)?;

        let place = self.places.insert(session.id, &new_place).await?;

        tracing::info!("✅ Favorite place {} created for session {}", place.id, session.id);
        Ok(place)
    }
}
