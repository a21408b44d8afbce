use axum::{
    extract::{Form, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    Extension,
};

use crate::{
    error::{AppError, Result},
    models::session::Session,
    state::AppState,
    validation::place::PlaceForm,
};

/// Creates a favorite place for the authenticated session.
#[axum::debug_handler]
pub async fn create_favorite(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: std::result::Result<Form<PlaceForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!("Form rejected: {}", rejection.body_text());
        AppError::Decode("Invalid form body".to_string())
    })?;

    let place = state.registrar.create(&session, form).await?;

    let body = sonic_rs::to_string(&place)
        .map_err(|e| AppError::Internal(format!("Place serialization failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
