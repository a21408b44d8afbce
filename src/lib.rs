use axum::{
    Router,
    routing::post,
    middleware::from_fn_with_state,
    extract::DefaultBodyLimit,
};

use http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::{AllowOrigin, CorsLayer},
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod place;
}

pub mod repositories {
    pub mod session;
    pub mod place;
}

pub mod services {
    pub mod auth;
    pub mod places;
}

pub mod handlers {
    pub mod auth;
    pub mod favorites;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod place;
}

use error::AppError;
use state::AppState;

/// Request bodies are small form posts.
const MAX_BODY_BYTES: usize = 64 * 1024;

async fn route_not_found() -> AppError {
    AppError::NotFound
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/v1/auth/tokens", post(handlers::auth::issue_token))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/v1/favorites", post(handlers::favorites::create_favorite))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config.cors_origins))
}
