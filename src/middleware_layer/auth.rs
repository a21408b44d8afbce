use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{error::AppError, state::AppState};

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
/// * `cookie_name` - The name of the session cookie.
///
/// # Returns
///
/// An `Option` containing the token if found.
fn extract_session_token(cookies: &Cookies, cookie_name: &str) -> Option<String> {
    cookies
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
}

/// A middleware that requires a valid session to be present.
///
/// Runs before the handler's body extractors, so an unauthenticated request
/// is rejected with 401 whatever its payload.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_session_token(&cookies, &state.config.session_cookie_name);
    if token.is_none() {
        tracing::warn!("❌ No {} cookie found", state.config.session_cookie_name);
    }

    let session = state.authenticator.authenticate(token.as_deref()).await?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
