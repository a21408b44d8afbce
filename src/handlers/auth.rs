use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::time::Duration;

use crate::{error::Result, state::AppState};

/// Creates the session cookie carrying `token`.
fn create_session_cookie(
    name: String,
    token: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, token);

    cookie.set_http_only(true);
    if secure {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");

    cookie
}

/// Issues a new session token, delivered in a `Set-Cookie` header.
#[axum::debug_handler]
pub async fn issue_token(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    let session = state.authenticator.issue_token().await?;

    let max_age_secs = (session.expires_at - session.created_at).num_seconds();
    let session_cookie = create_session_cookie(
        state.config.session_cookie_name.clone(),
        session.token,
        max_age_secs,
        state.config.secure_cookies,
    );
    cookies.add(session_cookie);
    tracing::info!("✅ Session cookie added for session {}", session.id);

    Ok(StatusCode::OK.into_response())
}
