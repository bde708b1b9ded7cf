//! Session gate middleware for Axum.

use agentgrid_platform_access::SessionToken;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::Cookie;
use std::sync::Arc;

use super::AppState;

/// Gates every request on the presence of a session cookie.
///
/// Excluded paths (API, static assets) pass untouched. Otherwise the request
/// is served or answered with a redirect; cookies are never modified.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if state.gate.is_excluded(path) {
        return next.run(request).await;
    }

    let session = session_token(request.headers(), state.config.session.cookie_name());
    let decision = state.gate.evaluate(path, session.as_ref());

    tracing::debug!(path = %path, decision = ?decision, "Session gate");

    match decision.location() {
        Some(location) => Redirect::temporary(&location).into_response(),
        None => next.run(request).await,
    }
}

/// Reads the session token from the request cookies.
///
/// An empty cookie value counts as no session.
pub(crate) fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    request_cookie(headers, cookie_name)
        .and_then(|value| SessionToken::from_cookie_value(&value))
}

/// Returns a request cookie's value exactly as the browser sent it.
///
/// Values are not percent-decoded: cookies are opaque to this server and
/// must reach the backend with the bytes the backend issued.
pub(crate) fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
