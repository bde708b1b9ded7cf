//! Authentication routes for sign-in, callback, and sign-out.

use agentgrid_platform_access::{
    HOME_PATH, OAUTH_STATE_COOKIE, RelayedCookie, SIGN_IN_PATH, SignInError,
    forward_cookie_header,
};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{
    AppState, cookies,
    middleware::{request_cookie, session_token},
};
use crate::backend::BackendError;
use crate::error::SignInRedirect;

/// Query parameters for starting sign-in.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    provider: Option<String>,
}

/// Query parameters the identity provider sends back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Query parameters of the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    error: Option<String>,
}

/// Starts sign-in by sending the browser to the identity provider.
///
/// The backend builds the authorization URL and issues the `oauth_state`
/// cookie, which is relayed so it comes back on the callback.
pub async fn login(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Result<Response, SignInRedirect> {
    let provider = query
        .ok()
        .and_then(|Query(query)| query.provider)
        .filter(|provider| !provider.is_empty())
        .unwrap_or_else(|| state.config.oauth.default_provider.clone());

    let initiation = state
        .backend
        .login_url(&state.config.oauth.redirect_uri, &provider)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, provider = %provider, "Failed to start sign-in");
            SignInError::OauthFailed
        })?;

    let headers = initiation
        .set_cookies
        .into_iter()
        .map(|value| (header::SET_COOKIE, value));

    Ok((
        AppendHeaders(headers),
        Redirect::to(&initiation.authorization_url),
    )
        .into_response())
}

/// Completes sign-in after the identity provider redirects back.
///
/// The authorization code is exchanged by the backend. On success the
/// session cookie is re-issued with canonical attributes, every other cookie
/// the backend set is relayed verbatim, and the browser lands on the home
/// page. Every failure ends on the sign-in page with an error code.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Response, SignInRedirect> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed callback query");
            CallbackQuery::default()
        }
    };

    if let Some(error) = query.error.filter(|error| !error.is_empty()) {
        tracing::warn!(
            error = %error,
            description = query.error_description.as_deref().unwrap_or("none"),
            "Identity provider reported an error"
        );
        return Err(SignInError::from_code(&error).into());
    }

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        tracing::warn!("Callback without authorization code");
        return Err(SignInError::NoCode.into());
    };

    let cookie_header =
        forward_cookie_header(&[OAUTH_STATE_COOKIE], |name| request_cookie(&headers, name));

    let exchange = state
        .backend
        .exchange_code(&code, query.state.as_deref(), cookie_header.as_deref())
        .await
        .map_err(|e| match e.current_context() {
            BackendError::Status { .. } => {
                tracing::warn!(error = %e, "Backend rejected authorization code");
                SignInError::AuthFailed
            }
            _ => {
                tracing::error!(error = %e, "Authorization code exchange failed");
                SignInError::ServerError
            }
        })?;

    let headers = relay_exchange_cookies(&state, exchange.set_cookies)?;

    tracing::info!(cookies = headers.len(), "Sign-in completed");

    Ok((AppendHeaders(headers), Redirect::to(HOME_PATH)).into_response())
}

/// Turns the backend's `Set-Cookie` headers into the ones sent to the browser.
///
/// The session cookie is rebuilt with the configured attributes; every other
/// cookie passes through untouched. Headers that cannot be parsed are dropped.
fn relay_exchange_cookies(
    state: &AppState,
    set_cookies: Vec<HeaderValue>,
) -> Result<Vec<(HeaderName, HeaderValue)>, SignInError> {
    let policy = &state.config.session;
    let mut headers = Vec::with_capacity(set_cookies.len());
    let mut session_installed = false;

    for value in set_cookies {
        let relayed = match value.to_str().map(RelayedCookie::parse) {
            Ok(Ok(relayed)) => relayed,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Skipping unparseable Set-Cookie header");
                continue;
            }
            Err(_) => {
                tracing::warn!("Skipping non-UTF-8 Set-Cookie header");
                continue;
            }
        };

        if relayed.name() == policy.cookie_name() {
            let cookie = cookies::session_cookie(policy, relayed.value());
            let Some(canonical) = cookies::set_cookie_value(&cookie) else {
                tracing::error!("Session cookie value is not a valid header");
                return Err(SignInError::ServerError);
            };
            headers.push((header::SET_COOKIE, canonical));
            session_installed = true;
        } else {
            tracing::debug!(
                cookie = relayed.name(),
                removal = relayed.is_removal(),
                "Relaying backend cookie"
            );
            headers.push((header::SET_COOKIE, value));
        }
    }

    if !session_installed {
        tracing::warn!(
            cookie = policy.cookie_name(),
            "Backend accepted the code but set no session cookie"
        );
    }

    Ok(headers)
}

/// Signs the user out.
///
/// The backend is told to end the session when there is one; its answer
/// does not matter. The session cookie is cleared either way.
pub async fn sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let policy = &state.config.session;

    if let Some(token) = session_token(&headers, policy.cookie_name()) {
        let cookie_header = format!("{}={}", policy.cookie_name(), token.as_str());
        if let Err(e) = state.backend.logout(&cookie_header).await {
            tracing::warn!(error = %e, "Backend logout failed, clearing session anyway");
        }
    }

    let removal = cookies::set_cookie_value(&cookies::clear_session_cookie(policy))
        .map(|value| (header::SET_COOKIE, value));

    (AppendHeaders(removal), Redirect::to(SIGN_IN_PATH))
}

/// Renders the sign-in page.
///
/// Only messages from a fixed set are shown, never the raw query value.
pub async fn sign_in(query: Result<Query<SignInQuery>, QueryRejection>) -> Html<String> {
    let error = query
        .ok()
        .and_then(|Query(query)| query.error)
        .filter(|code| !code.is_empty())
        .map(|code| SignInError::from_code(&code));

    Html(render_sign_in(error.as_ref()))
}

fn render_sign_in(error: Option<&SignInError>) -> String {
    let alert = error
        .map(|error| format!("<p role=\"alert\">{}</p>\n", error.message()))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>Sign in</title></head>\n\
         <body>\n\
         <h1>Sign in</h1>\n\
         {alert}<a href=\"/auth/login\">Continue to sign in</a>\n\
         </body>\n\
         </html>\n"
    )
}
