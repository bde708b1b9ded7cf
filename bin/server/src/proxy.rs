//! Same-origin relay for backend API calls.
//!
//! The browser never talks to the backend directly. Requests under
//! [`PROXY_PREFIX`] are rebuilt with a fixed set of headers and only the
//! cookies the backend needs, then the backend's status, body, and cookies
//! are relayed back unchanged.

use agentgrid_platform_access::forward_cookie_header;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{AppState, middleware::request_cookie};
use crate::backend::ForwardRequest;
use crate::error::ProxyError;

/// Path prefix relayed to the backend.
pub const PROXY_PREFIX: &str = "/api/backend/";

const X_ORGANIZATION_ID: HeaderName = HeaderName::from_static("x-organization-id");
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Content type assumed when neither side states one.
const DEFAULT_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("application/json");

/// Relays a request to the backend.
///
/// Backend error statuses are relayed like any other response. Only a
/// failure to reach the backend produces a response of our own.
pub async fn proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or_default()
        .to_string();

    let body = (method != Method::GET && method != Method::HEAD).then_some(body);
    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        headers: outbound_headers(&state, &headers),
        body,
    };

    match state.backend.forward(request).await {
        Ok(forwarded) => {
            let mut response = (forwarded.status, forwarded.body).into_response();
            let response_headers = response.headers_mut();
            response_headers.insert(
                header::CONTENT_TYPE,
                forwarded.content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
            );
            for cookie in forwarded.set_cookies {
                response_headers.append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(e) => {
            let error = ProxyError::from(&e);
            tracing::error!(error = %e, outcome = %error, "Backend proxy request failed");
            error.into_response()
        }
    }
}

/// Builds the header set sent to the backend.
///
/// Nothing from the browser is forwarded except the content type, the
/// allow-listed cookies, and the organization and request identifiers.
fn outbound_headers(state: &AppState, inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::new();

    outbound.insert(
        header::CONTENT_TYPE,
        inbound
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or(DEFAULT_CONTENT_TYPE),
    );

    let allow_list = state.config.session.forwarded_cookie_names();
    let cookie_header = forward_cookie_header(&allow_list, |name| request_cookie(inbound, name));
    if let Some(cookie_header) = cookie_header {
        match HeaderValue::from_str(&cookie_header) {
            Ok(value) => {
                outbound.insert(header::COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unforwardable cookie header"),
        }
    }

    for name in [X_ORGANIZATION_ID, X_REQUEST_ID] {
        if let Some(value) = inbound.get(&name) {
            outbound.insert(name, value.clone());
        }
    }

    outbound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn state() -> AppState {
        AppState::new(ServerConfig::new("http://127.0.0.1:9")).expect("state")
    }

    #[test]
    fn outbound_headers_are_allow_listed() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; oauth_state=s1; wos-session=abc"),
        );
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer x"));
        inbound.insert(X_ORGANIZATION_ID, HeaderValue::from_static("org_1"));

        let outbound = outbound_headers(&state(), &inbound);

        assert_eq!(
            outbound.get(header::COOKIE).expect("cookie"),
            "wos-session=abc; oauth_state=s1"
        );
        assert_eq!(outbound.get(X_ORGANIZATION_ID).expect("org"), "org_1");
        assert_eq!(
            outbound.get(header::CONTENT_TYPE).expect("content type"),
            "application/json"
        );
        assert!(outbound.get(header::AUTHORIZATION).is_none());
        assert!(outbound.get(X_REQUEST_ID).is_none());
    }

    #[test]
    fn forwarded_cookie_values_keep_their_encoding() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::COOKIE,
            HeaderValue::from_static("wos-session=a%2Bb%3D%3D; oauth_state=x%20y"),
        );

        let outbound = outbound_headers(&state(), &inbound);

        assert_eq!(
            outbound.get(header::COOKIE).expect("cookie"),
            "wos-session=a%2Bb%3D%3D; oauth_state=x%20y"
        );
    }

    #[test]
    fn no_cookie_header_without_allow_listed_cookies() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let outbound = outbound_headers(&state(), &inbound);

        assert!(outbound.get(header::COOKIE).is_none());
        assert_eq!(outbound.get(header::CONTENT_TYPE).expect("content type"), "text/plain");
    }
}
