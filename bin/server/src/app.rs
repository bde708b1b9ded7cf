//! Router assembly.
//!
//! Every request passes, outermost first, through request-id assignment,
//! tracing and the security headers, then the session gate, before it
//! reaches a route. Unmatched paths fall through to the static front-end when a
//! static directory is configured.

use agentgrid_core::RequestId;
use axum::{
    Json, Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Request, StatusCode, header},
    middleware,
    routing::{any, get},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::auth::{self, AppState};
use crate::proxy;

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/login", get(auth::login))
        .route("/auth/sign-in", get(auth::sign_in))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/sign-out", get(auth::sign_out).post(auth::sign_out))
        .route(
            "/api/backend/{*rest}",
            // Bodies are relayed as-is; size policy belongs to the backend.
            any(proxy::proxy).layer(DefaultBodyLimit::disable()),
        );

    let routes = match &state.config.static_dir {
        Some(dir) => {
            tracing::info!(static_dir = %dir, "Serving static front-end");
            routes.fallback_service(ServeDir::new(dir))
        }
        None => routes.fallback(not_found),
    };

    routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_gate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUlid))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(&X_REQUEST_ID)
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }),
                )
                // Headers already set by a handler or relayed from the backend win.
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("permissions-policy"),
                    HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
                )),
        )
        .with_state(state)
}

/// Issues `req_<ULID>` request ids for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
struct MakeRequestUlid;

impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(
        &mut self,
        _request: &Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        HeaderValue::from_str(&RequestId::new().to_string())
            .ok()
            .map(tower_http::request_id::RequestId::new)
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_request_ids_are_prefixed_ulids() {
        let request = Request::new(());
        let id = MakeRequestUlid
            .make_request_id(&request)
            .expect("request id");
        let value = id.header_value().to_str().expect("ascii");
        assert!(value.starts_with("req_"));
        assert!(value.parse::<RequestId>().is_ok());
    }
}
