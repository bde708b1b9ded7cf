//! Handler-boundary error types.
//!
//! Failures never escape a handler as raw errors. Sign-in flows turn them
//! into a redirect to the sign-in page carrying an error code; the backend
//! proxy turns them into a JSON error response.

use crate::backend::BackendError;
use agentgrid_platform_access::{SignInError, sign_in_error_location};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rootcause::prelude::Report;
use std::fmt;

/// Redirect to the sign-in page reporting why sign-in did not complete.
#[derive(Debug)]
pub struct SignInRedirect(pub SignInError);

impl From<SignInError> for SignInRedirect {
    fn from(error: SignInError) -> Self {
        Self(error)
    }
}

impl IntoResponse for SignInRedirect {
    fn into_response(self) -> Response {
        Redirect::to(&sign_in_error_location(&self.0)).into_response()
    }
}

/// Backend proxy failures.
///
/// Only transport-level failures end up here; any status the backend
/// returns is relayed as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The backend could not be reached or the exchange broke off.
    Unreachable,
    /// The backend did not answer within the configured timeout.
    Timeout,
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "backend unreachable"),
            Self::Timeout => write!(f, "backend timed out"),
        }
    }
}

impl std::error::Error for ProxyError {}

impl From<&Report<BackendError>> for ProxyError {
    fn from(report: &Report<BackendError>) -> Self {
        match report.current_context() {
            BackendError::Timeout { .. } => Self::Timeout,
            _ => Self::Unreachable,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unreachable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to reach backend service",
            ),
            Self::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Backend service did not respond in time",
            ),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
