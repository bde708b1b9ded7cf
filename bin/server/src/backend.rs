//! HTTP client for the backend service.
//!
//! Every outbound call goes through [`BackendClient`]. The client never
//! follows redirects, so `Set-Cookie` headers on any response reach the
//! caller, and every call is bounded by the configured timeout. Nothing is
//! retried.

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use agentgrid_core::Result;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Errors from backend calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The HTTP client could not be constructed.
    ClientSetup { details: String },
    /// Connection, DNS, or protocol failure.
    Transport { endpoint: String, details: String },
    /// The call did not complete within the configured timeout.
    Timeout { endpoint: String },
    /// The backend answered with a non-success status.
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    /// The backend's response body was not what the endpoint promises.
    InvalidResponse { endpoint: String, details: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientSetup { details } => {
                write!(f, "failed to build backend client: {details}")
            }
            Self::Transport { endpoint, details } => {
                write!(f, "backend request to '{endpoint}' failed: {details}")
            }
            Self::Timeout { endpoint } => {
                write!(f, "backend request to '{endpoint}' timed out")
            }
            Self::Status {
                endpoint,
                status,
                detail,
            } => match detail {
                Some(detail) => {
                    write!(f, "backend '{endpoint}' returned {status}: {detail}")
                }
                None => write!(f, "backend '{endpoint}' returned {status}"),
            },
            Self::InvalidResponse { endpoint, details } => {
                write!(f, "invalid response from backend '{endpoint}': {details}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    fn from_reqwest(endpoint: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            Self::Transport {
                endpoint: endpoint.to_string(),
                details: error.to_string(),
            }
        }
    }
}

/// Result of asking the backend where to send the browser for sign-in.
#[derive(Debug)]
pub struct LoginInitiation {
    /// Identity provider URL the browser is redirected to.
    pub authorization_url: String,
    /// `Set-Cookie` headers to relay, notably `oauth_state`.
    pub set_cookies: Vec<HeaderValue>,
}

/// Result of a successful authorization-code exchange.
#[derive(Debug)]
pub struct CodeExchange {
    /// Every `Set-Cookie` header the backend returned, in order.
    pub set_cookies: Vec<HeaderValue>,
}

/// A browser request rebuilt for the backend.
#[derive(Debug)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path below the backend base, without a leading slash.
    pub path: String,
    /// Raw query string, copied verbatim.
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// `None` for methods that carry no body.
    pub body: Option<Bytes>,
}

/// The backend's answer to a forwarded request.
#[derive(Debug)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub set_cookies: Vec<HeaderValue>,
    pub body: Bytes,
}

#[derive(Deserialize)]
struct LoginUrlBody {
    authorization_url: String,
}

/// Client for the backend service.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::ClientSetup {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the absolute URL for a backend path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Asks the backend for the identity provider's authorization URL.
    #[instrument(skip(self))]
    pub async fn login_url(
        &self,
        redirect_uri: &str,
        provider: &str,
    ) -> Result<LoginInitiation, BackendError> {
        let endpoint = "/auth/login-url";
        let response = self
            .http
            .get(self.url(endpoint))
            .query(&[("redirect_uri", redirect_uri), ("provider", provider)])
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(endpoint, &e))?;

        let status = response.status();
        let set_cookies = set_cookie_headers(response.headers());

        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        let body: LoginUrlBody =
            response
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse {
                    endpoint: endpoint.to_string(),
                    details: e.to_string(),
                })?;

        Ok(LoginInitiation {
            authorization_url: body.authorization_url,
            set_cookies,
        })
    }

    /// Exchanges an authorization code for session cookies.
    ///
    /// `cookie_header` is sent as-is; it carries the `oauth_state` cookie
    /// that lets the backend correlate this exchange with the sign-in it
    /// started.
    ///
    /// # Errors
    ///
    /// A non-success status is reported as [`BackendError::Status`], with the
    /// backend's JSON `detail` when one can be read.
    #[instrument(skip(self, code, cookie_header), fields(has_state = state.is_some()))]
    pub async fn exchange_code(
        &self,
        code: &str,
        state: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<CodeExchange, BackendError> {
        let endpoint = "/auth/callback";
        let mut query = vec![("code", code)];
        if let Some(state) = state {
            query.push(("state", state));
        }

        let mut request = self.http.get(self.url(endpoint)).query(&query);
        if let Some(cookie_header) = cookie_header {
            request = request.header(header::COOKIE, cookie_header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        let set_cookies = set_cookie_headers(response.headers());
        debug!(cookies = set_cookies.len(), "code exchange succeeded");

        Ok(CodeExchange { set_cookies })
    }

    /// Ends the session on the backend.
    #[instrument(skip(self, cookie_header))]
    pub async fn logout(&self, cookie_header: &str) -> Result<(), BackendError> {
        let endpoint = "/auth/logout";
        let response = self
            .http
            .post(self.url(endpoint))
            .header(header::COOKIE, cookie_header)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail: None,
            }
            .into());
        }

        Ok(())
    }

    /// Sends a rebuilt browser request and collects the backend's answer.
    ///
    /// Any status, including errors, is a successful forward.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn forward(
        &self,
        request: ForwardRequest,
    ) -> Result<ForwardResponse, BackendError> {
        let mut url = self.url(&request.path);
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        let mut outbound = self
            .http
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = request.body {
            outbound = outbound.body(body);
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&request.path, &e))?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let set_cookies = set_cookie_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::from_reqwest(&request.path, &e))?;

        Ok(ForwardResponse {
            status,
            content_type,
            set_cookies,
            body,
        })
    }
}

/// Collects every `Set-Cookie` header individually.
fn set_cookie_headers(headers: &HeaderMap) -> Vec<HeaderValue> {
    headers.get_all(header::SET_COOKIE).iter().cloned().collect()
}

/// Reads a FastAPI-style `{"detail": ...}` error body, if there is one.
///
/// Any failure to read or parse yields `None`.
async fn error_detail(response: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    match body.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client =
            BackendClient::new("http://backend:8000/", Duration::from_secs(5)).expect("client");
        assert_eq!(client.url("/auth/logout"), "http://backend:8000/auth/logout");
        assert_eq!(client.url("widgets/1"), "http://backend:8000/widgets/1");
    }

    #[test]
    fn set_cookie_headers_are_kept_separate() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1; Path=/"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));
        let cookies = set_cookie_headers(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "a=1; Path=/");
        assert_eq!(cookies[1], "b=2; Path=/");
    }

    #[test]
    fn status_error_display_includes_detail() {
        let err = BackendError::Status {
            endpoint: "/auth/callback".to_string(),
            status: 400,
            detail: Some("Invalid authorization code".to_string()),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Invalid authorization code"));
    }

    #[test]
    fn timeout_error_display() {
        let err = BackendError::Timeout {
            endpoint: "widgets".to_string(),
        };
        assert!(err.to_string().contains("timed out"));
    }
}
