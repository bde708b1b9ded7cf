//! Error types for the platform-access crate.
//!
//! - `SignInError`: failure codes carried back to the sign-in page
//! - `CookieParseError`: a `Set-Cookie` header that cannot be relayed

use std::fmt;

/// Failure reported to the browser on the sign-in page.
///
/// The edge server never shows raw failures; every failure path of the
/// sign-in, callback, and sign-out flows ends in a redirect carrying one of
/// these codes in the `error` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// Starting the flow with the identity provider failed.
    OauthFailed,
    /// The provider redirected back without an authorization code.
    NoCode,
    /// The backend rejected the authorization code.
    AuthFailed,
    /// Transport or other unexpected failure while completing sign-in.
    ServerError,
    /// Error code reported by the identity provider, passed through as-is.
    Provider { code: String },
}

impl SignInError {
    /// Parses an `error` query value back into a sign-in error.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "oauth_failed" => Self::OauthFailed,
            "no_code" => Self::NoCode,
            "auth_failed" => Self::AuthFailed,
            "server_error" => Self::ServerError,
            other => Self::Provider {
                code: other.to_string(),
            },
        }
    }

    /// Returns the value placed in the `error` query parameter.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::OauthFailed => "oauth_failed",
            Self::NoCode => "no_code",
            Self::AuthFailed => "auth_failed",
            Self::ServerError => "server_error",
            Self::Provider { code } => code,
        }
    }

    /// Returns a message suitable for showing to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::OauthFailed => "Could not start sign-in with the identity provider. Please try again.",
            Self::NoCode => "The identity provider did not return an authorization code.",
            Self::AuthFailed => "Authentication failed. Please try again.",
            Self::ServerError => "Something went wrong on our side. Please try again later.",
            Self::Provider { code } => match code.as_str() {
                "access_denied" => "Access was denied by the identity provider.",
                "invalid_state" => "Your sign-in attempt expired. Please start again.",
                _ => "Sign-in failed. Please try again.",
            },
        }
    }
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider { code } => write!(f, "identity provider error: {code}"),
            other => write!(f, "sign-in failed: {}", other.code()),
        }
    }
}

impl std::error::Error for SignInError {}

/// Errors from parsing a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieParseError {
    /// The header has no `=` in its first segment.
    MissingPair { header: String },
    /// The cookie name is empty.
    EmptyName { header: String },
}

impl fmt::Display for CookieParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPair { header } => {
                write!(f, "set-cookie header has no name=value pair: {header}")
            }
            Self::EmptyName { header } => {
                write!(f, "set-cookie header has an empty cookie name: {header}")
            }
        }
    }
}

impl std::error::Error for CookieParseError {}
