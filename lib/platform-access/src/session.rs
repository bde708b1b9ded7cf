//! Session cookie handling.
//!
//! The session cookie is an opaque token issued by the backend. The edge
//! server never validates it; it only checks that a non-empty value exists
//! and re-installs it with canonical attributes after sign-in.

use serde::{Deserialize, Serialize};

/// Name of the cookie correlating the OAuth authorization request with its
/// callback.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Opaque session token taken from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from a cookie value.
    ///
    /// Returns `None` for an empty value, which counts as signed out.
    #[must_use]
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `SameSite` setting for the session cookie.
///
/// Only `lax` and stricter are allowed for a session credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    Lax,
    Strict,
}

/// Attributes applied to the session cookie when the edge server installs it.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookiePolicy {
    /// Cookie name carrying the session.
    /// Default: "wos-session"
    #[serde(default = "default_cookie_name")]
    cookie_name: String,
    /// Lifetime of the cookie in seconds.
    /// Default: 7 days
    #[serde(default = "default_max_age_seconds")]
    max_age_seconds: i64,
    /// Whether to set the Secure flag (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    secure_cookies: bool,
    /// SameSite attribute.
    #[serde(default)]
    same_site: SameSitePolicy,
}

fn default_cookie_name() -> String {
    "wos-session".to_string()
}

fn default_max_age_seconds() -> i64 {
    60 * 60 * 24 * 7
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionCookiePolicy {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_seconds: default_max_age_seconds(),
            secure_cookies: default_secure_cookies(),
            same_site: SameSitePolicy::default(),
        }
    }
}

impl SessionCookiePolicy {
    /// Returns a copy with the Secure flag set as given.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Returns a copy with a different SameSite setting.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site;
        self
    }

    /// Returns the session cookie name.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the cookie lifetime in seconds.
    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    /// Returns whether the Secure flag is set.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Returns the SameSite setting.
    #[must_use]
    pub fn same_site(&self) -> SameSitePolicy {
        self.same_site
    }

    /// Returns the cookie names relayed to the backend, session cookie first.
    #[must_use]
    pub fn forwarded_cookie_names(&self) -> [&str; 2] {
        [self.cookie_name.as_str(), OAUTH_STATE_COOKIE]
    }
}
