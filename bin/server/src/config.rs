//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`SessionCookiePolicy`] for session cookie attributes and
//! [`RoutesConfig`] for the session gate's route lists.

use agentgrid_platform_access::{RoutesConfig, SessionCookiePolicy};
use serde::Deserialize;
use std::time::Duration;

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the backend service (e.g. "http://localhost:8000").
    pub backend_url: String,

    /// Directory of compiled front-end assets served for unmatched paths.
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Upper bound on any single backend call, in seconds.
    #[serde(default = "default_backend_timeout_seconds")]
    pub backend_timeout_seconds: u64,

    /// Session cookie attributes.
    #[serde(default)]
    pub session: SessionCookiePolicy,

    /// OAuth sign-in configuration.
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Session gate routes.
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// OAuth sign-in settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Where the identity provider sends the browser back to.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Provider used when sign-in is started without one.
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_backend_timeout_seconds() -> u64 {
    30
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/auth/callback".to_string()
}

fn default_provider() -> String {
    "authkit".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_uri: default_redirect_uri(),
            default_provider: default_provider(),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration for the given backend with defaults elsewhere.
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            listen_addr: default_listen_addr(),
            backend_url: backend_url.into(),
            static_dir: None,
            backend_timeout_seconds: default_backend_timeout_seconds(),
            session: SessionCookiePolicy::default(),
            oauth: OAuthConfig::default(),
            routes: RoutesConfig::default(),
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Nested keys use `__` as a separator, e.g. `SESSION__COOKIE_NAME`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the backend base URL without a trailing slash.
    #[must_use]
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Returns the backend call timeout.
    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_seconds)
    }
}
