//! Authentication glue for the edge server.
//!
//! This module provides:
//! - The session gate middleware in front of every page
//! - Sign-in initiation, the OAuth callback, and sign-out routes
//! - The minimal sign-in page those routes redirect to
//!
//! # Session Model
//!
//! The edge server holds no sessions. The backend issues an opaque session
//! cookie during the callback exchange; the edge server re-installs it with
//! canonical attributes and afterwards only checks that it is present. Every
//! decision about whether the session is still valid is left to the backend,
//! which sees the cookie on each proxied call.

mod cookies;
pub mod middleware;
pub mod routes;

use crate::backend::{BackendClient, BackendError};
use crate::config::ServerConfig;
use agentgrid_platform_access::SessionGate;
use agentgrid_core::Result;

pub use middleware::session_gate;
pub use routes::{callback, login, sign_in, sign_out};

/// Shared application state.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Client for the backend service.
    pub backend: BackendClient,
    /// Route protection rules.
    pub gate: SessionGate,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: ServerConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(config.backend_base(), config.backend_timeout())?;
        let gate = SessionGate::from_config(&config.routes);

        Ok(Self {
            config,
            backend,
            gate,
        })
    }
}
