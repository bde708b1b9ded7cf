//! agentgrid edge server.
//!
//! Sits between the browser and the agentgrid backend: gates pages on the
//! presence of a session cookie, completes OAuth sign-in by delegating the
//! code exchange to the backend, relays API calls under `/api/backend/`, and
//! serves the compiled front-end.

pub mod app;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod proxy;
