//! Core types and utilities for the agentgrid edge server.
//!
//! This crate provides the error-handling foundation and the identifiers
//! shared by the platform-access logic and the HTTP server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, RequestId};
