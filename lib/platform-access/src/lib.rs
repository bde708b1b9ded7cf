//! Platform access rules for the agentgrid edge server.
//!
//! This crate provides the request-independent logic behind the edge
//! server's authentication glue:
//! - Route matching and gate exclusions (`RouteList`, `Exclusions`)
//! - The session gate decision (`SessionGate`, `GateDecision`)
//! - `Set-Cookie` parsing and outbound `Cookie` construction (`RelayedCookie`)
//! - Session cookie attributes (`SessionCookiePolicy`, `SessionToken`)
//! - Sign-in error codes (`SignInError`)
//!
//! Nothing here performs I/O. Presence of a session cookie is the only
//! authentication signal; the backend remains the source of truth.
//!
//! # Example
//!
//! ```
//! use agentgrid_platform_access::{GateDecision, RoutesConfig, SessionGate, SessionToken};
//!
//! let gate = SessionGate::from_config(&RoutesConfig::default());
//!
//! let decision = gate.evaluate("/agents", None);
//! assert_eq!(
//!     decision,
//!     GateDecision::RedirectToSignIn { callback_url: "/agents".to_string() }
//! );
//!
//! let token = SessionToken::from_cookie_value("sealed-session");
//! assert_eq!(gate.evaluate("/auth/sign-in", token.as_ref()), GateDecision::RedirectHome);
//! ```

pub mod cookie;
pub mod error;
pub mod gate;
pub mod route;
pub mod session;

// Re-export main types at crate root
pub use cookie::{RelayedCookie, forward_cookie_header};
pub use error::{CookieParseError, SignInError};
pub use gate::{GateDecision, HOME_PATH, SIGN_IN_PATH, SessionGate, sign_in_error_location};
pub use route::{Exclusions, RouteList, RoutesConfig, matches_route};
pub use session::{OAUTH_STATE_COOKIE, SameSitePolicy, SessionCookiePolicy, SessionToken};
