//! The session gate.
//!
//! Every page request passes through the gate before it is served. The gate
//! looks only at the request path and whether a session cookie is present;
//! it never touches cookies itself.

use crate::error::SignInError;
use crate::route::{Exclusions, RouteList, RoutesConfig};
use crate::session::SessionToken;

/// Path of the sign-in page.
pub const SIGN_IN_PATH: &str = "/auth/sign-in";

/// Path signed-in users are sent to.
pub const HOME_PATH: &str = "/";

/// Outcome of gating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Serve the request.
    Allow,
    /// No session on a protected path; sign in, then come back.
    RedirectToSignIn { callback_url: String },
    /// Already signed in on an auth-only path.
    RedirectHome,
}

impl GateDecision {
    /// Returns the redirect target, or `None` for [`GateDecision::Allow`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToSignIn { callback_url } => Some(format!(
                "{SIGN_IN_PATH}?callbackUrl={}",
                urlencoding::encode(callback_url)
            )),
            Self::RedirectHome => Some(HOME_PATH.to_string()),
        }
    }
}

/// Returns the sign-in page location carrying an error code.
#[must_use]
pub fn sign_in_error_location(error: &SignInError) -> String {
    format!("{SIGN_IN_PATH}?error={}", urlencoding::encode(error.code()))
}

/// Route protection by session cookie presence.
#[derive(Debug, Clone)]
pub struct SessionGate {
    public: RouteList,
    auth_only: RouteList,
    exclusions: Exclusions,
}

impl SessionGate {
    /// Creates a gate from explicit route lists.
    #[must_use]
    pub fn new(public: RouteList, auth_only: RouteList, exclusions: Exclusions) -> Self {
        Self {
            public,
            auth_only,
            exclusions,
        }
    }

    /// Creates a gate from route configuration.
    #[must_use]
    pub fn from_config(config: &RoutesConfig) -> Self {
        Self::new(config.public(), config.auth_only(), config.exclusions())
    }

    /// Returns true if the path bypasses the gate entirely.
    ///
    /// Callers check this before [`SessionGate::evaluate`].
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.is_excluded(path)
    }

    /// Decides what to do with a request for `path`.
    ///
    /// An auth-only route with a session redirects home even when the route
    /// is also public.
    #[must_use]
    pub fn evaluate(&self, path: &str, session: Option<&SessionToken>) -> GateDecision {
        let signed_in = session.is_some();

        if signed_in && self.auth_only.matches(path) {
            return GateDecision::RedirectHome;
        }

        if self.public.matches(path) || signed_in {
            return GateDecision::Allow;
        }

        GateDecision::RedirectToSignIn {
            callback_url: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SessionGate {
        SessionGate::from_config(&RoutesConfig::default())
    }

    fn session() -> SessionToken {
        SessionToken::from_cookie_value("sealed").expect("token")
    }

    #[test]
    fn protected_path_without_session_redirects_to_sign_in() {
        for path in ["/", "/agents", "/settings/billing", "/auth/sign-inx"] {
            let decision = gate().evaluate(path, None);
            assert_eq!(
                decision,
                GateDecision::RedirectToSignIn {
                    callback_url: path.to_string()
                },
                "path {path}"
            );
        }
    }

    #[test]
    fn public_paths_pass_regardless_of_session() {
        for path in ["/auth/callback", "/auth/sign-out", "/healthz", "/auth/login"] {
            assert_eq!(gate().evaluate(path, None), GateDecision::Allow, "path {path}");
            assert_eq!(
                gate().evaluate(path, Some(&session())),
                GateDecision::Allow,
                "path {path}"
            );
        }
    }

    #[test]
    fn sign_in_without_session_is_allowed() {
        assert_eq!(gate().evaluate("/auth/sign-in", None), GateDecision::Allow);
    }

    #[test]
    fn sign_in_with_session_redirects_home() {
        let decision = gate().evaluate("/auth/sign-in", Some(&session()));
        assert_eq!(decision, GateDecision::RedirectHome);
        assert_eq!(decision.location().as_deref(), Some("/"));
    }

    #[test]
    fn auth_only_matches_nested_paths() {
        assert_eq!(
            gate().evaluate("/auth/sign-up/verify", Some(&session())),
            GateDecision::RedirectHome
        );
    }

    #[test]
    fn protected_path_with_session_is_allowed() {
        assert_eq!(gate().evaluate("/agents", Some(&session())), GateDecision::Allow);
    }

    #[test]
    fn sign_in_location_encodes_callback_url() {
        let decision = GateDecision::RedirectToSignIn {
            callback_url: "/agents/42".to_string(),
        };
        assert_eq!(
            decision.location().as_deref(),
            Some("/auth/sign-in?callbackUrl=%2Fagents%2F42")
        );
    }

    #[test]
    fn allow_has_no_location() {
        assert!(GateDecision::Allow.location().is_none());
    }

    #[test]
    fn error_location_carries_code() {
        assert_eq!(
            sign_in_error_location(&SignInError::NoCode),
            "/auth/sign-in?error=no_code"
        );
        assert_eq!(
            sign_in_error_location(&SignInError::from_code("access_denied")),
            "/auth/sign-in?error=access_denied"
        );
    }

    #[test]
    fn excluded_paths_are_reported() {
        assert!(gate().is_excluded("/api/backend/widgets"));
        assert!(!gate().is_excluded("/agents"));
    }
}
