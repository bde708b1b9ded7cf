//! Route lists and gate exclusions.
//!
//! Routes are matched by an ordered scan over declared lists. A route matches
//! a request path when the path equals the route, or when the path continues
//! the route with a `/` (whole path segments only). There are no wildcards.

use serde::{Deserialize, Serialize};

/// Returns true if `path` is `route` or lies beneath it on a segment boundary.
///
/// ```
/// use agentgrid_platform_access::matches_route;
///
/// assert!(matches_route("/auth/sign-in", "/auth/sign-in"));
/// assert!(matches_route("/auth/sign-in/sso", "/auth/sign-in"));
/// assert!(!matches_route("/auth/sign-inx", "/auth/sign-in"));
/// ```
#[must_use]
pub fn matches_route(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// An ordered list of declared routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteList {
    routes: Vec<String>,
}

impl RouteList {
    /// Creates a route list, normalizing trailing slashes.
    ///
    /// Empty entries are dropped. `/` is kept as-is and matches only `/`.
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let routes = routes
            .into_iter()
            .filter_map(|route| {
                let route = route.as_ref().trim();
                if route.is_empty() {
                    return None;
                }
                let trimmed = route.trim_end_matches('/');
                Some(if trimmed.is_empty() {
                    "/".to_string()
                } else {
                    trimmed.to_string()
                })
            })
            .collect();
        Self { routes }
    }

    /// Parses a comma-separated route list.
    #[must_use]
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Returns true if any route in the list matches `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.routes.iter().any(|route| matches_route(path, route))
    }

    /// Iterates over the declared routes.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(String::as_str)
    }

    /// Returns true if no routes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Image extensions that are always treated as static assets.
const ASSET_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"];

/// Paths that are removed from gating before the gate runs.
///
/// Covers the API prefix, framework asset prefixes, well-known top-level
/// files, and image assets by extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    prefixes: RouteList,
    files: Vec<String>,
}

impl Exclusions {
    /// Creates an exclusion set from prefixes and exact top-level files.
    #[must_use]
    pub fn new(prefixes: RouteList, files: Vec<String>) -> Self {
        Self { prefixes, files }
    }

    /// Returns true if `path` bypasses the session gate.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.prefixes.matches(path) || self.files.iter().any(|file| file == path) {
            return true;
        }

        let last_segment = path.rsplit('/').next().unwrap_or_default();
        last_segment
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| {
                !stem.is_empty()
                    && ASSET_EXTENSIONS
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Route configuration for the session gate.
///
/// Every list is a comma-separated string so it can be supplied from a single
/// environment variable. Fields with defaults can be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Routes servable without a session.
    #[serde(default = "default_public")]
    public: String,
    /// Routes a signed-in user is sent away from (the login flow).
    #[serde(default = "default_auth_only")]
    auth_only: String,
    /// Path prefixes never gated (API, framework assets).
    #[serde(default = "default_excluded_prefixes")]
    excluded_prefixes: String,
    /// Exact top-level files never gated.
    #[serde(default = "default_excluded_files")]
    excluded_files: String,
}

fn default_public() -> String {
    "/auth/sign-in,/auth/sign-up,/auth/callback,/auth/login,/auth/sign-out,/healthz".to_string()
}

fn default_auth_only() -> String {
    "/auth/sign-in,/auth/sign-up".to_string()
}

fn default_excluded_prefixes() -> String {
    "/api,/_next/static,/_next/image,/pkg,/static,/assets".to_string()
}

fn default_excluded_files() -> String {
    "/favicon.ico,/robots.txt,/sitemap.xml,/manifest.json".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: default_public(),
            auth_only: default_auth_only(),
            excluded_prefixes: default_excluded_prefixes(),
            excluded_files: default_excluded_files(),
        }
    }
}

impl RoutesConfig {
    /// Returns the public routes.
    #[must_use]
    pub fn public(&self) -> RouteList {
        RouteList::from_csv(&self.public)
    }

    /// Returns the auth-only routes.
    #[must_use]
    pub fn auth_only(&self) -> RouteList {
        RouteList::from_csv(&self.auth_only)
    }

    /// Returns the gate exclusions.
    #[must_use]
    pub fn exclusions(&self) -> Exclusions {
        let files = self
            .excluded_files
            .split(',')
            .map(str::trim)
            .filter(|file| !file.is_empty())
            .map(str::to_string)
            .collect();
        Exclusions::new(RouteList::from_csv(&self.excluded_prefixes), files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(matches_route("/auth/callback", "/auth/callback"));
    }

    #[test]
    fn segment_prefix_match() {
        assert!(matches_route("/auth/callback/extra", "/auth/callback"));
        assert!(!matches_route("/auth/callbacks", "/auth/callback"));
    }

    #[test]
    fn root_route_matches_only_root() {
        let routes = RouteList::new(["/"]);
        assert!(routes.matches("/"));
        assert!(!routes.matches("/agents"));
    }

    #[test]
    fn trailing_slashes_are_normalized() {
        let routes = RouteList::new(["/docs/"]);
        assert_eq!(routes.iter().collect::<Vec<_>>(), vec!["/docs"]);
        assert!(routes.matches("/docs/getting-started"));
    }

    #[test]
    fn csv_parsing_skips_blanks() {
        let routes = RouteList::from_csv(" /a , ,/b,");
        assert_eq!(routes.iter().collect::<Vec<_>>(), vec!["/a", "/b"]);
    }

    #[test]
    fn empty_list_matches_nothing() {
        let routes = RouteList::from_csv("");
        assert!(routes.is_empty());
        assert!(!routes.matches("/"));
    }

    #[test]
    fn default_exclusions_cover_api_and_assets() {
        let exclusions = RoutesConfig::default().exclusions();
        assert!(exclusions.is_excluded("/api/backend/widgets"));
        assert!(exclusions.is_excluded("/api"));
        assert!(exclusions.is_excluded("/_next/static/chunks/main.js"));
        assert!(exclusions.is_excluded("/favicon.ico"));
        assert!(exclusions.is_excluded("/robots.txt"));
        assert!(exclusions.is_excluded("/images/logo.PNG"));
    }

    #[test]
    fn exclusions_do_not_cover_pages() {
        let exclusions = RoutesConfig::default().exclusions();
        assert!(!exclusions.is_excluded("/"));
        assert!(!exclusions.is_excluded("/agents"));
        assert!(!exclusions.is_excluded("/apis"));
        assert!(!exclusions.is_excluded("/settings/profile.json"));
        assert!(!exclusions.is_excluded("/.png"));
    }

    #[test]
    fn routes_config_deserializes_with_defaults() {
        let config: RoutesConfig =
            serde_json::from_str(r#"{"public": "/status"}"#).expect("deserialize");
        assert!(config.public().matches("/status"));
        assert!(!config.public().matches("/auth/sign-in"));
        assert!(config.auth_only().matches("/auth/sign-in"));
    }
}
