//! Cookies installed and removed by the edge server.
//!
//! Only the session cookie is ever built here. Every other cookie the browser
//! receives is relayed from the backend unchanged.
//!
//! Cookies are rendered without percent-encoding so the session value reaches
//! the browser byte-for-byte as the backend issued it.

use agentgrid_platform_access::{SameSitePolicy, SessionCookiePolicy};
use axum::http::HeaderValue;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Create the session cookie with canonical attributes.
pub(super) fn session_cookie(policy: &SessionCookiePolicy, value: &str) -> Cookie<'static> {
    Cookie::build((policy.cookie_name().to_string(), value.to_string()))
        .http_only(true)
        .secure(policy.secure_cookies())
        .same_site(same_site(policy.same_site()))
        .path("/")
        .max_age(Duration::seconds(policy.max_age_seconds()))
        .build()
}

/// Create removal cookie for the session.
pub(super) fn clear_session_cookie(policy: &SessionCookiePolicy) -> Cookie<'static> {
    Cookie::build((policy.cookie_name().to_string(), ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Render a cookie as a `Set-Cookie` header value.
pub(super) fn set_cookie_value(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}

fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::Strict => SameSite::Strict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_has_canonical_attributes() {
        let cookie = session_cookie(&SessionCookiePolicy::default(), "XYZ==");
        assert_eq!(cookie.name(), "wos-session");
        assert_eq!(cookie.value(), "XYZ==");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn strict_policy_maps_to_strict_cookie() {
        let policy = SessionCookiePolicy::default()
            .with_same_site(SameSitePolicy::Strict)
            .with_secure_cookies(false);
        let cookie = session_cookie(&policy, "token");
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn header_value_is_not_percent_encoded() {
        let cookie = session_cookie(&SessionCookiePolicy::default(), "XYZ==");
        let value = set_cookie_value(&cookie).expect("header value");
        let value = value.to_str().expect("ascii");
        assert!(value.starts_with("wos-session=XYZ==;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=604800"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&SessionCookiePolicy::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
