//! Cookie relay between the browser and the backend.
//!
//! Backend `Set-Cookie` headers are parsed just far enough to recognize the
//! session cookie; everything else is relayed untouched. Outbound requests
//! carry a `Cookie` header rebuilt from an allow-list.

use crate::error::CookieParseError;

/// A `Set-Cookie` header received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedCookie {
    name: String,
    value: String,
    attributes: String,
}

impl RelayedCookie {
    /// Parses a `Set-Cookie` header value.
    ///
    /// The `name=value` pair is split on the first `=` only. Session values
    /// are commonly base64 and end in `=` padding, which must survive intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the first segment has no `=` or the name is empty.
    pub fn parse(header: &str) -> Result<Self, CookieParseError> {
        let (pair, attributes) = match header.split_once(';') {
            Some((pair, attributes)) => (pair, attributes.trim()),
            None => (header, ""),
        };

        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| CookieParseError::MissingPair {
                header: header.to_string(),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CookieParseError::EmptyName {
                header: header.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            attributes: attributes.to_string(),
        })
    }

    /// Returns the cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cookie value exactly as the backend sent it.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the `Max-Age` attribute, if present and numeric.
    #[must_use]
    pub fn max_age(&self) -> Option<i64> {
        self.attribute("max-age")
            .and_then(|value| value.parse().ok())
    }

    /// Returns true if the backend is instructing the browser to delete the
    /// cookie.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.max_age().is_some_and(|age| age <= 0)
    }

    /// Looks up an attribute value by case-insensitive name.
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.split(';').find_map(|attribute| {
            let (name, value) = attribute.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case(key)
                .then(|| value.trim())
        })
    }
}

/// Builds the outbound `Cookie` header from an allow-list.
///
/// Only names in `allow_list` that `lookup` finds are included, in
/// allow-list order, joined with `; `. Returns `None` when none are present.
///
/// ```
/// use agentgrid_platform_access::forward_cookie_header;
///
/// let header = forward_cookie_header(&["wos-session", "oauth_state"], |name| {
///     (name == "wos-session").then(|| "S1".to_string())
/// });
/// assert_eq!(header.as_deref(), Some("wos-session=S1"));
/// ```
pub fn forward_cookie_header<F>(allow_list: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let pairs: Vec<String> = allow_list
        .iter()
        .filter_map(|name| lookup(name).map(|value| format!("{name}={value}")))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
