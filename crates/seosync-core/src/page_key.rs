//! Page keys and their derivation from sitemap URLs.
//!
//! `https://example.com/pricing/plans/` becomes `pricing-plans`: the origin
//! is removed, then one trailing slash, then the path is lowercased and its
//! slashes become hyphens.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier correlating a sitemap URL with a metadata record.
///
/// Invariant: non-empty, lowercase, no `/`, no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageKey(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid page key `{key}`: {reason}")]
pub struct InvalidPageKey {
    pub key: String,
    pub reason: &'static str,
}

impl PageKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidPageKey> {
        let key = raw.into();
        let reason = if key.is_empty() {
            Some("empty")
        } else if key.chars().any(char::is_uppercase) {
            Some("contains uppercase characters")
        } else if key.contains('/') {
            Some("contains `/`")
        } else if key.chars().any(char::is_whitespace) {
            Some("contains whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InvalidPageKey { key, reason }),
            None => Ok(Self(key)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hyphen-separated tokens, skipping empty ones (`a--b` yields `a`, `b`).
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split('-').filter(|token| !token.is_empty())
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PageKey {
    type Error = InvalidPageKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageKey> for String {
    fn from(key: PageKey) -> Self {
        key.0
    }
}

/// Derives page keys for one site origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDeriver {
    origin: String,
    bare_domain: String,
}

impl KeyDeriver {
    /// `origin` is scheme plus host, e.g. `https://example.com`. A trailing
    /// slash is ignored.
    pub fn new(origin: &str) -> Result<Self, ConfigError> {
        let trimmed = origin.trim().trim_end_matches('/');
        let host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| ConfigError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "must start with http:// or https://",
            })?;
        if host.is_empty() || host.contains(['/', '?', '#']) || host.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "must be scheme and host only",
            });
        }

        Ok(Self {
            origin: trimmed.to_ascii_lowercase(),
            bare_domain: host.to_ascii_lowercase(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The host token a key must never equal.
    pub fn bare_domain(&self) -> &str {
        &self.bare_domain
    }

    /// Derive the key for `url`. Returns `None` (the empty sentinel) for URLs
    /// outside the origin, the site root, and keys equal to the bare domain.
    pub fn derive_key(&self, url: &str) -> Option<PageKey> {
        let url = url.trim();
        let head = url.get(..self.origin.len())?;
        if !head.eq_ignore_ascii_case(&self.origin) {
            return None;
        }
        let rest = &url[self.origin.len()..];
        if !(rest.is_empty() || rest.starts_with(['/', '?', '#'])) {
            return None;
        }

        let path = rest.split(['?', '#']).next().unwrap_or_default();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        let key = path.to_lowercase().replace('/', "-");
        if key.is_empty() || key == self.bare_domain {
            return None;
        }
        PageKey::new(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deriver() -> KeyDeriver {
        KeyDeriver::new("https://example.com").expect("origin should be valid")
    }

    fn key(url: &str) -> Option<String> {
        deriver().derive_key(url).map(String::from)
    }

    #[test]
    fn derives_hyphenated_lowercase_keys() {
        assert_eq!(key("https://example.com/about"), Some("about".to_string()));
        assert_eq!(
            key("https://example.com/pricing/plans"),
            Some("pricing-plans".to_string())
        );
        assert_eq!(
            key("https://example.com/Blog/Data-Erasure-Guide/"),
            Some("blog-data-erasure-guide".to_string())
        );
    }

    #[test]
    fn strips_only_one_trailing_slash() {
        assert_eq!(key("https://example.com/about//"), Some("about-".to_string()));
    }

    #[test]
    fn same_path_same_key() {
        assert_eq!(
            key("https://example.com/services/?utm=1"),
            key("https://EXAMPLE.com/services#top")
        );
    }

    #[test]
    fn rejects_root_foreign_and_bare_domain() {
        assert_eq!(key("https://example.com"), None);
        assert_eq!(key("https://example.com/"), None);
        assert_eq!(key("https://other.com/about"), None);
        assert_eq!(key("https://example.com.evil/about"), None);
        assert_eq!(key("https://example.com/example.com"), None);
        assert_eq!(key(""), None);
    }

    #[test]
    fn origin_validation() {
        assert!(KeyDeriver::new("https://example.com/").is_ok());
        assert!(KeyDeriver::new("example.com").is_err());
        assert!(KeyDeriver::new("https://example.com/blog").is_err());
        assert_eq!(
            KeyDeriver::new("https://Example.com/")
                .expect("valid")
                .bare_domain(),
            "example.com"
        );
    }

    #[test]
    fn page_key_validation() {
        assert!(PageKey::new("data-erasure-guide").is_ok());
        assert_eq!(
            PageKey::new("Home").expect_err("uppercase").reason,
            "contains uppercase characters"
        );
        assert!(PageKey::new("").is_err());
        assert!(PageKey::new("a/b").is_err());
        assert!(PageKey::new("a b").is_err());
    }

    #[test]
    fn tokens_skip_empty_segments() {
        let key = PageKey::new("a--b-").expect("valid");
        assert_eq!(key.tokens().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
