//! Base URL normalization.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// Appends a trailing slash to `url` unless it already has one.
///
/// Empty or whitespace-only input is rejected instead of being indexed into.
/// The result is idempotent: normalizing twice yields the same string.
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidBaseUrl {
            url: url.to_string(),
            reason: "base URL is empty".to_string(),
        });
    }

    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

/// A validated, slash-terminated API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Normalizes `raw` and checks that it is an absolute URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_base_url(raw)?;
        let url = Url::parse(&normalized).map_err(|e| Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        // A query or fragment would swallow the appended slash.
        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL must not carry a query or fragment".to_string(),
            });
        }

        Ok(Self(url))
    }

    /// Resolves `path` below this root. Leading slashes on `path` are dropped
    /// so that `api/v3/` + `/projects` stays under `api/v3/`.
    pub fn join(&self, path: &str) -> Result<Url> {
        self.0
            .join(path.trim_start_matches('/'))
            .map_err(|source| Error::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_missing_slash() {
        assert_eq!(
            normalize_base_url("http://example.com/api").unwrap(),
            "http://example.com/api/"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "http://example.com/api",
            "http://example.com/api/",
            "https://gitlab.example.org",
            "  http://gitlab.com/api/v3  ",
        ] {
            let once = normalize_base_url(raw).unwrap();
            let twice = normalize_base_url(&once).unwrap();
            assert_eq!(once, twice);
            assert!(once.ends_with('/'));
            assert!(!once.ends_with("//"));
        }
    }

    #[test]
    fn empty_base_url_is_a_configuration_error() {
        for raw in ["", "   "] {
            let err = normalize_base_url(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidBaseUrl { .. }));
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn rejects_relative_urls() {
        let err = BaseUrl::parse("gitlab.com/api/v3").unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_non_hierarchical_urls() {
        let err = BaseUrl::parse("mailto:admin@example.com").unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_query_and_fragment() {
        for raw in [
            "http://example.com/api/v3?x=1",
            "http://example.com/api/v3#frag",
            "http://example.com/api/v3/?",
        ] {
            let err = BaseUrl::parse(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidBaseUrl { .. }), "{raw}");
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn join_keeps_the_api_prefix() {
        let base = BaseUrl::parse("http://gitlab.com/api/v3").unwrap();
        assert_eq!(base.as_str(), "http://gitlab.com/api/v3/");
        assert_eq!(
            base.join("projects").unwrap().as_str(),
            "http://gitlab.com/api/v3/projects"
        );
        assert_eq!(
            base.join("/projects").unwrap().as_str(),
            "http://gitlab.com/api/v3/projects"
        );
    }
}
