//! Remote repository references

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::{Error, Result};

/// Id of the default remote repository
pub const CENTRAL_ID: &str = "central";

/// URL of the default remote repository
pub const CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";

/// Repository layout used when none is given
pub const DEFAULT_LAYOUT: &str = "default";

/// A remote repository the resolution engine may talk to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRepository {
    /// Repository id, also the key for server credentials
    pub id: String,

    /// Repository layout ("default", "legacy", ...)
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Base URL
    pub url: String,
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}

impl RemoteRepository {
    /// Create a repository with an explicit layout
    pub fn new(id: impl Into<String>, layout: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layout: layout.into(),
            url: url.into(),
        }
    }

    /// Create a repository using the default layout
    pub fn with_default_layout(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(id, DEFAULT_LAYOUT, url)
    }

    /// The conventional default remote endpoint
    pub fn central() -> Self {
        Self::with_default_layout(CENTRAL_ID, CENTRAL_URL)
    }

    /// Parse a repository from an `id::url` or `id::layout::url` spec.
    ///
    /// # Example
    ///
    /// ```
    /// use mima_context::RemoteRepository;
    ///
    /// let repo = RemoteRepository::parse_spec("releases::https://repo.example.com/releases").unwrap();
    /// assert_eq!(repo.id, "releases");
    /// assert_eq!(repo.layout, "default");
    /// ```
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepositorySpec {
            spec: spec.to_string(),
        };

        let parts: Vec<&str> = spec.splitn(3, "::").collect();
        let repo = match parts.as_slice() {
            [id, url] => Self::with_default_layout(*id, *url),
            [id, layout, url] => Self::new(*id, *layout, *url),
            _ => return Err(invalid()),
        };

        if repo.id.trim().is_empty() || repo.layout.trim().is_empty() {
            return Err(invalid());
        }
        Url::parse(&repo.url).map_err(|_| invalid())?;
        Ok(repo)
    }

    /// URL scheme in lower case, if the URL parses
    pub fn protocol(&self) -> Option<String> {
        Url::parse(&self.url).ok().map(|u| u.scheme().to_ascii_lowercase())
    }

    /// Host part of the URL, if any
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Whether the repository lives outside this machine.
    ///
    /// `file:` URLs and loopback hosts are local; anything unparseable is
    /// treated as local so that `external:*` never captures it.
    pub fn is_external(&self) -> bool {
        let Ok(url) = Url::parse(&self.url) else {
            return false;
        };
        if url.scheme().eq_ignore_ascii_case("file") {
            return false;
        }
        match url.host_str() {
            Some(host) => !matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1"),
            None => false,
        }
    }

    /// Whether the repository is external and uses plain `http`
    pub fn is_external_http(&self) -> bool {
        self.is_external() && self.protocol().as_deref() == Some("http")
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.url, self.layout)
    }
}

impl FromStr for RemoteRepository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_spec(s)
    }
}
