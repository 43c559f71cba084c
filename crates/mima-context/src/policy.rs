//! Checksum, snapshot-update and resolution-error policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// How often remote repositories are re-checked for snapshot versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotUpdatePolicy {
    /// Always re-check the remote repository
    Always,
    /// Trust whatever is cached locally
    Never,
}

impl SnapshotUpdatePolicy {
    /// Policy identifier understood by the resolution engine
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotUpdatePolicy::Always => "always",
            SnapshotUpdatePolicy::Never => "never",
        }
    }

    /// Whether a cached snapshot must be re-checked against the remote
    pub fn requires_remote_check(self) -> bool {
        matches!(self, SnapshotUpdatePolicy::Always)
    }
}

/// What to do when a downloaded checksum does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Abort on any mismatch
    Fail,
    /// Log the mismatch and continue
    #[default]
    Warn,
    /// Skip verification
    Ignore,
}

/// A checksum mismatch signalled by the resolution engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Artifact or metadata path being verified
    pub resource: String,
    /// Checksum published by the repository
    pub expected: String,
    /// Checksum computed locally
    pub actual: String,
}

/// Outcome of applying a [`ChecksumPolicy`] to a mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumOutcome {
    /// Mismatch was logged, processing continues
    Warned,
    /// Verification was skipped
    Ignored,
}

impl ChecksumPolicy {
    /// Policy identifier understood by the resolution engine
    pub fn as_str(self) -> &'static str {
        match self {
            ChecksumPolicy::Fail => "fail",
            ChecksumPolicy::Warn => "warn",
            ChecksumPolicy::Ignore => "ignore",
        }
    }

    /// Apply the policy to a mismatch reported by the engine.
    ///
    /// `Fail` returns [`Error::ChecksumMismatch`], `Warn` logs and
    /// continues, `Ignore` continues silently.
    pub fn on_mismatch(self, mismatch: &ChecksumMismatch) -> Result<ChecksumOutcome> {
        match self {
            ChecksumPolicy::Fail => Err(Error::ChecksumMismatch {
                resource: mismatch.resource.clone(),
                expected: mismatch.expected.clone(),
                actual: mismatch.actual.clone(),
            }),
            ChecksumPolicy::Warn => {
                tracing::warn!(
                    resource = %mismatch.resource,
                    expected = %mismatch.expected,
                    actual = %mismatch.actual,
                    "Checksum mismatch, continuing"
                );
                Ok(ChecksumOutcome::Warned)
            }
            ChecksumPolicy::Ignore => Ok(ChecksumOutcome::Ignored),
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SnapshotUpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(ChecksumPolicy::Fail),
            "warn" => Ok(ChecksumPolicy::Warn),
            "ignore" => Ok(ChecksumPolicy::Ignore),
            other => Err(format!("unknown checksum policy '{}'", other)),
        }
    }
}

impl FromStr for SnapshotUpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(SnapshotUpdatePolicy::Always),
            "never" => Ok(SnapshotUpdatePolicy::Never),
            other => Err(format!("unknown snapshot update policy '{}'", other)),
        }
    }
}

/// Which resolution failures the engine may cache between requests.
///
/// The context always disables both caches so that a failed lookup is
/// retried by the next resolution task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolutionErrorPolicy {
    /// Remember "artifact not found" results
    pub cache_not_found: bool,
    /// Remember transfer errors
    pub cache_transfer_errors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> ChecksumMismatch {
        ChecksumMismatch {
            resource: "org/example/lib/1.0/lib-1.0.jar".into(),
            expected: "abc".into(),
            actual: "def".into(),
        }
    }

    #[test]
    fn fail_policy_surfaces_error() {
        let err = ChecksumPolicy::Fail.on_mismatch(&mismatch()).unwrap_err();
        match err {
            Error::ChecksumMismatch { resource, .. } => {
                assert_eq!(resource, "org/example/lib/1.0/lib-1.0.jar")
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn warn_and_ignore_proceed() {
        assert_eq!(
            ChecksumPolicy::Warn.on_mismatch(&mismatch()).unwrap(),
            ChecksumOutcome::Warned
        );
        assert_eq!(
            ChecksumPolicy::Ignore.on_mismatch(&mismatch()).unwrap(),
            ChecksumOutcome::Ignored
        );
    }

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!("FAIL".parse::<ChecksumPolicy>().unwrap(), ChecksumPolicy::Fail);
        assert_eq!(
            "Never".parse::<SnapshotUpdatePolicy>().unwrap(),
            SnapshotUpdatePolicy::Never
        );
        assert!("sometimes".parse::<SnapshotUpdatePolicy>().is_err());
    }

    #[test]
    fn only_always_rechecks_remote_snapshots() {
        assert!(SnapshotUpdatePolicy::Always.requires_remote_check());
        assert!(!SnapshotUpdatePolicy::Never.requires_remote_check());
    }

    #[test]
    fn resolution_error_policy_caches_nothing() {
        let policy = ResolutionErrorPolicy::default();
        assert!(!policy.cache_not_found);
        assert!(!policy.cache_transfer_errors);
    }
}
