//! Repository session

use std::path::{Path, PathBuf};

use crate::Result;
use crate::listener::Listeners;
use crate::policy::{
    ChecksumMismatch, ChecksumOutcome, ChecksumPolicy, ResolutionErrorPolicy, SnapshotUpdatePolicy,
};
use crate::properties::MergedProperties;
use crate::repository::RemoteRepository;
use crate::selector::Selectors;

/// Per-context configuration handed to the resolution engine.
///
/// Immutable once built; every [`crate::Context`] owns its own session.
#[derive(Debug, Clone)]
pub struct RepositorySession {
    pub(crate) local_repository: PathBuf,
    pub(crate) offline: bool,
    pub(crate) checksum_policy: Option<ChecksumPolicy>,
    pub(crate) snapshot_update_policy: Option<SnapshotUpdatePolicy>,
    pub(crate) resolution_error_policy: ResolutionErrorPolicy,
    pub(crate) selectors: Selectors,
    pub(crate) properties: MergedProperties,
    pub(crate) listeners: Listeners,
}

impl RepositorySession {
    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    /// Explicit checksum policy; `None` leaves the engine default
    pub fn checksum_policy(&self) -> Option<ChecksumPolicy> {
        self.checksum_policy
    }

    /// Checksum policy the session enforces
    pub fn effective_checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy.unwrap_or_default()
    }

    /// Explicit snapshot policy; `None` leaves the engine default (daily)
    pub fn snapshot_update_policy(&self) -> Option<SnapshotUpdatePolicy> {
        self.snapshot_update_policy
    }

    pub fn resolution_error_policy(&self) -> ResolutionErrorPolicy {
        self.resolution_error_policy
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn properties(&self) -> &MergedProperties {
        &self.properties
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Called by the engine when a checksum does not verify
    pub fn on_checksum_mismatch(&self, mismatch: &ChecksumMismatch) -> Result<ChecksumOutcome> {
        self.effective_checksum_policy().on_mismatch(mismatch)
    }
}

/// A fully configured session plus the repositories to resolve against,
/// not yet bound to an engine
#[derive(Debug, Clone)]
pub struct PreparedSession {
    pub session: RepositorySession,
    pub remote_repositories: Vec<RemoteRepository>,
}
