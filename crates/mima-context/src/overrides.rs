//! User-supplied overrides for context construction
//!
//! [`ContextOverrides`] is immutable. Build one with
//! [`ContextOverridesBuilder`], which copies every collection it is given,
//! so the built value never aliases data owned by the caller.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::listener::{Listeners, RepositoryListener, TransferListener};
use crate::policy::{ChecksumPolicy, SnapshotUpdatePolicy};
use crate::repository::RemoteRepository;

/// Immutable set of overrides applied on top of ambient settings
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    user_properties: Option<BTreeMap<String, String>>,
    config_properties: Option<BTreeMap<String, Value>>,
    repositories: Option<Vec<RemoteRepository>>,
    offline: Option<bool>,
    local_repository: Option<PathBuf>,
    snapshot_update_policy: Option<SnapshotUpdatePolicy>,
    checksum_policy: Option<ChecksumPolicy>,
    with_user_settings: bool,
    settings_file: Option<PathBuf>,
    listeners: Listeners,
}

impl ContextOverrides {
    /// Start building a new set of overrides
    pub fn builder() -> ContextOverridesBuilder {
        ContextOverridesBuilder::default()
    }

    /// User properties; highest precedence in the merged property map
    pub fn user_properties(&self) -> Option<&BTreeMap<String, String>> {
        self.user_properties.as_ref()
    }

    /// Engine-tuning configuration properties
    pub fn config_properties(&self) -> Option<&BTreeMap<String, Value>> {
        self.config_properties.as_ref()
    }

    /// Explicit remote repositories; replaces the default when present
    pub fn repositories(&self) -> Option<&[RemoteRepository]> {
        self.repositories.as_deref()
    }

    /// Explicit offline flag; `None` defers to the settings file
    pub fn offline(&self) -> Option<bool> {
        self.offline
    }

    pub fn local_repository(&self) -> Option<&Path> {
        self.local_repository.as_deref()
    }

    pub fn snapshot_update_policy(&self) -> Option<SnapshotUpdatePolicy> {
        self.snapshot_update_policy
    }

    pub fn checksum_policy(&self) -> Option<ChecksumPolicy> {
        self.checksum_policy
    }

    /// Whether ambient settings files are consulted at all
    pub fn with_user_settings(&self) -> bool {
        self.with_user_settings
    }

    /// Explicit settings file, used instead of the conventional location
    pub fn settings_file(&self) -> Option<&Path> {
        self.settings_file.as_deref()
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Create a builder pre-populated with these overrides
    pub fn to_builder(&self) -> ContextOverridesBuilder {
        ContextOverridesBuilder {
            inner: self.clone(),
        }
    }
}

/// Mutable builder for [`ContextOverrides`]
#[derive(Debug, Default)]
pub struct ContextOverridesBuilder {
    inner: ContextOverrides,
}

impl ContextOverridesBuilder {
    /// Replace all user properties with a copy of `properties`
    pub fn user_properties(mut self, properties: &BTreeMap<String, String>) -> Self {
        self.inner.user_properties = Some(properties.clone());
        self
    }

    /// Set a single user property
    pub fn user_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner
            .user_properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all configuration properties with a copy of `properties`
    pub fn config_properties(mut self, properties: &BTreeMap<String, Value>) -> Self {
        self.inner.config_properties = Some(properties.clone());
        self
    }

    /// Set a single configuration property
    pub fn config_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner
            .config_properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the remote repository list with a copy of `repositories`
    pub fn repositories(mut self, repositories: &[RemoteRepository]) -> Self {
        self.inner.repositories = Some(repositories.to_vec());
        self
    }

    /// Append a remote repository
    pub fn repository(mut self, repository: RemoteRepository) -> Self {
        self.inner
            .repositories
            .get_or_insert_with(Vec::new)
            .push(repository);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.inner.offline = Some(offline);
        self
    }

    pub fn local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.local_repository = Some(path.into());
        self
    }

    pub fn snapshot_update_policy(mut self, policy: SnapshotUpdatePolicy) -> Self {
        self.inner.snapshot_update_policy = Some(policy);
        self
    }

    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.inner.checksum_policy = Some(policy);
        self
    }

    /// Consult ambient settings (the explicit file or the per-user one)
    pub fn with_user_settings(mut self, enabled: bool) -> Self {
        self.inner.with_user_settings = enabled;
        self
    }

    /// Use this settings file instead of the conventional location
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.settings_file = Some(path.into());
        self
    }

    pub fn repository_listener(mut self, listener: Arc<dyn RepositoryListener>) -> Self {
        self.inner.listeners.repository = Some(listener);
        self
    }

    pub fn transfer_listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.inner.listeners.transfer = Some(listener);
        self
    }

    /// Finish building
    pub fn build(self) -> ContextOverrides {
        self.inner
    }
}
