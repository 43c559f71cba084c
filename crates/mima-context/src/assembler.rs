//! Context assembly
//!
//! [`ContextAssembler`] runs the whole pipeline:
//!
//! ```text
//! overrides ─▶ settings ─▶ selectors ─▶ properties ─▶ session ─▶ Context
//! ```
//!
//! Each stage failure is wrapped in [`Error::ContextBuild`] naming the stage.
//! Nothing is cached between calls, so two assemblies with the same inputs
//! see the same settings file contents and produce equal sessions.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::context::Context;
use crate::engine::EngineHandle;
use crate::error::Stage;
use crate::overrides::ContextOverrides;
use crate::policy::ResolutionErrorPolicy;
use crate::properties::PropertyMerger;
use crate::repository::RemoteRepository;
use crate::selector::SelectorBuilder;
use crate::session::{PreparedSession, RepositorySession};
use crate::settings::{EffectiveSettings, SettingsDecrypter, SettingsResolver, USER_DIR};
use crate::system::SystemProperties;
use crate::{Error, Result};

/// Directory under [`USER_DIR`] used when nothing else names a local repository
pub const DEFAULT_LOCAL_REPOSITORY: &str = "repository";

/// Builds [`Context`]s from overrides and ambient configuration
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    system: SystemProperties,
    resolver: SettingsResolver,
    start_time: DateTime<Utc>,
}

impl ContextAssembler {
    /// Create an assembler with the platform home directory.
    ///
    /// The start time recorded in every session is captured here.
    pub fn new(system: SystemProperties, decrypter: Arc<dyn SettingsDecrypter>) -> Self {
        Self {
            resolver: SettingsResolver::new(system.clone(), decrypter),
            system,
            start_time: Utc::now(),
        }
    }

    /// Use a custom home directory for settings and the default local repository
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.resolver = self.resolver.with_home_dir(home);
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn settings_resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Resolve the ambient settings on their own
    pub fn effective_settings(&self, overrides: &ContextOverrides) -> Result<EffectiveSettings> {
        self.resolver
            .resolve(overrides)
            .map_err(|e| e.in_stage(Stage::Settings))
    }

    /// Run every step except binding an engine
    pub fn prepare(&self, overrides: &ContextOverrides) -> Result<PreparedSession> {
        let settings = self.effective_settings(overrides)?;

        let selectors = SelectorBuilder::new()
            .build(&settings)
            .map_err(|e| e.in_stage(Stage::Selectors))?;

        let properties =
            PropertyMerger::new(self.system.clone(), self.start_time).merge(&settings, overrides, &selectors);

        let local_repository = self
            .local_repository(overrides, &settings)
            .map_err(|e| e.in_stage(Stage::Session))?;

        let session = RepositorySession {
            local_repository,
            offline: overrides.offline().unwrap_or(settings.offline),
            checksum_policy: overrides.checksum_policy(),
            snapshot_update_policy: overrides.snapshot_update_policy(),
            resolution_error_policy: ResolutionErrorPolicy::default(),
            selectors,
            properties,
            listeners: overrides.listeners().clone(),
        };

        let remote_repositories = match overrides.repositories() {
            Some(repositories) => repositories.to_vec(),
            None => vec![RemoteRepository::central()],
        };

        tracing::debug!(
            local_repository = %session.local_repository.display(),
            offline = session.offline,
            remotes = remote_repositories.len(),
            "Prepared session"
        );
        Ok(PreparedSession {
            session,
            remote_repositories,
        })
    }

    /// Build a context bound to `engine`
    pub fn assemble(&self, overrides: &ContextOverrides, engine: EngineHandle) -> Result<Context> {
        let prepared = self.prepare(overrides)?;
        Ok(Context::new(prepared, engine))
    }

    /// Override path, else the settings path, else `<home>/.mima/repository`
    fn local_repository(&self, overrides: &ContextOverrides, settings: &EffectiveSettings) -> Result<PathBuf> {
        if let Some(path) = overrides.local_repository() {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &settings.local_repository {
            return Ok(path.clone());
        }
        self.resolver
            .home_dir()
            .map(|home| home.join(USER_DIR).join(DEFAULT_LOCAL_REPOSITORY))
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "cannot determine home directory for the default local repository",
                ))
            })
    }
}
