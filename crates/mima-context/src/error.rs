//! Error types for mima-context

use std::fmt;
use std::path::PathBuf;

/// Result type for mima-context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced a [`Error::ContextBuild`] failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading, interpolating and decrypting settings
    Settings,
    /// Building mirror, proxy and authentication selectors
    Selectors,
    /// Merging property layers
    Properties,
    /// Binding the session and the resolution engine
    Session,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Settings => "settings",
            Stage::Selectors => "selectors",
            Stage::Properties => "properties",
            Stage::Session => "session",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building a context
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings source could not be read or parsed
    #[error("Failed to load settings from {path}: {message}")]
    SettingsLoad { path: PathBuf, message: String },

    /// One or more secrets could not be decrypted
    #[error("Failed to decrypt settings: {}", problems.join("; "))]
    CredentialDecryption { problems: Vec<String> },

    /// Server transport configuration is unusable
    #[error("Invalid configuration for server '{server}': {message}")]
    SelectorBuild { server: String, message: String },

    /// A pipeline stage failed while assembling the context
    #[error("Cannot create context ({stage} stage): {source}")]
    ContextBuild {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// Checksum mismatch rejected by the `FAIL` policy
    #[error("Checksum mismatch for {resource}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        resource: String,
        expected: String,
        actual: String,
    },

    /// Repository spec string could not be parsed
    #[error("Invalid repository spec '{spec}': expected id::url or id::layout::url")]
    InvalidRepositorySpec { spec: String },

    /// Runtime registry misuse
    #[error("Runtime registry error: {message}")]
    RuntimeRegistry { message: String },

    /// Failure reported by the resolution engine, passed through unmodified
    #[error(transparent)]
    Resolution(Box<dyn std::error::Error + Send + Sync>),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error as a [`Error::ContextBuild`] failure of `stage`.
    ///
    /// Errors that are already stage-tagged are returned unchanged, so the
    /// first failing stage is the one reported.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ Error::ContextBuild { .. } => already,
            other => Error::ContextBuild {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage that failed, if this is a context build error
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::ContextBuild { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Wrap an engine failure without interpreting it
    pub fn resolution(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Resolution(source.into())
    }

    pub(crate) fn settings_load(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::SettingsLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_stage_keeps_first_stage() {
        let err = Error::SelectorBuild {
            server: "nexus".into(),
            message: "bad timeout".into(),
        }
        .in_stage(Stage::Selectors)
        .in_stage(Stage::Session);

        assert_eq!(err.stage(), Some(Stage::Selectors));
        let display = err.to_string();
        assert!(display.contains("selectors stage"), "got: {}", display);
        assert!(display.contains("nexus"), "got: {}", display);
    }

    #[test]
    fn decryption_error_lists_every_problem() {
        let err = Error::CredentialDecryption {
            problems: vec![
                "servers[a].password: no cipher".into(),
                "servers[b].passphrase: no cipher".into(),
            ],
        };
        let display = err.to_string();
        assert!(display.contains("servers[a].password"));
        assert!(display.contains("servers[b].passphrase"));
    }
}
