//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use mima_context::{ChecksumPolicy, ContextOverrides, RemoteRepository, SnapshotUpdatePolicy};

/// mima - Inspect dependency resolution contexts
#[derive(Parser, Debug)]
#[command(name = "mima")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub context: ContextArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by every command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextArgs {
    /// Work offline
    #[arg(long, global = true)]
    pub offline: bool,

    /// Settings file to use instead of ~/.mima/settings.toml
    #[arg(long, global = true, value_name = "PATH", env = "MIMA_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Ignore ambient settings entirely
    #[arg(long, global = true, conflicts_with = "settings")]
    pub no_settings: bool,

    /// Local repository directory
    #[arg(long, global = true, value_name = "PATH")]
    pub local_repository: Option<PathBuf>,

    /// Remote repository as id::url or id::layout::url (repeatable)
    #[arg(long = "repository", global = true, value_name = "SPEC")]
    pub repositories: Vec<RemoteRepository>,

    /// User property as key=value (repeatable)
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Checksum policy: fail, warn or ignore
    #[arg(long, global = true, value_name = "POLICY")]
    pub checksum_policy: Option<ChecksumPolicy>,

    /// Snapshot update policy: always or never
    #[arg(long = "snapshot-policy", global = true, value_name = "POLICY")]
    pub snapshot_policy: Option<SnapshotUpdatePolicy>,
}

impl ContextArgs {
    /// Translate the flags into context overrides
    pub fn to_overrides(&self) -> ContextOverrides {
        let mut builder = ContextOverrides::builder().with_user_settings(!self.no_settings);

        if self.offline {
            builder = builder.offline(true);
        }
        if let Some(path) = &self.settings {
            builder = builder.settings_file(path);
        }
        if let Some(path) = &self.local_repository {
            builder = builder.local_repository(path);
        }
        if !self.repositories.is_empty() {
            builder = builder.repositories(&self.repositories);
        }
        for (key, value) in &self.properties {
            builder = builder.user_property(key, value);
        }
        if let Some(policy) = self.checksum_policy {
            builder = builder.checksum_policy(policy);
        }
        if let Some(policy) = self.snapshot_policy {
            builder = builder.snapshot_update_policy(policy);
        }
        builder.build()
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing property name in '{}'", raw)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        // a bare -Dflag means flag=true
        None => Ok((raw.to_string(), "true".to_string())),
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the effective settings, secrets masked
    Settings {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the assembled session
    ///
    /// Prints the local repository, remote repositories, policies and the
    /// merged property maps.
    Context {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show how a repository URL is routed
    ///
    /// Examples:
    ///   mima route https://repo.maven.apache.org/maven2/
    ///   mima route https://nexus.example.com/releases --id releases
    Route {
        /// Repository URL
        url: String,

        /// Repository id used for mirror and credential lookup
        #[arg(long, default_value = "central")]
        id: String,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   mima completions bash > ~/.local/share/bash-completion/completions/mima
    ///   mima completions zsh > ~/.zfunc/_mima
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
