//! Context command implementation

use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use mima_context::{
    ChecksumPolicy, ContextOverrides, MergedProperties, PreparedSession, RemoteRepository,
    ResolutionErrorPolicy, SnapshotUpdatePolicy,
};

use super::{assembler, mask_properties};
use crate::error::Result;

/// JSON shape of a prepared session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextView<'a> {
    local_repository: &'a Path,
    offline: bool,
    checksum_policy: Option<ChecksumPolicy>,
    snapshot_update_policy: Option<SnapshotUpdatePolicy>,
    resolution_error_policy: ResolutionErrorPolicy,
    remote_repositories: &'a [RemoteRepository],
    properties: MergedProperties,
}

impl<'a> From<&'a PreparedSession> for ContextView<'a> {
    fn from(prepared: &'a PreparedSession) -> Self {
        let session = &prepared.session;
        Self {
            local_repository: session.local_repository(),
            offline: session.offline(),
            checksum_policy: session.checksum_policy(),
            snapshot_update_policy: session.snapshot_update_policy(),
            resolution_error_policy: session.resolution_error_policy(),
            remote_repositories: &prepared.remote_repositories,
            properties: mask_properties(session.properties()),
        }
    }
}

/// Run the context command
pub fn run_context(overrides: &ContextOverrides, json: bool) -> Result<()> {
    let prepared = assembler().prepare(overrides)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ContextView::from(&prepared))?);
        return Ok(());
    }

    let session = &prepared.session;
    println!("{}", "Resolution Context".bold());
    println!();
    println!("{}:    {}", "Local".dimmed(), session.local_repository().display());
    println!("{}:  {}", "Offline".dimmed(), session.offline());
    println!(
        "{}: {}",
        "Checksums".dimmed(),
        session
            .checksum_policy()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    println!(
        "{}: {}",
        "Snapshots".dimmed(),
        session
            .snapshot_update_policy()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    println!();

    println!("{}:", "Remote Repositories".bold());
    for repo in &prepared.remote_repositories {
        println!("  {} {} {} ({})", "+".green(), repo.id.cyan(), repo.url, repo.layout);
    }
    println!();

    let properties = mask_properties(session.properties());
    println!("{}:", "Properties".bold());
    println!("  {}: {}", "system".dimmed(), properties.system.len());
    println!("  {}: {}", "user".dimmed(), properties.user.len());
    println!("  {}: {}", "config".dimmed(), properties.config.len());
    for (key, value) in &properties.user {
        println!("  {} {} = {}", "-D".dimmed(), key, value);
    }
    for (key, value) in properties
        .config
        .iter()
        .filter(|(k, _)| k.starts_with("aether.") || k.starts_with("maven.") || k.starts_with("mima."))
    {
        println!("  {} = {}", key.cyan(), value);
    }

    Ok(())
}
