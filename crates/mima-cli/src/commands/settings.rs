//! Settings command implementation

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use mima_context::ContextOverrides;
use mima_context::settings::{EffectiveSettings, Mirror};

use super::{assembler, mask, mask_configuration};
use crate::error::Result;

/// Effective settings with secrets replaced by a mask
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub source: Option<PathBuf>,
    pub local_repository: Option<PathBuf>,
    pub offline: bool,
    pub mirrors: Vec<Mirror>,
    pub proxies: Vec<ProxyView>,
    pub servers: Vec<ServerView>,
    pub active_profiles: Vec<String>,
    pub profile_properties: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyView {
    pub id: String,
    pub active: bool,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<&'static str>,
    pub non_proxy_hosts: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerView {
    pub id: String,
    pub username: Option<String>,
    pub password: Option<&'static str>,
    pub private_key: Option<PathBuf>,
    pub passphrase: Option<&'static str>,
    pub file_permissions: Option<String>,
    pub directory_permissions: Option<String>,
    pub configuration: Option<Value>,
}

impl From<&EffectiveSettings> for SettingsView {
    fn from(settings: &EffectiveSettings) -> Self {
        Self {
            source: settings.source.clone(),
            local_repository: settings.local_repository.clone(),
            offline: settings.offline,
            mirrors: settings.mirrors.clone(),
            proxies: settings
                .proxies
                .iter()
                .map(|p| ProxyView {
                    id: p.id.clone(),
                    active: p.active,
                    protocol: p.protocol.clone(),
                    host: p.host.clone(),
                    port: p.port,
                    username: p.username.clone(),
                    password: mask(p.password.is_some()),
                    non_proxy_hosts: p.non_proxy_hosts.clone(),
                })
                .collect(),
            servers: settings
                .servers
                .iter()
                .map(|s| ServerView {
                    id: s.id.clone(),
                    username: s.username.clone(),
                    password: mask(s.password.is_some()),
                    private_key: s.private_key.clone(),
                    passphrase: mask(s.passphrase.is_some()),
                    file_permissions: s.file_permissions.clone(),
                    directory_permissions: s.directory_permissions.clone(),
                    configuration: s.configuration.as_ref().map(mask_configuration),
                })
                .collect(),
            active_profiles: settings
                .active_profiles()
                .iter()
                .map(|p| p.id.clone())
                .collect(),
            profile_properties: settings.profile_properties(),
        }
    }
}

/// Run the settings command
pub fn run_settings(overrides: &ContextOverrides, json: bool) -> Result<()> {
    let settings = assembler().effective_settings(overrides)?;
    let view = SettingsView::from(&settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", "Effective Settings".bold());
    println!();
    match &view.source {
        Some(path) => println!("{}:   {}", "Source".dimmed(), path.display()),
        None => println!("{}:   {}", "Source".dimmed(), "none".dimmed()),
    }
    if let Some(path) = &view.local_repository {
        println!("{}:   {}", "Local".dimmed(), path.display());
    }
    println!("{}:  {}", "Offline".dimmed(), view.offline);
    println!();

    println!("{}:", "Mirrors".bold());
    if view.mirrors.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for mirror in &view.mirrors {
        let blocked = if mirror.blocked { " (blocked)".red().to_string() } else { String::new() };
        println!(
            "  {} {} -> {} [mirrorOf {}]{}",
            "+".green(),
            mirror.id.cyan(),
            mirror.url,
            mirror.mirror_of,
            blocked
        );
    }
    println!();

    println!("{}:", "Proxies".bold());
    if view.proxies.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for proxy in &view.proxies {
        let state = if proxy.active { "active".green() } else { "inactive".yellow() };
        println!(
            "  {} {}://{}:{} ({})",
            "+".green(),
            proxy.protocol,
            proxy.host,
            proxy.port,
            state
        );
    }
    println!();

    println!("{}:", "Servers".bold());
    if view.servers.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for server in &view.servers {
        println!(
            "  {} {} user={} password={}",
            "+".green(),
            server.id.cyan(),
            server.username.as_deref().unwrap_or("-"),
            server.password.unwrap_or("-")
        );
    }
    println!();

    println!("{}:", "Active Profiles".bold());
    if view.active_profiles.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for id in &view.active_profiles {
        println!("  {} {}", "+".green(), id.cyan());
    }

    Ok(())
}
