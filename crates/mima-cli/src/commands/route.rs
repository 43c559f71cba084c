//! Route command implementation

use colored::Colorize;

use mima_context::{ContextOverrides, RemoteRepository};

use super::assembler;
use crate::error::{CliError, Result};

/// Run the route command
pub fn run_route(overrides: &ContextOverrides, id: &str, url: &str) -> Result<()> {
    let repository = RemoteRepository::parse_spec(&format!("{}::{}", id, url))
        .map_err(|_| CliError::user(format!("'{}' is not a valid repository URL", url)))?;

    let prepared = assembler().prepare(overrides)?;
    let selectors = prepared.session.selectors();
    let route = selectors.route(&repository);

    println!("{}:  {} {}", "Repository".dimmed(), repository.id.cyan(), repository.url);

    match &route.mirror {
        Some(mirror) => println!(
            "{}:      {} {}",
            "Mirror".dimmed(),
            mirror.repository.id.cyan(),
            mirror.repository.url
        ),
        None => println!("{}:      {}", "Mirror".dimmed(), "none".dimmed()),
    }
    for blocked in selectors.mirror.blocked_for(&repository) {
        println!(
            "{}:     {} {}",
            "Skipped".dimmed(),
            blocked.id.cyan(),
            "(blocked)".red().bold()
        );
    }

    match route.proxy {
        Some(proxy) => println!(
            "{}:       {}://{}:{}",
            "Proxy".dimmed(),
            proxy.protocol,
            proxy.host,
            proxy.port
        ),
        None => println!("{}:       {}", "Proxy".dimmed(), "direct".dimmed()),
    }

    match route.auth {
        Some(auth) => println!(
            "{}: {} (user {})",
            "Credentials".dimmed(),
            route.target.id.cyan(),
            auth.username.as_deref().unwrap_or("-")
        ),
        None => println!("{}: {}", "Credentials".dimmed(), "none".dimmed()),
    }

    Ok(())
}
