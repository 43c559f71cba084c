//! Routing selectors
//!
//! [`SelectorBuilder`] turns [`EffectiveSettings`] into the three lookups a
//! resolution engine consults for every remote repository:
//!
//! - [`MirrorSelector`]: which mirror, if any, replaces the repository
//! - [`ProxySelector`]: which proxy to tunnel through
//! - [`AuthenticationSelector`]: which credentials to present
//!
//! It also translates per-server `configuration` blocks into
//! [`ServerTransport`] entries that end up as connector config properties.

mod auth;
mod mirror;
mod proxy;
mod transport;

pub use auth::{Authentication, AuthenticationSelector};
pub use mirror::{MirrorSelection, MirrorSelector};
pub use proxy::ProxySelector;
pub use transport::{
    CONNECT_TIMEOUT, DIR_MODE, FILE_MODE, HTTP_HEADERS, REQUEST_TIMEOUT, ServerTransport,
};

use serde_json::Value;
use std::collections::BTreeMap;

use crate::Result;
use crate::repository::RemoteRepository;
use crate::settings::{EffectiveSettings, ProxyRule};

/// Everything the engine needs to route a request
#[derive(Debug, Clone, Default)]
pub struct Selectors {
    pub mirror: MirrorSelector,
    pub proxy: ProxySelector,
    pub auth: AuthenticationSelector,

    /// Transport tuning per server id, sorted by id
    pub transports: Vec<ServerTransport>,
}

/// Where a request for a repository actually goes
#[derive(Debug, Clone)]
pub struct Route<'a> {
    /// Repository after mirror substitution
    pub target: RemoteRepository,
    pub mirror: Option<MirrorSelection>,
    pub proxy: Option<&'a ProxyRule>,
    pub auth: Option<&'a Authentication>,
}

impl Selectors {
    /// Connector config properties contributed by every server
    pub fn transport_properties(&self) -> BTreeMap<String, Value> {
        self.transports
            .iter()
            .flat_map(ServerTransport::to_config_properties)
            .collect()
    }

    /// Apply mirror, then proxy and credentials for the resulting target.
    pub fn route(&self, repository: &RemoteRepository) -> Route<'_> {
        let mirror = self.mirror.select(repository);
        let target = mirror
            .as_ref()
            .map(|m| m.repository.clone())
            .unwrap_or_else(|| repository.clone());
        Route {
            proxy: self.proxy.select(&target),
            auth: self.auth.select(&target),
            target,
            mirror,
        }
    }
}

/// Builds [`Selectors`] from effective settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorBuilder;

impl SelectorBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build all selectors.
    ///
    /// Fails with [`crate::Error::SelectorBuild`] when a server's transport
    /// configuration or a proxy's host patterns are unusable.
    pub fn build(&self, settings: &EffectiveSettings) -> Result<Selectors> {
        let mut transports: BTreeMap<String, ServerTransport> = BTreeMap::new();
        for server in &settings.servers {
            // later duplicates replace earlier ones, matching credentials
            match ServerTransport::from_server(server)? {
                Some(transport) => {
                    transports.insert(server.id.clone(), transport);
                }
                None => {
                    transports.remove(&server.id);
                }
            }
        }

        let selectors = Selectors {
            mirror: MirrorSelector::new(settings.mirrors.clone()),
            proxy: ProxySelector::new(&settings.proxies)?,
            auth: AuthenticationSelector::new(&settings.servers),
            transports: transports.into_values().collect(),
        };

        tracing::debug!(
            mirrors = selectors.mirror.rules().len(),
            proxies = selectors.proxy.len(),
            servers = selectors.auth.len(),
            "Built selectors"
        );
        Ok(selectors)
    }
}
