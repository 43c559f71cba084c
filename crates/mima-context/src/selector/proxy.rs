//! Proxy assignment

use regex::{Regex, RegexBuilder};

use crate::repository::RemoteRepository;
use crate::settings::ProxyRule;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct CompiledProxy {
    rule: ProxyRule,
    non_proxy_hosts: Vec<Regex>,
}

impl CompiledProxy {
    fn excludes(&self, host: &str) -> bool {
        self.non_proxy_hosts.iter().any(|re| re.is_match(host))
    }
}

/// Picks the proxy for a destination; first usable rule wins
#[derive(Debug, Clone, Default)]
pub struct ProxySelector {
    proxies: Vec<CompiledProxy>,
}

impl ProxySelector {
    /// Compile the `nonProxyHosts` patterns of every active proxy
    pub fn new(rules: &[ProxyRule]) -> Result<Self> {
        let proxies = rules
            .iter()
            .filter(|rule| rule.active)
            .map(|rule| {
                let non_proxy_hosts = rule
                    .non_proxy_hosts
                    .as_deref()
                    .map(|patterns| compile_host_patterns(&rule.id, patterns))
                    .transpose()?
                    .unwrap_or_default();
                Ok(CompiledProxy {
                    rule: rule.clone(),
                    non_proxy_hosts,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { proxies })
    }

    /// Proxy for `protocol://host`, or `None` for a direct connection
    pub fn select_for(&self, protocol: &str, host: &str) -> Option<&ProxyRule> {
        self.proxies
            .iter()
            .find(|p| p.rule.protocol.eq_ignore_ascii_case(protocol) && !p.excludes(host))
            .map(|p| &p.rule)
    }

    /// Proxy for a repository's URL
    pub fn select(&self, repository: &RemoteRepository) -> Option<&ProxyRule> {
        let protocol = repository.protocol()?;
        let host = repository.host()?;
        self.select_for(&protocol, &host)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

/// Turn `*.example.com|localhost,10.*` into anchored, case-insensitive regexes
fn compile_host_patterns(proxy_id: &str, patterns: &str) -> Result<Vec<Regex>> {
    patterns
        .split(['|', ','])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|pattern| {
            let body = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            RegexBuilder::new(&format!("^{}$", body))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::SelectorBuild {
                    server: proxy_id.to_string(),
                    message: format!("invalid nonProxyHosts pattern '{}': {}", pattern, e),
                })
        })
        .collect()
}
