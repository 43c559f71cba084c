//! Mirror routing

use serde::Serialize;

use crate::repository::RemoteRepository;
use crate::settings::Mirror;

const WILDCARD: &str = "*";
const EXTERNAL_WILDCARD: &str = "external:*";
const EXTERNAL_HTTP_WILDCARD: &str = "external:http:*";
const DEFAULT_MIRROR_OF_LAYOUTS: &str = "default,legacy";

/// Result of routing a repository through a mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorSelection {
    /// Repository traffic is sent to
    pub repository: RemoteRepository,

    /// The repository that was replaced
    pub mirror_of: RemoteRepository,
}

/// Routes repositories to mirrors; first matching rule wins.
///
/// Blocked rules never match.
#[derive(Debug, Clone, Default)]
pub struct MirrorSelector {
    rules: Vec<Mirror>,
}

impl MirrorSelector {
    pub fn new(rules: Vec<Mirror>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Mirror] {
        &self.rules
    }

    /// Find the mirror for `repository`, or `None` to use it directly
    pub fn select(&self, repository: &RemoteRepository) -> Option<MirrorSelection> {
        let rule = self
            .rules
            .iter()
            .find(|rule| !rule.blocked && applies_to(rule, repository))?;

        let layout = if rule.layout.is_empty() {
            repository.layout.clone()
        } else {
            rule.layout.clone()
        };

        Some(MirrorSelection {
            repository: RemoteRepository::new(&rule.id, layout, &rule.url),
            mirror_of: repository.clone(),
        })
    }

    /// Blocked rules whose patterns cover `repository`
    pub fn blocked_for(&self, repository: &RemoteRepository) -> Vec<&Mirror> {
        self.rules
            .iter()
            .filter(|rule| rule.blocked && applies_to(rule, repository))
            .collect()
    }
}

fn applies_to(rule: &Mirror, repository: &RemoteRepository) -> bool {
    matches_repository(repository, &rule.mirror_of)
        && matches_layout(&repository.layout, &rule.mirror_of_layouts)
}

/// Evaluate a `mirrorOf` pattern against a repository.
///
/// Entries are comma-separated. `!id` excludes and wins immediately; an
/// exact id match wins immediately; wildcards match but keep scanning so a
/// later exclusion can still reject.
pub(crate) fn matches_repository(repository: &RemoteRepository, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern == WILDCARD || pattern == repository.id {
        return true;
    }

    let mut matched = false;
    for entry in pattern.split(',').map(str::trim) {
        if entry.len() > 1 && entry.starts_with('!') {
            if &entry[1..] == repository.id.as_str() {
                return false;
            }
        } else if entry == repository.id {
            return true;
        } else if entry == EXTERNAL_HTTP_WILDCARD {
            matched |= repository.is_external_http();
        } else if entry == EXTERNAL_WILDCARD {
            matched |= repository.is_external();
        } else if entry == WILDCARD {
            matched = true;
        }
    }
    matched
}

/// Evaluate a `mirrorOfLayouts` pattern against a layout
pub(crate) fn matches_layout(layout: &str, pattern: &str) -> bool {
    let pattern = match pattern.trim() {
        "" => DEFAULT_MIRROR_OF_LAYOUTS,
        other => other,
    };
    if pattern == WILDCARD || pattern == layout {
        return true;
    }

    let mut matched = false;
    for entry in pattern.split(',').map(str::trim) {
        if entry.len() > 1 && entry.starts_with('!') {
            if &entry[1..] == layout {
                return false;
            }
        } else if entry == layout || entry == WILDCARD {
            matched = true;
        }
    }
    matched
}
