//! Property layering
//!
//! The string layers, lowest precedence first:
//!
//! 1. system properties
//! 2. active profile properties, in declaration order
//! 3. system properties again
//! 4. user properties from the overrides
//!
//! The result is kept as [`MergedProperties::merged`]. Override config
//! properties never reach it.
//!
//! The config map starts with the engine knobs, receives the layered
//! strings, then per-server transport keys, then override config properties.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::overrides::ContextOverrides;
use crate::selector::Selectors;
use crate::settings::EffectiveSettings;
use crate::system::SystemProperties;

pub const USER_AGENT: &str = "aether.connector.userAgent";
pub const INTERACTIVE: &str = "aether.interactive";
pub const START_TIME: &str = "maven.startTime";
pub const RESOLUTION_ERROR_POLICY: &str = "mima.resolutionErrorPolicy";

/// The property maps handed to the session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedProperties {
    /// Ambient system properties, untouched
    pub system: BTreeMap<String, String>,

    /// Caller-supplied user properties only
    pub user: BTreeMap<String, String>,

    /// System, profile, system and user layers; user properties win
    pub merged: BTreeMap<String, String>,

    /// Engine configuration, see module docs for layering
    pub config: BTreeMap<String, Value>,
}

impl MergedProperties {
    /// String value of a config property, if it is a string
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }
}

/// Pure merge of settings, overrides and system state
#[derive(Debug, Clone)]
pub struct PropertyMerger {
    system: SystemProperties,
    start_time: DateTime<Utc>,
    user_agent: String,
}

impl PropertyMerger {
    pub fn new(system: SystemProperties, start_time: DateTime<Utc>) -> Self {
        let user_agent = user_agent(&system);
        Self {
            system,
            start_time,
            user_agent,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn merge(
        &self,
        settings: &EffectiveSettings,
        overrides: &ContextOverrides,
        selectors: &Selectors,
    ) -> MergedProperties {
        let system = self.system.as_map().clone();
        let user = overrides.user_properties().cloned().unwrap_or_default();

        let mut layered = system.clone();
        layered.extend(settings.profile_properties());
        layered.extend(system.clone());
        layered.extend(user.clone());

        let mut config = BTreeMap::new();
        config.insert(USER_AGENT.to_string(), Value::String(self.user_agent.clone()));
        config.insert(INTERACTIVE.to_string(), Value::Bool(false));
        config.insert(
            START_TIME.to_string(),
            Value::String(self.start_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        config.insert(
            RESOLUTION_ERROR_POLICY.to_string(),
            json!({ "cacheNotFound": false, "cacheTransferErrors": false }),
        );
        config.extend(layered.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))));
        config.extend(selectors.transport_properties());
        if let Some(extra) = overrides.config_properties() {
            config.extend(extra.clone());
        }

        tracing::trace!(
            system = system.len(),
            user = user.len(),
            config = config.len(),
            "Merged properties"
        );
        MergedProperties {
            system,
            user,
            merged: layered,
            config,
        }
    }
}

fn user_agent(system: &SystemProperties) -> String {
    format!(
        "mima/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        system.get("os.name").unwrap_or(std::env::consts::OS),
        system.get("os.arch").unwrap_or(std::env::consts::ARCH),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Activation, Profile};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn merger() -> PropertyMerger {
        let system = SystemProperties::from_pairs([
            ("os.name", "linux"),
            ("os.arch", "x86_64"),
            ("shared", "from-system"),
            ("java.version", "system"),
        ]);
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        PropertyMerger::new(system, start)
    }

    fn profile(id: &str, default: bool, props: &[(&str, &str)]) -> Profile {
        Profile {
            id: id.into(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            activation: Some(Activation {
                active_by_default: default,
            }),
        }
    }

    #[test]
    fn engine_knobs_are_seeded() {
        let merged = merger().merge(
            &EffectiveSettings::default(),
            &ContextOverrides::default(),
            &Selectors::default(),
        );

        let agent = merged.config_str(USER_AGENT).unwrap();
        assert!(agent.starts_with("mima/"));
        assert!(agent.ends_with("(linux; x86_64)"));
        assert_eq!(merged.config[INTERACTIVE], Value::Bool(false));
        assert_eq!(merged.config_str(START_TIME), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(
            merged.config[RESOLUTION_ERROR_POLICY]["cacheNotFound"],
            Value::Bool(false)
        );
    }

    #[test]
    fn system_properties_override_profiles() {
        let settings = EffectiveSettings {
            profiles: vec![profile(
                "defaults",
                true,
                &[("shared", "from-profile"), ("profile.only", "yes")],
            )],
            ..Default::default()
        };
        let merged = merger().merge(&settings, &ContextOverrides::default(), &Selectors::default());

        assert_eq!(merged.config_str("shared"), Some("from-system"));
        assert_eq!(merged.config_str("profile.only"), Some("yes"));
    }

    #[test]
    fn user_properties_win_and_stay_separate() {
        let overrides = ContextOverrides::builder()
            .user_property("shared", "from-user")
            .build();
        let merged = merger().merge(&EffectiveSettings::default(), &overrides, &Selectors::default());

        assert_eq!(merged.merged["shared"], "from-user");
        assert_eq!(merged.config_str("shared"), Some("from-user"));
        assert_eq!(merged.user.len(), 1);
        assert_eq!(merged.system["shared"], "from-system");
    }

    #[test]
    fn later_active_profile_wins_and_inactive_is_skipped() {
        let settings = EffectiveSettings {
            profiles: vec![
                profile("a", true, &[("p", "a")]),
                profile("b", false, &[("p", "b"), ("b.only", "yes")]),
                profile("c", true, &[("p", "c")]),
            ],
            ..Default::default()
        };
        let merged = merger().merge(&settings, &ContextOverrides::default(), &Selectors::default());
        assert_eq!(merged.merged["p"], "c");
        assert!(!merged.merged.contains_key("b.only"));
        assert!(!merged.config.contains_key("b.only"));
    }

    #[test]
    fn config_properties_do_not_leak_into_merged_map() {
        let overrides = ContextOverrides::builder()
            .user_property("k", "user")
            .config_property("k", "config")
            .build();
        let merged = merger().merge(&EffectiveSettings::default(), &overrides, &Selectors::default());

        assert_eq!(merged.merged["k"], "user");
        assert_eq!(merged.user["k"], "user");
        assert_eq!(merged.config_str("k"), Some("config"));
    }

    #[test]
    fn override_config_properties_apply_last() {
        let overrides = ContextOverrides::builder()
            .config_property(INTERACTIVE, true)
            .config_property("aether.connector.connectTimeout.corp", 99)
            .build();
        let merged = merger().merge(&EffectiveSettings::default(), &overrides, &Selectors::default());

        assert_eq!(merged.config[INTERACTIVE], Value::Bool(true));
        assert_eq!(merged.config["aether.connector.connectTimeout.corp"], json!(99));
    }

    #[test]
    fn merge_is_deterministic() {
        let overrides = ContextOverrides::builder().user_property("x", "1").build();
        let settings = EffectiveSettings {
            profiles: vec![profile("a", true, &[("p", "a")])],
            ..Default::default()
        };
        let m = merger();
        let first = serde_json::to_string(&m.merge(&settings, &overrides, &Selectors::default())).unwrap();
        let second = serde_json::to_string(&m.merge(&settings, &overrides, &Selectors::default())).unwrap();
        assert_eq!(first, second);
    }
}
