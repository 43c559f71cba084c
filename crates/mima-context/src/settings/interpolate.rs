//! `${...}` expression interpolation for settings values

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::system::SystemProperties;

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"));

/// Resolves `${key}` expressions against user and system properties
pub(crate) struct Interpolator<'a> {
    user: Option<&'a BTreeMap<String, String>>,
    system: &'a SystemProperties,
}

impl<'a> Interpolator<'a> {
    pub(crate) fn new(
        user: Option<&'a BTreeMap<String, String>>,
        system: &'a SystemProperties,
    ) -> Self {
        Self { user, system }
    }

    /// User properties shadow system properties; `env.*` keys live in the
    /// system snapshot. Unknown expressions are kept verbatim.
    fn lookup(&self, key: &str) -> Option<&str> {
        self.user
            .and_then(|u| u.get(key).map(String::as_str))
            .or_else(|| self.system.get(key))
    }

    pub(crate) fn interpolate_str(&self, input: &str) -> String {
        EXPRESSION
            .replace_all(input, |caps: &Captures<'_>| {
                let key = caps[1].trim();
                match self.lookup(key) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Interpolate every string leaf of a settings document in place
    pub(crate) fn interpolate_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if s.contains("${") {
                    *s = self.interpolate_str(s);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.interpolate_value(item);
                }
            }
            Value::Object(map) => {
                for (_, item) in map.iter_mut() {
                    self.interpolate_value(item);
                }
            }
            _ => {}
        }
    }
}
