//! Command implementations for mima-cli

pub mod completions;
pub mod context;
pub mod route;
pub mod settings;

pub use completions::run_completions;
pub use context::run_context;
pub use route::run_route;
pub use settings::run_settings;

use mima_context::selector::HTTP_HEADERS;
use mima_context::{ContextAssembler, MergedProperties, PlaintextDecrypter, SystemProperties};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Assembler for the current process environment
pub(crate) fn assembler() -> ContextAssembler {
    ContextAssembler::new(SystemProperties::capture(), Arc::new(PlaintextDecrypter))
}

/// Placeholder shown instead of a secret
pub(crate) const MASK: &str = "********";

pub(crate) fn mask(present: bool) -> Option<&'static str> {
    present.then_some(MASK)
}

fn is_environment(key: &str) -> bool {
    key.starts_with("env.")
}

fn mask_env(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| {
            let shown = if is_environment(key) { MASK.to_string() } else { value.clone() };
            (key.clone(), shown)
        })
        .collect()
}

/// Mask every header value in a `{name: value}` table or a `[{name, value}]` list
fn mask_headers(headers: &Value) -> Value {
    match headers {
        Value::Object(table) => Value::Object(
            table
                .keys()
                .map(|name| (name.clone(), Value::from(MASK)))
                .collect(),
        ),
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(header) => {
                        let mut header = header.clone();
                        if header.contains_key("value") {
                            header.insert("value".to_string(), Value::from(MASK));
                        }
                        Value::Object(header)
                    }
                    _ => Value::from(MASK),
                })
                .collect(),
        ),
        _ => Value::from(MASK),
    }
}

/// Server `configuration` block with `httpHeaders` values masked
pub(crate) fn mask_configuration(configuration: &Value) -> Value {
    let mut masked = configuration.clone();
    if let Some(headers) = masked.get_mut("httpHeaders") {
        *headers = mask_headers(headers);
    }
    masked
}

/// Property maps safe to print: `env.*` values and connector headers masked
pub(crate) fn mask_properties(properties: &MergedProperties) -> MergedProperties {
    let header_prefix = format!("{}.", HTTP_HEADERS);
    let config = properties
        .config
        .iter()
        .map(|(key, value)| {
            let shown = if key.starts_with(&header_prefix) {
                mask_headers(value)
            } else if is_environment(key) {
                Value::from(MASK)
            } else {
                value.clone()
            };
            (key.clone(), shown)
        })
        .collect();

    MergedProperties {
        system: mask_env(&properties.system),
        user: properties.user.clone(),
        merged: mask_env(&properties.merged),
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configuration_headers_are_masked_in_both_shapes() {
        let listed = json!({
            "httpHeaders": [{ "name": "Authorization", "value": "Bearer abc" }],
            "connectTimeout": 5000
        });
        let masked = mask_configuration(&listed);
        assert_eq!(masked["httpHeaders"][0]["name"], "Authorization");
        assert_eq!(masked["httpHeaders"][0]["value"], MASK);
        assert_eq!(masked["connectTimeout"], 5000);

        let table = json!({ "httpHeaders": { "X-Token": "abc" } });
        assert_eq!(mask_configuration(&table)["httpHeaders"]["X-Token"], MASK);
    }

    #[test]
    fn environment_and_header_properties_are_masked() {
        let properties = MergedProperties {
            system: BTreeMap::from([
                ("env.TOKEN".to_string(), "abc".to_string()),
                ("os.name".to_string(), "linux".to_string()),
            ]),
            user: BTreeMap::from([("build".to_string(), "42".to_string())]),
            merged: BTreeMap::from([("env.TOKEN".to_string(), "abc".to_string())]),
            config: BTreeMap::from([
                ("env.TOKEN".to_string(), json!("abc")),
                (
                    format!("{}.corp", HTTP_HEADERS),
                    json!({ "Authorization": "Bearer abc" }),
                ),
                ("aether.interactive".to_string(), json!(false)),
            ]),
        };

        let masked = mask_properties(&properties);
        let rendered = serde_json::to_string(&masked).unwrap();
        assert!(!rendered.contains("abc"));
        assert_eq!(masked.system["os.name"], "linux");
        assert_eq!(masked.user["build"], "42");
        assert_eq!(masked.config["aether.interactive"], json!(false));
    }
}
