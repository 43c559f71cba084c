//! Per-server transport tuning
//!
//! A server's free-form `configuration` block is translated into connector
//! config properties keyed by server id, so headers and timeouts apply to
//! that destination only. Recognised keys:
//!
//! - `httpHeaders`: list of `{ name, value }` tables, or a plain table
//! - `connectTimeout`, `requestTimeout`: milliseconds, number or numeric string
//!
//! The legacy `wagonProvider` key is dropped. Unknown keys are ignored.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::settings::ServerCredential;
use crate::{Error, Result};

pub const HTTP_HEADERS: &str = "aether.connector.http.headers";
pub const CONNECT_TIMEOUT: &str = "aether.connector.connectTimeout";
pub const REQUEST_TIMEOUT: &str = "aether.connector.requestTimeout";
pub const FILE_MODE: &str = "aether.connector.perms.fileMode";
pub const DIR_MODE: &str = "aether.connector.perms.dirMode";

const LEGACY_PROVIDER_KEY: &str = "wagonProvider";

/// Transport settings for one server id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerTransport {
    pub server_id: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub file_mode: Option<String>,
    pub dir_mode: Option<String>,
}

impl ServerTransport {
    /// Translate a server entry. Returns `None` when it carries no tuning at all.
    pub fn from_server(server: &ServerCredential) -> Result<Option<Self>> {
        let mut transport = Self {
            server_id: server.id.clone(),
            file_mode: server.file_permissions.clone(),
            dir_mode: server.directory_permissions.clone(),
            ..Default::default()
        };

        if let Some(configuration) = &server.configuration {
            let Some(block) = configuration.as_object() else {
                return Err(selector_error(server, "configuration must be a table"));
            };
            let mut block = block.clone();
            if block.remove(LEGACY_PROVIDER_KEY).is_some() {
                tracing::debug!(server = %server.id, "Ignoring legacy wagonProvider setting");
            }

            transport.headers = block
                .get("httpHeaders")
                .map(|headers| parse_headers(server, headers))
                .transpose()?;
            transport.connect_timeout_ms = block
                .get("connectTimeout")
                .map(|v| parse_millis(server, "connectTimeout", v))
                .transpose()?;
            transport.request_timeout_ms = block
                .get("requestTimeout")
                .map(|v| parse_millis(server, "requestTimeout", v))
                .transpose()?;
        }

        Ok((!transport.is_empty()).then_some(transport))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_none()
            && self.connect_timeout_ms.is_none()
            && self.request_timeout_ms.is_none()
            && self.file_mode.is_none()
            && self.dir_mode.is_none()
    }

    /// Connector config properties for this server
    pub fn to_config_properties(&self) -> BTreeMap<String, Value> {
        let id = &self.server_id;
        let mut out = BTreeMap::new();
        if let Some(headers) = &self.headers {
            let headers: Map<String, Value> = headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            out.insert(format!("{}.{}", HTTP_HEADERS, id), Value::Object(headers));
        }
        if let Some(ms) = self.connect_timeout_ms {
            out.insert(format!("{}.{}", CONNECT_TIMEOUT, id), Value::from(ms));
        }
        if let Some(ms) = self.request_timeout_ms {
            out.insert(format!("{}.{}", REQUEST_TIMEOUT, id), Value::from(ms));
        }
        if let Some(mode) = &self.file_mode {
            out.insert(format!("{}.{}", FILE_MODE, id), Value::String(mode.clone()));
        }
        if let Some(mode) = &self.dir_mode {
            out.insert(format!("{}.{}", DIR_MODE, id), Value::String(mode.clone()));
        }
        out
    }
}

fn selector_error(server: &ServerCredential, message: impl Into<String>) -> Error {
    Error::SelectorBuild {
        server: server.id.clone(),
        message: message.into(),
    }
}

fn parse_headers(server: &ServerCredential, value: &Value) -> Result<BTreeMap<String, String>> {
    let as_text = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    };

    match value {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                let name = entry.get("name").and_then(as_text);
                let value = entry.get("value").and_then(as_text);
                match (name, value) {
                    (Some(name), Some(value)) => Ok((name, value)),
                    _ => Err(selector_error(
                        server,
                        "httpHeaders entries need a 'name' and a 'value'",
                    )),
                }
            })
            .collect(),
        Value::Object(table) => table
            .iter()
            .map(|(name, v)| {
                as_text(v)
                    .map(|value| (name.clone(), value))
                    .ok_or_else(|| {
                        selector_error(server, format!("header '{}' must be a plain value", name))
                    })
            })
            .collect(),
        _ => Err(selector_error(server, "httpHeaders must be a list or a table")),
    }
}

fn parse_millis(server: &ServerCredential, key: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        selector_error(
            server,
            format!("{} must be a non-negative number of milliseconds, got {}", key, value),
        )
    })
}
