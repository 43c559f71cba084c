//! Settings loading, interpolation and decryption
//!
//! Settings come from at most one file: an explicit path from the
//! overrides, or the conventional `<home>/.mima/settings.toml`. The file is
//! parsed by extension (TOML, JSON or YAML), `${...}` expressions are
//! resolved, and every secret goes through a [`SettingsDecrypter`] before
//! anything else sees it.
//!
//! # Example
//!
//! ```ignore
//! use mima_context::settings::{PlaintextDecrypter, SettingsResolver};
//! use mima_context::{ContextOverrides, SystemProperties};
//! use std::sync::Arc;
//!
//! let resolver = SettingsResolver::new(SystemProperties::capture(), Arc::new(PlaintextDecrypter));
//! let overrides = ContextOverrides::builder().with_user_settings(true).build();
//! let settings = resolver.resolve(&overrides)?;
//! println!("{} mirrors", settings.mirrors.len());
//! ```

mod decrypt;
mod effective;
mod interpolate;
mod model;
mod resolver;
mod source;

pub use decrypt::{
    DecryptionProblem, DecryptionRequest, DecryptionResult, PlaintextDecrypter, RawSecret,
    SecretLocation, SettingsDecrypter, is_encrypted,
};
pub use effective::{EffectiveSettings, ProxyRule, ServerCredential};
pub use model::{Activation, Mirror, Profile, Proxy, Server, Settings};
pub use resolver::{SETTINGS_FILE, SettingsResolver, USER_DIR};
pub use source::{SettingsFormat, load_document};
