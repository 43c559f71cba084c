//! Shared test utilities for the mima workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`home`]: [`TestHome`], a temporary home directory with a settings file
//! - [`decrypter`]: [`FakeDecrypter`] with a fixed cipher table
//! - [`engine`]: [`RecordingEngine`] that counts shutdowns

pub mod decrypter;
pub mod engine;
pub mod home;

pub use decrypter::FakeDecrypter;
pub use engine::RecordingEngine;
pub use home::TestHome;
