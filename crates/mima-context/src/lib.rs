//! Context construction for dependency resolution
//!
//! This crate turns user overrides plus ambient configuration (a settings
//! file, system properties) into one resolved, read-only [`Context`] that a
//! resolution engine can work with.
//!
//! # Pipeline
//!
//! 1. [`SettingsResolver`] loads, interpolates and decrypts the settings file
//! 2. [`SelectorBuilder`] derives mirror, proxy and authentication selectors
//! 3. [`PropertyMerger`] layers system, profile and user properties
//! 4. [`ContextAssembler`] binds everything into a session and a [`Context`]
//!
//! # Example
//!
//! ```ignore
//! use mima_context::{ContextAssembler, ContextOverrides, EngineHandle, PlaintextDecrypter, SystemProperties};
//! use std::sync::Arc;
//!
//! let assembler = ContextAssembler::new(SystemProperties::capture(), Arc::new(PlaintextDecrypter));
//! let overrides = ContextOverrides::builder().with_user_settings(true).build();
//! let context = assembler.assemble(&overrides, EngineHandle::Borrowed(engine))?;
//! println!("{}", context.local_repository().display());
//! ```

pub mod assembler;
pub mod context;
pub mod engine;
pub mod error;
pub mod listener;
pub mod overrides;
pub mod policy;
pub mod properties;
pub mod repository;
pub mod runtime;
pub mod selector;
pub mod session;
pub mod settings;
pub mod system;

pub use assembler::{ContextAssembler, DEFAULT_LOCAL_REPOSITORY};
pub use context::Context;
pub use engine::{EngineHandle, RepositorySystem};
pub use error::{Error, Result, Stage};
pub use listener::{
    Listeners, RepositoryEvent, RepositoryEventKind, RepositoryListener, TransferEvent,
    TransferEventKind, TransferListener,
};
pub use overrides::{ContextOverrides, ContextOverridesBuilder};
pub use policy::{
    ChecksumMismatch, ChecksumOutcome, ChecksumPolicy, ResolutionErrorPolicy, SnapshotUpdatePolicy,
};
pub use properties::{MergedProperties, PropertyMerger};
pub use repository::RemoteRepository;
pub use runtime::{EngineFactory, Runtime, RuntimeRegistry, Runtimes, StandaloneRuntime};
pub use selector::{
    Authentication, AuthenticationSelector, MirrorSelection, MirrorSelector, ProxySelector, Route,
    SelectorBuilder, Selectors, ServerTransport,
};
pub use session::{PreparedSession, RepositorySession};
pub use settings::{EffectiveSettings, PlaintextDecrypter, SettingsDecrypter, SettingsResolver};
pub use system::SystemProperties;
