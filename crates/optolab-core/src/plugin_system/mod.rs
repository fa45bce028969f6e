//! # Optolab Core Plugin System
//!
//! Modules are declared in the application manifest and implemented by
//! statically registered plugins. Nothing is imported at runtime: the binary
//! links the plugin crates and registers them in a [`PluginRegistry`].
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`manifest`]**: application manifest and per-module sub-manifests.
//! - **[`loader`]**: resolves module locations, checks availability and caches
//!   loaded [`ModuleHandle`]s.
//! - **[`registry`]**: controller key to [`ModulePlugin`] map, with API
//!   compatibility checks on registration.
//! - **[`factory`]**: builds controllers, including the built-in default one.
//! - **[`manager`]**: the controller lifecycle state machine ([`ModuleManager`]).
//! - **[`traits`]**: [`ModulePlugin`] and [`Controller`].
//! - **[`version`]**: semver constraint helpers.
pub mod default_module;
pub mod error;
pub mod factory;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod traits;
pub mod version;

pub use default_module::{DefaultController, DefaultModulePlugin};
pub use error::PluginSystemError;
pub use factory::{ControllerFactory, ControllerInstance};
pub use loader::{ModuleHandle, ModuleLoader};
pub use manager::{EventDisposition, LifecycleState, ModuleManager, TransitionOutcome};
pub use manifest::{ApplicationManifest, LoadPolicy, ManifestBuilder, ModuleDescriptor, ModuleSubManifest};
pub use registry::PluginRegistry;
pub use traits::{Controller, ControllerEvent, EventOutcome, ModulePlugin, PluginError};
pub use version::{VersionError, VersionRange};

#[cfg(test)]
pub(crate) mod tests;
