//! # Optolab Core Kernel
//!
//! Bootstrapping and the UI loop. [`Application`] reads the manifest, builds
//! the [`ModuleManager`](crate::plugin_system::ModuleManager) and drains the
//! event bus into it until shutdown.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{AppOptions, Application};
pub use error::{Error, KernelLifecyclePhase, Result};

#[cfg(test)]
mod tests;
