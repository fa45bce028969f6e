//! # Optolab Core Kernel Errors
//!
//! [`Error`] aggregates the subsystem errors so that the binary deals with a
//! single type. Only bootstrap failures (an unreadable manifest, a plugin
//! that cannot be registered) are expected to reach it; module-level errors
//! are handled inside the module manager.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::acquisition::error::HardwareError;
use crate::event::error::EventSystemError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;
use crate::ui_bridge::error::UiBridgeError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("UI Bridge system error: {0}")]
    UiBridge(#[from] UiBridgeError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Start")]
    Start,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn lifecycle(phase: KernelLifecyclePhase, message: impl Into<String>) -> Self {
        Error::KernelLifecycleError { phase, message: message.into(), source: None }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
