//! # Optolab Core UI Bridge Errors
//!
//! [`UiBridgeError`] covers menu lookups, disabled entries and provider
//! failures. None of these is fatal: the window logs them and the user can
//! keep interacting with the menu.
use thiserror::Error;

use crate::event::EventSystemError;

#[derive(Debug, Error)]
pub enum UiBridgeError {
    #[error("Menu entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Menu entry '{0}' is disabled")]
    EntryDisabled(String),

    #[error("Menu event could not be delivered: {0}")]
    EventChannelClosed(#[from] EventSystemError),

    #[error("UI provider '{provider}' failed during '{operation}': {message}")]
    ProviderFailed {
        provider: String,
        operation: String,
        message: String,
    },
}
