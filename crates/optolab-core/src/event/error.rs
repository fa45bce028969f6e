//! # Optolab Core Event System Errors
//!
//! Defines [`EventSystemError`], raised when an event cannot be delivered to
//! the UI loop.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventSystemError {
    #[error("Event channel closed, '{event_name}' was dropped")]
    ChannelClosed {
        event_name: String,
    },
}
