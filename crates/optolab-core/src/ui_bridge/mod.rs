//! # Optolab Core UI Bridge
//!
//! Headless model of the main window and the seam to whatever renders it.
//! [`MainWindow`] owns the menu buttons and the four view slots; every change
//! is forwarded as a [`UiMessage`] to an optional [`UiProvider`].
pub mod error;
pub mod widget;
pub mod window;

use std::sync::Arc;
use std::time::SystemTime;
use parking_lot::Mutex;

pub use error::UiBridgeError;
pub use widget::{ViewSlot, ViewWidget, ViewWidgets, WidgetContent};
pub use window::{MainWindow, MenuButton};

/// UI message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Info,
    Warning,
    Error,
}

/// UI update type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdateType {
    /// Window title changed
    Title(String),
    /// Status line text
    Status(String),
    /// Message the user has to acknowledge
    Dialog(String, MessageSeverity),
    /// Menu was cleared and rebuilt with these entries
    MenuRebuilt(Vec<String>),
    /// Enabled/active state of one menu entry
    MenuEntry { name: String, enabled: bool, active: bool },
    /// A view slot got new content, `None` when emptied
    SlotChanged { slot: ViewSlot, title: Option<String> },
}

/// UI message for communication with UI providers
#[derive(Debug, Clone)]
pub struct UiMessage {
    pub update_type: UiUpdateType,
    /// Component that caused the update
    pub source: String,
    pub timestamp: SystemTime,
}

impl UiMessage {
    pub fn new(source: impl Into<String>, update_type: UiUpdateType) -> Self {
        Self { update_type, source: source.into(), timestamp: SystemTime::now() }
    }
}

/// Trait for UI providers
pub trait UiProvider: Send {
    fn name(&self) -> &str;

    fn initialize(&mut self) -> Result<(), UiBridgeError> {
        Ok(())
    }

    fn handle_message(&mut self, message: &UiMessage) -> Result<(), UiBridgeError>;

    fn finalize(&mut self) -> Result<(), UiBridgeError> {
        Ok(())
    }
}

/// Provider that keeps every message in memory.
///
/// Clones share the same buffer, so a handle kept outside the window can
/// inspect what was rendered.
#[derive(Debug, Clone, Default)]
pub struct MemoryUiProvider {
    messages: Arc<Mutex<Vec<UiMessage>>>,
}

impl MemoryUiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<UiMessage> {
        self.messages.lock().clone()
    }

    pub fn updates(&self) -> Vec<UiUpdateType> {
        self.messages.lock().iter().map(|m| m.update_type.clone()).collect()
    }

    /// Dialog texts shown at the given severity
    pub fn dialogs(&self, severity: MessageSeverity) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter_map(|m| match &m.update_type {
                UiUpdateType::Dialog(text, s) if *s == severity => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl UiProvider for MemoryUiProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn handle_message(&mut self, message: &UiMessage) -> Result<(), UiBridgeError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
