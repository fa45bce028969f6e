use std::fmt;
use tokio::sync::mpsc;

use crate::event::error::EventSystemError;
use crate::event::types::AppEvent;

/// Cloneable producer side of the event bus.
///
/// Sending never blocks, so it is safe to call from the acquisition thread.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    /// Queue an event for the UI loop
    pub fn send(&self, event: AppEvent) -> Result<(), EventSystemError> {
        let name = event.name();
        self.tx.send(event).map_err(|_| EventSystemError::ChannelClosed {
            event_name: name.to_string(),
        })
    }

    /// Whether the UI loop has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Single-consumer event queue drained by the UI loop
pub struct EventBus {
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Create a new producer handle
    pub fn sender(&self) -> EventSender {
        EventSender { tx: self.tx.clone() }
    }

    /// Wait for the next event.
    ///
    /// The bus keeps a sender of its own, so this only returns `None` after
    /// the bus was closed and drained.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Stop accepting events; queued ones can still be received
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}
