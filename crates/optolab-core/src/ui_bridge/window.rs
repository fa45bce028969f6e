use std::fmt;

use crate::event::{AppEvent, EventSender};
use crate::ui_bridge::error::UiBridgeError;
use crate::ui_bridge::widget::{ViewSlot, ViewWidget};
use crate::ui_bridge::{MessageSeverity, UiMessage, UiProvider, UiUpdateType};

const SOURCE: &str = "main_window";

/// A menu entry wired to the event bus
#[derive(Debug, Clone)]
pub struct MenuButton {
    name: String,
    enabled: bool,
    active: bool,
    events: EventSender,
}

impl MenuButton {
    fn new(name: String, events: EventSender) -> Self {
        Self { name, enabled: true, active: false, events }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Emit `MenuChanged(name)`. Disabled buttons emit nothing.
    pub fn click(&self) -> Result<(), UiBridgeError> {
        if !self.enabled {
            return Err(UiBridgeError::EntryDisabled(self.name.clone()));
        }
        self.events.send(AppEvent::MenuChanged(self.name.clone()))?;
        Ok(())
    }
}

/// Headless main window: title, side menu and four view slots
pub struct MainWindow {
    title: String,
    buttons: Vec<MenuButton>,
    slots: [Option<ViewWidget>; 4],
    last_message: Option<(MessageSeverity, String)>,
    events: EventSender,
    provider: Option<Box<dyn UiProvider>>,
}

impl MainWindow {
    pub fn new(events: EventSender) -> Self {
        Self {
            title: String::new(),
            buttons: Vec::new(),
            slots: Default::default(),
            last_message: None,
            events,
            provider: None,
        }
    }

    /// Attach a renderer and initialize it
    pub fn with_provider(mut self, mut provider: Box<dyn UiProvider>) -> Result<Self, UiBridgeError> {
        provider.initialize()?;
        self.provider = Some(provider);
        Ok(self)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.notify(UiUpdateType::Title(self.title.clone()));
    }

    /// Drop every button and rebuild one enabled button per name, in order
    pub fn set_menu_elements<S: AsRef<str>>(&mut self, names: &[S]) {
        self.buttons = names
            .iter()
            .map(|n| MenuButton::new(n.as_ref().to_string(), self.events.clone()))
            .collect();
        let names = self.buttons.iter().map(|b| b.name.clone()).collect();
        self.notify(UiUpdateType::MenuRebuilt(names));
    }

    pub fn menu_buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    pub fn button(&self, name: &str) -> Option<&MenuButton> {
        self.buttons.iter().find(|b| b.name == name)
    }

    /// Click the named entry, as the user would
    pub fn click(&self, name: &str) -> Result<(), UiBridgeError> {
        self.button(name)
            .ok_or_else(|| UiBridgeError::EntryNotFound(name.to_string()))?
            .click()
    }

    pub fn set_menu_entry_state(&mut self, name: &str, enabled: bool, active: bool) -> Result<(), UiBridgeError> {
        let button = self
            .buttons
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| UiBridgeError::EntryNotFound(name.to_string()))?;
        if button.enabled == enabled && button.active == active {
            return Ok(());
        }
        button.enabled = enabled;
        button.active = active;
        self.notify(UiUpdateType::MenuEntry { name: name.to_string(), enabled, active });
        Ok(())
    }

    /// Put `widget` in `slot`; the previous widget is released
    pub fn set_view_slot(&mut self, slot: ViewSlot, widget: Option<ViewWidget>) {
        let title = widget.as_ref().map(|w| w.title.clone());
        self.slots[slot.index()] = widget;
        self.notify(UiUpdateType::SlotChanged { slot, title });
    }

    pub fn view_slot(&self, slot: ViewSlot) -> Option<&ViewWidget> {
        self.slots[slot.index()].as_ref()
    }

    pub fn clear_view_slots(&mut self) {
        for slot in ViewSlot::ALL {
            if self.slots[slot.index()].is_some() {
                self.set_view_slot(slot, None);
            }
        }
    }

    /// Show a message to the user (dialog for errors and warnings)
    pub fn show_message(&mut self, severity: MessageSeverity, text: impl Into<String>) {
        let text = text.into();
        match severity {
            MessageSeverity::Info => log::info!("{}", text),
            MessageSeverity::Warning => log::warn!("{}", text),
            MessageSeverity::Error => log::error!("{}", text),
        }
        let update = match severity {
            MessageSeverity::Info => UiUpdateType::Status(text.clone()),
            _ => UiUpdateType::Dialog(text.clone(), severity),
        };
        self.last_message = Some((severity, text));
        self.notify(update);
    }

    pub fn last_message(&self) -> Option<&(MessageSeverity, String)> {
        self.last_message.as_ref()
    }

    /// Finalize the attached renderer
    pub fn close(&mut self) {
        if let Some(mut provider) = self.provider.take() {
            if let Err(e) = provider.finalize() {
                log::warn!("{}", e);
            }
        }
    }

    fn notify(&mut self, update: UiUpdateType) {
        if let Some(provider) = self.provider.as_mut() {
            if let Err(e) = provider.handle_message(&UiMessage::new(SOURCE, update)) {
                log::warn!("{}", e);
            }
        }
    }
}

impl fmt::Debug for MainWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainWindow")
            .field("title", &self.title)
            .field("buttons", &self.buttons)
            .field("slots", &self.slots)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}
