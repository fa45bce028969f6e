//! Controller lifecycle state machine.
//!
//! ```text
//! NoModuleActive --start--> DefaultActive --select(x)--> ModuleActive(x)
//!                                 ^                          |
//!                                 +---- failure / select ----+
//! ```
//!
//! Every transition deactivates the current controller before the next one
//! is constructed. Errors are turned into user-visible messages here and
//! never reach the UI loop.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::ApplicationContext;
use crate::event::{AppEvent, EventSender, Generation};
use crate::kernel::constants::DEFAULT_MODULE;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::factory::{ControllerFactory, ControllerInstance};
use crate::plugin_system::loader::ModuleLoader;
use crate::plugin_system::manifest::{ApplicationManifest, LoadPolicy};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::{ControllerEvent, EventOutcome};
use crate::ui_bridge::{MainWindow, MessageSeverity, ViewSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    NoModuleActive,
    DefaultActive,
    ModuleActive(String),
    ShutDown,
}

impl LifecycleState {
    /// Module whose controller is alive in this state
    pub fn module(&self) -> Option<&str> {
        match self {
            LifecycleState::DefaultActive => Some(DEFAULT_MODULE),
            LifecycleState::ModuleActive(name) => Some(name),
            _ => None,
        }
    }
}

/// Result of a requested transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The module was already active
    Unchanged,
    Activated(String),
    /// Nothing was torn down; the state is the same as before
    Rejected { module: String, reason: String },
    /// Construction failed and the default module took over
    FellBack { module: String, reason: String },
}

/// How the manager dealt with an event from the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    Transition(TransitionOutcome),
    Routed(EventOutcome),
    /// Stale generation or no controller to route to
    Dropped,
    ShutDown,
}

pub struct ModuleManager {
    manifest: Arc<ApplicationManifest>,
    factory: ControllerFactory,
    context: ApplicationContext,
    window: MainWindow,
    events: EventSender,
    load_policy: LoadPolicy,
    state: LifecycleState,
    active: Option<ControllerInstance>,
    unavailable: BTreeMap<String, String>,
    generation: Generation,
}

impl ModuleManager {
    pub fn new(
        manifest: Arc<ApplicationManifest>,
        registry: Arc<PluginRegistry>,
        context: ApplicationContext,
        window: MainWindow,
        events: EventSender,
        load_policy: LoadPolicy,
    ) -> Self {
        let loader = ModuleLoader::new(Arc::clone(&manifest), registry);
        Self {
            manifest,
            factory: ControllerFactory::new(loader),
            context,
            window,
            events,
            load_policy,
            state: LifecycleState::NoModuleActive,
            active: None,
            unavailable: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn active_module(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name())
    }

    /// Current activation; worker events from older ones are dropped
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn manifest(&self) -> &ApplicationManifest {
        &self.manifest
    }

    pub fn window(&self) -> &MainWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut MainWindow {
        &mut self.window
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    pub fn loader(&self) -> &ModuleLoader {
        self.factory.loader()
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.load_policy
    }

    /// Modules that cannot be selected, with the reason
    pub fn unavailable(&self) -> &BTreeMap<String, String> {
        &self.unavailable
    }

    /// Leave `NoModuleActive`: pre-flight, menu, optional eager load, default view
    pub fn start(&mut self) -> TransitionOutcome {
        if self.state != LifecycleState::NoModuleActive {
            return TransitionOutcome::Unchanged;
        }

        for (name, status) in self.factory.loader().check_report() {
            if let Err(e) = status {
                log::warn!("Module '{}' is unavailable: {}", name, e);
                self.unavailable.insert(name, e.to_string());
            }
        }

        self.window.set_title(self.manifest.window_title());
        self.window.set_menu_elements(&self.manifest.module_names());

        if self.load_policy == LoadPolicy::Eager {
            for (name, e) in self.factory.loader_mut().load_all() {
                log::warn!("Module '{}' failed to load: {}", name, e);
                self.unavailable.insert(name, e.to_string());
            }
        }

        let outcome = self.activate(DEFAULT_MODULE);
        self.sync_menu();
        outcome
    }

    /// Switch to module `name`. Never fails; see [`TransitionOutcome`].
    pub fn select_module(&mut self, name: &str) -> TransitionOutcome {
        if self.state == LifecycleState::ShutDown {
            return TransitionOutcome::Rejected {
                module: name.to_string(),
                reason: "application is shutting down".to_string(),
            };
        }
        if self.state.module() == Some(name) {
            log::debug!("Module '{}' already active", name);
            return TransitionOutcome::Unchanged;
        }
        if name != DEFAULT_MODULE && self.manifest.module(name).is_none() {
            return self.reject(name, PluginSystemError::UnknownModule(name.to_string()).to_string());
        }
        if let Some(reason) = self.unavailable.get(name) {
            let reason = format!("Module '{}' is unavailable: {}", name, reason);
            return self.reject(name, reason);
        }

        let outcome = self.activate(name);
        self.sync_menu();
        outcome
    }

    /// Route a bus event to the state machine or the active controller
    pub fn handle_event(&mut self, event: AppEvent) -> EventDisposition {
        match event {
            AppEvent::MenuChanged(name) => EventDisposition::Transition(self.select_module(&name)),
            AppEvent::Shutdown => {
                self.shutdown();
                EventDisposition::ShutDown
            }
            AppEvent::Acquisition { generation, event } => {
                if generation != self.generation {
                    log::debug!("Dropping {:?} from stale generation {}", event, generation);
                    return EventDisposition::Dropped;
                }
                self.route(ControllerEvent::Acquisition(event))
            }
            AppEvent::UserInput(input) => self.route(ControllerEvent::UserInput(input)),
        }
    }

    /// Deactivate the active controller and stop accepting transitions
    pub fn shutdown(&mut self) {
        if self.state == LifecycleState::ShutDown {
            return;
        }
        log::info!("Module manager shutting down");
        self.teardown();
        self.window.clear_view_slots();
        self.window.close();
        self.state = LifecycleState::ShutDown;
    }

    fn route(&mut self, event: ControllerEvent) -> EventDisposition {
        let Some(active) = self.active.as_mut() else {
            return EventDisposition::Dropped;
        };
        let outcome = match active.handle_event(event, &mut self.context, &self.manifest, &self.events) {
            Ok(outcome) => outcome,
            Err(e) => EventOutcome::Warning(format!("{}: {}", active.name(), e)),
        };
        match &outcome {
            EventOutcome::ViewChanged => self.refresh_view(),
            EventOutcome::Warning(message) => {
                self.window.show_message(MessageSeverity::Warning, message.clone());
                self.refresh_view();
            }
            EventOutcome::Handled | EventOutcome::Ignored => {}
        }
        EventDisposition::Routed(outcome)
    }

    fn reject(&mut self, name: &str, reason: String) -> TransitionOutcome {
        self.window.show_message(MessageSeverity::Error, reason.clone());
        TransitionOutcome::Rejected { module: name.to_string(), reason }
    }

    /// Tear down, construct, populate. Falls back to the default module.
    fn activate(&mut self, name: &str) -> TransitionOutcome {
        self.teardown();

        match self.construct(name) {
            Ok(()) => TransitionOutcome::Activated(name.to_string()),
            Err(e) if name != DEFAULT_MODULE => {
                let reason = e.to_string();
                log::error!("Activation of '{}' failed: {}", name, reason);
                if !matches!(e, PluginSystemError::InitializationError { .. }) {
                    // The module itself is broken, not just its hardware
                    self.unavailable.insert(name.to_string(), reason.clone());
                }
                self.window.show_message(MessageSeverity::Error, reason.clone());
                match self.construct(DEFAULT_MODULE) {
                    Ok(()) => TransitionOutcome::FellBack { module: name.to_string(), reason },
                    Err(e) => {
                        log::error!("Default module failed too: {}", e);
                        TransitionOutcome::Rejected { module: name.to_string(), reason }
                    }
                }
            }
            Err(e) => {
                log::error!("Default module failed: {}", e);
                self.window.show_message(MessageSeverity::Error, e.to_string());
                TransitionOutcome::Rejected { module: name.to_string(), reason: e.to_string() }
            }
        }
    }

    fn construct(&mut self, name: &str) -> Result<(), PluginSystemError> {
        self.generation += 1;
        let instance = self.factory.instantiate(name, &mut self.context, &self.events, self.generation)?;
        self.active = Some(instance);
        self.state = if name == DEFAULT_MODULE {
            LifecycleState::DefaultActive
        } else {
            LifecycleState::ModuleActive(name.to_string())
        };
        self.refresh_view();
        log::info!("Module '{}' active", name);
        Ok(())
    }

    /// Deactivate and drop the active controller, leaving `NoModuleActive`
    fn teardown(&mut self) {
        if let Some(instance) = self.active.take() {
            let name = instance.name().to_string();
            if let Err(e) = instance.deactivate(&mut self.context, &self.manifest, &self.events) {
                log::warn!("Deactivating '{}' reported: {}", name, e);
                self.window.show_message(MessageSeverity::Warning, format!("{}: {}", name, e));
            }
            log::debug!("Module '{}' deactivated", name);
        }
        self.window.clear_view_slots();
        self.state = LifecycleState::NoModuleActive;
    }

    fn refresh_view(&mut self) {
        let widgets = match &self.active {
            Some(active) => active.widgets(&self.context),
            None => return,
        };
        for (slot, widget) in widgets.into_slots() {
            if self.window.view_slot(slot) != widget.as_ref() {
                self.window.set_view_slot(slot, widget);
            }
        }
    }

    fn sync_menu(&mut self) {
        let active = self.state.module().map(str::to_string);
        for name in self.manifest.module_names() {
            let enabled = !self.unavailable.contains_key(&name);
            let is_active = active.as_deref() == Some(name.as_str());
            if let Err(e) = self.window.set_menu_entry_state(&name, enabled, is_active) {
                log::warn!("{}", e);
            }
        }
    }

    /// Widget currently displayed in `slot`
    pub fn view_slot_title(&self, slot: ViewSlot) -> Option<&str> {
        self.window.view_slot(slot).map(|w| w.title.as_str())
    }
}

impl Drop for ModuleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleManager")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("unavailable", &self.unavailable)
            .field("load_policy", &self.load_policy)
            .finish()
    }
}
