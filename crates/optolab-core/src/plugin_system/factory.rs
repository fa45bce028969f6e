use std::fmt;
use std::sync::Arc;

use crate::context::{ApplicationContext, ControllerContext};
use crate::event::{EventSender, Generation};
use crate::kernel::constants::DEFAULT_MODULE;
use crate::plugin_system::default_module::DefaultModulePlugin;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{ModuleHandle, ModuleLoader};
use crate::plugin_system::manifest::ApplicationManifest;
use crate::plugin_system::traits::{Controller, ControllerEvent, EventOutcome, ModulePlugin, PluginError};
use crate::ui_bridge::ViewWidgets;

/// A constructed controller together with the activation it belongs to
pub struct ControllerInstance {
    name: String,
    module: Option<Arc<ModuleHandle>>,
    generation: Generation,
    controller: Box<dyn Controller>,
}

impl ControllerInstance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn module(&self) -> Option<&Arc<ModuleHandle>> {
        self.module.as_ref()
    }

    pub fn widgets(&self, app: &ApplicationContext) -> ViewWidgets {
        self.controller.widgets(app)
    }

    pub fn handle_event(
        &mut self,
        event: ControllerEvent,
        app: &mut ApplicationContext,
        manifest: &ApplicationManifest,
        events: &EventSender,
    ) -> Result<EventOutcome, PluginError> {
        let mut ctx = ControllerContext {
            app,
            manifest,
            module: self.module.as_deref(),
            events,
            generation: self.generation,
        };
        self.controller.handle_event(event, &mut ctx)
    }

    /// Tear the controller down; the instance is consumed
    pub fn deactivate(
        mut self,
        app: &mut ApplicationContext,
        manifest: &ApplicationManifest,
        events: &EventSender,
    ) -> Result<(), PluginError> {
        let mut ctx = ControllerContext {
            app,
            manifest,
            module: self.module.as_deref(),
            events,
            generation: self.generation,
        };
        self.controller.deactivate(&mut ctx)
    }
}

impl fmt::Debug for ControllerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerInstance")
            .field("name", &self.name)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Maps module names to controller plugins and builds controllers.
///
/// `"default"` always maps to the built-in [`DefaultModulePlugin`]; every
/// other name goes through the [`ModuleLoader`].
pub struct ControllerFactory {
    loader: ModuleLoader,
    default_plugin: Arc<dyn ModulePlugin>,
}

impl ControllerFactory {
    pub fn new(loader: ModuleLoader) -> Self {
        Self { loader, default_plugin: Arc::new(DefaultModulePlugin::new()) }
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut ModuleLoader {
        &mut self.loader
    }

    /// Plugin able to build controllers for module `name`
    pub fn get_controller_class(&mut self, name: &str) -> Result<Arc<dyn ModulePlugin>, PluginSystemError> {
        if name == DEFAULT_MODULE {
            return Ok(Arc::clone(&self.default_plugin));
        }
        Ok(Arc::clone(self.loader.load(name)?.plugin()))
    }

    /// Build the controller of module `name` for activation `generation`
    pub fn instantiate(
        &mut self,
        name: &str,
        app: &mut ApplicationContext,
        events: &EventSender,
        generation: Generation,
    ) -> Result<ControllerInstance, PluginSystemError> {
        let (plugin, module) = if name == DEFAULT_MODULE {
            (Arc::clone(&self.default_plugin), None)
        } else {
            let handle = self.loader.load(name)?;
            (Arc::clone(handle.plugin()), Some(handle))
        };

        let manifest = Arc::clone(self.loader.manifest());
        let mut ctx = ControllerContext {
            app,
            manifest: &manifest,
            module: module.as_deref(),
            events,
            generation,
        };
        let controller = plugin.create_controller(&mut ctx).map_err(|e| {
            PluginSystemError::InitializationError { module: name.to_string(), message: e.to_string() }
        })?;

        log::debug!("Constructed controller for '{}' (generation {})", name, generation);
        Ok(ControllerInstance { name: name.to_string(), module, generation, controller })
    }
}

impl fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerFactory").field("loader", &self.loader).finish()
    }
}
