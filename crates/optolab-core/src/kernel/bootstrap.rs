use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::acquisition::{CameraDriver, NoCameraDriver};
use crate::context::ApplicationContext;
use crate::event::{AppEvent, EventBus, EventSender};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::{
    ApplicationManifest, EventDisposition, LoadPolicy, ModuleManager, PluginRegistry, TransitionOutcome,
};
use crate::ui_bridge::{MainWindow, UiProvider};

/// Startup choices that do not come from the manifest
pub struct AppOptions {
    /// Overrides the manifest's `load_policy` when set
    pub load_policy: Option<LoadPolicy>,
    pub camera_driver: Arc<dyn CameraDriver>,
    pub ui_provider: Option<Box<dyn UiProvider>>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self { load_policy: None, camera_driver: Arc::new(NoCameraDriver), ui_provider: None }
    }
}

impl fmt::Debug for AppOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppOptions")
            .field("load_policy", &self.load_policy)
            .field("camera_driver", &self.camera_driver.name())
            .field("ui_provider", &self.ui_provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

/// Main application: the event bus and the module manager it feeds
pub struct Application {
    manager: ModuleManager,
    bus: EventBus,
    initialized: bool,
}

impl Application {
    /// Read the manifest at `manifest_path` and wire everything up.
    ///
    /// A missing or malformed manifest is fatal.
    pub fn new(manifest_path: &Path, registry: PluginRegistry, options: AppOptions) -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let manifest = ApplicationManifest::load(manifest_path)?;
        Self::from_manifest(manifest, Arc::new(registry), options)
    }

    pub fn from_manifest(
        manifest: ApplicationManifest,
        registry: Arc<PluginRegistry>,
        options: AppOptions,
    ) -> Result<Self> {
        let load_policy = options.load_policy.or(manifest.load_policy).unwrap_or_default();
        log::info!(
            "Application '{}' with {} module(s), {} loading, camera driver '{}'",
            manifest.app_name,
            manifest.modules.len(),
            load_policy,
            options.camera_driver.name()
        );

        let bus = EventBus::new();
        let mut window = MainWindow::new(bus.sender());
        if let Some(provider) = options.ui_provider {
            window = window.with_provider(provider).map_err(|e| Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Bootstrap,
                message: "UI provider failed to initialize".to_string(),
                source: Some(Box::new(e.into())),
            })?;
        }

        let manager = ModuleManager::new(
            Arc::new(manifest),
            registry,
            ApplicationContext::new(options.camera_driver),
            window,
            bus.sender(),
            load_policy,
        );
        Ok(Self { manager, bus, initialized: false })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Producer handle for menu clicks, user input and shutdown requests
    pub fn events(&self) -> EventSender {
        self.bus.sender()
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ModuleManager {
        &mut self.manager
    }

    /// Build the menu and show the default module
    pub fn start(&mut self) -> Result<TransitionOutcome> {
        if self.initialized {
            return Err(Error::lifecycle(KernelLifecyclePhase::Start, "Application already started"));
        }
        let outcome = self.manager.start();
        self.initialized = true;
        log::info!("Application started: {:?}", outcome);
        Ok(outcome)
    }

    /// Handle every event already queued, in order
    pub fn process_pending(&mut self) -> Vec<EventDisposition> {
        self.bus.drain().into_iter().map(|event| self.dispatch(event)).collect()
    }

    /// UI loop: handle events until a shutdown request, then tear down
    pub async fn run(&mut self) -> Result<()> {
        if !self.initialized {
            self.start()?;
        }
        log::info!("Entering UI loop");
        while let Some(event) = self.bus.recv().await {
            if self.dispatch(event) == EventDisposition::ShutDown {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.manager.shutdown();
        self.bus.close();
    }

    fn dispatch(&mut self, event: AppEvent) -> EventDisposition {
        log::trace!("Dispatching {}", event.name());
        self.manager.handle_event(event)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("initialized", &self.initialized)
            .field("manager", &self.manager)
            .finish()
    }
}
