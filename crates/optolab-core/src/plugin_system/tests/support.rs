use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::acquisition::{share_camera, CallLog, Camera, SimulatedCameraDriver};
use crate::context::{ApplicationContext, ControllerContext};
use crate::event::EventBus;
use crate::kernel::constants::API_VERSION;
use crate::plugin_system::{
    ApplicationManifest, Controller, ControllerEvent, EventOutcome, LoadPolicy, ModuleManager,
    ModulePlugin, ModuleSubManifest, PluginError, PluginRegistry, VersionRange,
};
use crate::ui_bridge::{MainWindow, MemoryUiProvider, ViewSlot, ViewWidget, ViewWidgets};

/// Counters shared between a mock plugin and the test body
#[derive(Debug, Default)]
pub struct Counters {
    pub loads: AtomicUsize,
    pub constructions: AtomicUsize,
    pub deactivations: AtomicUsize,
}

impl Counters {
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    pub fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

/// Configurable plugin; optionally opens the context camera
pub struct MockPlugin {
    pub name: String,
    pub api: String,
    pub counters: Arc<Counters>,
    pub log: CallLog,
    pub uses_camera: bool,
    pub fail_create: bool,
    pub fail_preflight: bool,
}

impl MockPlugin {
    pub fn new(name: &str, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            api: format!("^{}", API_VERSION),
            counters: Arc::new(Counters::default()),
            log,
            uses_camera: false,
            fail_create: false,
            fail_preflight: false,
        }
    }
}

impl ModulePlugin for MockPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        vec![VersionRange::from_constraint(&self.api).unwrap()]
    }

    fn preflight_check(&self, _module: &str, _sub: &ModuleSubManifest) -> Result<(), PluginError> {
        if self.fail_preflight {
            return Err(PluginError::PreflightCheckError("SDK not installed".into()));
        }
        Ok(())
    }

    fn on_load(&self, _module: &str, _sub: &ModuleSubManifest) -> Result<(), PluginError> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError> {
        let module = ctx.module_name().unwrap_or("?").to_string();
        self.log.record(format!("construct:{}", module));
        if self.fail_create {
            return Err(PluginError::ControllerError("constructor raised".into()));
        }
        self.counters.constructions.fetch_add(1, Ordering::SeqCst);
        if self.uses_camera {
            let camera = ctx
                .app
                .camera_driver()
                .find_first_camera()?
                .ok_or(PluginError::Hardware(crate::acquisition::HardwareError::NoCamera))?;
            let camera = share_camera(camera);
            camera.lock().open()?;
            ctx.app.attach_camera(camera);
        }
        Ok(Box::new(MockController { module, counters: Arc::clone(&self.counters), log: self.log.clone() }))
    }
}

pub struct MockController {
    module: String,
    counters: Arc<Counters>,
    log: CallLog,
}

impl Controller for MockController {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn widgets(&self, _app: &ApplicationContext) -> ViewWidgets {
        ViewWidgets::new().with(ViewSlot::TopLeft, ViewWidget::text(self.module.clone(), "mock"))
    }

    fn handle_event(&mut self, event: ControllerEvent, _ctx: &mut ControllerContext<'_>) -> Result<EventOutcome, PluginError> {
        match event {
            ControllerEvent::UserInput(input) if input.command == "fail" => {
                Err(PluginError::ControllerError(input.value))
            }
            ControllerEvent::UserInput(_) => Ok(EventOutcome::Handled),
            ControllerEvent::Acquisition(_) => Ok(EventOutcome::ViewChanged),
        }
    }

    fn deactivate(&mut self, ctx: &mut ControllerContext<'_>) -> Result<(), PluginError> {
        self.counters.deactivations.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("deactivate:{}", self.module));
        if let Some(camera) = ctx.app.detach_camera() {
            camera.lock().close()?;
        }
        Ok(())
    }
}

/// Create `{root}/{name}/{name}.toml` naming `controller`
pub fn write_module(root: &Path, name: &str, controller: &str, extra: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.toml", name)), format!("controller = \"{}\"\n{}", controller, extra)).unwrap();
    dir
}

pub fn write_manifest(root: &Path, modules: &[(&str, &str)], extra: &str) -> PathBuf {
    let mut content = format!("name = \"Machine Vision\"\norganization = \"LEnsE\"\nyear = 2025\n{}\n", extra);
    for (name, location) in modules {
        content.push_str(&format!("\n[[module]]\nname = \"{}\"\nlocation = \"{}\"\n", name, location));
    }
    let path = root.join("appli.toml");
    fs::write(&path, content).unwrap();
    path
}

/// The scenario fixture: default, camera_demo (camera plugin), broken_demo (missing dir)
pub struct Fixture {
    pub dir: TempDir,
    pub manifest: Arc<ApplicationManifest>,
    pub registry: Arc<PluginRegistry>,
    pub driver: SimulatedCameraDriver,
    pub camera_counters: Arc<Counters>,
    pub images_counters: Arc<Counters>,
    pub log: CallLog,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(|_, _| {})
    }

    /// Build the fixture, letting the caller tweak the two plugins first
    pub fn with<F: FnOnce(&mut MockPlugin, &mut MockPlugin)>(tweak: F) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_module(dir.path(), "camera_demo", "MockCamera", "[variables]\ncolormode = \"Mono8:8,Mono12:12\"\n");
        write_module(dir.path(), "images_demo", "MockImages", "");
        let path = write_manifest(
            dir.path(),
            &[
                ("default", ""),
                ("camera_demo", "camera_demo"),
                ("images_demo", "images_demo"),
                ("broken_demo", "does/not/exist"),
            ],
            "",
        );

        let driver = SimulatedCameraDriver::default();
        let log = driver.call_log();
        let mut camera = MockPlugin::new("MockCamera", log.clone());
        camera.uses_camera = true;
        let mut images = MockPlugin::new("MockImages", log.clone());
        tweak(&mut camera, &mut images);
        let camera_counters = Arc::clone(&camera.counters);
        let images_counters = Arc::clone(&images.counters);

        let mut registry = PluginRegistry::new(API_VERSION).unwrap();
        registry.register_plugin(Arc::new(camera)).unwrap();
        registry.register_plugin(Arc::new(images)).unwrap();

        Self {
            manifest: Arc::new(ApplicationManifest::load(&path).unwrap()),
            registry: Arc::new(registry),
            dir,
            driver,
            camera_counters,
            images_counters,
            log,
        }
    }

    pub fn manager(&self, bus: &EventBus, policy: LoadPolicy) -> (ModuleManager, MemoryUiProvider) {
        let memory = MemoryUiProvider::new();
        let window = MainWindow::new(bus.sender()).with_provider(Box::new(memory.clone())).unwrap();
        let context = ApplicationContext::new(Arc::new(self.driver.clone()));
        let manager = ModuleManager::new(
            Arc::clone(&self.manifest),
            Arc::clone(&self.registry),
            context,
            window,
            bus.sender(),
            policy,
        );
        (manager, memory)
    }
}
