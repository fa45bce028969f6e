
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use optolab_core::acquisition::{CallLog, SimulatedCameraDriver};
use optolab_core::context::ApplicationContext;
use optolab_core::event::EventBus;
use optolab_core::kernel::constants::API_VERSION;
use optolab_core::plugin_system::{
    ApplicationManifest, EventDisposition, LoadPolicy, ModuleManager, PluginRegistry,
};
use optolab_core::ui_bridge::{MainWindow, MemoryUiProvider};
use tempfile::TempDir;

use crate::CameraLivePlugin;

/// Write `appli.toml` with a default entry and a `camera_live` module
pub(crate) fn write_live_manifest(root: &Path, colormode: Option<&str>) -> std::path::PathBuf {
    let module_dir = root.join("camera_live");
    fs::create_dir_all(&module_dir).unwrap();
    let mut sub = "controller = \"CameraLiveController\"\nversion = \"0.1.0\"\n".to_string();
    if let Some(modes) = colormode {
        sub.push_str(&format!("\n[variables]\ncolormode = \"{}\"\n", modes));
    }
    fs::write(module_dir.join("camera_live.toml"), sub).unwrap();

    let manifest = "name = \"Machine Vision\"\norganization = \"LEnsE\"\nyear = 2025\n\n\
                    [[module]]\nname = \"default\"\n\n\
                    [[module]]\nname = \"camera_live\"\nlocation = \"camera_live\"\n";
    let path = root.join("appli.toml");
    fs::write(&path, manifest).unwrap();
    path
}

pub(crate) fn registry() -> Arc<PluginRegistry> {
    let mut registry = PluginRegistry::new(API_VERSION).unwrap();
    registry.register_plugin(Arc::new(CameraLivePlugin)).unwrap();
    Arc::new(registry)
}

/// A started manager over a simulated camera
pub(crate) struct LiveFixture {
    pub manager: ModuleManager,
    pub bus: EventBus,
    pub ui: MemoryUiProvider,
    pub log: CallLog,
    pub _dir: TempDir,
}

impl LiveFixture {
    pub fn new(driver: SimulatedCameraDriver, colormode: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = write_live_manifest(dir.path(), colormode);
        let manifest = Arc::new(ApplicationManifest::load(&path).unwrap());

        let bus = EventBus::new();
        let ui = MemoryUiProvider::new();
        let window = MainWindow::new(bus.sender()).with_provider(Box::new(ui.clone())).unwrap();
        let log = driver.call_log();
        let context = ApplicationContext::new(Arc::new(driver));
        let mut manager = ModuleManager::new(manifest, registry(), context, window, bus.sender(), LoadPolicy::Lazy);
        manager.start();
        Self { manager, bus, ui, log, _dir: dir }
    }

    /// Feed bus events to the manager until `done` accepts one or time runs out
    pub fn pump_until<F: FnMut(&EventDisposition) -> bool>(&mut self, mut done: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            match self.bus.try_recv() {
                Some(event) => {
                    let disposition = self.manager.handle_event(event);
                    if done(&disposition) {
                        return true;
                    }
                }
                None => std::thread::sleep(Duration::from_millis(2)),
            }
        }
        false
    }

    /// Handle whatever is queued right now
    pub fn drain(&mut self) -> Vec<EventDisposition> {
        self.bus.drain().into_iter().map(|e| self.manager.handle_event(e)).collect()
    }
}
