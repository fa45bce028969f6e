#![cfg(test)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::acquisition::{share_camera, LiveWorker, SimulatedCameraDriver, SimulatedSettings};
use crate::context::{ApplicationContext, ControllerContext};
use crate::event::{AcquisitionEvent, StopReason};
use crate::kernel::bootstrap::{AppOptions, Application};
use crate::kernel::constants::API_VERSION;
use crate::plugin_system::tests::support::{write_manifest, write_module};
use crate::plugin_system::{
    Controller, ControllerEvent, EventOutcome, ModulePlugin, PluginError, PluginRegistry, VersionRange,
};
use crate::ui_bridge::{MemoryUiProvider, ViewSlot, ViewWidget, ViewWidgets, WidgetContent};

/// Plugin whose controller streams from the first camera while active
pub struct StreamingPlugin;

impl ModulePlugin for StreamingPlugin {
    fn name(&self) -> &str {
        "Streaming"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        vec![VersionRange::from_constraint("^0.1").unwrap()]
    }

    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError> {
        let camera = ctx.app.camera_driver().find_first_camera()?.ok_or(crate::HardwareError::NoCamera)?;
        let camera = share_camera(camera);
        camera.lock().open()?;
        ctx.app.attach_camera(camera.clone());
        let worker = LiveWorker::start(camera, ctx.app.image().clone(), ctx.events.clone(), ctx.generation)?;
        Ok(Box::new(StreamingController { worker: Some(worker) }))
    }
}

pub struct StreamingController {
    worker: Option<LiveWorker>,
}

impl StreamingController {
    fn release(&mut self, app: &mut ApplicationContext) -> Result<(), PluginError> {
        if let Some(mut worker) = self.worker.take() {
            worker.stop()?;
        }
        if let Some(camera) = app.detach_camera() {
            camera.lock().close()?;
        }
        Ok(())
    }
}

impl Controller for StreamingController {
    fn module_name(&self) -> &str {
        "stream"
    }

    fn widgets(&self, app: &ApplicationContext) -> ViewWidgets {
        let content = match app.image_summary() {
            Some(s) => WidgetContent::Image { sequence: s.sequence, width: s.width, height: s.height },
            None => WidgetContent::Empty,
        };
        ViewWidgets::new().with(ViewSlot::TopLeft, ViewWidget::new("Live", content))
    }

    fn handle_event(&mut self, event: ControllerEvent, ctx: &mut ControllerContext<'_>) -> Result<EventOutcome, PluginError> {
        match event {
            ControllerEvent::Acquisition(AcquisitionEvent::FrameReady { .. }) => Ok(EventOutcome::ViewChanged),
            ControllerEvent::Acquisition(AcquisitionEvent::Stopped { reason: StopReason::Error(msg) }) => {
                self.release(ctx.app)?;
                Ok(EventOutcome::Warning(msg))
            }
            _ => Ok(EventOutcome::Ignored),
        }
    }

    fn deactivate(&mut self, ctx: &mut ControllerContext<'_>) -> Result<(), PluginError> {
        self.release(ctx.app)
    }
}

/// Application with one streaming module named "stream"
pub fn streaming_app(settings: SimulatedSettings) -> (tempfile::TempDir, Application, SimulatedCameraDriver) {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "stream", "Streaming", "");
    let manifest = write_manifest(dir.path(), &[("default", ""), ("stream", "stream")], "");

    let mut registry = PluginRegistry::new(API_VERSION).unwrap();
    registry.register_plugin(Arc::new(StreamingPlugin)).unwrap();
    let driver = SimulatedCameraDriver::new(settings);
    let options = AppOptions {
        load_policy: None,
        camera_driver: Arc::new(driver.clone()),
        ui_provider: Some(Box::new(MemoryUiProvider::new())),
    };
    let app = Application::new(&manifest, registry, options).unwrap();
    (dir, app, driver)
}

pub fn wait_until<F: FnMut() -> bool>(mut condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}
