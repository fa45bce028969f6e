use std::sync::Arc;

use parking_lot::MutexGuard;

use optolab_core::acquisition::{
    bits_depth_for_format, share_camera, Camera, HardwareError, LiveWorker, ParameterValue, SharedCamera,
    EXPOSURE_TIME, PIXEL_FORMAT, STOP_TIMEOUT,
};
use optolab_core::context::{ApplicationContext, ControllerContext};
use optolab_core::event::{AcquisitionEvent, StopReason, UserInput};
use optolab_core::plugin_system::traits::{Controller, ControllerEvent, EventOutcome, PluginError};
use optolab_core::ui_bridge::{ViewSlot, ViewWidget, ViewWidgets, WidgetContent};

use crate::color_mode::{select_color_mode, ColorMode};

/// User-input command switching the pixel format
pub const COLOR_MODE_COMMAND: &str = "color_mode";

/// Controller owning the camera and its live worker while the module is active
pub struct CameraLiveController {
    module: String,
    camera: Option<SharedCamera>,
    camera_name: String,
    worker: Option<LiveWorker>,
    color_modes: Vec<ColorMode>,
    pixel_format: String,
    exposure: Option<String>,
    status: Option<String>,
}

impl CameraLiveController {
    /// Open the first camera of the context driver and start streaming.
    ///
    /// Fails with [`HardwareError::NoCamera`] when nothing is plugged in; the
    /// camera is closed again if the worker cannot be started.
    pub fn connect(ctx: &mut ControllerContext<'_>, color_modes: Vec<ColorMode>) -> Result<Self, PluginError> {
        let module = ctx.module_name().unwrap_or("camera_live").to_string();
        let driver = ctx.app.camera_driver();
        let mut camera = driver.find_first_camera()?.ok_or(HardwareError::NoCamera)?;
        let camera_name = camera.name().to_string();
        log::info!("Opening camera {} for module {}", camera_name, module);
        camera.open()?;

        let pixel_format = match camera.get_parameter(PIXEL_FORMAT) {
            Ok(ParameterValue::Text(format)) => format,
            Ok(other) => other.to_string(),
            Err(e) => {
                log::warn!("Could not read pixel format of {}: {}", camera_name, e);
                String::new()
            }
        };
        let exposure = camera.get_parameter(EXPOSURE_TIME).ok().map(|v| v.to_string());
        let camera = share_camera(camera);

        let mut controller = Self {
            module,
            camera: Some(Arc::clone(&camera)),
            camera_name,
            worker: None,
            color_modes,
            pixel_format,
            exposure,
            status: None,
        };

        ctx.app.image().clear();
        ctx.app.set_bits_depth(Some(controller.bits_depth()));
        if ctx.app.attach_camera(Arc::clone(&camera)).is_some() {
            log::warn!("Replacing a camera still attached to the context");
        }

        if let Err(e) = controller.start_worker(ctx) {
            if let Some(release_err) = controller.release(ctx.app) {
                log::warn!("Error while releasing camera: {}", release_err);
            }
            return Err(e.into());
        }
        Ok(controller)
    }

    pub fn camera_name(&self) -> &str {
        &self.camera_name
    }

    pub fn pixel_format(&self) -> &str {
        &self.pixel_format
    }

    pub fn color_modes(&self) -> &[ColorMode] {
        &self.color_modes
    }

    pub fn is_streaming(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_running())
    }

    /// Bit depth of the current pixel format, as declared by the color mode list
    pub fn bits_depth(&self) -> u8 {
        self.color_modes
            .iter()
            .find(|m| m.pixel_format == self.pixel_format)
            .map(|m| m.bits_depth)
            .or_else(|| bits_depth_for_format(&self.pixel_format))
            .unwrap_or(8)
    }

    fn start_worker(&mut self, ctx: &ControllerContext<'_>) -> Result<(), HardwareError> {
        let camera = self.camera.clone().ok_or(HardwareError::NoCamera)?;
        let worker = LiveWorker::start(camera, ctx.app.image().clone(), ctx.events.clone(), ctx.generation)?;
        self.worker = Some(worker);
        Ok(())
    }

    /// Stop and drop the worker. On a stop timeout the worker is dropped
    /// abandoned and keeps its grab until the binding returns.
    fn stop_worker(&mut self) -> Result<(), HardwareError> {
        let Some(mut worker) = self.worker.take() else {
            return Ok(());
        };
        if let StopReason::Error(msg) = worker.stop()? {
            log::warn!("Live acquisition had already failed: {}", msg);
        }
        Ok(())
    }

    /// Camera lock, waiting at most [`STOP_TIMEOUT`] for a grab in progress
    fn lock_camera<'a>(&self, camera: &'a SharedCamera) -> Result<MutexGuard<'a, Box<dyn Camera>>, HardwareError> {
        camera.try_lock_for(STOP_TIMEOUT).ok_or_else(|| HardwareError::Busy {
            camera: self.camera_name.clone(),
            timeout: STOP_TIMEOUT,
        })
    }

    /// Stop the worker, detach the camera and close it, in that order
    fn release(&mut self, app: &mut ApplicationContext) -> Option<HardwareError> {
        match self.stop_worker() {
            Ok(()) => self.detach(app, true),
            Err(e) => {
                self.detach(app, false);
                Some(e)
            }
        }
    }

    /// Remove the camera from the context, closing it when `close` is set.
    ///
    /// A camera whose worker did not acknowledge the stop is left open; the
    /// abandoned worker still owns a grab on it.
    fn detach(&mut self, app: &mut ApplicationContext, close: bool) -> Option<HardwareError> {
        let mut close_error = None;
        if let Some(camera) = self.camera.take() {
            if let Some(attached) = app.detach_camera() {
                if !Arc::ptr_eq(&attached, &camera) {
                    app.attach_camera(attached);
                }
            }
            if !close {
                log::warn!("Leaving camera {} open: acquisition did not stop", self.camera_name);
            } else {
                match self.lock_camera(&camera) {
                    Ok(mut device) if device.is_open() => {
                        log::info!("Closing camera {}", self.camera_name);
                        if let Err(e) = device.close() {
                            log::error!("Failed to close camera {}: {}", self.camera_name, e);
                            close_error = Some(e);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::error!("Not closing camera {}: {}", self.camera_name, e);
                        close_error = Some(e);
                    }
                }
            }
        }
        app.set_bits_depth(None);
        close_error
    }

    fn on_acquisition(&mut self, event: AcquisitionEvent, app: &mut ApplicationContext) -> EventOutcome {
        match event {
            // Older frames queued behind a newer one need no refresh of their own
            AcquisitionEvent::FrameReady { sequence } if sequence < app.image().sequence() => EventOutcome::Ignored,
            AcquisitionEvent::FrameReady { .. } if self.camera.is_some() => EventOutcome::ViewChanged,
            AcquisitionEvent::FrameReady { .. } => EventOutcome::Ignored,
            AcquisitionEvent::Stopped { reason: StopReason::ByUser } => EventOutcome::Ignored,
            AcquisitionEvent::Stopped { reason: StopReason::Error(msg) } => {
                if self.worker.as_mut().is_some_and(|w| w.poll_stopped().is_none()) {
                    // Left over from a worker replaced by a color mode change
                    return EventOutcome::Ignored;
                }
                if let Some(e) = self.release(app) {
                    log::warn!("Error while releasing camera after acquisition failure: {}", e);
                }
                let message = format!("Acquisition stopped: {}", msg);
                self.status = Some(message.clone());
                EventOutcome::Warning(message)
            }
        }
    }

    fn on_user_input(&mut self, input: UserInput, ctx: &mut ControllerContext<'_>) -> Result<EventOutcome, PluginError> {
        if input.command != COLOR_MODE_COMMAND {
            return Ok(EventOutcome::Ignored);
        }
        let mode = select_color_mode(&self.color_modes, &input.value)
            .cloned()
            .ok_or_else(|| PluginError::ControllerError(format!("unknown color mode '{}'", input.value)))?;
        self.change_color_mode(mode, ctx)
    }

    /// Switch pixel format: stop the worker, close, write the format, reopen, restart
    fn change_color_mode(&mut self, mode: ColorMode, ctx: &mut ControllerContext<'_>) -> Result<EventOutcome, PluginError> {
        let camera = self.camera.clone().ok_or(HardwareError::NoCamera)?;
        if mode.pixel_format == self.pixel_format {
            return Ok(EventOutcome::Handled);
        }
        let available = self.lock_camera(&camera)?.available_pixel_formats();
        if !available.is_empty() && !available.contains(&mode.pixel_format) {
            return Ok(EventOutcome::Warning(format!(
                "Pixel format {} is not supported by {}",
                mode.pixel_format, self.camera_name
            )));
        }

        log::info!("Switching {} to {}", self.camera_name, mode);
        if let Err(e) = self.stop_worker() {
            self.detach(ctx.app, false);
            self.status = Some(format!("Camera lost: {}", e));
            return Err(e.into());
        }

        let reopened = self
            .lock_camera(&camera)
            .and_then(|mut device| reopen_with_format(&mut **device, &mode.pixel_format));
        let rejected = match reopened {
            Ok(rejected) => rejected,
            Err(e) => {
                if let Some(release_err) = self.release(ctx.app) {
                    log::warn!("Error while releasing camera: {}", release_err);
                }
                self.status = Some(format!("Camera lost: {}", e));
                return Err(e.into());
            }
        };
        if rejected.is_none() {
            self.pixel_format = mode.pixel_format.clone();
        }
        ctx.app.set_bits_depth(Some(self.bits_depth()));

        if let Err(e) = self.start_worker(ctx) {
            if let Some(release_err) = self.release(ctx.app) {
                log::warn!("Error while releasing camera: {}", release_err);
            }
            self.status = Some(format!("Camera lost: {}", e));
            return Err(e.into());
        }

        Ok(match rejected {
            None => EventOutcome::ViewChanged,
            Some(e) => EventOutcome::Warning(e.to_string()),
        })
    }
}

/// Close the camera, write the pixel format and open it again.
///
/// The outer error means the camera could not be closed or reopened. The
/// inner one is the format write failing on an otherwise healthy device.
fn reopen_with_format(device: &mut dyn Camera, format: &str) -> Result<Option<HardwareError>, HardwareError> {
    device.close()?;
    let rejected = device.set_parameter(PIXEL_FORMAT, ParameterValue::Text(format.to_string())).err();
    device.open()?;
    Ok(rejected)
}

impl Controller for CameraLiveController {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn widgets(&self, app: &ApplicationContext) -> ViewWidgets {
        let summary = if self.camera.is_some() { app.image_summary() } else { None };

        let live = match (&summary, &self.status) {
            (Some(summary), _) => ViewWidget::new(
                "Live",
                WidgetContent::Image { sequence: summary.sequence, width: summary.width, height: summary.height },
            ),
            (None, Some(status)) => ViewWidget::text("Live", status.clone()),
            (None, None) => ViewWidget::text("Live", "Waiting for frames"),
        };

        let color_mode = ViewWidget::new(
            "Color mode",
            WidgetContent::Choices {
                command: COLOR_MODE_COMMAND.to_string(),
                options: self.color_modes.iter().map(|m| m.pixel_format.clone()).collect(),
                selected: Some(self.pixel_format.clone()),
            },
        );

        let histogram = match &summary {
            Some(summary) => ViewWidget::histogram("Histogram", summary),
            None => ViewWidget::empty("Histogram"),
        };

        let mut info = vec![
            ("Camera".to_string(), self.camera_name.clone()),
            ("Pixel format".to_string(), self.pixel_format.clone()),
            ("Bits depth".to_string(), app.bits_depth().to_string()),
        ];
        if let Some(exposure) = &self.exposure {
            info.push(("Exposure (us)".to_string(), exposure.clone()));
        }
        info.push((
            "Status".to_string(),
            if self.is_streaming() { "streaming".to_string() } else { "stopped".to_string() },
        ));

        ViewWidgets::new()
            .with(ViewSlot::TopLeft, live)
            .with(ViewSlot::TopRight, color_mode)
            .with(ViewSlot::BotLeft, histogram)
            .with(ViewSlot::BotRight, ViewWidget::new("Camera", WidgetContent::Table(info)))
    }

    fn handle_event(
        &mut self,
        event: ControllerEvent,
        ctx: &mut ControllerContext<'_>,
    ) -> Result<EventOutcome, PluginError> {
        match event {
            ControllerEvent::Acquisition(event) => Ok(self.on_acquisition(event, ctx.app)),
            ControllerEvent::UserInput(input) => self.on_user_input(input, ctx),
        }
    }

    fn deactivate(&mut self, ctx: &mut ControllerContext<'_>) -> Result<(), PluginError> {
        log::debug!("Deactivating {}", self.module);
        match self.release(ctx.app) {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for CameraLiveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraLiveController")
            .field("module", &self.module)
            .field("camera", &self.camera_name)
            .field("pixel_format", &self.pixel_format)
            .field("worker", &self.worker)
            .finish()
    }
}
