//! # Optolab Core Application Context
//!
//! Typed state shared between the module manager and controllers.
//!
//! | field          | written by                                   |
//! |----------------|----------------------------------------------|
//! | `camera_driver`| the application, once at startup             |
//! | `camera`       | the active controller, on the UI loop        |
//! | `image`        | the live worker, or a controller on the UI loop |
//! | `bits_depth`   | the active controller, on the UI loop        |
//!
//! The [`ModuleManager`](crate::plugin_system::ModuleManager) owns the
//! context and lends it mutably to exactly one controller call at a time.
use std::fmt;
use std::sync::Arc;

use crate::acquisition::{CameraDriver, Frame, FrameSlot, FrameSummary, SharedCamera};
use crate::event::{EventSender, Generation};
use crate::plugin_system::loader::ModuleHandle;
use crate::plugin_system::manifest::ApplicationManifest;

/// Bit depth assumed when no controller has set one
pub const DEFAULT_BITS_DEPTH: u8 = 8;

pub struct ApplicationContext {
    camera_driver: Arc<dyn CameraDriver>,
    camera: Option<SharedCamera>,
    image: FrameSlot,
    bits_depth: Option<u8>,
}

impl ApplicationContext {
    pub fn new(camera_driver: Arc<dyn CameraDriver>) -> Self {
        Self { camera_driver, camera: None, image: FrameSlot::new(), bits_depth: None }
    }

    pub fn camera_driver(&self) -> Arc<dyn CameraDriver> {
        Arc::clone(&self.camera_driver)
    }

    pub fn camera(&self) -> Option<&SharedCamera> {
        self.camera.as_ref()
    }

    /// Store the opened camera, returning the one it replaces
    pub fn attach_camera(&mut self, camera: SharedCamera) -> Option<SharedCamera> {
        self.camera.replace(camera)
    }

    pub fn detach_camera(&mut self) -> Option<SharedCamera> {
        self.camera.take()
    }

    /// Slot the worker writes into; clone it to hand it to another thread
    pub fn image(&self) -> &FrameSlot {
        &self.image
    }

    pub fn set_image(&mut self, frame: Frame) -> u64 {
        self.image.store(frame)
    }

    pub fn latest_image(&self) -> Option<Frame> {
        self.image.latest()
    }

    /// Metadata and histogram of the latest image, without cloning its pixels
    pub fn image_summary(&self) -> Option<FrameSummary> {
        self.image.summary()
    }

    pub fn bits_depth(&self) -> u8 {
        self.bits_depth.unwrap_or(DEFAULT_BITS_DEPTH)
    }

    pub fn set_bits_depth(&mut self, bits_depth: Option<u8>) {
        self.bits_depth = bits_depth;
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("camera_driver", &self.camera_driver.name())
            .field(
                "camera",
                &self.camera.as_ref().map(|c| c.try_lock().map_or_else(|| "<grabbing>".to_string(), |d| d.name().to_string())),
            )
            .field("image_sequence", &self.image.sequence())
            .field("bits_depth", &self.bits_depth)
            .finish()
    }
}

/// What a controller sees while the manager calls into it
pub struct ControllerContext<'a> {
    pub app: &'a mut ApplicationContext,
    pub manifest: &'a ApplicationManifest,
    /// `None` for the built-in default module
    pub module: Option<&'a ModuleHandle>,
    /// Sender for worker threads spawned by the controller
    pub events: &'a EventSender,
    /// Activation the controller belongs to; stamp it on worker events
    pub generation: Generation,
}

impl ControllerContext<'_> {
    /// Module-local variable from the sub-manifest
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.module.and_then(|m| m.variable(name))
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module.map(|m| m.name())
    }
}
