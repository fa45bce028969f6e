//! # optolab-core
//!
//! Application module manager for a machine-vision lab application: reads
//! the application manifest, resolves modules to statically registered
//! plugins, drives the controller lifecycle and hosts the live acquisition
//! worker.
pub mod acquisition;
pub mod context;
pub mod event;
pub mod kernel;
pub mod plugin_system;
pub mod storage;
pub mod ui_bridge;

pub use acquisition::{Camera, CameraDriver, Frame, FrameSlot, HardwareError, LiveWorker, SharedCamera};
pub use context::{ApplicationContext, ControllerContext};
pub use event::{AcquisitionEvent, AppEvent, EventBus, EventSender, StopReason, UserInput};
pub use kernel::error::Error as KernelError;
pub use kernel::{AppOptions, Application};
pub use plugin_system::{
    ApplicationManifest, Controller, ControllerEvent, EventOutcome, LoadPolicy, ModuleManager, ModulePlugin,
    PluginError, PluginRegistry, TransitionOutcome,
};
pub use ui_bridge::{MainWindow, UiProvider, ViewSlot, ViewWidget, ViewWidgets};

#[cfg(test)]
mod tests;
