//! # Optolab Core Acquisition
//!
//! The boundary to camera hardware. Vendor SDK bindings are hidden behind the
//! [`Camera`] and [`CameraDriver`] traits; the core only sequences calls on
//! them. [`LiveWorker`] runs the blocking grab loop on its own thread and
//! reports back through the event bus.
//!
//! Ordering rules enforced here and by the camera controllers:
//!
//! - the worker calls `start_grab` before its loop and `stop_grab` after it,
//!   and acknowledges the stop only once `stop_grab` returned;
//! - a camera is never closed or reconfigured while a worker is grabbing.
pub mod camera;
pub mod error;
pub mod frame;
pub mod simulated;
pub mod worker;

pub use camera::{
    Camera, CameraDriver, NoCameraDriver, ParameterValue, SharedCamera, bits_depth_for_format,
    share_camera, EXPOSURE_TIME, PIXEL_FORMAT,
};
pub use error::HardwareError;
pub use frame::{Frame, FrameSlot, FrameSummary, HISTOGRAM_BINS};
pub use simulated::{CallLog, SimulatedCamera, SimulatedCameraDriver, SimulatedSettings};
pub use worker::{LiveWorker, STOP_TIMEOUT};
