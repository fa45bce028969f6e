//! # Optolab Core Hardware Errors
//!
//! [`HardwareError`] covers every failure reported by a camera binding, plus
//! the worker-side failures (spawn, stop acknowledgement timeout). These are
//! recoverable: the owning controller stops acquisition and detaches the
//! camera.
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    #[error("No camera detected")]
    NoCamera,

    #[error("Camera '{camera}' failed to open: {message}")]
    Open { camera: String, message: String },

    #[error("Camera '{camera}' failed to close: {message}")]
    Close { camera: String, message: String },

    #[error("Camera '{camera}' is not open")]
    NotOpen { camera: String },

    #[error("Frame grab failed on '{camera}': {message}")]
    Grab { camera: String, message: String },

    #[error("Parameter '{parameter}' on '{camera}': {message}")]
    Parameter { camera: String, parameter: String, message: String },

    #[error("Acquisition worker did not acknowledge stop within {0:?}")]
    StopTimeout(Duration),

    #[error("Camera '{camera}' stayed busy for {timeout:?}")]
    Busy { camera: String, timeout: Duration },

    #[error("Failed to spawn acquisition worker: {0}")]
    WorkerSpawn(String),
}
