use std::fmt;
use std::sync::Arc;
use parking_lot::Mutex;

use crate::acquisition::error::HardwareError;
use crate::acquisition::frame::Frame;

/// GenICam name of the pixel format node
pub const PIXEL_FORMAT: &str = "PixelFormat";
/// GenICam name of the exposure time node (microseconds)
pub const EXPOSURE_TIME: &str = "ExposureTime";

/// Value of a camera parameter node
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ParameterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Bool(v) => write!(f, "{}", v),
            ParameterValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Opaque camera handle, as exposed by a vendor SDK binding.
///
/// Every call may fail with a [`HardwareError`]. Implementations are driven
/// from two threads (UI loop and acquisition worker) but never concurrently:
/// access always goes through the [`SharedCamera`] mutex.
pub trait Camera: Send {
    /// Model or serial used in log and error messages
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<(), HardwareError>;

    fn close(&mut self) -> Result<(), HardwareError>;

    fn is_open(&self) -> bool;

    fn start_grab(&mut self) -> Result<(), HardwareError>;

    fn stop_grab(&mut self) -> Result<(), HardwareError>;

    /// Block until the next frame is available
    fn get_frame(&mut self) -> Result<Frame, HardwareError>;

    fn get_parameter(&self, name: &str) -> Result<ParameterValue, HardwareError>;

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), HardwareError>;

    /// Pixel formats the device accepts. Empty when unknown.
    fn available_pixel_formats(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Camera handle shared between the UI loop and the acquisition worker
pub type SharedCamera = Arc<Mutex<Box<dyn Camera>>>;

pub fn share_camera(camera: Box<dyn Camera>) -> SharedCamera {
    Arc::new(Mutex::new(camera))
}

/// Device enumeration entry point of a camera SDK
pub trait CameraDriver: Send + Sync {
    fn name(&self) -> &str;

    /// Return the first detected camera, or `None` when nothing is plugged in
    fn find_first_camera(&self) -> Result<Option<Box<dyn Camera>>, HardwareError>;
}

/// Driver for machines without any camera SDK
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCameraDriver;

impl CameraDriver for NoCameraDriver {
    fn name(&self) -> &str {
        "none"
    }

    fn find_first_camera(&self) -> Result<Option<Box<dyn Camera>>, HardwareError> {
        Ok(None)
    }
}

/// Bit depth encoded in a pixel format name ("Mono12" -> 12, "BayerRG8" -> 8)
pub fn bits_depth_for_format(format: &str) -> Option<u8> {
    let digits: String = format
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse::<u8>().ok().filter(|d| (1..=16).contains(d))
}
