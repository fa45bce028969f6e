//! # Simulated camera
//!
//! A software [`Camera`] producing gradient frames. It stands in for vendor
//! hardware in the demo binary and in tests, and records the calls it
//! receives in a shared [`CallLog`] so call ordering can be asserted.
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;

use crate::acquisition::camera::{
    Camera, CameraDriver, ParameterValue, bits_depth_for_format, EXPOSURE_TIME, PIXEL_FORMAT,
};
use crate::acquisition::error::HardwareError;
use crate::acquisition::frame::Frame;

const SUPPORTED_FORMATS: [&str; 3] = ["Mono8", "Mono10", "Mono12"];

/// Ordered record of the state-changing calls made on simulated cameras
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Construction settings for simulated cameras
#[derive(Debug, Clone)]
pub struct SimulatedSettings {
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    /// Fail `get_frame` once this many frames were produced
    pub fail_grab_after: Option<u64>,
    pub fail_open: bool,
    /// Exposure simulated inside `get_frame`, with the camera lock held
    pub grab_delay: Option<Duration>,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            pixel_format: "Mono8".to_string(),
            fail_grab_after: None,
            fail_open: false,
            grab_delay: None,
        }
    }
}

#[derive(Debug)]
pub struct SimulatedCamera {
    name: String,
    settings: SimulatedSettings,
    log: CallLog,
    open: bool,
    grabbing: bool,
    exposure_us: f64,
    produced: u64,
}

impl SimulatedCamera {
    pub fn new(name: impl Into<String>, settings: SimulatedSettings, log: CallLog) -> Self {
        Self {
            name: name.into(),
            settings,
            log,
            open: false,
            grabbing: false,
            exposure_us: 10_000.0,
            produced: 0,
        }
    }

    pub fn pixel_format(&self) -> &str {
        &self.settings.pixel_format
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    fn parameter_error(&self, parameter: &str, message: impl Into<String>) -> HardwareError {
        HardwareError::Parameter {
            camera: self.name.clone(),
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    fn ensure_open(&self) -> Result<(), HardwareError> {
        if self.open {
            Ok(())
        } else {
            Err(HardwareError::NotOpen { camera: self.name.clone() })
        }
    }
}

impl Camera for SimulatedCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<(), HardwareError> {
        self.log.record("open");
        if self.settings.fail_open {
            return Err(HardwareError::Open {
                camera: self.name.clone(),
                message: "device busy".into(),
            });
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), HardwareError> {
        self.log.record("close");
        if self.grabbing {
            return Err(HardwareError::Close {
                camera: self.name.clone(),
                message: "acquisition still running".into(),
            });
        }
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn start_grab(&mut self) -> Result<(), HardwareError> {
        self.log.record("start_grab");
        self.ensure_open()?;
        self.grabbing = true;
        Ok(())
    }

    fn stop_grab(&mut self) -> Result<(), HardwareError> {
        self.log.record("stop_grab");
        self.grabbing = false;
        Ok(())
    }

    fn get_frame(&mut self) -> Result<Frame, HardwareError> {
        self.ensure_open()?;
        if !self.grabbing {
            return Err(HardwareError::Grab {
                camera: self.name.clone(),
                message: "camera is not grabbing".into(),
            });
        }
        if self.settings.fail_grab_after.is_some_and(|limit| self.produced >= limit) {
            return Err(HardwareError::Grab {
                camera: self.name.clone(),
                message: "transfer timeout".into(),
            });
        }

        if let Some(delay) = self.settings.grab_delay {
            std::thread::sleep(delay);
        }

        let bits_depth = bits_depth_for_format(&self.settings.pixel_format).unwrap_or(8);
        let modulo = 1u32 << bits_depth;
        let (width, height) = (self.settings.width, self.settings.height);
        let offset = self.produced as u32;
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x + y + offset) % modulo) as u16))
            .collect();
        self.produced += 1;

        Frame::new(width, height, bits_depth, pixels).ok_or_else(|| HardwareError::Grab {
            camera: self.name.clone(),
            message: "frame size mismatch".into(),
        })
    }

    fn get_parameter(&self, name: &str) -> Result<ParameterValue, HardwareError> {
        match name {
            PIXEL_FORMAT => Ok(ParameterValue::Text(self.settings.pixel_format.clone())),
            EXPOSURE_TIME => Ok(ParameterValue::Float(self.exposure_us)),
            "Width" => Ok(ParameterValue::Int(self.settings.width as i64)),
            "Height" => Ok(ParameterValue::Int(self.settings.height as i64)),
            other => Err(self.parameter_error(other, "unknown parameter")),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), HardwareError> {
        self.log.record(format!("set_parameter({}={})", name, value));
        match (name, value) {
            (PIXEL_FORMAT, ParameterValue::Text(format)) => {
                if self.grabbing {
                    return Err(self.parameter_error(name, "not writable while grabbing"));
                }
                if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                    return Err(self.parameter_error(name, format!("unsupported format {}", format)));
                }
                self.settings.pixel_format = format;
                Ok(())
            }
            (EXPOSURE_TIME, ParameterValue::Float(us)) if us > 0.0 => {
                self.exposure_us = us;
                Ok(())
            }
            (EXPOSURE_TIME, ParameterValue::Int(us)) if us > 0 => {
                self.exposure_us = us as f64;
                Ok(())
            }
            (other, value) => Err(self.parameter_error(other, format!("cannot set to {}", value))),
        }
    }

    fn available_pixel_formats(&self) -> Vec<String> {
        SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect()
    }
}

/// Driver returning one [`SimulatedCamera`], or nothing when disconnected
#[derive(Debug, Clone)]
pub struct SimulatedCameraDriver {
    settings: SimulatedSettings,
    connected: bool,
    log: CallLog,
}

impl SimulatedCameraDriver {
    pub fn new(settings: SimulatedSettings) -> Self {
        Self { settings, connected: true, log: CallLog::new() }
    }

    /// A driver that finds no device
    pub fn disconnected() -> Self {
        Self { settings: SimulatedSettings::default(), connected: false, log: CallLog::new() }
    }

    /// Log shared by every camera this driver hands out
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Default for SimulatedCameraDriver {
    fn default() -> Self {
        Self::new(SimulatedSettings::default())
    }
}

impl CameraDriver for SimulatedCameraDriver {
    fn name(&self) -> &str {
        "simulated"
    }

    fn find_first_camera(&self) -> Result<Option<Box<dyn Camera>>, HardwareError> {
        if !self.connected {
            return Ok(None);
        }
        let camera = SimulatedCamera::new("SIM-0001", self.settings.clone(), self.log.clone());
        Ok(Some(Box::new(camera)))
    }
}
