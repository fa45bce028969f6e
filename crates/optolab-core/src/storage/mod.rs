//! # Optolab Core Storage
//!
//! Format-agnostic configuration file reading. The manifest and the
//! per-module sub-manifests are plain serde documents; the format is chosen
//! from the file extension (JSON always, TOML, YAML and XML behind features).
pub mod config;
pub mod error;
#[cfg(feature = "xml-config")]
pub mod xml;

pub use config::{ConfigFormat, find_config_file, read_config};
pub use error::StorageSystemError;
