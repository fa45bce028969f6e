use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

#[cfg(feature = "xml-config")]
use crate::storage::xml;

use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
    /// Tag based XML (.xml) - requires "xml-config" feature
    #[cfg(feature = "xml-config")]
    Xml,
}

impl ConfigFormat {
    /// Every format compiled into this build, in lookup priority order
    pub fn supported() -> Vec<ConfigFormat> {
        let mut formats = Vec::new();
        #[cfg(feature = "toml-config")]
        formats.push(ConfigFormat::Toml);
        formats.push(ConfigFormat::Json);
        #[cfg(feature = "yaml-config")]
        formats.push(ConfigFormat::Yaml);
        #[cfg(feature = "xml-config")]
        formats.push(ConfigFormat::Xml);
        formats
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
            #[cfg(feature = "xml-config")]
            ConfigFormat::Xml => "xml",
        }
    }

    /// Alternative extensions accepted for this format
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => &["yml"],
            _ => &[],
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                #[cfg(feature = "xml-config")]
                "xml" => Some(ConfigFormat::Xml),
                _ => None,
            })
    }

    /// Deserialize a document of this format
    pub fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, StorageSystemError> {
        let wrap = |format: &str, e: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::DeserializationError { format: format.to_string(), source: e }
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| wrap("json", Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| wrap("yaml", Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| wrap("toml", Box::new(e))),
            #[cfg(feature = "xml-config")]
            ConfigFormat::Xml => xml::to_value(data)
                .and_then(|value| serde_json::from_value(value).map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>))
                .map_err(|e| wrap("xml", e)),
        }
    }
}

/// Read and deserialize a configuration file, picking the format from its extension.
pub fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, StorageSystemError> {
    if !path.is_file() {
        return Err(StorageSystemError::FileNotFound(path.to_path_buf()));
    }
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
    })?;
    let data = std::fs::read_to_string(path).map_err(|source| StorageSystemError::Io {
        path: path.to_path_buf(),
        operation: "read_config".to_string(),
        source,
    })?;
    log::debug!("Parsing {:?} config from {}", format, path.display());
    format.deserialize(&data)
}

/// Find `{dir}/{stem}.{ext}` for the first supported extension that exists.
pub fn find_config_file(dir: &Path, stem: &str) -> Option<std::path::PathBuf> {
    ConfigFormat::supported().into_iter().find_map(|format| {
        std::iter::once(format.extension())
            .chain(format.aliases().iter().copied())
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|candidate| candidate.is_file())
    })
}
