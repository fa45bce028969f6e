//! # Optolab Core Plugin System Errors
//!
//! [`PluginSystemError`] covers manifest reading, module resolution and
//! loading, controller lookup and plugin registration.
//!
//! Only `ManifestError` is fatal, and only at startup. Every module-level
//! variant is caught by the module manager, which disables or skips the
//! offending module and keeps the rest of the menu usable.
use std::path::PathBuf;

use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Application manifest error for '{path}': {message}")]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Module '{0}' is not declared in the application manifest")]
    UnknownModule(String),

    #[error("Module '{module}' failed to load: {message}")]
    ModuleLoadError {
        module: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("No controller registered under '{controller}' (module '{module}')")]
    ControllerNotFound { module: String, controller: String },

    #[error("Plugin registration error for '{controller}': {message}")]
    RegistrationError { controller: String, message: String },

    #[error("Plugin '{controller}' is not compatible with API version {api_version} (supports {supported})")]
    IncompatibleApi {
        controller: String,
        api_version: String,
        supported: String,
    },

    #[error("Preflight check failed for module '{module}': {message}")]
    PreflightCheckFailed { module: String, message: String },

    #[error("Controller initialization error for module '{module}': {message}")]
    InitializationError { module: String, message: String },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

impl PluginSystemError {
    pub(crate) fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginSystemError::ManifestError { path: path.into(), message: message.into(), source: None }
    }

    pub(crate) fn load(module: &str, message: impl Into<String>) -> Self {
        PluginSystemError::ModuleLoadError {
            module: module.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Name of the module the error is about, when there is one
    pub fn module(&self) -> Option<&str> {
        match self {
            PluginSystemError::UnknownModule(module)
            | PluginSystemError::ModuleLoadError { module, .. }
            | PluginSystemError::ControllerNotFound { module, .. }
            | PluginSystemError::PreflightCheckFailed { module, .. }
            | PluginSystemError::InitializationError { module, .. } => Some(module),
            _ => None,
        }
    }
}
