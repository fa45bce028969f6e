use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use semver::Version;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::ModulePlugin;
use crate::plugin_system::version::{any_includes, parse_version};

/// Link-time registry of module plugins, keyed by controller name
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn ModulePlugin>>,
    api_version: Version,
}

impl PluginRegistry {
    /// Create a registry accepting plugins compatible with `api_version`
    pub fn new(api_version: &str) -> Result<Self, PluginSystemError> {
        Ok(Self { plugins: BTreeMap::new(), api_version: parse_version(api_version)? })
    }

    pub fn api_version(&self) -> &Version {
        &self.api_version
    }

    /// Register a plugin under its name
    pub fn register_plugin(&mut self, plugin: Arc<dyn ModulePlugin>) -> Result<(), PluginSystemError> {
        let name = plugin.name().to_string();
        if name.trim().is_empty() {
            return Err(PluginSystemError::RegistrationError {
                controller: name,
                message: "plugin name is empty".to_string(),
            });
        }
        if self.plugins.contains_key(&name) {
            return Err(PluginSystemError::RegistrationError {
                controller: name,
                message: "a plugin is already registered under this name".to_string(),
            });
        }

        let ranges = plugin.compatible_api_versions();
        if !any_includes(&ranges, &self.api_version) {
            let supported = ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
            return Err(PluginSystemError::IncompatibleApi {
                controller: name,
                api_version: self.api_version.to_string(),
                supported: if supported.is_empty() { "nothing".to_string() } else { supported },
            });
        }

        log::debug!("Registered plugin '{}' v{}", name, plugin.version());
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn ModulePlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("api_version", &self.api_version.to_string())
            .field("plugins", &self.names())
            .finish()
    }
}
