use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::constants::DEFAULT_MODULE;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{ApplicationManifest, ModuleDescriptor, ModuleSubManifest};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::ModulePlugin;
use crate::plugin_system::version::any_includes;

/// A resolved and loaded module, cached for the process lifetime
pub struct ModuleHandle {
    descriptor: ModuleDescriptor,
    location: PathBuf,
    sub_manifest: ModuleSubManifest,
    plugin: Arc<dyn ModulePlugin>,
}

impl ModuleHandle {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Location resolved against the manifest directory
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn sub_manifest(&self) -> &ModuleSubManifest {
        &self.sub_manifest
    }

    pub fn plugin(&self) -> &Arc<dyn ModulePlugin> {
        &self.plugin
    }

    pub fn controller_key(&self) -> &str {
        &self.sub_manifest.controller
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.sub_manifest.variable(name)
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.descriptor.name)
            .field("location", &self.location)
            .field("controller", &self.sub_manifest.controller)
            .finish()
    }
}

/// Everything needed to build a handle, gathered without side effects
struct Resolved {
    descriptor: ModuleDescriptor,
    location: PathBuf,
    sub_manifest: ModuleSubManifest,
    plugin: Arc<dyn ModulePlugin>,
}

/// Resolves declared modules to registered plugins and caches the result
pub struct ModuleLoader {
    manifest: Arc<ApplicationManifest>,
    registry: Arc<PluginRegistry>,
    cache: HashMap<String, Arc<ModuleHandle>>,
}

impl ModuleLoader {
    pub fn new(manifest: Arc<ApplicationManifest>, registry: Arc<PluginRegistry>) -> Self {
        Self { manifest, registry, cache: HashMap::new() }
    }

    pub fn manifest(&self) -> &Arc<ApplicationManifest> {
        &self.manifest
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Filesystem location of a declared module
    pub fn resolve_location(&self, name: &str) -> Result<PathBuf, PluginSystemError> {
        let descriptor = self
            .manifest
            .module(name)
            .ok_or_else(|| PluginSystemError::UnknownModule(name.to_string()))?;
        Ok(self.manifest.module_location(descriptor))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Load a module, or return the cached handle.
    ///
    /// `on_load` of the module's plugin runs only on the first successful load.
    pub fn load(&mut self, name: &str) -> Result<Arc<ModuleHandle>, PluginSystemError> {
        if let Some(handle) = self.cache.get(name) {
            return Ok(Arc::clone(handle));
        }
        if name == DEFAULT_MODULE {
            return Err(PluginSystemError::load(name, "the built-in module is not loaded from disk"));
        }

        let resolved = self.resolve(name)?;
        resolved
            .plugin
            .on_load(name, &resolved.sub_manifest)
            .map_err(|e| PluginSystemError::ModuleLoadError {
                module: name.to_string(),
                message: "on_load failed".to_string(),
                source: Some(Box::new(e)),
            })?;

        let handle = Arc::new(ModuleHandle {
            descriptor: resolved.descriptor,
            location: resolved.location,
            sub_manifest: resolved.sub_manifest,
            plugin: resolved.plugin,
        });
        log::info!(
            "Loaded module '{}' ({} from {})",
            name,
            handle.controller_key(),
            handle.location().display()
        );
        self.cache.insert(name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Load every declared module that passes the availability check.
    ///
    /// Returns the failures; the other modules stay cached.
    pub fn load_all(&mut self) -> Vec<(String, PluginSystemError)> {
        let mut failures = Vec::new();
        for (name, status) in self.check_report() {
            if name == DEFAULT_MODULE {
                continue;
            }
            let result = status.and_then(|_| self.load(&name).map(|_| ()));
            if let Err(e) = result {
                failures.push((name, e));
            }
        }
        failures
    }

    /// Names of declared modules that cannot be used right now. Loads nothing.
    pub fn check_available(&self) -> BTreeSet<String> {
        self.check_report()
            .into_iter()
            .filter_map(|(name, status)| status.err().map(|_| name))
            .collect()
    }

    /// Availability of every declared module, in declaration order
    pub fn check_report(&self) -> Vec<(String, Result<(), PluginSystemError>)> {
        self.manifest
            .modules
            .iter()
            .map(|m| (m.name.clone(), self.check_module(&m.name)))
            .collect()
    }

    fn check_module(&self, name: &str) -> Result<(), PluginSystemError> {
        if name == DEFAULT_MODULE || self.cache.contains_key(name) {
            return Ok(());
        }
        let resolved = self.resolve(name)?;
        resolved
            .plugin
            .preflight_check(name, &resolved.sub_manifest)
            .map_err(|e| PluginSystemError::PreflightCheckFailed {
                module: name.to_string(),
                message: e.to_string(),
            })
    }

    fn resolve(&self, name: &str) -> Result<Resolved, PluginSystemError> {
        let descriptor = self
            .manifest
            .module(name)
            .cloned()
            .ok_or_else(|| PluginSystemError::UnknownModule(name.to_string()))?;
        let location = self.manifest.module_location(&descriptor);
        let sub_manifest = ModuleSubManifest::load(&location, name)?;

        let api = self.registry.api_version();
        if !sub_manifest.api_versions.is_empty() && !any_includes(&sub_manifest.api_versions, api) {
            return Err(PluginSystemError::load(
                name,
                format!("module requires an API other than {}", api),
            ));
        }

        let plugin = self.registry.get_plugin(&sub_manifest.controller).ok_or_else(|| {
            PluginSystemError::ControllerNotFound {
                module: name.to_string(),
                controller: sub_manifest.controller.clone(),
            }
        })?;

        Ok(Resolved { descriptor, location, sub_manifest, plugin })
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("app", &self.manifest.app_name)
            .field("loaded", &self.cache.keys().collect::<Vec<_>>())
            .finish()
    }
}
