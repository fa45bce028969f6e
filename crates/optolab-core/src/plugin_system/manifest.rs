use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::kernel::constants::DEFAULT_MODULE;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::VersionRange;
use crate::storage::{find_config_file, read_config, ConfigFormat, StorageSystemError};

/// When declared modules are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Load every available module at startup
    Eager,
    /// Load a module the first time it is selected
    #[default]
    Lazy,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(LoadPolicy::Eager),
            "lazy" => Ok(LoadPolicy::Lazy),
            other => Err(format!("unknown load policy '{}' (expected eager or lazy)", other)),
        }
    }
}

impl fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPolicy::Eager => f.write_str("eager"),
            LoadPolicy::Lazy => f.write_str("lazy"),
        }
    }
}

/// A module entry of the application manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: String,
    /// As written in the manifest; see [`ApplicationManifest::module_location`]
    pub location: PathBuf,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), location: location.into() }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_MODULE
    }
}

/// Application manifest, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationManifest {
    pub app_name: String,
    pub organization: String,
    pub year: String,
    pub logo_path: Option<PathBuf>,
    /// Declaration order is menu order
    pub modules: Vec<ModuleDescriptor>,
    pub load_policy: Option<LoadPolicy>,
    /// Directory relative locations are resolved against
    pub base_dir: PathBuf,
}

// Years and variable values are often written unquoted
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            RawScalar::Text(s) => s,
            RawScalar::Int(i) => i.to_string(),
            RawScalar::Float(f) => f.to_string(),
            RawScalar::Bool(b) => b.to_string(),
        }
    }
}

// A tag based document cannot tell a one-entry list from a single value
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[derive(Deserialize)]
struct RawModule {
    name: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize)]
struct RawApplicationManifest {
    name: Option<String>,
    #[serde(default)]
    organization: Option<RawScalar>,
    #[serde(default)]
    year: Option<RawScalar>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    load_policy: Option<LoadPolicy>,
    #[serde(default, rename = "module", deserialize_with = "one_or_many")]
    modules: Vec<RawModule>,
}

impl ApplicationManifest {
    /// Read and validate a manifest file. The format follows the extension.
    pub fn load(path: &Path) -> Result<Self, PluginSystemError> {
        log::info!("Loading application manifest from {}", path.display());
        let raw: RawApplicationManifest = read_config(path).map_err(|e| manifest_error(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = Self::from_raw(raw, base_dir).map_err(|msg| PluginSystemError::manifest(path, msg))?;
        log::debug!(
            "Manifest '{}' declares {} module(s)",
            manifest.app_name,
            manifest.modules.len()
        );
        Ok(manifest)
    }

    /// Parse a manifest held in memory, resolving locations against `base_dir`
    pub fn parse(content: &str, format: ConfigFormat, base_dir: &Path) -> Result<Self, PluginSystemError> {
        let origin = base_dir.join(format!("<memory>.{}", format.extension()));
        let raw: RawApplicationManifest = format.deserialize(content).map_err(|e| manifest_error(&origin, e))?;
        Self::from_raw(raw, base_dir.to_path_buf()).map_err(|msg| PluginSystemError::manifest(origin, msg))
    }

    fn from_raw(raw: RawApplicationManifest, base_dir: PathBuf) -> Result<Self, String> {
        let app_name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or("missing required node 'name'")?;

        let mut seen = HashSet::new();
        let mut modules = Vec::with_capacity(raw.modules.len());
        for (index, module) in raw.modules.into_iter().enumerate() {
            let name = module
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| format!("module #{} is missing required node 'name'", index + 1))?;
            let location = match module.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) {
                Some(location) => PathBuf::from(location),
                // The built-in module never reads from disk
                None if name == DEFAULT_MODULE => PathBuf::new(),
                None => return Err(format!("module '{}' is missing required node 'location'", name)),
            };
            if !seen.insert(name.clone()) {
                return Err(format!("module '{}' is declared more than once", name));
            }
            modules.push(ModuleDescriptor { name, location });
        }

        Ok(Self {
            app_name,
            organization: raw.organization.map(RawScalar::into_string).unwrap_or_default(),
            year: raw.year.map(RawScalar::into_string).unwrap_or_default(),
            logo_path: raw.logo.filter(|l| !l.trim().is_empty()).map(PathBuf::from),
            modules,
            load_policy: raw.load_policy,
            base_dir,
        })
    }

    /// "name / organization - year", leaving out whatever is empty
    pub fn window_title(&self) -> String {
        let mut title = self.app_name.clone();
        if !self.organization.is_empty() {
            title.push_str(" / ");
            title.push_str(&self.organization);
        }
        if !self.year.is_empty() {
            title.push_str(" - ");
            title.push_str(&self.year);
        }
        title
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name.clone()).collect()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Location of a module as an absolute-or-base-relative path
    pub fn module_location(&self, descriptor: &ModuleDescriptor) -> PathBuf {
        if descriptor.location.is_absolute() {
            descriptor.location.clone()
        } else {
            self.base_dir.join(&descriptor.location)
        }
    }

    /// Logo path resolved against the manifest directory
    pub fn resolved_logo_path(&self) -> Option<PathBuf> {
        self.logo_path.as_ref().map(|logo| {
            if logo.is_absolute() { logo.clone() } else { self.base_dir.join(logo) }
        })
    }
}

fn manifest_error(path: &Path, error: StorageSystemError) -> PluginSystemError {
    let message = match &error {
        StorageSystemError::FileNotFound(_) => "file not found".to_string(),
        StorageSystemError::UnsupportedConfigFormat(ext) => format!("unsupported format '{}'", ext),
        other => other.to_string(),
    };
    PluginSystemError::ManifestError {
        path: path.to_path_buf(),
        message,
        source: Some(Box::new(error)),
    }
}

/// Builder for manifests assembled in code
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    manifest: ApplicationManifest,
}

impl ManifestBuilder {
    pub fn new(app_name: &str) -> Self {
        Self {
            manifest: ApplicationManifest {
                app_name: app_name.to_string(),
                organization: String::new(),
                year: String::new(),
                logo_path: None,
                modules: Vec::new(),
                load_policy: None,
                base_dir: PathBuf::new(),
            },
        }
    }

    pub fn organization(mut self, organization: &str) -> Self {
        self.manifest.organization = organization.to_string();
        self
    }

    pub fn year(mut self, year: &str) -> Self {
        self.manifest.year = year.to_string();
        self
    }

    pub fn logo(mut self, logo: impl Into<PathBuf>) -> Self {
        self.manifest.logo_path = Some(logo.into());
        self
    }

    pub fn module(mut self, name: &str, location: impl Into<PathBuf>) -> Self {
        self.manifest.modules.push(ModuleDescriptor::new(name, location));
        self
    }

    pub fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.manifest.load_policy = Some(policy);
        self
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.manifest.base_dir = base_dir.into();
        self
    }

    pub fn build(self) -> ApplicationManifest {
        self.manifest
    }
}

/// Module-local manifest found at `{location}/{name}.{ext}`
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSubManifest {
    /// Registry key of the controller plugin
    pub controller: String,
    pub version: Option<String>,
    pub api_versions: Vec<VersionRange>,
    pub variables: BTreeMap<String, String>,
    /// File the sub-manifest was read from
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct RawModuleSubManifest {
    controller: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    api_versions: Vec<String>,
    #[serde(default)]
    variables: BTreeMap<String, RawScalar>,
}

impl ModuleSubManifest {
    /// Find and parse the sub-manifest of module `name` in `location`
    pub fn load(location: &Path, name: &str) -> Result<Self, PluginSystemError> {
        if !location.is_dir() {
            return Err(PluginSystemError::load(
                name,
                format!("location '{}' is not a directory", location.display()),
            ));
        }
        let path = find_config_file(location, name).ok_or_else(|| {
            PluginSystemError::load(
                name,
                format!("no sub-manifest '{}.*' in '{}'", name, location.display()),
            )
        })?;

        let raw: RawModuleSubManifest = read_config(&path).map_err(|e| PluginSystemError::ModuleLoadError {
            module: name.to_string(),
            message: format!("malformed sub-manifest '{}'", path.display()),
            source: Some(Box::new(e)),
        })?;

        let controller = raw
            .controller
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PluginSystemError::load(name, "sub-manifest is missing required node 'controller'"))?;

        let api_versions = raw
            .api_versions
            .iter()
            .map(|c| VersionRange::from_constraint(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            controller,
            version: raw.version,
            api_versions,
            variables: raw.variables.into_iter().map(|(k, v)| (k, v.into_string())).collect(),
            path,
        })
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}
