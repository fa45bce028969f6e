/// Application name
pub const APP_NAME: &str = "optolab";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core API version plugins are checked against
pub const API_VERSION: &str = "0.1.0";

/// Manifest read when none is given on the command line
pub const DEFAULT_MANIFEST_PATH: &str = "config/appli.toml";

/// Reserved name of the built-in landing module
pub const DEFAULT_MODULE: &str = "default";
