//! Live acquisition module.
//!
//! Opens the first camera the driver finds, runs a [`LiveWorker`] into the
//! shared image slot and lets the user switch pixel format through the
//! `color_mode` command. Color modes come from the module's `colormode`
//! variable, e.g. `colormode = "Mono8:8,Mono12:12"`.
//!
//! [`LiveWorker`]: optolab_core::acquisition::LiveWorker
use optolab_core::context::ControllerContext;
use optolab_core::plugin_system::manifest::ModuleSubManifest;
use optolab_core::plugin_system::traits::{Controller, ModulePlugin, PluginError};
use optolab_core::plugin_system::version::VersionRange;

pub mod color_mode;
mod controller;

pub use color_mode::{ColorMode, default_color_modes, parse_color_modes, select_color_mode};
pub use controller::{CameraLiveController, COLOR_MODE_COMMAND};

/// Sub-manifest variable listing the selectable color modes
pub const COLOR_MODE_VARIABLE: &str = "colormode";

#[derive(Default)]
pub struct CameraLivePlugin;

impl CameraLivePlugin {
    pub const CONTROLLER_KEY: &'static str = "CameraLiveController";
}

impl ModulePlugin for CameraLivePlugin {
    fn name(&self) -> &str {
        Self::CONTROLLER_KEY
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        const COMPATIBLE_API_REQ: &str = "^0.1";
        match VersionRange::from_constraint(COMPATIBLE_API_REQ) {
            Ok(vr) => vec![vr],
            Err(e) => {
                log::error!(
                    "Failed to parse API version requirement ('{}') for {}: {}",
                    COMPATIBLE_API_REQ,
                    self.name(),
                    e
                );
                vec![]
            }
        }
    }

    fn preflight_check(&self, module: &str, sub_manifest: &ModuleSubManifest) -> Result<(), PluginError> {
        if let Some(modes) = sub_manifest.variable(COLOR_MODE_VARIABLE) {
            parse_color_modes(modes)
                .map_err(|e| PluginError::PreflightCheckError(format!("{}: {}", module, e)))?;
        }
        Ok(())
    }

    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError> {
        let color_modes = match ctx.variable(COLOR_MODE_VARIABLE) {
            Some(modes) => parse_color_modes(modes).map_err(PluginError::InitError)?,
            None => default_color_modes(),
        };
        let controller = CameraLiveController::connect(ctx, color_modes)?;
        Ok(Box::new(controller))
    }
}

#[cfg(test)]
mod tests;
