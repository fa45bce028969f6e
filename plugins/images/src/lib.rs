//! Image file module.
//!
//! Opens PNG, TIFF and BMP files through the `image` crate and stores them
//! in the shared image slot, so other modules see the last loaded image.
//! The optional `directory` variable sets where the opening widget looks,
//! relative to the module location.
use optolab_core::context::ControllerContext;
use optolab_core::plugin_system::manifest::ModuleSubManifest;
use optolab_core::plugin_system::traits::{Controller, ModulePlugin, PluginError};
use optolab_core::plugin_system::version::VersionRange;

mod controller;
pub mod decode;

pub use controller::{ImagesController, OPEN_COMMAND};
pub use decode::{list_images, load_frame, ImageLoadError};

/// Sub-manifest variable naming the image directory
pub const DIRECTORY_VARIABLE: &str = "directory";

#[derive(Default)]
pub struct ImagesPlugin;

impl ImagesPlugin {
    pub const CONTROLLER_KEY: &'static str = "ImagesController";
}

impl ModulePlugin for ImagesPlugin {
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

    fn on_load(&self, module: &str, sub_manifest: &ModuleSubManifest) -> Result<(), PluginError> {
        if let Some(dir) = sub_manifest.variable(DIRECTORY_VARIABLE) {
            log::info!("Module {} opens images from '{}'", module, dir);
        }
        Ok(())
    }

    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError> {
        let module = ctx.module_name().unwrap_or("images").to_string();
        let directory = match (ctx.module, ctx.variable(DIRECTORY_VARIABLE)) {
            (Some(handle), Some(dir)) => Some(handle.location().join(dir)),
            (Some(handle), None) => Some(handle.location().to_path_buf()),
            (None, _) => None,
        };
        Ok(Box::new(ImagesController::new(module, directory)))
    }
}

#[cfg(test)]
mod tests;
