use crate::acquisition::HardwareError;
use crate::context::{ApplicationContext, ControllerContext};
use crate::event::{AcquisitionEvent, UserInput};
use crate::plugin_system::manifest::ModuleSubManifest;
use crate::plugin_system::version::VersionRange;
use crate::ui_bridge::ViewWidgets;

/// Error type for plugin and controller operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin initialization error: {0}")]
    InitError(String),

    #[error("Plugin pre-flight check error: {0}")]
    PreflightCheckError(String),

    #[error("Controller error: {0}")]
    ControllerError(String),

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// A statically linked module implementation.
///
/// The registry key is [`ModulePlugin::name`]; sub-manifests refer to it
/// through their `controller` field.
pub trait ModulePlugin: Send + Sync {
    /// Registry key, e.g. "CameraLiveController"
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Core API versions this plugin was built against
    fn compatible_api_versions(&self) -> Vec<VersionRange>;

    /// Cheap availability check run before the menu is built.
    ///
    /// Must not open devices or allocate controller resources. A failure
    /// disables the menu entry.
    fn preflight_check(&self, _module: &str, _sub_manifest: &ModuleSubManifest) -> Result<(), PluginError> {
        Ok(())
    }

    /// One-time setup when a module using this plugin is loaded
    fn on_load(&self, _module: &str, _sub_manifest: &ModuleSubManifest) -> Result<(), PluginError> {
        Ok(())
    }

    /// Build a controller for the module described by `ctx`
    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError>;
}

/// Event routed by the manager to the active controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Acquisition(AcquisitionEvent),
    UserInput(UserInput),
}

/// What the controller did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Handled,
    /// Widgets changed and the view slots must be refreshed
    ViewChanged,
    /// Recoverable problem to show as a non-modal warning
    Warning(String),
}

/// The live half of a module: widgets plus any resources it holds.
///
/// Exactly one controller is alive at a time. Before a controller is
/// dropped the manager calls [`Controller::deactivate`], which must release
/// hardware in order (stop the worker before closing the camera).
pub trait Controller: Send {
    fn module_name(&self) -> &str;

    /// Widgets for the four view slots
    fn widgets(&self, app: &ApplicationContext) -> ViewWidgets;

    fn handle_event(
        &mut self,
        event: ControllerEvent,
        ctx: &mut ControllerContext<'_>,
    ) -> Result<EventOutcome, PluginError>;

    /// Release live resources. Called exactly once, before drop.
    fn deactivate(&mut self, ctx: &mut ControllerContext<'_>) -> Result<(), PluginError>;
}
