//! The built-in landing module shown before the user picks anything.
use crate::context::{ApplicationContext, ControllerContext};
use crate::kernel::constants::{API_VERSION, DEFAULT_MODULE};
use crate::plugin_system::traits::{Controller, ControllerEvent, EventOutcome, ModulePlugin, PluginError};
use crate::plugin_system::version::VersionRange;
use crate::ui_bridge::{ViewSlot, ViewWidget, ViewWidgets, WidgetContent};

#[derive(Debug, Default)]
pub struct DefaultModulePlugin;

impl DefaultModulePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl ModulePlugin for DefaultModulePlugin {
    fn name(&self) -> &str {
        DEFAULT_MODULE
    }

    fn version(&self) -> &str {
        API_VERSION
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        VersionRange::from_constraint(API_VERSION).into_iter().collect()
    }

    fn create_controller(&self, ctx: &mut ControllerContext<'_>) -> Result<Box<dyn Controller>, PluginError> {
        let logo = ctx.manifest.resolved_logo_path().map(|p| p.display().to_string());
        let modules = ctx
            .manifest
            .modules
            .iter()
            .filter(|m| !m.is_default())
            .map(|m| m.name.clone())
            .collect();
        Ok(Box::new(DefaultController {
            title: ctx.manifest.window_title(),
            logo,
            modules,
        }))
    }
}

/// Title, logo and the list of modules to pick from
#[derive(Debug)]
pub struct DefaultController {
    title: String,
    logo: Option<String>,
    modules: Vec<String>,
}

impl Controller for DefaultController {
    fn module_name(&self) -> &str {
        DEFAULT_MODULE
    }

    fn widgets(&self, _app: &ApplicationContext) -> ViewWidgets {
        let logo = match &self.logo {
            Some(path) => ViewWidget::text("Logo", path.clone()),
            None => ViewWidget::empty("Logo"),
        };
        ViewWidgets::new()
            .with(ViewSlot::TopLeft, ViewWidget::text("Welcome", self.title.clone()))
            .with(ViewSlot::TopRight, logo)
            .with(
                ViewSlot::BotLeft,
                ViewWidget::new(
                    "Modules",
                    WidgetContent::Table(self.modules.iter().map(|m| (m.clone(), String::new())).collect()),
                ),
            )
    }

    fn handle_event(
        &mut self,
        _event: ControllerEvent,
        _ctx: &mut ControllerContext<'_>,
    ) -> Result<EventOutcome, PluginError> {
        Ok(EventOutcome::Ignored)
    }

    fn deactivate(&mut self, _ctx: &mut ControllerContext<'_>) -> Result<(), PluginError> {
        Ok(())
    }
}
