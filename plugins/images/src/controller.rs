use std::path::{Path, PathBuf};

use optolab_core::context::{ApplicationContext, ControllerContext};
use optolab_core::plugin_system::traits::{Controller, ControllerEvent, EventOutcome, PluginError};
use optolab_core::ui_bridge::{ViewSlot, ViewWidget, ViewWidgets, WidgetContent};

use crate::decode::{list_images, load_frame};

/// User-input command opening an image file
pub const OPEN_COMMAND: &str = "open";

pub struct ImagesController {
    module: String,
    directory: Option<PathBuf>,
    candidates: Vec<String>,
    opened: Option<PathBuf>,
}

impl ImagesController {
    pub fn new(module: impl Into<String>, directory: Option<PathBuf>) -> Self {
        let candidates = directory.as_deref().map(list_images).unwrap_or_default();
        Self { module: module.into(), directory, candidates, opened: None }
    }

    /// File shown since the last successful `open`
    pub fn opened(&self) -> Option<&Path> {
        self.opened.as_deref()
    }

    fn resolve(&self, value: &str) -> PathBuf {
        let path = Path::new(value.trim());
        match &self.directory {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn open(&mut self, value: &str, app: &mut ApplicationContext) -> Result<EventOutcome, PluginError> {
        let path = self.resolve(value);
        let frame = load_frame(&path).map_err(|e| PluginError::ControllerError(e.to_string()))?;
        log::info!("Opened {} ({}x{}, {} bits)", path.display(), frame.width, frame.height, frame.bits_depth);
        app.set_bits_depth(Some(frame.bits_depth));
        app.set_image(frame);
        self.opened = Some(path);
        if let Some(dir) = &self.directory {
            self.candidates = list_images(dir);
        }
        Ok(EventOutcome::ViewChanged)
    }
}

impl Controller for ImagesController {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn widgets(&self, app: &ApplicationContext) -> ViewWidgets {
        let summary = app.image_summary();

        let display = match &summary {
            Some(summary) => ViewWidget::new(
                "Image",
                WidgetContent::Image { sequence: summary.sequence, width: summary.width, height: summary.height },
            ),
            None => ViewWidget::text("Image", "No image loaded"),
        };

        let mut info = Vec::new();
        if let Some(path) = &self.opened {
            info.push(("File".to_string(), path.display().to_string()));
        }
        if let Some(summary) = &summary {
            info.push(("Size".to_string(), format!("{} x {}", summary.width, summary.height)));
            info.push(("Bits depth".to_string(), summary.bits_depth.to_string()));
        }

        let histogram = match &summary {
            Some(summary) => ViewWidget::histogram("Histogram", summary),
            None => ViewWidget::empty("Histogram"),
        };

        let selected = self
            .opened
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string);
        let opening = ViewWidget::new(
            "Open image",
            WidgetContent::Choices { command: OPEN_COMMAND.to_string(), options: self.candidates.clone(), selected },
        );

        ViewWidgets::new()
            .with(ViewSlot::TopLeft, display)
            .with(ViewSlot::TopRight, ViewWidget::new("Image info", WidgetContent::Table(info)))
            .with(ViewSlot::BotLeft, histogram)
            .with(ViewSlot::BotRight, opening)
    }

    fn handle_event(
        &mut self,
        event: ControllerEvent,
        ctx: &mut ControllerContext<'_>,
    ) -> Result<EventOutcome, PluginError> {
        match event {
            ControllerEvent::UserInput(input) if input.command == OPEN_COMMAND => self.open(&input.value, ctx.app),
            _ => Ok(EventOutcome::Ignored),
        }
    }

    fn deactivate(&mut self, _ctx: &mut ControllerContext<'_>) -> Result<(), PluginError> {
        log::debug!("Deactivating {}", self.module);
        Ok(())
    }
}
