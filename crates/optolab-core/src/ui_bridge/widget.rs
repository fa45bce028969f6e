use std::fmt;

use crate::acquisition::FrameSummary;

/// The four quadrants of the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewSlot {
    TopLeft,
    TopRight,
    BotLeft,
    BotRight,
}

impl ViewSlot {
    pub const ALL: [ViewSlot; 4] =
        [ViewSlot::TopLeft, ViewSlot::TopRight, ViewSlot::BotLeft, ViewSlot::BotRight];

    pub fn index(self) -> usize {
        match self {
            ViewSlot::TopLeft => 0,
            ViewSlot::TopRight => 1,
            ViewSlot::BotLeft => 2,
            ViewSlot::BotRight => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewSlot::TopLeft => "top_left",
            ViewSlot::TopRight => "top_right",
            ViewSlot::BotLeft => "bot_left",
            ViewSlot::BotRight => "bot_right",
        }
    }
}

impl fmt::Display for ViewSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a widget displays, independent of any toolkit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetContent {
    Empty,
    Text(String),
    /// Latest image of the context, identified by its slot sequence
    Image { sequence: u64, width: u32, height: u32 },
    /// A selector bound to a user-input command
    Choices { command: String, options: Vec<String>, selected: Option<String> },
    /// Key/value table, such as camera parameters
    Table(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewWidget {
    pub title: String,
    pub content: WidgetContent,
}

impl ViewWidget {
    pub fn new(title: impl Into<String>, content: WidgetContent) -> Self {
        Self { title: title.into(), content }
    }

    pub fn text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, WidgetContent::Text(text.into()))
    }

    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, WidgetContent::Empty)
    }

    /// Table of the precomputed histogram, one `lower bound..` row per bin
    pub fn histogram(title: impl Into<String>, summary: &FrameSummary) -> Self {
        let rows = summary
            .bin_starts()
            .into_iter()
            .zip(&summary.histogram)
            .map(|(start, count)| (format!("{}..", start), count.to_string()))
            .collect();
        Self::new(title, WidgetContent::Table(rows))
    }
}

/// The widgets a controller exposes, one per slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewWidgets {
    slots: [Option<ViewWidget>; 4],
}

impl ViewWidgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, slot: ViewSlot, widget: ViewWidget) -> Self {
        self.set(slot, Some(widget));
        self
    }

    pub fn set(&mut self, slot: ViewSlot, widget: Option<ViewWidget>) {
        self.slots[slot.index()] = widget;
    }

    pub fn get(&self, slot: ViewSlot) -> Option<&ViewWidget> {
        self.slots[slot.index()].as_ref()
    }

    pub fn top_left(&self) -> Option<&ViewWidget> {
        self.get(ViewSlot::TopLeft)
    }

    pub fn top_right(&self) -> Option<&ViewWidget> {
        self.get(ViewSlot::TopRight)
    }

    pub fn bot_left(&self) -> Option<&ViewWidget> {
        self.get(ViewSlot::BotLeft)
    }

    pub fn bot_right(&self) -> Option<&ViewWidget> {
        self.get(ViewSlot::BotRight)
    }

    /// Slot/widget pairs in slot order, empty slots included
    pub fn into_slots(self) -> impl Iterator<Item = (ViewSlot, Option<ViewWidget>)> {
        ViewSlot::ALL.into_iter().zip(self.slots)
    }
}
