use std::fmt;

/// Activation counter stamped on worker events.
///
/// Every controller construction gets a fresh generation; events carrying an
/// older one belong to a controller that no longer exists.
pub type Generation = u64;

/// Why a live acquisition worker left its loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Cancellation was requested by the owning controller
    ByUser,
    /// The grab loop hit a hardware error
    Error(String),
}

impl StopReason {
    pub fn is_error(&self) -> bool {
        matches!(self, StopReason::Error(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::ByUser => write!(f, "stopped by user"),
            StopReason::Error(msg) => write!(f, "stopped by error: {}", msg),
        }
    }
}

/// Notifications emitted by the acquisition worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionEvent {
    /// A new frame was stored in the context image slot
    FrameReady { sequence: u64 },
    /// The worker loop has ended
    Stopped { reason: StopReason },
}

/// A command issued from a controller's widgets (e.g. a colour mode combo box)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub command: String,
    pub value: String,
}

impl UserInput {
    pub fn new(command: impl Into<String>, value: impl Into<String>) -> Self {
        Self { command: command.into(), value: value.into() }
    }
}

/// Events consumed by the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A menu button was clicked
    MenuChanged(String),
    /// Worker notification, tagged with the activation it belongs to
    Acquisition { generation: Generation, event: AcquisitionEvent },
    /// Input aimed at the active controller
    UserInput(UserInput),
    /// Leave the UI loop
    Shutdown,
}

impl AppEvent {
    /// Get the name of this event
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::MenuChanged(_) => "menu.changed",
            AppEvent::Acquisition { event: AcquisitionEvent::FrameReady { .. }, .. } => "acquisition.frame_ready",
            AppEvent::Acquisition { event: AcquisitionEvent::Stopped { .. }, .. } => "acquisition.stopped",
            AppEvent::UserInput(_) => "user.input",
            AppEvent::Shutdown => "application.shutdown",
        }
    }
}
