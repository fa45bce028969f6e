//! # Optolab Core Event System
//!
//! Events are the only way work crosses from the acquisition thread or the
//! menu buttons into the UI loop. Producers hold an [`EventSender`]; the
//! kernel owns the single [`EventBus`] receiver and feeds every event to the
//! module manager, one at a time, in arrival order.
pub mod bus;
pub mod error;
pub mod types;

pub use bus::{EventBus, EventSender};
pub use error::EventSystemError;
pub use types::{AcquisitionEvent, AppEvent, Generation, StopReason, UserInput};
