//! Background tasks module
//!
//! Tasks that run alongside a timer in the binary: the event sink and the
//! stdin controls.

pub mod controls;
pub mod event_logger;

// Re-export main functions
pub use controls::control_task;
pub use event_logger::{event_logger_task, OutputMode};
