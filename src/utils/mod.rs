//! Utility functions module
//!
//! Clock formatting, millisecond duration serialization and signal handling.

pub mod format;
pub mod serde_millis;
pub mod signals;

// Re-export main functions
pub use format::{format_elapsed, format_remaining};
pub use signals::shutdown_signal;
