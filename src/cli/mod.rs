//! CLI-specific utilities for border-stitch
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod logging;
pub mod progress;

pub use logging::init_logging;
pub use progress::ProgressManager;
