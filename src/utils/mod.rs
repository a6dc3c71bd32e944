//! Utility helpers.

pub mod logging;

pub use logging::StepTimer;
