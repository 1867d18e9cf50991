//! Shared logging and tracing helpers for Forge services.

pub mod logging;
pub mod tracing_spans;

pub use logging::{init_logging, LogFormat, LoggingError};
