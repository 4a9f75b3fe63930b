//! DScan Infrastructure Library
//!
//! Shared infrastructure used by the DScan binaries: tracing initialization.

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
