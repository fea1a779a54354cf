//! A bounded, in-memory log router with per-source visibility and severity
//! filtering, plus a terminal viewer built on it.
pub mod app;
pub mod config;
pub mod logging;
pub mod ui;

pub use config::RouterConfig;
pub use logging::{LogRecord, LogRouter, RouterHandle, Severity};
