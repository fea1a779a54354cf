//! This module contains the log routing core.
//!
//! It includes the bounded history, the source registry, the router that
//! filters records into a render sink, a channel front end for producers on
//! other threads and a `tracing` layer feeding it.
pub mod collector;
pub mod format;
pub mod history;
pub mod record;
pub mod registry;
pub mod router;
pub mod service;
pub mod sink;
#[cfg(test)]
pub(crate) mod testing;

pub use collector::RouterLayer;
pub use format::{RecordFormatter, TIMESTAMP_LEN};
pub use history::HistoryBuffer;
pub use record::{LogRecord, Severity};
pub use registry::{SourceEntry, SourceId, SourceRegistry};
pub use router::{DisplayState, EmitOutcome, LogRouter, FALLBACK_TARGET};
pub use service::{RouterCommand, RouterHandle, SourceHandle};
pub use sink::{MemorySink, RenderLine, RenderSink, SinkError};
