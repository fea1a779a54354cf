//! Marshals calls from any thread onto the task that owns the router.
//!
//! Producers hold a [`RouterHandle`] or per-source [`SourceHandle`]s and
//! send [`RouterCommand`]s over an unbounded channel; the owner applies them
//! in arrival order.
use super::format::{Location, RecordFormatter};
use super::record::{LogRecord, Severity};
use super::router::{LogRouter, FALLBACK_TARGET};
use super::sink::RenderSink;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A call into the router.
#[derive(Debug)]
pub enum RouterCommand {
    Register { name: String, severity: Severity },
    Emit(LogRecord),
    SetThreshold(Severity),
    ToggleSource { name: String, visible: bool },
    Rerender,
    ToggleTimestamps(bool),
    ToggleAutoscroll(bool),
    ClearView,
    PrintTips,
    Detach(String),
    Export(PathBuf),
}

/// The clonable, thread-safe front of a router.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::UnboundedSender<RouterCommand>,
    formatter: Arc<RecordFormatter>,
}

impl RouterHandle {
    /// Creates a handle and the receiver the owning task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RouterCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                formatter: Arc::new(RecordFormatter::new()),
            },
            rx,
        )
    }

    /// Registers a source and returns its emission handle. Registering an
    /// existing name is harmless.
    pub fn register_source(&self, name: &str, initial_severity: Severity) -> SourceHandle {
        self.send(RouterCommand::Register {
            name: name.to_string(),
            severity: initial_severity,
        });
        SourceHandle {
            name: Arc::from(name),
            router: self.clone(),
        }
    }

    /// Formats and sends a record on behalf of `source_name`.
    pub fn emit(
        &self,
        source_name: &str,
        severity: Severity,
        message: &str,
        location: Option<Location<'_>>,
    ) -> bool {
        let mut record = LogRecord::new(source_name, severity, String::new());
        record.rendered_text =
            self.formatter
                .format(&record.timestamp, source_name, severity, message, location);
        self.send(RouterCommand::Emit(record))
    }

    pub fn set_severity_threshold(&self, level: Severity) -> bool {
        self.send(RouterCommand::SetThreshold(level))
    }

    pub fn toggle_source_visibility(&self, name: &str, visible: bool) -> bool {
        self.send(RouterCommand::ToggleSource {
            name: name.to_string(),
            visible,
        })
    }

    pub fn rerender(&self) -> bool {
        self.send(RouterCommand::Rerender)
    }

    pub fn toggle_timestamps(&self, show: bool) -> bool {
        self.send(RouterCommand::ToggleTimestamps(show))
    }

    pub fn toggle_autoscroll(&self, enabled: bool) -> bool {
        self.send(RouterCommand::ToggleAutoscroll(enabled))
    }

    /// Sends a raw command. Returns `false` once the router is gone.
    pub fn send(&self, command: RouterCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Emission handle for one named source.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    name: Arc<str>,
    router: RouterHandle,
}

impl SourceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, severity: Severity, message: &str) -> bool {
        self.router.emit(&self.name, severity, message, None)
    }

    pub fn debug(&self, message: &str) -> bool {
        self.log(Severity::Debug, message)
    }

    pub fn info(&self, message: &str) -> bool {
        self.log(Severity::Info, message)
    }

    pub fn warning(&self, message: &str) -> bool {
        self.log(Severity::Warning, message)
    }

    pub fn error(&self, message: &str) -> bool {
        self.log(Severity::Error, message)
    }

    pub fn critical(&self, message: &str) -> bool {
        self.log(Severity::Critical, message)
    }

    /// Asks the router to stop forwarding this source.
    pub fn detach(&self) -> bool {
        self.router
            .send(RouterCommand::Detach(self.name.to_string()))
    }
}

impl<S: RenderSink> LogRouter<S> {
    /// Applies one command from a handle.
    pub fn apply(&mut self, command: RouterCommand) {
        match command {
            RouterCommand::Register { name, severity } => {
                self.register_source(&name, severity);
            }
            RouterCommand::Emit(record) => {
                self.emit(record);
            }
            RouterCommand::SetThreshold(level) => {
                self.set_severity_threshold(level);
            }
            RouterCommand::ToggleSource { name, visible } => {
                self.toggle_source_visibility(&name, visible);
            }
            RouterCommand::Rerender => {
                self.rerender();
            }
            RouterCommand::ToggleTimestamps(show) => {
                self.toggle_timestamps(show);
            }
            RouterCommand::ToggleAutoscroll(enabled) => {
                self.toggle_autoscroll(enabled);
            }
            RouterCommand::ClearView => self.clear_view(),
            RouterCommand::PrintTips => self.print_tips(),
            RouterCommand::Detach(name) => {
                self.detach_source(&name);
            }
            RouterCommand::Export(path) => match self.export(&path) {
                Ok(count) => debug!("Exported {} records to {}", count, path.display()),
                Err(e) => warn!(
                    target: FALLBACK_TARGET,
                    "Failed to export log to {}: {}",
                    path.display(),
                    e
                ),
            },
        }
    }

    /// Applies every command already queued without waiting. Returns how
    /// many were applied.
    pub fn drain(&mut self, rx: &mut mpsc::UnboundedReceiver<RouterCommand>) -> usize {
        let mut applied = 0;
        while let Ok(command) = rx.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }
}

/// Applies commands until every handle has been dropped.
pub async fn drive<S: RenderSink>(
    router: &mut LogRouter<S>,
    mut rx: mpsc::UnboundedReceiver<RouterCommand>,
) {
    while let Some(command) = rx.recv().await {
        router.apply(command);
    }
}
