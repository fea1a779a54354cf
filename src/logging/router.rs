//! The log router: bounded history, source registry and filtered rendering.
//!
//! The router is owned by a single task. Records and control calls from
//! other threads reach it through [`super::service::RouterHandle`].
use super::format::{strip_timestamp, to_plain, TIMESTAMP_LEN};
use super::history::HistoryBuffer;
use super::record::{LogRecord, Severity};
use super::registry::{SourceEntry, SourceId, SourceRegistry};
use super::sink::{RenderLine, RenderSink, SinkError};
use crate::config::RouterConfig;
use rand::seq::SliceRandom;
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Target for the router's own diagnostics. Events on this target go to
/// stderr and are never routed back into a router.
pub const FALLBACK_TARGET: &str = "log_router::fallback";

/// What happened to an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Stored and forwarded to the sink.
    Rendered,
    /// Stored but filtered out of the view.
    Hidden,
    /// Dropped because the source's handler was detached.
    Detached,
    /// Stored, but the sink was gone; the source has been detached.
    SinkUnavailable,
}

/// Rendering options. Never affects what is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub threshold: Severity,
    pub show_timestamps: bool,
    pub autoscroll: bool,
}

pub struct LogRouter<S: RenderSink> {
    history: HistoryBuffer,
    registry: SourceRegistry,
    display: DisplayState,
    sink: S,
    config: RouterConfig,
}

impl<S: RenderSink> LogRouter<S> {
    pub fn new(config: RouterConfig, sink: S) -> Self {
        Self {
            history: HistoryBuffer::new(config.capacity),
            registry: SourceRegistry::new(),
            display: DisplayState {
                threshold: config.default_severity,
                show_timestamps: config.show_timestamps,
                autoscroll: config.autoscroll,
            },
            sink,
            config,
        }
    }

    /// Registers a source, visible and attached. Registering a known name
    /// returns its existing id and changes nothing. The first source to
    /// register sets the severity threshold.
    pub fn register_source(&mut self, name: &str, initial_severity: Severity) -> SourceId {
        let (id, added) = self.registry.register(name, initial_severity);
        if added && self.registry.len() == 1 {
            self.display.threshold = initial_severity;
        }
        id
    }

    /// Stores a record and renders it if its source is visible and it
    /// meets the threshold. Unknown sources are registered on the fly.
    pub fn emit(&mut self, record: LogRecord) -> EmitOutcome {
        let attached = match self.registry.get(&record.source_name) {
            Some(entry) => entry.attached,
            None => {
                self.register_source(&record.source_name, self.config.default_severity);
                true
            }
        };
        if !attached {
            return EmitOutcome::Detached;
        }

        let outcome = if is_shown(&self.registry, &self.display, &record) {
            match forward(&mut self.sink, &self.display, &record) {
                Ok(()) => EmitOutcome::Rendered,
                Err(err) => {
                    warn!(
                        target: FALLBACK_TARGET,
                        source = %record.source_name,
                        "Logger issue: {}; detaching source",
                        err
                    );
                    self.registry.detach(&record.source_name);
                    EmitOutcome::SinkUnavailable
                }
            }
        } else {
            EmitOutcome::Hidden
        };

        self.history.push(record);
        outcome
    }

    pub fn set_severity_threshold(&mut self, level: Severity) -> usize {
        self.display.threshold = level;
        self.rerender()
    }

    /// Changes whether a source is shown. The view is refreshed only by a
    /// later `rerender`. Returns `false` for an unknown source.
    pub fn toggle_source_visibility(&mut self, name: &str, visible: bool) -> bool {
        self.registry.set_visible(name, visible)
    }

    /// Clears the sink and replays the history through the current
    /// filters. Returns the number of records rendered.
    pub fn rerender(&mut self) -> usize {
        if !self.sink.is_alive() {
            warn!(target: FALLBACK_TARGET, "Logger issue: render sink gone, skipping rerender");
            return 0;
        }
        if let Err(err) = self.sink.clear() {
            warn!(target: FALLBACK_TARGET, "Logger issue: {}", err);
            return 0;
        }

        let mut rendered = 0;
        for record in self.history.iter() {
            if !is_shown(&self.registry, &self.display, record) {
                continue;
            }
            if let Err(err) = forward(&mut self.sink, &self.display, record) {
                warn!(target: FALLBACK_TARGET, "Logger issue: {}", err);
                break;
            }
            rendered += 1;
        }
        rendered
    }

    pub fn toggle_timestamps(&mut self, show: bool) -> usize {
        self.display.show_timestamps = show;
        self.rerender()
    }

    pub fn toggle_autoscroll(&mut self, enabled: bool) {
        self.display.autoscroll = enabled;
    }

    /// Names of the visible sources, in registration order.
    pub fn checked_sources(&self) -> Vec<&str> {
        self.registry.checked()
    }

    /// Title describing the active filter, e.g. `Log  (filter >= info)`.
    pub fn title(&self) -> String {
        format!(
            "Log  (filter >= {})",
            self.display.threshold.as_str().to_lowercase()
        )
    }

    /// Clears the view only; the history is kept and comes back on the
    /// next rerender.
    pub fn clear_view(&mut self) {
        if let Err(err) = self.sink.clear() {
            warn!(target: FALLBACK_TARGET, "Logger issue: {}", err);
        }
    }

    /// Stops forwarding for a source. Its later records are dropped.
    pub fn detach_source(&mut self, name: &str) -> bool {
        self.registry.detach(name)
    }

    /// Detaches every source, as on shutdown.
    pub fn detach_all(&mut self) -> usize {
        let names: Vec<String> = self.registry.names().map(str::to_string).collect();
        names
            .iter()
            .filter(|name| self.registry.detach(name))
            .count()
    }

    /// Renders every configured tip. Tips are not stored in the history.
    pub fn print_tips(&mut self) {
        let pad = " ".repeat(TIMESTAMP_LEN);
        let lines: Vec<String> = self
            .config
            .tips
            .iter()
            .map(|tip| {
                format!(
                    "<span class=\"INFO\">{} \u{2022} {} </span>",
                    pad,
                    html_escape::encode_text(tip)
                )
            })
            .collect();

        for line in lines {
            self.announce(&line);
        }
    }

    /// Renders the welcome banner with one random tip.
    pub fn welcome_message(&mut self) {
        let tip = self
            .config
            .tips
            .choose(&mut rand::thread_rng())
            .map(|tip| {
                format!(
                    "<br><b>Tip: </b> {}",
                    html_escape::encode_text(tip)
                )
            })
            .unwrap_or_default();

        let text = format!(
            "<span class=\"INFO\"><h3>{}</h3> v{}</span>{}",
            html_escape::encode_text(&self.config.welcome_title),
            env!("CARGO_PKG_VERSION"),
            tip
        );
        self.announce(&text);
    }

    /// Records currently passing both filters, oldest first.
    pub fn visible_records(&self) -> impl Iterator<Item = &LogRecord> + '_ {
        self.history
            .iter()
            .filter(move |record| is_shown(&self.registry, &self.display, record))
    }

    /// Writes the visible records as plain text, one per line, timestamps
    /// included. Multi-line messages are joined onto their record's line.
    /// Returns the number of records written.
    pub fn export(&self, path: impl AsRef<Path>) -> std::io::Result<usize> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        let mut written = 0;
        for record in self.visible_records() {
            let text = to_plain(&record.rendered_text);
            let rows: Vec<&str> = text
                .lines()
                .map(str::trim_end)
                .filter(|row| !row.is_empty())
                .collect();
            writeln!(file, "{}", rows.join(" "))?;
            written += 1;
        }
        file.flush()?;
        Ok(written)
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &SourceEntry)> + '_ {
        self.registry.iter()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Renders a line that belongs to no source and is not stored.
    fn announce(&mut self, markup: &str) {
        if !self.sink.is_alive() {
            return;
        }
        let line = RenderLine {
            source: None,
            severity: None,
            markup,
        };
        if let Err(err) = self.sink.append(&line, self.display.autoscroll) {
            warn!(target: FALLBACK_TARGET, "Logger issue: {}", err);
        }
    }
}

fn is_shown(registry: &SourceRegistry, display: &DisplayState, record: &LogRecord) -> bool {
    registry.is_visible(&record.source_name) && record.severity >= display.threshold
}

fn forward<S: RenderSink>(
    sink: &mut S,
    display: &DisplayState,
    record: &LogRecord,
) -> Result<(), SinkError> {
    if !sink.is_alive() {
        return Err(SinkError::Unavailable);
    }

    let markup = if display.show_timestamps {
        Cow::Borrowed(record.rendered_text.as_str())
    } else {
        strip_timestamp(&record.rendered_text)
    };

    let line = RenderLine {
        source: Some(&record.source_name),
        severity: Some(record.severity),
        markup: &markup,
    };
    sink.append(&line, display.autoscroll)
}
