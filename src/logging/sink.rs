//! The display surface the router renders into.
use super::record::Severity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("render sink is no longer available")]
    Unavailable,
    #[error("render sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One line handed to a sink, already filtered and transformed.
#[derive(Debug, Clone, Copy)]
pub struct RenderLine<'a> {
    /// `None` for announcements that belong to no source.
    pub source: Option<&'a str>,
    /// `None` for announcements.
    pub severity: Option<Severity>,
    pub markup: &'a str,
}

/// A surface accepting "append one record" and "clear all".
///
/// The sink is not owned by anything outside the router, but its backing
/// surface may go away at any time; `is_alive` reports that.
pub trait RenderSink {
    fn is_alive(&self) -> bool {
        true
    }

    /// Appends a line. With `follow` set the view should scroll to it.
    fn append(&mut self, line: &RenderLine<'_>, follow: bool) -> Result<(), SinkError>;

    fn clear(&mut self) -> Result<(), SinkError>;
}

/// A line captured by `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub source: Option<String>,
    pub severity: Option<Severity>,
    pub markup: String,
}

/// An in-memory sink, used headless and in tests.
#[derive(Debug, Clone)]
pub struct MemorySink {
    lines: Vec<CapturedLine>,
    alive: bool,
    clears: usize,
    followed: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            alive: true,
            clears: 0,
            followed: 0,
        }
    }

    pub fn lines(&self) -> &[CapturedLine] {
        &self.lines
    }

    /// The markup of every captured line, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.markup.as_str()).collect()
    }

    /// How many times the sink was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// How many appends asked the view to follow.
    pub fn followed(&self) -> usize {
        self.followed
    }

    /// Simulates the backing surface being torn down.
    pub fn destroy(&mut self) {
        self.alive = false;
    }
}

impl RenderSink for MemorySink {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn append(&mut self, line: &RenderLine<'_>, follow: bool) -> Result<(), SinkError> {
        if !self.alive {
            return Err(SinkError::Unavailable);
        }
        if follow {
            self.followed += 1;
        }
        self.lines.push(CapturedLine {
            source: line.source.map(str::to_string),
            severity: line.severity,
            markup: line.markup.to_string(),
        });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        if !self.alive {
            return Err(SinkError::Unavailable);
        }
        self.clears += 1;
        self.lines.clear();
        Ok(())
    }
}
