//! This module provides a `tracing` layer that routes events into a
//! `LogRouter`.
//!
//! Each event target is a source. Events on the fallback target are skipped
//! so the router's own diagnostics never loop back into it.
use super::format::Location;
use super::record::Severity;
use super::router::FALLBACK_TARGET;
use super::service::RouterHandle;
use tracing::{Event, Subscriber};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

/// A `tracing` layer that forwards events through a `RouterHandle`.
pub struct RouterLayer {
    router: RouterHandle,
}

impl RouterLayer {
    /// Creates a new `RouterLayer`.
    ///
    /// # Arguments
    ///
    /// * `router` - The handle events are sent through.
    pub fn new(router: RouterHandle) -> Self {
        Self { router }
    }
}

impl<S> Layer<S> for RouterLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    /// Handles a `tracing` event.
    ///
    /// Extracts the message and fields, maps the level to a `Severity`
    /// (a `critical = true` field raises it to `Critical`) and emits the
    /// record under the event's target.
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target == FALLBACK_TARGET {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let severity = if visitor.critical {
            Severity::Critical
        } else {
            Severity::from_level(metadata.level())
        };
        let message = visitor.into_text();

        // Last path component keeps the location short.
        let module = metadata
            .module_path()
            .map(|path| path.rsplit("::").next().unwrap_or(path))
            .unwrap_or(target);

        self.router.emit(
            target,
            severity,
            &message,
            Some(Location {
                module,
                line: metadata.line(),
            }),
        );
    }
}

/// A `tracing::field::Visit` implementation collecting the message and any
/// extra fields as `name=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
    critical: bool,
}

impl MessageVisitor {
    /// The message followed by the extra fields.
    fn into_text(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: impl std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        self.fields.push_str(&format!("{}={}", name, value));
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), value);
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        if field.name() == "critical" {
            self.critical = value;
        } else {
            self.push_field(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.push_field(field.name(), value);
    }
}
