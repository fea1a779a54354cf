use log_router::logging::{EmitOutcome, MemorySink, RecordFormatter};
use log_router::{LogRecord, LogRouter, RouterConfig, Severity};
use pretty_assertions::assert_eq;

fn router_with_capacity(capacity: usize) -> LogRouter<MemorySink> {
    let config = RouterConfig {
        capacity,
        ..RouterConfig::default()
    };
    LogRouter::new(config, MemorySink::new())
}

fn record(source: &str, severity: Severity, message: &str) -> LogRecord {
    let mut record = LogRecord::new(source, severity, String::new());
    record.rendered_text =
        RecordFormatter::new().format(&record.timestamp, source, severity, message, None);
    record
}

fn rendered_sources(router: &LogRouter<MemorySink>) -> Vec<String> {
    router
        .sink()
        .lines()
        .iter()
        .filter_map(|line| line.source.clone())
        .collect()
}

#[test]
fn history_keeps_the_most_recent_records() {
    let mut router = router_with_capacity(2);
    for message in ["R1", "R2", "R3"] {
        router.emit(record("a", Severity::Info, message));
    }

    let kept: Vec<&str> = router
        .history()
        .iter()
        .map(|r| r.rendered_text.as_str())
        .collect();
    assert_eq!(kept.len(), 2);
    assert!(kept[0].contains("a: R2"));
    assert!(kept[1].contains("a: R3"));
}

#[test]
fn overflow_keeps_exactly_capacity_in_order() {
    let mut router = router_with_capacity(7);
    for i in 0..40 {
        router.emit(record("a", Severity::Info, &format!("n{}", i)));
    }

    let kept: Vec<String> = router
        .history()
        .iter()
        .map(|r| r.rendered_text.clone())
        .collect();
    assert_eq!(kept.len(), 7);
    for (offset, text) in kept.iter().enumerate() {
        assert!(text.contains(&format!("a: n{}<", 33 + offset)));
    }
}

#[test]
fn two_sources_then_hide_one() {
    let mut router = router_with_capacity(100);
    router.register_source("A", Severity::Info);
    router.register_source("B", Severity::Error);

    for i in 0..3 {
        router.emit(record("A", Severity::Info, &format!("info {}", i)));
    }
    router.emit(record("B", Severity::Error, "failure"));

    assert_eq!(router.rerender(), 4);
    assert_eq!(rendered_sources(&router), vec!["A", "A", "A", "B"]);

    assert!(router.toggle_source_visibility("A", false));
    assert_eq!(router.rerender(), 1);
    assert_eq!(rendered_sources(&router), vec!["B"]);
    assert!(router.sink().texts()[0].contains("B: failure"));
}

#[test]
fn hidden_source_stays_hidden_at_every_severity() {
    let mut router = router_with_capacity(100);
    router.register_source("s", Severity::Debug);
    router.register_source("t", Severity::Debug);
    for severity in Severity::ALL {
        router.emit(record("s", severity, "x"));
        router.emit(record("t", severity, "y"));
    }

    router.toggle_source_visibility("s", false);
    router.rerender();

    assert!(rendered_sources(&router).iter().all(|name| name == "t"));
    assert_eq!(router.sink().lines().len(), 5);
}

#[test]
fn toggle_does_not_rerender_by_itself() {
    let mut router = router_with_capacity(10);
    router.emit(record("a", Severity::Info, "one"));
    let clears = router.sink().clears();

    router.toggle_source_visibility("a", false);

    assert_eq!(router.sink().clears(), clears);
    assert_eq!(router.sink().lines().len(), 1);
    assert_eq!(
        router.emit(record("a", Severity::Info, "two")),
        EmitOutcome::Hidden
    );
}

#[test]
fn setting_the_same_threshold_twice_is_idempotent() {
    let mut router = router_with_capacity(50);
    router.register_source("a", Severity::Debug);
    for severity in Severity::ALL {
        router.emit(record("a", severity, severity.as_str()));
    }

    router.set_severity_threshold(Severity::Warning);
    let first: Vec<String> = router.sink().texts().iter().map(|t| t.to_string()).collect();
    router.set_severity_threshold(Severity::Warning);
    let second: Vec<String> = router.sink().texts().iter().map(|t| t.to_string()).collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn timestamps_round_trip_restores_original_text() {
    let config = RouterConfig {
        show_timestamps: true,
        ..RouterConfig::default()
    };
    let mut router = LogRouter::new(config, MemorySink::new());
    router.emit(record("a", Severity::Info, "first"));
    router.emit(record("b", Severity::Warning, "second"));
    router.rerender();
    let original: Vec<String> = router.sink().texts().iter().map(|t| t.to_string()).collect();

    router.toggle_timestamps(false);
    assert!(router
        .sink()
        .texts()
        .iter()
        .all(|t| t.contains("<pre>a: ") || t.contains("<pre>b: ")));

    router.toggle_timestamps(true);
    router.rerender();
    let restored: Vec<String> = router.sink().texts().iter().map(|t| t.to_string()).collect();

    assert_eq!(original, restored);
    let stored: Vec<String> = router
        .history()
        .iter()
        .map(|r| r.rendered_text.clone())
        .collect();
    assert_eq!(restored, stored);
}

#[test]
fn export_writes_only_visible_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let mut router = router_with_capacity(10);
    router.register_source("a", Severity::Info);
    router.emit(record("a", Severity::Info, "keep <me>"));
    router.emit(record("a", Severity::Debug, "too quiet"));
    router.emit(record("b", Severity::Error, "hidden source"));
    router.toggle_source_visibility("b", false);

    assert_eq!(router.export(&path).unwrap(), 1);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_end().ends_with("a: keep <me>"));
}

#[test]
fn sink_teardown_is_contained() {
    let mut router = router_with_capacity(10);
    router.emit(record("a", Severity::Info, "before"));
    router.sink_mut().destroy();

    assert_eq!(
        router.emit(record("a", Severity::Error, "during")),
        EmitOutcome::SinkUnavailable
    );
    assert_eq!(
        router.emit(record("a", Severity::Error, "after")),
        EmitOutcome::Detached
    );
    assert_eq!(router.history().len(), 2);
    assert_eq!(router.set_severity_threshold(Severity::Debug), 0);
}
