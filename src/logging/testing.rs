//! Helpers for asserting on the router's stderr diagnostics in tests.
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a plain fmt subscriber and returns everything it printed.
pub fn capture_diagnostics(f: impl FnOnce()) -> String {
    let writer = CapturedWriter::default();
    let make_writer = writer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || make_writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = writer.0.lock().unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
