//! Captures formatted log output for assertions in tests.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;

/// Shared buffer the capturing subscriber writes into.
#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a debug-level subscriber on this thread and returns its
/// result together with the log lines it emitted.
pub(crate) fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    let lines = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_owned)
        .collect();
    (value, lines)
}

/// Number of WARN lines containing every fragment.
pub(crate) fn count_warnings(lines: &[String], fragments: &[&str]) -> usize {
    lines
        .iter()
        .filter(|line| line.contains("WARN") && fragments.iter().all(|f| line.contains(f)))
        .count()
}
