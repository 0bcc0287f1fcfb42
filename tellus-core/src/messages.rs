//! Message sink for human-readable runtime output
//!
//! The runtime never writes diagnostics to a fixed destination. Front ends
//! inject a sink and route messages to a console, log file, or GUI widget.

use std::sync::{Arc, Mutex};

/// Destination for human-readable progress and diagnostic strings
pub trait MessageSink: Send + Sync {
    /// Plain informational message
    fn message(&self, text: &str);

    /// Non-fatal warning
    fn warning(&self, text: &str);

    /// Error report
    fn error(&self, text: &str);

    /// Progress update for a running tool
    fn progress(&self, fraction: f64, text: &str) {
        let _ = (fraction, text);
    }
}

/// Shared sink handle
pub type SharedSink = Arc<dyn MessageSink>;

/// Default sink that forwards everything to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn message(&self, text: &str) {
        tracing::info!("{}", text);
    }

    fn warning(&self, text: &str) {
        tracing::warn!("{}", text);
    }

    fn error(&self, text: &str) {
        tracing::error!("{}", text);
    }

    fn progress(&self, fraction: f64, text: &str) {
        tracing::debug!(fraction, "{}", text);
    }
}

/// Severity of a captured message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Sink that records messages in memory
///
/// Used by tests and by front ends that render output after the fact.
#[derive(Debug, Default)]
pub struct BufferSink {
    entries: Mutex<Vec<(MessageLevel, String)>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far
    pub fn entries(&self) -> Vec<(MessageLevel, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Captured messages of one severity
    pub fn with_level(&self, level: MessageLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    fn push(&self, level: MessageLevel, text: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, text.to_string()));
        }
    }
}

impl MessageSink for BufferSink {
    fn message(&self, text: &str) {
        self.push(MessageLevel::Info, text);
    }

    fn warning(&self, text: &str) {
        self.push(MessageLevel::Warning, text);
    }

    fn error(&self, text: &str) {
        self.push(MessageLevel::Error, text);
    }
}
