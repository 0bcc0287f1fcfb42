//! Execution context handed to a running tool

use crate::data::DataStore;
use crate::messages::{MessageSink, SharedSink, TracingSink};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Caller-supplied progress callback: receives the completed fraction and a
/// status line, returns whether the tool should keep running
pub type ProgressCallback = Arc<dyn Fn(f64, &str) -> bool + Send + Sync>;

/// Everything a tool may touch while running
///
/// The progress checkpoint is the single cooperative suspension point:
/// cancellation is observed there and nowhere else.
#[derive(Clone)]
pub struct ExecutionContext {
    store: Arc<DataStore>,
    sink: SharedSink,
    cancellation: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl ExecutionContext {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self {
            store,
            sink: Arc::new(TracingSink),
            cancellation: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The session data store
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Shared handle to the session data store
    pub fn store_handle(&self) -> Arc<DataStore> {
        Arc::clone(&self.store)
    }

    /// Message sink for human-readable output
    pub fn sink(&self) -> &dyn MessageSink {
        self.sink.as_ref()
    }

    /// Token the caller uses to request cancellation
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cooperative checkpoint.
    ///
    /// Reports progress and returns whether the tool should continue. A
    /// `false` return means a cancellation request or a caller veto; the
    /// tool must stop at the next safe point and return
    /// [`ToolFailure::Cancelled`](super::ToolFailure::Cancelled).
    pub fn progress(&self, fraction: f64, message: &str) -> bool {
        if self.cancellation.is_cancelled() {
            return false;
        }
        self.sink.progress(fraction.clamp(0.0, 1.0), message);
        match &self.progress {
            Some(callback) => callback(fraction, message),
            None => true,
        }
    }
}
