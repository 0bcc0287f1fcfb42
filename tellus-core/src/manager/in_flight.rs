//! In-flight execution tracking
//!
//! Shared between the manager and the execution engine: the engine marks
//! runs, the manager refuses to unload a library while any of its tools is
//! mid-execution.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Live execution bookkeeping
#[derive(Debug, Default)]
pub struct InFlight {
    inner: Mutex<InFlightInner>,
}

#[derive(Debug, Default)]
struct InFlightInner {
    /// Running execution count per library
    libraries: HashMap<String, usize>,
    /// Library/tool pairs with a run in progress
    tools: HashSet<(String, String)>,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Begin a run; `None` when the same library/tool pair is already
    /// executing. The engine never runs two executions against one tool
    /// instance concurrently
    pub fn begin(self: &Arc<Self>, library: &str, tool: &str) -> Option<RunGuard> {
        let mut inner = self.lock();
        let key = (library.to_string(), tool.to_string());
        if !inner.tools.insert(key.clone()) {
            return None;
        }
        *inner.libraries.entry(key.0.clone()).or_insert(0) += 1;
        Some(RunGuard {
            tracker: Arc::clone(self),
            key,
        })
    }

    /// Whether any tool of this library is mid-execution
    pub fn library_active(&self, library: &str) -> bool {
        self.lock()
            .libraries
            .get(library)
            .is_some_and(|count| *count > 0)
    }

    /// Whether this specific library/tool pair is mid-execution
    pub fn tool_active(&self, library: &str, tool: &str) -> bool {
        self.lock()
            .tools
            .contains(&(library.to_string(), tool.to_string()))
    }

    fn end(&self, key: &(String, String)) {
        let mut inner = self.lock();
        inner.tools.remove(key);
        if let Some(count) = inner.libraries.get_mut(&key.0) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                inner.libraries.remove(&key.0);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InFlightInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Marks one run as finished when dropped
pub struct RunGuard {
    tracker: Arc<InFlight>,
    key: (String, String),
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.tracker.end(&self.key);
    }
}
