//! Append-only provenance log attached to every data object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// One provenance record: which tool produced or modified the object,
/// with the effective parameter values at that moment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Tool identifier
    pub tool: String,

    /// Library the tool came from
    pub library: String,

    /// Snapshot of the effective parameter values (id -> value)
    pub parameters: Value,

    /// Hash of the parameter snapshot, for replay matching
    pub parameters_hash: String,

    /// When the producing execution started
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry for a tool run with the given parameter snapshot
    pub fn new(library: impl Into<String>, tool: impl Into<String>, parameters: Value) -> Self {
        let snapshot = serde_json::to_string(&parameters).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(snapshot.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        Self {
            tool: tool.into(),
            library: library.into(),
            parameters,
            parameters_hash: hash[..16].to_string(),
            recorded_at: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of provenance entries
///
/// Entries are never mutated or removed once appended; reproducibility and
/// undo tooling rely on the log being immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provenance entry
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry, if any
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut history = History::new();
        history.record(HistoryEntry::new("grid_filters", "smooth", serde_json::json!({"radius": 2})));
        history.record(HistoryEntry::new("grid_filters", "slope", serde_json::json!({})));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].tool, "smooth");
        assert_eq!(history.latest().unwrap().tool, "slope");
    }

    #[test]
    fn snapshot_hash_is_stable_for_equal_parameters() {
        let a = HistoryEntry::new("lib", "tool", serde_json::json!({"k": 1}));
        let b = HistoryEntry::new("lib", "tool", serde_json::json!({"k": 1}));
        assert_eq!(a.parameters_hash, b.parameters_hash);
        assert_eq!(a.parameters_hash.len(), 16);
    }
}
