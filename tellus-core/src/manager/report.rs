//! Per-candidate outcomes of a discovery scan

use crate::library::LoadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happened to one load candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Loaded and registered
    Loaded { library: String, tools: usize },

    /// Identical resolved path was already in the registry; skipped
    AlreadyLoaded { library: String },

    /// Loaded, displacing an earlier library with the same identifier
    Replaced {
        library: String,
        previous_path: Option<PathBuf>,
    },

    /// Load failed; the candidate is absent from the registry
    Failed {
        #[serde(skip)]
        error: Option<LoadError>,
        message: String,
    },
}

impl LoadOutcome {
    pub fn failed(error: LoadError) -> Self {
        LoadOutcome::Failed {
            message: error.to_string(),
            error: Some(error),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. } | LoadOutcome::Replaced { .. })
    }
}

/// One scanned candidate and its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub path: PathBuf,
    pub outcome: LoadOutcome,
}

/// Accumulated outcomes of one initialization scan
///
/// A scan never aborts on a single failure; foreign files sitting next to
/// real libraries are the normal case, and each of them simply contributes
/// a failed candidate line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitReport {
    candidates: Vec<CandidateReport>,
    warnings: Vec<String>,
}

impl InitReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, outcome: LoadOutcome) {
        self.candidates.push(CandidateReport {
            path: path.into(),
            outcome,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: InitReport) {
        self.candidates.extend(other.candidates);
        self.warnings.extend(other.warnings);
    }

    /// Every scanned candidate, in scan order
    pub fn candidates(&self) -> &[CandidateReport] {
        &self.candidates
    }

    /// Warnings recorded along the way (identifier collisions and the like)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Outcome for a specific candidate path
    pub fn outcome_for(&self, path: &Path) -> Option<&LoadOutcome> {
        self.candidates
            .iter()
            .find(|c| c.path == path)
            .map(|c| &c.outcome)
    }

    /// Number of candidates that ended up in the registry
    pub fn loaded_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.outcome.is_loaded())
            .count()
    }

    /// Number of candidates that failed to load
    pub fn failed_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| matches!(c.outcome, LoadOutcome::Failed { .. }))
            .count()
    }

    /// Human-readable per-candidate lines, for the message sink
    pub fn summary_lines(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|c| match &c.outcome {
                LoadOutcome::Loaded { library, tools } => {
                    format!("loaded {} ({} tools) from {}", library, tools, c.path.display())
                }
                LoadOutcome::AlreadyLoaded { library } => {
                    format!("{} already loaded, skipped {}", library, c.path.display())
                }
                LoadOutcome::Replaced { library, .. } => {
                    format!("reloaded {} from {}", library, c.path.display())
                }
                LoadOutcome::Failed { message, .. } => {
                    format!("failed {}: {}", c.path.display(), message)
                }
            })
            .collect()
    }
}
