use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::ObjectId;
use crate::params::ValidationReport;
use crate::tool::RunState;

/// Terminal classification of a single tool run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The tool ran to completion and its outputs carry a new history entry.
    Succeeded,
    /// Binding or validation rejected the supplied values. The report holds
    /// every violation found, not just the first.
    InvalidParameters { report: ValidationReport },
    /// The tool itself returned an error after validation passed.
    Failed { message: String },
    /// The run observed cancellation at a progress checkpoint and unwound.
    Cancelled,
    /// No such library or no such tool within the library.
    NotFound { library: String, tool: String },
    /// The same tool instance is already executing.
    Busy,
    /// An output object is already claimed by another running tool.
    ObjectBusy { object: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded)
    }
}

/// Everything a caller learns from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub library: String,
    pub tool: String,
    pub status: ExecutionStatus,
    /// Terminal state of the run lifecycle.
    pub state: RunState,
    /// Identifiers of the data objects the run produced or wrote into.
    /// Empty unless the run succeeded.
    pub outputs: Vec<ObjectId>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn validation_report(&self) -> Option<&ValidationReport> {
        match &self.status {
            ExecutionStatus::InvalidParameters { report } => Some(report),
            _ => None,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
