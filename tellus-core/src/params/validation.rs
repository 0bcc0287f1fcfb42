//! Validation results for parameter lists
//!
//! A report always carries every violated constraint, never just the first,
//! so a front end can surface all problems at once.

use serde::{Deserialize, Serialize};

/// Enumerated constraint violation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Required parameter left empty
    Required,
    /// Raw value could not be coerced to the parameter type
    InvalidValue,
    /// Numeric value outside declared bounds
    OutOfBounds,
    /// Choice index or name not in the effective choice set
    InvalidChoice,
    /// Interval with min greater than max
    InvalidRange,
    /// Input file does not exist
    MissingFile,
    /// Referenced data object is gone from the store
    DanglingReference,
    /// Bound data object has the wrong kind
    KindMismatch,
    /// Value supplied for a parameter the tool does not declare
    UnknownParameter,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::OutOfBounds => "out_of_bounds",
            IssueCode::InvalidChoice => "invalid_choice",
            IssueCode::InvalidRange => "invalid_range",
            IssueCode::MissingFile => "missing_file",
            IssueCode::DanglingReference => "dangling_reference",
            IssueCode::KindMismatch => "kind_mismatch",
            IssueCode::UnknownParameter => "unknown_parameter",
        }
    }
}

/// One violated constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Identifier of the offending parameter
    pub parameter: String,

    /// Violation category
    pub code: IssueCode,

    /// Human-readable description, suitable for direct display
    pub message: String,
}

impl ValidationIssue {
    pub fn new(parameter: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code.as_str(), self.parameter, self.message)
    }
}

/// Outcome of validating a parameter list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues for one parameter
    pub fn for_parameter(&self, id: &str) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.parameter == id).collect()
    }

    /// Whether a parameter violated a specific constraint
    pub fn has(&self, id: &str, code: IssueCode) -> bool {
        self.issues
            .iter()
            .any(|i| i.parameter == id && i.code == code)
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "ok");
        }
        let lines: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", lines.join("; "))
    }
}
