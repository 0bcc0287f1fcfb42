//! Parameter descriptors and type-directed value coercion

use super::value::ParameterValue;
use crate::data::{DataKind, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Where a choice parameter takes its valid set from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ChoiceSource {
    /// Fixed set, frozen at declaration
    Static { choices: Vec<String> },

    /// Field names of the table object currently bound to another parameter
    /// of the same list; resolved at validation time, never frozen
    FieldsOf { parameter: String },
}

/// Type tag and constraint payload of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    Bool,
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Double {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Choice {
        #[serde(flatten)]
        source: ChoiceSource,
    },
    Text,
    FilePath {
        #[serde(default)]
        must_exist: bool,
    },
    /// Closed numeric interval, optionally bounded on both ends
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Consumed data object of the given kind
    Input { data: DataKind },
    /// Produced data object of the given kind
    Output { data: DataKind },
}

impl ParameterKind {
    /// Short display name of the kind
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::Bool => "bool",
            ParameterKind::Int { .. } => "int",
            ParameterKind::Double { .. } => "double",
            ParameterKind::Choice { .. } => "choice",
            ParameterKind::Text => "text",
            ParameterKind::FilePath { .. } => "file",
            ParameterKind::Range { .. } => "range",
            ParameterKind::Input { .. } => "input",
            ParameterKind::Output { .. } => "output",
        }
    }

    /// Whether this parameter consumes or produces a data object
    pub fn is_data_object(&self) -> bool {
        matches!(
            self,
            ParameterKind::Input { .. } | ParameterKind::Output { .. }
        )
    }
}

/// A typed, constrained input/output slot of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Identifier, unique within one parameter list
    pub id: String,

    /// Human-readable label
    pub label: String,

    /// Type tag and constraints
    pub kind: ParameterKind,

    /// A run may not start while this is unset
    pub required: bool,

    /// Current, possibly provisional, value
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: true,
            value: ParameterValue::Empty,
        }
    }

    pub fn bool(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ParameterKind::Bool)
    }

    pub fn int(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ParameterKind::Int { min: None, max: None })
    }

    pub fn double(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ParameterKind::Double { min: None, max: None })
    }

    pub fn choice(
        id: impl Into<String>,
        label: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(
            id,
            label,
            ParameterKind::Choice {
                source: ChoiceSource::Static {
                    choices: choices.into_iter().map(Into::into).collect(),
                },
            },
        )
    }

    /// Choice whose valid set is the field list of the table bound to
    /// `table_parameter` at validation time
    pub fn field_choice(
        id: impl Into<String>,
        label: impl Into<String>,
        table_parameter: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            label,
            ParameterKind::Choice {
                source: ChoiceSource::FieldsOf {
                    parameter: table_parameter.into(),
                },
            },
        )
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ParameterKind::Text)
    }

    pub fn file_path(id: impl Into<String>, label: impl Into<String>, must_exist: bool) -> Self {
        Self::new(id, label, ParameterKind::FilePath { must_exist })
    }

    pub fn range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ParameterKind::Range { min: None, max: None })
    }

    pub fn input(id: impl Into<String>, label: impl Into<String>, data: DataKind) -> Self {
        Self::new(id, label, ParameterKind::Input { data })
    }

    pub fn output(id: impl Into<String>, label: impl Into<String>, data: DataKind) -> Self {
        Self::new(id, label, ParameterKind::Output { data })
    }

    /// Mark as optional; an empty value then passes validation
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Numeric bounds, applied to int, double, and range kinds
    pub fn with_bounds(mut self, lo: f64, hi: f64) -> Self {
        match &mut self.kind {
            ParameterKind::Int { min, max } => {
                *min = Some(lo as i64);
                *max = Some(hi as i64);
            }
            ParameterKind::Double { min, max } | ParameterKind::Range { min, max } => {
                *min = Some(lo);
                *max = Some(hi);
            }
            _ => {}
        }
        self
    }

    /// Preset value, applied through the usual coercion
    pub fn with_default(mut self, raw: Value) -> Self {
        let _ = self.set_value(raw);
        self
    }

    /// Attempt a type-directed coercion of `raw` into this parameter.
    ///
    /// Returns `false` and leaves the prior value intact when the raw value
    /// cannot be interpreted for this parameter's type; never panics. The
    /// accepted value is still provisional: constraints are checked at
    /// validation time, not here.
    pub fn set_value(&mut self, raw: Value) -> bool {
        match self.coerce(raw) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }

    fn coerce(&self, raw: Value) -> Option<ParameterValue> {
        if raw.is_null() {
            return Some(ParameterValue::Empty);
        }
        match &self.kind {
            ParameterKind::Bool => match raw {
                Value::Bool(b) => Some(ParameterValue::Bool(b)),
                Value::String(s) => match s.to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(ParameterValue::Bool(true)),
                    "false" | "0" | "no" => Some(ParameterValue::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ParameterKind::Int { .. } => match raw {
                Value::Number(n) => n.as_i64().map(ParameterValue::Int),
                Value::String(s) => s.trim().parse().ok().map(ParameterValue::Int),
                _ => None,
            },
            ParameterKind::Double { .. } => match raw {
                Value::Number(n) => n.as_f64().map(ParameterValue::Double),
                Value::String(s) => s.trim().parse().ok().map(ParameterValue::Double),
                _ => None,
            },
            ParameterKind::Choice { source } => match raw {
                Value::Number(n) => n.as_u64().map(|i| ParameterValue::Choice(i as usize)),
                Value::String(s) => match source {
                    ChoiceSource::Static { choices } => choices
                        .iter()
                        .position(|c| c == &s)
                        .map(ParameterValue::Choice),
                    // The valid set is not known until validation; keep the
                    // name and resolve membership lazily.
                    ChoiceSource::FieldsOf { .. } => Some(ParameterValue::Text(s)),
                },
                _ => None,
            },
            ParameterKind::Text => match raw {
                Value::String(s) => Some(ParameterValue::Text(s)),
                Value::Number(n) => Some(ParameterValue::Text(n.to_string())),
                _ => None,
            },
            ParameterKind::FilePath { .. } => match raw {
                Value::String(s) => Some(ParameterValue::FilePath(PathBuf::from(s))),
                _ => None,
            },
            ParameterKind::Range { .. } => match raw {
                Value::Array(items) if items.len() == 2 => {
                    let lo = items[0].as_f64()?;
                    let hi = items[1].as_f64()?;
                    Some(ParameterValue::Range(lo, hi))
                }
                _ => None,
            },
            ParameterKind::Input { .. } | ParameterKind::Output { .. } => match raw {
                Value::String(s) => serde_json::from_value::<ObjectId>(Value::String(s))
                    .ok()
                    .map(ParameterValue::Object),
                _ => None,
            },
        }
    }

    /// Bind a data object directly, for programmatic callers
    pub fn set_object(&mut self, id: ObjectId) -> bool {
        if self.kind.is_data_object() {
            self.value = ParameterValue::Object(id);
            true
        } else {
            false
        }
    }
}
