//! Tagged parameter values

use crate::data::ObjectId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current value of a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    /// No value set yet
    Empty,
    Bool(bool),
    Int(i64),
    Double(f64),
    /// Resolved index into the effective choice set
    Choice(usize),
    /// Free text; also a provisional choice name for lazily resolved sets
    Text(String),
    FilePath(PathBuf),
    /// Closed numeric interval
    Range(f64, f64),
    /// Reference to a data object in the session store
    Object(ObjectId),
}

impl ParameterValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, ParameterValue::Empty)
    }

    /// The referenced object, for data-object parameters
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            ParameterValue::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(d) => Some(*d),
            ParameterValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON rendition, used for provenance snapshots. The serde form
    /// of the enum is tagged; history entries record the bare value.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ParameterValue::Empty => Value::Null,
            ParameterValue::Bool(b) => Value::from(*b),
            ParameterValue::Int(i) => Value::from(*i),
            ParameterValue::Double(d) => Value::from(*d),
            ParameterValue::Choice(i) => Value::from(*i),
            ParameterValue::Text(s) => Value::from(s.as_str()),
            ParameterValue::FilePath(p) => Value::from(p.display().to_string()),
            ParameterValue::Range(lo, hi) => serde_json::json!([lo, hi]),
            ParameterValue::Object(id) => Value::from(id.to_string()),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::Empty => write!(f, "<empty>"),
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Int(i) => write!(f, "{}", i),
            ParameterValue::Double(d) => write!(f, "{}", d),
            ParameterValue::Choice(i) => write!(f, "#{}", i),
            ParameterValue::Text(s) => write!(f, "{}", s),
            ParameterValue::FilePath(p) => write!(f, "{}", p.display()),
            ParameterValue::Range(lo, hi) => write!(f, "[{}, {}]", lo, hi),
            ParameterValue::Object(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rendition_is_untagged() {
        assert_eq!(ParameterValue::Int(3).to_json(), json!(3));
        assert_eq!(ParameterValue::Bool(true).to_json(), json!(true));
        assert_eq!(ParameterValue::Empty.to_json(), json!(null));
        assert_eq!(ParameterValue::Range(0.5, 2.0).to_json(), json!([0.5, 2.0]));

        let id = ObjectId::new();
        assert_eq!(
            ParameterValue::Object(id).to_json(),
            json!(id.to_string())
        );
    }
}
