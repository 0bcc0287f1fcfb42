//! Ordered parameter collections

use super::parameter::{ChoiceSource, Parameter, ParameterKind};
use super::validation::{IssueCode, ValidationIssue, ValidationReport};
use super::value::ParameterValue;
use crate::data::DataStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The parameters of one tool, in declaration order
///
/// Declaration order is the display order and is meaningful: a dependent
/// parameter may reference one declared before it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter; identifiers must be unique within the list
    pub fn add(&mut self, parameter: Parameter) -> bool {
        if self.get(&parameter.id).is_some() {
            return false;
        }
        self.parameters.push(parameter);
        true
    }

    /// Builder-style append, used by tool declarations
    pub fn with(mut self, parameter: Parameter) -> Self {
        self.add(parameter);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Output parameters, in declaration order
    pub fn outputs(&self) -> Vec<&Parameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p.kind, ParameterKind::Output { .. }))
            .collect()
    }

    /// Copy caller-supplied raw values into the list.
    ///
    /// Unknown identifiers and failed coercions are reported; successfully
    /// coerced values stick even when siblings fail, so the report reflects
    /// every problem at once.
    pub fn bind(&mut self, values: &serde_json::Map<String, Value>) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (id, raw) in values {
            match self.get_mut(id) {
                Some(parameter) => {
                    if !parameter.set_value(raw.clone()) {
                        report.push(ValidationIssue::new(
                            id,
                            IssueCode::InvalidValue,
                            format!(
                                "cannot interpret {} as {}",
                                raw,
                                parameter.kind.type_name()
                            ),
                        ));
                    }
                }
                None => {
                    report.push(ValidationIssue::new(
                        id,
                        IssueCode::UnknownParameter,
                        "tool declares no such parameter",
                    ));
                }
            }
        }
        report
    }

    /// Effective parameter values as an id -> plain-value map, used for
    /// provenance snapshots
    pub fn snapshot(&self) -> Value {
        let mut map = serde_json::Map::new();
        for parameter in &self.parameters {
            map.insert(parameter.id.clone(), parameter.value.to_json());
        }
        Value::Object(map)
    }

    /// Check every constraint against the current values.
    ///
    /// Dependent choice sets are computed here, from the values bound right
    /// now, so revalidating after an upstream change always sees the fresh
    /// set. The returned report lists every violation.
    pub fn validate(&self, store: &DataStore) -> ValidationReport {
        let mut report = ValidationReport::new();
        for parameter in &self.parameters {
            self.validate_one(parameter, store, &mut report);
        }
        report
    }

    fn validate_one(
        &self,
        parameter: &Parameter,
        store: &DataStore,
        report: &mut ValidationReport,
    ) {
        if parameter.value.is_empty() {
            // Empty outputs are legal even when required: the engine
            // creates and binds a fresh object of the declared kind.
            let auto_created = matches!(parameter.kind, ParameterKind::Output { .. });
            if parameter.required && !auto_created {
                report.push(ValidationIssue::new(
                    &parameter.id,
                    IssueCode::Required,
                    format!("'{}' is required", parameter.label),
                ));
            }
            return;
        }

        match &parameter.kind {
            ParameterKind::Int { min, max } => {
                if let Some(v) = parameter.value.as_int() {
                    let out_low = min.is_some_and(|m| v < m);
                    let out_high = max.is_some_and(|m| v > m);
                    if out_low || out_high {
                        report.push(ValidationIssue::new(
                            &parameter.id,
                            IssueCode::OutOfBounds,
                            format!("{} outside {}", v, bounds_text(*min, *max)),
                        ));
                    }
                }
            }
            ParameterKind::Double { min, max } => {
                if let Some(v) = parameter.value.as_double() {
                    let out_low = min.is_some_and(|m| v < m);
                    let out_high = max.is_some_and(|m| v > m);
                    if out_low || out_high {
                        report.push(ValidationIssue::new(
                            &parameter.id,
                            IssueCode::OutOfBounds,
                            format!("{} outside {}", v, bounds_text(*min, *max)),
                        ));
                    }
                }
            }
            ParameterKind::Range { min, max } => {
                if let ParameterValue::Range(lo, hi) = parameter.value {
                    if lo > hi {
                        report.push(ValidationIssue::new(
                            &parameter.id,
                            IssueCode::InvalidRange,
                            format!("minimum {} exceeds maximum {}", lo, hi),
                        ));
                    }
                    let out_low = min.is_some_and(|m| lo < m);
                    let out_high = max.is_some_and(|m| hi > m);
                    if out_low || out_high {
                        report.push(ValidationIssue::new(
                            &parameter.id,
                            IssueCode::OutOfBounds,
                            format!("[{}, {}] outside {}", lo, hi, bounds_text(*min, *max)),
                        ));
                    }
                }
            }
            ParameterKind::Choice { source } => {
                let choices = self.effective_choices(source, store);
                match &parameter.value {
                    ParameterValue::Choice(index) => {
                        if *index >= choices.len() {
                            report.push(ValidationIssue::new(
                                &parameter.id,
                                IssueCode::InvalidChoice,
                                format!("index {} outside {} choices", index, choices.len()),
                            ));
                        }
                    }
                    ParameterValue::Text(name) => {
                        if !choices.iter().any(|c| c == name) {
                            report.push(ValidationIssue::new(
                                &parameter.id,
                                IssueCode::InvalidChoice,
                                format!("'{}' is not a valid choice", name),
                            ));
                        }
                    }
                    _ => {}
                }
            }
            ParameterKind::FilePath { must_exist } => {
                if let ParameterValue::FilePath(path) = &parameter.value {
                    if *must_exist && !path.exists() {
                        report.push(ValidationIssue::new(
                            &parameter.id,
                            IssueCode::MissingFile,
                            format!("file does not exist: {}", path.display()),
                        ));
                    }
                }
            }
            ParameterKind::Input { data } | ParameterKind::Output { data } => {
                if let Some(id) = parameter.value.as_object() {
                    match store.kind_of(id) {
                        Some(kind) if kind == *data => {}
                        Some(kind) => {
                            report.push(ValidationIssue::new(
                                &parameter.id,
                                IssueCode::KindMismatch,
                                format!("expected {}, got {}", data, kind),
                            ));
                        }
                        None => {
                            report.push(ValidationIssue::new(
                                &parameter.id,
                                IssueCode::DanglingReference,
                                format!("object {} is not in the session store", id),
                            ));
                        }
                    }
                }
            }
            ParameterKind::Bool | ParameterKind::Text => {}
        }
    }

    /// The valid choice set of a choice parameter, as of right now
    pub fn effective_choices(&self, source: &ChoiceSource, store: &DataStore) -> Vec<String> {
        match source {
            ChoiceSource::Static { choices } => choices.clone(),
            ChoiceSource::FieldsOf { parameter } => self
                .get(parameter)
                .and_then(|upstream| upstream.value.as_object())
                .and_then(|id| store.get(id))
                .and_then(|object| object.lock().ok().map(|o| o.fields()))
                .unwrap_or_default(),
        }
    }
}

/// Displayable bound interval; open ends render as infinities
fn bounds_text<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    let lo = min.map_or_else(|| "-inf".to_string(), |v| v.to_string());
    let hi = max.map_or_else(|| "inf".to_string(), |v| v.to_string());
    format!("[{}, {}]", lo, hi)
}

impl IntoIterator for ParameterList {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataKind, DataObject};

    fn sample_list() -> ParameterList {
        ParameterList::new()
            .with(Parameter::input("table", "Input Table", DataKind::Table))
            .with(Parameter::field_choice("field", "Field", "table"))
            .with(Parameter::int("classes", "Class Count").with_bounds(2.0, 32.0))
            .with(Parameter::output("result", "Result Grid", DataKind::Grid))
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let mut list = ParameterList::new();
        assert!(list.add(Parameter::bool("flag", "Flag")));
        assert!(!list.add(Parameter::int("flag", "Flag Again")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn validation_reports_every_violation_not_just_the_first() {
        let store = DataStore::new();
        let mut list = sample_list();
        list.get_mut("classes")
            .map(|p| p.set_value(serde_json::json!(100)));

        let report = list.validate(&store);
        assert!(report.has("table", IssueCode::Required));
        assert!(report.has("classes", IssueCode::OutOfBounds));
        assert!(report.len() >= 2);
    }

    #[test]
    fn empty_output_passes_validation() {
        let store = DataStore::new();
        let list = ParameterList::new().with(Parameter::output("out", "Out", DataKind::Grid));
        assert!(list.validate(&store).is_ok());
    }

    #[test]
    fn input_kind_mismatch_is_flagged() {
        let store = DataStore::new();
        let grid = store.create(DataKind::Grid);
        let id = grid.lock().unwrap().id();

        let mut list = sample_list();
        list.get_mut("table").map(|p| p.set_object(id));
        list.get_mut("classes")
            .map(|p| p.set_value(serde_json::json!(4)));

        let report = list.validate(&store);
        assert!(report.has("table", IssueCode::KindMismatch));
    }

    #[test]
    fn derived_choices_follow_the_current_upstream_table() {
        let store = DataStore::new();

        let mut first = DataObject::new(DataKind::Table);
        first.set_fields(&["elevation"]);
        let first = store.insert(first);
        let first_id = first.lock().unwrap().id();

        let mut second = DataObject::new(DataKind::Table);
        second.set_fields(&["slope", "aspect"]);
        let second = store.insert(second);
        let second_id = second.lock().unwrap().id();

        let mut list = sample_list();
        list.get_mut("classes")
            .map(|p| p.set_value(serde_json::json!(4)));
        list.get_mut("table").map(|p| p.set_object(first_id));
        list.get_mut("field")
            .map(|p| p.set_value(serde_json::json!("slope")));

        // "slope" is not a field of the first table.
        let report = list.validate(&store);
        assert!(report.has("field", IssueCode::InvalidChoice));

        // Rebinding the upstream table changes the valid set; revalidation
        // sees the fresh one.
        list.get_mut("table").map(|p| p.set_object(second_id));
        assert!(list.validate(&store).is_ok());
    }

    #[test]
    fn bind_reports_unknown_and_uncoercible_values() {
        let store = DataStore::new();
        let mut list = sample_list();

        let values = serde_json::json!({
            "classes": "not-a-number",
            "mystery": true,
        });
        let Value::Object(map) = values else { unreachable!() };
        let report = list.bind(&map);

        assert!(report.has("classes", IssueCode::InvalidValue));
        assert!(report.has("mystery", IssueCode::UnknownParameter));
        drop(store);
    }

    #[test]
    fn snapshot_lists_every_parameter_as_plain_values() {
        let mut list = sample_list();
        list.get_mut("classes")
            .map(|p| p.set_value(serde_json::json!(4)));

        let snapshot = list.snapshot();
        let map = snapshot.as_object().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map["classes"], serde_json::json!(4));
        assert_eq!(map["table"], serde_json::json!(null));
    }

    #[test]
    fn bound_violations_read_as_plain_intervals() {
        let store = DataStore::new();
        let mut list = ParameterList::new()
            .with(Parameter::int("classes", "Class Count").with_bounds(2.0, 32.0));
        list.get_mut("classes")
            .map(|p| p.set_value(serde_json::json!(100)));

        let report = list.validate(&store);
        let issue = &report.for_parameter("classes")[0];
        assert_eq!(issue.message, "100 outside [2, 32]");
    }
}
