//! Per-request form values and validation.

use std::collections::{BTreeMap, HashMap};

use super::{FieldKind, FieldSpec, FormSpec};

const INVALID_CHOICE: &str = "Not a valid choice.";
const INVALID_INTEGER: &str = "Not a valid integer value.";
const INVALID_FLOAT: &str = "Not a valid float value.";

/// Validation failures, per field and for the form as a whole.
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("Please correct the highlighted fields.")]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
    form: Vec<String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error attached to the form rather than a single field.
    pub fn form_level(message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push_form(message);
        err
    }

    pub fn push_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn push_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    /// Messages for `field`, empty when it validated.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn form_errors(&self) -> &[String] {
        &self.form
    }

    /// Fields with at least one error, in name order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }
}

/// A parsed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Choice(String),
    Integer(Option<i64>),
    Float(Option<f64>),
}

impl FieldValue {
    /// Numeric value used for the model; blanks become 0.
    pub fn as_feature(&self) -> f64 {
        match self {
            FieldValue::Choice(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            FieldValue::Integer(v) => v.map(|i| i as f64).unwrap_or(0.0),
            FieldValue::Float(v) => v.unwrap_or(0.0),
        }
    }
}

/// Values of a form that passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedForm {
    values: HashMap<String, FieldValue>,
}

impl ValidatedForm {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Selected option of a select field, if any.
    pub fn choice(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Choice(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw values of every field for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: HashMap<String, String>,
}

impl FormState {
    /// Every field at its default.
    pub fn defaults(spec: &FormSpec) -> Self {
        let values = spec
            .fields()
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        Self { values }
    }

    /// Defaults overridden by `data` for the fields the form knows.
    pub fn with_data<K, V>(spec: &FormSpec, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut state = Self::defaults(spec);
        state.merge(spec, data);
        state
    }

    /// Overlay submitted values on the current ones. Unknown keys are ignored;
    /// fields absent from the submission keep their current value.
    pub fn merge<K, V>(&mut self, spec: &FormSpec, data: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in data {
            if let Some(field) = spec.field(key.as_ref()) {
                self.values.insert(field.name.clone(), value.into());
            }
        }
    }

    /// Raw value of a field, blank when unknown.
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Parse every field.
    pub fn validate(&self, spec: &FormSpec) -> Result<ValidatedForm, ValidationError> {
        let mut errors = ValidationError::new();
        let mut values = HashMap::with_capacity(spec.fields().len());

        for field in spec.fields() {
            match parse_field(field, self.value(&field.name)) {
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(message) => errors.push_field(field.name.clone(), message),
            }
        }

        if errors.is_empty() {
            Ok(ValidatedForm { values })
        } else {
            Err(errors)
        }
    }
}

fn parse_field(field: &FieldSpec, raw: &str) -> Result<FieldValue, &'static str> {
    let trimmed = raw.trim();
    match &field.kind {
        FieldKind::Select { .. } => {
            if field.accepts_choice(raw) {
                Ok(FieldValue::Choice(raw.to_string()))
            } else {
                Err(INVALID_CHOICE)
            }
        }
        FieldKind::Integer if trimmed.is_empty() => Ok(FieldValue::Integer(None)),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(|v| FieldValue::Integer(Some(v)))
            .map_err(|_| INVALID_INTEGER),
        FieldKind::Float if trimmed.is_empty() => Ok(FieldValue::Float(None)),
        FieldKind::Float => trimmed
            .parse::<f64>()
            .map(|v| FieldValue::Float(Some(v)))
            .map_err(|_| INVALID_FLOAT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnKind, FeatureColumn, OneHotGroup, Schema};

    fn spec() -> FormSpec {
        FormSpec::from_schema(&Schema::from_parts(
            vec!["brand_A".into(), "brand_B".into(), "year".into(), "power".into(), "is_new".into()],
            vec![
                FeatureColumn::new("year", ColumnKind::Int),
                FeatureColumn::new("power", ColumnKind::Float),
                FeatureColumn::new("is_new", ColumnKind::Binary),
            ],
            vec![OneHotGroup::new("brand", vec!["brand_A".into(), "brand_B".into()])],
        ))
    }

    #[test]
    fn defaults_validate() {
        let spec = spec();
        let form = FormState::defaults(&spec).validate(&spec).unwrap();
        assert_eq!(form.choice("brand_choice"), Some(""));
        assert_eq!(form.get("year"), Some(&FieldValue::Integer(Some(0))));
        assert_eq!(form.get("power"), Some(&FieldValue::Float(Some(0.0))));
        assert_eq!(form.choice("is_new"), Some("0"));
    }

    #[test]
    fn blank_numbers_are_none() {
        let spec = spec();
        let state = FormState::with_data(&spec, [("year", ""), ("power", "  ")]);
        let form = state.validate(&spec).unwrap();
        assert_eq!(form.get("year"), Some(&FieldValue::Integer(None)));
        assert_eq!(form.get("power").unwrap().as_feature(), 0.0);
    }

    #[test]
    fn reports_every_invalid_field() {
        let spec = spec();
        let state = FormState::with_data(
            &spec,
            [("year", "1.5"), ("power", "fast"), ("brand_choice", "brand_Z"), ("is_new", "2")],
        );
        let err = state.validate(&spec).unwrap_err();
        assert_eq!(err.field_errors("year"), &[INVALID_INTEGER]);
        assert_eq!(err.field_errors("power"), &[INVALID_FLOAT]);
        assert_eq!(err.field_errors("brand_choice"), &[INVALID_CHOICE]);
        assert_eq!(err.field_errors("is_new"), &[INVALID_CHOICE]);
        assert_eq!(err.invalid_fields().count(), 4);
        assert_eq!(err.to_string(), "Please correct the highlighted fields.");
    }

    #[test]
    fn merge_ignores_unknown_and_keeps_absent_fields() {
        let spec = spec();
        let mut state = FormState::with_data(&spec, [("year", "2015")]);
        state.merge(&spec, [("csrf_token", "x"), ("power", "80.5")]);
        assert_eq!(state.value("year"), "2015");
        assert_eq!(state.value("power"), "80.5");
        assert_eq!(state.value("csrf_token"), "");
    }
}
