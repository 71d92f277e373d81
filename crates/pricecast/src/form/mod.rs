//! Dynamic form definition and row/form conversion.
//!
//! A [`FormSpec`] is a plain list of [`FieldSpec`]s built from a [`Schema`]:
//! one single-choice field per one-hot group followed by one field per
//! ungrouped column. Per-request values live in a [`FormState`]; validating
//! it yields a [`ValidatedForm`] that [`form_to_feature_row`] turns into a
//! model-aligned [`FeatureRow`](crate::inference::FeatureRow).

mod convert;
mod labels;
mod state;

pub use convert::{form_to_feature_row, row_to_form_data, FormData};
pub use labels::{humanize, title_case};
pub use state::{FieldValue, FormState, ValidatedForm, ValidationError};

use crate::schema::{ColumnKind, Schema};

/// Label of the submit button.
pub const SUBMIT_LABEL: &str = "Predict";

/// One option of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Input widget and parsing rule of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Single choice among fixed options.
    Select { choices: Vec<Choice> },
    /// Optional integer; blank means none.
    Integer,
    /// Optional float; blank means none.
    Float,
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Raw value shown when nothing else is known.
    pub default: String,
}

impl FieldSpec {
    /// True when `value` is one of the field's options. Non-select fields
    /// accept everything here and are checked during parsing instead.
    pub fn accepts_choice(&self, value: &str) -> bool {
        match &self.kind {
            FieldKind::Select { choices } => choices.iter().any(|c| c.value == value),
            _ => true,
        }
    }
}

/// Ordered list of form fields derived from a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    /// Build the form for `schema`.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut fields = Vec::with_capacity(schema.groups().len() + schema.ungrouped().len());

        for group in schema.groups() {
            let mut choices = vec![Choice::new("", "None")];
            choices.extend(
                group
                    .columns
                    .iter()
                    .map(|col| Choice::new(col.clone(), humanize(group.member_suffix(col)))),
            );
            fields.push(FieldSpec {
                name: group.field_name.clone(),
                label: humanize(&group.name),
                kind: FieldKind::Select { choices },
                default: String::new(),
            });
        }

        for column in schema.ungrouped() {
            let (kind, default) = match column.kind {
                ColumnKind::Binary => (
                    FieldKind::Select {
                        choices: vec![Choice::new("0", "No"), Choice::new("1", "Yes")],
                    },
                    "0",
                ),
                ColumnKind::Int => (FieldKind::Integer, "0"),
                ColumnKind::Float => (FieldKind::Float, "0.0"),
            };
            fields.push(FieldSpec {
                name: column.name.clone(),
                label: humanize(&column.name),
                kind,
                default: default.to_string(),
            });
        }

        Self { fields }
    }

    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
