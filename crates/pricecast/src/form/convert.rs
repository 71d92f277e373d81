//! Conversion between dataset rows, form values and feature rows.

use std::collections::HashMap;

use crate::data::{Row, Value};
use crate::inference::FeatureRow;
use crate::schema::{ColumnKind, Schema};

use super::ValidatedForm;

/// Raw form values keyed by field name.
pub type FormData = HashMap<String, String>;

/// Form values that reproduce `row`.
///
/// Each group selects its first member (in member order) whose value is 1,
/// or nothing. Binary columns become `"0"`/`"1"`; other values are rendered
/// as text.
pub fn row_to_form_data(row: &Row, schema: &Schema) -> FormData {
    let mut data = FormData::with_capacity(schema.groups().len() + schema.ungrouped().len());

    for group in schema.groups() {
        let selected = group
            .columns
            .iter()
            .find(|col| row.get(col.as_str()).is_some_and(|v| v.equals_number(1.0)))
            .cloned()
            .unwrap_or_default();
        data.insert(group.field_name.clone(), selected);
    }

    let zero = Value::Int(0);
    for column in schema.ungrouped() {
        let value = row.get(&column.name).unwrap_or(&zero);
        let text = match column.kind {
            ColumnKind::Binary => match value.as_f64() {
                Some(x) if x == 1.0 => "1".to_string(),
                _ => "0".to_string(),
            },
            _ => value.to_string(),
        };
        data.insert(column.name.clone(), text);
    }

    data
}

/// Build the model input for a validated form.
///
/// Every name in `feature_order` starts at 0. Ungrouped fields write their
/// value (blank as 0) and the selected member of each group is set to 1.
/// Columns outside `feature_order` are dropped.
pub fn form_to_feature_row(
    form: &ValidatedForm,
    schema: &Schema,
    feature_order: &[String],
) -> FeatureRow {
    let mut row = FeatureRow::zeros(feature_order.to_vec());

    for column in schema.ungrouped() {
        if let Some(value) = form.get(&column.name) {
            row.set(&column.name, value.as_feature() as f32);
        }
    }

    for group in schema.groups() {
        if let Some(selected) = form.choice(&group.field_name) {
            if group.contains(selected) {
                row.set(selected, 1.0);
            }
        }
    }

    row
}
