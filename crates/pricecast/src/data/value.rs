//! Cell values.

use std::fmt;

/// Tokens read as a missing value.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// A parsed CSV cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    #[default]
    Missing,
}

impl Value {
    /// Parse a raw CSV field.
    ///
    /// Integers win over floats, floats over booleans, and anything else is
    /// kept as text. Surrounding whitespace is ignored for typed values.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Value::Missing;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        match trimmed {
            "True" | "true" | "TRUE" => Value::Bool(true),
            "False" | "false" | "FALSE" => Value::Bool(false),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Numeric view of the value. Booleans map to 0/1; text and missing
    /// values have none.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// True when the value equals `target` numerically.
    #[inline]
    pub fn equals_number(&self, target: f64) -> bool {
        self.as_f64() == Some(target)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Whole floats keep a trailing ".0" so they read as floats in the form.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Value::Int(42))]
    #[case(" -3 ", Value::Int(-3))]
    #[case("19.7", Value::Float(19.7))]
    #[case("1e3", Value::Float(1000.0))]
    #[case("True", Value::Bool(true))]
    #[case("false", Value::Bool(false))]
    #[case("", Value::Missing)]
    #[case("NaN", Value::Missing)]
    #[case("manual", Value::Text("manual".into()))]
    fn parse_cells(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(Value::parse(raw), expected);
    }

    #[test]
    fn numeric_view() {
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::Int(0).as_f64(), Some(0.0));
        assert_eq!(Value::Text("1".into()).as_f64(), None);
        assert_eq!(Value::Missing.as_f64(), None);
        assert!(Value::Float(1.0).equals_number(1.0));
        assert!(!Value::Float(f64::NAN).equals_number(f64::NAN));
    }

    #[test]
    fn display_matches_form_rendering() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(18.9).to_string(), "18.9");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Missing.to_string(), "");
    }
}
