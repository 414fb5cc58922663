// sieve-core/src/domain/table/value.rs

use serde::Serialize;
use std::fmt;

/// A single cell. `Missing` is a value of its own, never a sentinel string.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Types a raw cell the way the CSV adapter does: NA markers become `Missing`,
    /// then integer, then finite float, otherwise the raw text is kept untouched.
    pub fn parse_cell(raw: &str, na_values: &[String]) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || na_values.iter().any(|na| na == trimmed) {
            return Value::Missing;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text is accepted when it parses as a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Float(_) => None,
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Value::Missing => None,
        }
    }

    /// Hashable form used for identity-key grouping and frequency counts.
    /// Integral floats collapse onto integers so that `5` and `5.0` compare equal.
    pub fn key(&self) -> KeyValue {
        match self {
            Value::Missing => KeyValue::Missing,
            Value::Integer(i) => KeyValue::Integer(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    KeyValue::Integer(*f as i64)
                } else {
                    KeyValue::FloatBits(f.to_bits())
                }
            }
            Value::Text(s) => KeyValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.fract() == 0.0 && x.abs() < 1.0e15 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Missing,
    Integer(i64),
    FloatBits(u64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn na() -> Vec<String> {
        vec!["NA".to_string(), "N/A".to_string()]
    }

    #[test]
    fn test_parse_cell_typing() {
        assert_eq!(Value::parse_cell("", &na()), Value::Missing);
        assert_eq!(Value::parse_cell("  ", &na()), Value::Missing);
        assert_eq!(Value::parse_cell("N/A", &na()), Value::Missing);
        assert_eq!(Value::parse_cell(" 2020 ", &na()), Value::Integer(2020));
        assert_eq!(Value::parse_cell("4.5", &na()), Value::Float(4.5));
        assert_eq!(Value::parse_cell("inf", &na()), Value::text("inf"));
        assert_eq!(Value::parse_cell(" Acme ", &na()), Value::text(" Acme "));
    }

    #[test]
    fn test_key_unifies_integral_floats() {
        assert_eq!(Value::Integer(5).key(), Value::Float(5.0).key());
        assert_ne!(Value::Float(5.5).key(), Value::Integer(5).key());
        assert_ne!(Value::text("5").key(), Value::Integer(5).key());
        assert_eq!(Value::Missing.key(), KeyValue::Missing);
    }

    #[test]
    fn test_display_matches_csv_output() {
        assert_eq!(Value::Float(15.0).to_string(), "15.0");
        assert_eq!(Value::Float(4.25).to_string(), "4.25");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Missing.to_string(), "");
    }

    #[test]
    fn test_as_f64_accepts_numeric_text() {
        assert_eq!(Value::text(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Value::text("twelve").as_f64(), None);
        assert_eq!(Value::Missing.as_f64(), None);
    }
}
