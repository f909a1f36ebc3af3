//! Values exchanged with remote operations.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A value passed to or returned by a remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value.
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Ordered sequence (arrays and collections).
    Array(Vec<Value>),
    /// Named fields of a structured result.
    Composite(BTreeMap<String, Value>),
}

impl Value {
    /// Render the value as an expression that coerces back to it.
    ///
    /// Strings are always quoted so that `"null"` stays a string.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Char(c) => quote(&c.to_string(), '\''),
            Self::String(s) => quote(s, '"'),
            Self::Array(items) => {
                let items: Vec<String> = items.iter().map(Self::to_literal).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Composite(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{k}={}", v.to_literal()))
                    .collect();
                format!("{{{}}}", fields.join(", "))
            }
            other => other.to_string(),
        }
    }
}

fn quote(raw: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push(delimiter);
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Composite(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

/// A coerced argument together with the type name used for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArgument {
    pub value: Value,
    pub type_name: String,
}

impl TypedArgument {
    #[must_use]
    pub fn new(value: Value, type_name: impl Into<String>) -> Self {
        Self {
            value,
            type_name: type_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_call_trace_format() {
        let v = Value::Array(vec![Value::Int(1), Value::from("a"), Value::Null]);
        assert_eq!(v.to_string(), "[1, a, null]");
    }

    #[test]
    fn test_literal_quotes_and_escapes_strings() {
        assert_eq!(Value::from("say \"hi\"\n").to_literal(), r#""say \"hi\"\n""#);
        assert_eq!(Value::from("null").to_literal(), "\"null\"");
        assert_eq!(Value::Char('\'').to_literal(), r"'\''");
        assert_eq!(Value::Null.to_literal(), "null");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Value::Long(7)).unwrap();
        assert_eq!(json, r#"{"type":"long","value":7}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Long(7));
    }
}
