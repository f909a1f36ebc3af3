//! Coercion of textual parameter expressions into typed values.

use mbean_run_core::{STRING_TYPE, TypedArgument, Value};
use thiserror::Error;

use crate::literal::{Literal, NULL_LITERAL, split_elements, strip_quotes, unwrap_literal};

/// Coercion error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("Cannot parse {expression:?} as {type_name}: {reason}")]
    ValueParse {
        expression: String,
        type_name: String,
        reason: String,
    },
    #[error("Parameter type {type_name} is not supported (expression {expression:?})")]
    UnsupportedParameterType {
        expression: String,
        type_name: String,
    },
}

/// Shape of a declared parameter type, as far as coercion cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Array of primitives, e.g. `[I` or `int[]`; elements cannot be `null`.
    PrimitiveArray(Box<ParameterType>),
    /// Array of objects, e.g. `[Ljava.lang.String;` or `[[I`.
    Array(Box<ParameterType>),
    /// `java.util.List` and friends; elements are strings.
    List(Box<ParameterType>),
    /// `java.util.Set`; duplicate elements are dropped.
    Set(Box<ParameterType>),
}

impl ParameterType {
    /// Classify a declared type name, `None` if it is not supported.
    #[must_use]
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let shape = match type_name {
            "boolean" | "java.lang.Boolean" => Self::Boolean,
            "char" | "java.lang.Character" => Self::Char,
            "byte" | "java.lang.Byte" => Self::Byte,
            "short" | "java.lang.Short" => Self::Short,
            "int" | "java.lang.Integer" => Self::Int,
            "long" | "java.lang.Long" => Self::Long,
            "float" | "java.lang.Float" => Self::Float,
            "double" | "java.lang.Double" => Self::Double,
            STRING_TYPE => Self::String,
            "java.util.List" | "java.util.ArrayList" | "java.util.Collection" => {
                Self::List(Box::new(Self::String))
            }
            "java.util.Set" | "java.util.HashSet" => Self::Set(Box::new(Self::String)),
            other => {
                if let Some(element) = other.strip_suffix("[]") {
                    if let Some(primitive) = Self::from_primitive_name(element) {
                        return Some(Self::PrimitiveArray(Box::new(primitive)));
                    }
                    return Self::from_type_name(element).map(|e| Self::Array(Box::new(e)));
                }
                let descriptor = other.strip_prefix('[')?;
                if let Some(primitive) = Self::from_primitive_code(descriptor) {
                    return Some(Self::PrimitiveArray(Box::new(primitive)));
                }
                return Self::from_descriptor(descriptor).map(|e| Self::Array(Box::new(e)));
            }
        };
        Some(shape)
    }

    fn from_primitive_name(name: &str) -> Option<Self> {
        let shape = match name {
            "boolean" => Self::Boolean,
            "char" => Self::Char,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        };
        Some(shape)
    }

    fn from_primitive_code(code: &str) -> Option<Self> {
        let shape = match code {
            "Z" => Self::Boolean,
            "C" => Self::Char,
            "B" => Self::Byte,
            "S" => Self::Short,
            "I" => Self::Int,
            "J" => Self::Long,
            "F" => Self::Float,
            "D" => Self::Double,
            _ => return None,
        };
        Some(shape)
    }

    /// Element type of an object array descriptor such as `Ljava.lang.String;` or `[I`.
    fn from_descriptor(descriptor: &str) -> Option<Self> {
        if descriptor.starts_with('[') {
            return Self::from_type_name(descriptor);
        }
        let name = descriptor.strip_prefix('L')?.strip_suffix(';')?;
        Self::from_type_name(name)
    }

    /// Parse `expression` into a value of this shape.
    ///
    /// # Errors
    /// Returns a human readable reason when the expression does not fit.
    pub fn parse(&self, expression: &str) -> Result<Value, String> {
        if expression == NULL_LITERAL {
            return Ok(Value::Null);
        }
        match self {
            Self::PrimitiveArray(element) => {
                parse_sequence(element, expression, false).map(Value::Array)
            }
            Self::Array(element) | Self::List(element) => {
                parse_sequence(element, expression, true).map(Value::Array)
            }
            Self::Set(element) => {
                let mut unique: Vec<Value> = Vec::new();
                for item in parse_sequence(element, expression, true)? {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::Array(unique))
            }
            scalar => match unwrap_literal(expression).map_err(|e| e.to_string())? {
                Literal::Null => Ok(Value::Null),
                Literal::Text(text) => scalar.parse_scalar(text),
            },
        }
    }

    fn parse_scalar(&self, text: String) -> Result<Value, String> {
        let value = match self {
            Self::Boolean => {
                if text.eq_ignore_ascii_case("true") {
                    Value::Boolean(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Value::Boolean(false)
                } else {
                    return Err("expected true or false".to_string());
                }
            }
            Self::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => return Err("expected exactly one character".to_string()),
                }
            }
            Self::Byte => Value::Byte(text.parse::<i8>().map_err(|e| e.to_string())?),
            Self::Short => Value::Short(text.parse::<i16>().map_err(|e| e.to_string())?),
            Self::Int => Value::Int(text.parse::<i32>().map_err(|e| e.to_string())?),
            Self::Long => Value::Long(text.parse::<i64>().map_err(|e| e.to_string())?),
            Self::Float => Value::Float(text.parse::<f32>().map_err(|e| e.to_string())?),
            Self::Double => Value::Double(text.parse::<f64>().map_err(|e| e.to_string())?),
            Self::String => Value::String(text),
            Self::PrimitiveArray(_) | Self::Array(_) | Self::List(_) | Self::Set(_) => {
                return Err("expected a bracketed list".to_string());
            }
        };
        Ok(value)
    }
}

fn parse_sequence(
    element: &ParameterType,
    expression: &str,
    nullable: bool,
) -> Result<Vec<Value>, String> {
    let text = strip_quotes(expression.trim()).map_err(|e| e.to_string())?;
    let body = text
        .trim()
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed list such as [a, b]".to_string())?;

    split_elements(body)
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|item| {
            if !nullable && item == NULL_LITERAL {
                return Err(format!("element {item:?}: primitive arrays cannot hold null"));
            }
            element
                .parse(item)
                .map_err(|reason| format!("element {item:?}: {reason}"))
        })
        .collect()
}

/// Coerce one textual expression into a value of `type_name`.
///
/// An unquoted `null` yields [`Value::Null`] whatever the type.
///
/// # Errors
/// Returns [`CoerceError::UnsupportedParameterType`] for types outside the
/// supported shapes and [`CoerceError::ValueParse`] when the expression does
/// not parse.
pub fn coerce(expression: &str, type_name: &str) -> Result<TypedArgument, CoerceError> {
    if expression == NULL_LITERAL {
        return Ok(TypedArgument::new(Value::Null, type_name));
    }

    let shape = ParameterType::from_type_name(type_name).ok_or_else(|| {
        CoerceError::UnsupportedParameterType {
            expression: expression.to_string(),
            type_name: type_name.to_string(),
        }
    })?;

    let value = shape
        .parse(expression)
        .map_err(|reason| CoerceError::ValueParse {
            expression: expression.to_string(),
            type_name: type_name.to_string(),
            reason,
        })?;

    tracing::debug!(expression, type_name, %value, "coerced parameter");
    Ok(TypedArgument::new(value, type_name))
}
