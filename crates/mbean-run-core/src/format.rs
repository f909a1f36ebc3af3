//! Indented rendering of result values.

use crate::Value;

/// Layout options for printing a result value.
///
/// Scalars print on one line; arrays render as `( ... )` and composites as
/// `{ key = value; }` blocks, one element per line, each nesting level
/// indented by `indent` more spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueOutputFormat {
    /// Spaces per nesting level; the top-level value is indented once.
    pub indent: usize,
    /// Surround string values with quotation marks.
    pub show_quotation_marks: bool,
}

impl Default for ValueOutputFormat {
    fn default() -> Self {
        Self::new(2, false)
    }
}

impl ValueOutputFormat {
    #[must_use]
    pub const fn new(indent: usize, show_quotation_marks: bool) -> Self {
        Self {
            indent,
            show_quotation_marks,
        }
    }

    /// Render `value`, possibly spanning several lines.
    #[must_use]
    pub fn format(&self, value: &Value) -> String {
        let mut out = self.pad(1);
        self.write_value(&mut out, value, 1);
        out
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(self.indent * level)
    }

    fn write_value(&self, out: &mut String, value: &Value, level: usize) {
        match value {
            Value::String(s) if self.show_quotation_marks => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Value::Array(items) => {
                if items.is_empty() {
                    out.push_str("( )");
                    return;
                }
                out.push_str("(\n");
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&self.pad(level + 1));
                    self.write_value(out, item, level + 1);
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&self.pad(level));
                out.push(')');
            }
            Value::Composite(fields) => {
                if fields.is_empty() {
                    out.push_str("{ }");
                    return;
                }
                out.push_str("{\n");
                for (key, field) in fields {
                    out.push_str(&self.pad(level + 1));
                    out.push_str(key);
                    out.push_str(" = ");
                    self.write_value(out, field, level + 1);
                    out.push_str(";\n");
                }
                out.push_str(&self.pad(level));
                out.push('}');
            }
            other => out.push_str(&other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_scalar_is_indented_once() {
        let format = ValueOutputFormat::new(2, false);
        assert_eq!(format.format(&Value::Long(42)), "  42");
        assert_eq!(format.format(&Value::Null), "  null");
    }

    #[test]
    fn test_quotation_marks_only_wrap_strings() {
        let format = ValueOutputFormat::new(2, true);
        assert_eq!(format.format(&Value::from("ok")), "  \"ok\"");
        assert_eq!(format.format(&Value::Int(1)), "  1");

        let plain = ValueOutputFormat::new(2, false);
        assert_eq!(plain.format(&Value::from("ok")), "  ok");
    }

    #[test]
    fn test_nested_layout() {
        let mut fields = BTreeMap::new();
        fields.insert("max".to_string(), Value::Long(10));
        fields.insert(
            "tags".to_string(),
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        );
        let rendered = ValueOutputFormat::new(2, true).format(&Value::Composite(fields));
        let expected = "  {\n    max = 10;\n    tags = (\n      \"a\",\n      \"b\"\n    );\n  }";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_empty_containers() {
        let format = ValueOutputFormat::default();
        assert_eq!(format.format(&Value::Array(vec![])), "  ( )");
        assert_eq!(format.format(&Value::Composite(BTreeMap::new())), "  { }");
    }
}
