//! Overload resolution by name, arity and optional type hints.

use mbean_run_core::{OperationDescriptor, STRING_TYPE};
use thiserror::Error;

/// Hint accepted in place of [`STRING_TYPE`].
pub const STRING_HINT: &str = "string";

/// Resolution error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Signature does not match parameter count: {hints} types for {arguments} parameters")]
    SignatureArityMismatch { hints: usize, arguments: usize },
    #[error("Operation {name} with {arg_count} parameters doesn't exist")]
    NoSuchOperation { name: String, arg_count: usize },
}

/// User supplied parameter types used to pick between overloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHints(Vec<String>);

impl TypeHints {
    /// Parse the comma separated form used on the command line, e.g.
    /// `int,string`. Whitespace around each entry is ignored.
    #[must_use]
    pub fn parse(types: &str) -> Self {
        Self(types.split(',').map(|t| t.trim().to_string()).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Whether a declared parameter type satisfies a hint.
///
/// Only exact equality counts, plus `string` standing for [`STRING_TYPE`].
#[must_use]
pub fn hint_matches(declared: &str, hint: &str) -> bool {
    declared == hint || (hint == STRING_HINT && declared == STRING_TYPE)
}

/// Pick the operation to invoke.
///
/// Candidates are the descriptors named `name` with exactly `arg_count`
/// parameters. Without hints the first candidate wins; with hints the first
/// candidate whose parameter types all match their hint wins. Ties go to
/// whichever the remote side listed first.
///
/// # Errors
/// Returns [`ResolveError::SignatureArityMismatch`] when the hint count
/// differs from `arg_count`, before looking at `available`, and
/// [`ResolveError::NoSuchOperation`] when nothing matches.
pub fn resolve<'a>(
    available: &'a [OperationDescriptor],
    name: &str,
    arg_count: usize,
    hints: Option<&TypeHints>,
) -> Result<&'a OperationDescriptor, ResolveError> {
    if let Some(hints) = hints {
        if hints.len() != arg_count {
            return Err(ResolveError::SignatureArityMismatch {
                hints: hints.len(),
                arguments: arg_count,
            });
        }
    }

    let found = available
        .iter()
        .filter(|op| op.name == name && op.arity() == arg_count)
        .find(|op| {
            hints.is_none_or(|hints| {
                op.parameter_types
                    .iter()
                    .zip(hints.as_slice())
                    .all(|(declared, hint)| hint_matches(declared, hint))
            })
        });

    match found {
        Some(op) => {
            tracing::debug!(operation = %op, "resolved operation");
            Ok(op)
        }
        None => Err(ResolveError::NoSuchOperation {
            name: name.to_string(),
            arg_count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overloads() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new("set", ["int"]),
            OperationDescriptor::new("set", [STRING_TYPE]),
            OperationDescriptor::new("set", ["int", "int"]),
            OperationDescriptor::new("reset", Vec::<String>::new()),
        ]
    }

    #[test]
    fn test_unique_name_and_arity() {
        let ops = overloads();
        let op = resolve(&ops, "reset", 0, None).unwrap();
        assert_eq!(op, &ops[3]);
        let op = resolve(&ops, "set", 2, None).unwrap();
        assert_eq!(op, &ops[2]);
    }

    #[test]
    fn test_first_match_without_hints() {
        let ops = overloads();
        assert_eq!(resolve(&ops, "set", 1, None).unwrap(), &ops[0]);

        let reversed: Vec<_> = ops.iter().rev().cloned().collect();
        assert_eq!(
            resolve(&reversed, "set", 1, None).unwrap().parameter_types,
            vec![STRING_TYPE.to_string()]
        );
    }

    #[test]
    fn test_hints_pick_overload() {
        let ops = overloads();
        let hints = TypeHints::parse("string");
        assert_eq!(resolve(&ops, "set", 1, Some(&hints)).unwrap(), &ops[1]);

        let hints = TypeHints::parse(STRING_TYPE);
        assert_eq!(resolve(&ops, "set", 1, Some(&hints)).unwrap(), &ops[1]);

        let hints = TypeHints::parse("int");
        assert_eq!(resolve(&ops, "set", 1, Some(&hints)).unwrap(), &ops[0]);
    }

    #[test]
    fn test_hints_matching_nothing() {
        let ops = overloads();
        let hints = TypeHints::parse("long");
        assert_eq!(
            resolve(&ops, "set", 1, Some(&hints)),
            Err(ResolveError::NoSuchOperation {
                name: "set".to_string(),
                arg_count: 1
            })
        );
    }

    #[test]
    fn test_string_alias_is_not_a_wildcard() {
        let ops = overloads();
        let hints = TypeHints::parse("string, int");
        assert!(matches!(
            resolve(&ops, "set", 2, Some(&hints)),
            Err(ResolveError::NoSuchOperation { .. })
        ));
        assert!(!hint_matches("int", STRING_HINT));
        assert!(!hint_matches("java.lang.Object", STRING_HINT));
        assert!(hint_matches(STRING_TYPE, STRING_HINT));
    }

    #[test]
    fn test_arity_mismatch_checked_first() {
        let hints = TypeHints::parse("int,int");
        assert_eq!(
            resolve(&[], "anything", 1, Some(&hints)),
            Err(ResolveError::SignatureArityMismatch {
                hints: 2,
                arguments: 1
            })
        );

        let ops = overloads();
        let hints = TypeHints::parse("int");
        assert_eq!(
            resolve(&ops, "set", 2, Some(&hints)),
            Err(ResolveError::SignatureArityMismatch {
                hints: 1,
                arguments: 2
            })
        );
    }

    #[test]
    fn test_unknown_operation() {
        let ops = overloads();
        assert!(matches!(
            resolve(&ops, "set", 3, None),
            Err(ResolveError::NoSuchOperation { arg_count: 3, .. })
        ));
        assert!(matches!(
            resolve(&ops, "Set", 1, None),
            Err(ResolveError::NoSuchOperation { .. })
        ));
    }

    #[test]
    fn test_parse_hints() {
        assert_eq!(
            TypeHints::parse("int, java.lang.String").as_slice(),
            ["int".to_string(), STRING_TYPE.to_string()]
        );
        assert_eq!(TypeHints::parse("").len(), 1);
    }
}
