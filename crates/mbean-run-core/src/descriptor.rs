//! Remote object names and operation metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical type name of textual string parameters.
pub const STRING_TYPE: &str = "java.lang.String";

/// Name of a remote management object, e.g. `java.lang:type=Memory`.
///
/// Opaque to the core: it is only handed back to the connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectName(String);

impl ObjectName {
    /// Wrap a bean name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw bean name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ObjectName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

fn default_return_type() -> String {
    "void".to_string()
}

/// Metadata of one invocable remote operation.
///
/// A snapshot fetched for a single call; never cached across invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Operation name.
    pub name: String,
    /// Declared parameter type names, in call order.
    #[serde(default)]
    pub parameter_types: Vec<String>,
    /// Declared return type name.
    #[serde(default = "default_return_type")]
    pub return_type: String,
}

impl OperationDescriptor {
    /// Create a descriptor returning `void`.
    #[must_use]
    pub fn new<I>(name: impl Into<String>, parameter_types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            return_type: default_return_type(),
        }
    }

    /// Set the declared return type.
    #[must_use]
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}({})",
            self.return_type,
            self.name,
            self.parameter_types.join(", ")
        )
    }
}
