//! Collaborator traits: remote connection, bean resolution and output.

use async_trait::async_trait;
use thiserror::Error;

use crate::{ObjectName, OperationDescriptor, Value, ValueOutputFormat};

/// Connection error.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Bean not found: {0}")]
    InstanceNotFound(ObjectName),
    #[error("Operation {operation}({signature}) not found in bean {target}")]
    OperationNotFound {
        target: ObjectName,
        operation: String,
        signature: String,
    },
    #[error("Remote exception: {0}")]
    Remote(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Connection to a remote management endpoint.
///
/// Each method is one round trip; implementations must not cache metadata
/// on behalf of the caller.
#[async_trait]
pub trait ManagementConnection: Send + Sync {
    /// Fetch the operations currently exposed by `target`, in the order the
    /// remote side reports them.
    async fn operations(&self, target: &ObjectName)
    -> Result<Vec<OperationDescriptor>, ConnectionError>;

    /// Invoke `operation` on `target` with already typed arguments.
    ///
    /// `signature` holds the declared parameter type names, one per argument.
    async fn invoke(
        &self,
        target: &ObjectName,
        operation: &str,
        args: &[Value],
        signature: &[String],
    ) -> Result<Value, ConnectionError>;
}

/// Turns the `-b`/`-d` pair into the bean to talk to.
pub trait BeanResolver: Send + Sync {
    /// Resolve the target bean, `None` if neither argument nor session state
    /// yields one.
    fn resolve(&self, bean: Option<&str>, domain: Option<&str>) -> Option<ObjectName>;
}

/// Sink for command output.
pub trait Output: Send + Sync {
    /// Informational message about what the command is doing.
    fn print_message(&self, message: &str);

    /// A line of command output.
    fn println(&self, line: &str);

    /// A result value rendered with `format`.
    fn print_value(&self, value: &Value, format: ValueOutputFormat) {
        self.println(&format.format(value));
    }
}
