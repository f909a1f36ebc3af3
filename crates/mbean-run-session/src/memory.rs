//! In-process management connection.

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use mbean_run_core::{
    ConnectionError, ManagementConnection, ObjectName, OperationDescriptor, STRING_TYPE, Value,
};
use thiserror::Error;

/// Operation implementation: receives the typed arguments.
type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, ConnectionError> + Send + Sync>;

struct RegisteredOperation {
    descriptor: OperationDescriptor,
    handler: Handler,
}

/// A call that reached the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub target: ObjectName,
    pub operation: String,
    pub args: Vec<Value>,
    pub signature: Vec<String>,
}

/// Memory connection error.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Internal(String),
    #[error("Invalid descriptor list: {0}")]
    Json(#[from] serde_json::Error),
}

fn poisoned<T>(e: PoisonError<T>) -> ConnectionError {
    ConnectionError::Protocol(e.to_string())
}

/// In-memory management connection.
///
/// Useful for development, demos and tests. Operations are reported in
/// registration order, so overload ties resolve deterministically.
pub struct MemoryConnection {
    beans: RwLock<HashMap<ObjectName, Vec<RegisteredOperation>>>,
    calls: RwLock<Vec<RecordedCall>>,
    metadata_requests: AtomicUsize,
}

impl MemoryConnection {
    /// Create an empty connection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            beans: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            metadata_requests: AtomicUsize::new(0),
        }
    }

    /// Expose `descriptor` on `bean`, creating the bean if needed.
    ///
    /// # Errors
    /// Returns error if the bean table is poisoned.
    pub fn register<F>(
        &self,
        bean: &ObjectName,
        descriptor: OperationDescriptor,
        handler: F,
    ) -> Result<(), MemoryError>
    where
        F: Fn(&[Value]) -> Result<Value, ConnectionError> + Send + Sync + 'static,
    {
        self.beans
            .write()
            .map_err(|e| MemoryError::Internal(e.to_string()))?
            .entry(bean.clone())
            .or_default()
            .push(RegisteredOperation {
                descriptor,
                handler: Arc::new(handler),
            });
        Ok(())
    }

    /// Expose a JSON list of descriptors on `bean`.
    ///
    /// Each operation answers with the zero value of its return type.
    /// Returns the number of operations added.
    ///
    /// # Errors
    /// Returns error if `json` is not a descriptor list.
    pub fn load_descriptors(&self, bean: &ObjectName, json: &str) -> Result<usize, MemoryError> {
        let descriptors: Vec<OperationDescriptor> = serde_json::from_str(json)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            let result = zero_value(&descriptor.return_type);
            self.register(bean, descriptor, move |_| Ok(result.clone()))?;
        }
        Ok(count)
    }

    /// Calls received so far, oldest first.
    ///
    /// # Errors
    /// Returns error if the call log is poisoned.
    pub fn calls(&self) -> Result<Vec<RecordedCall>, MemoryError> {
        Ok(self
            .calls
            .read()
            .map_err(|e| MemoryError::Internal(e.to_string()))?
            .clone())
    }

    /// Number of metadata fetches served.
    #[must_use]
    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::SeqCst)
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

fn zero_value(type_name: &str) -> Value {
    match type_name {
        "boolean" | "java.lang.Boolean" => Value::Boolean(false),
        "int" | "java.lang.Integer" => Value::Int(0),
        "long" | "java.lang.Long" => Value::Long(0),
        "double" | "java.lang.Double" => Value::Double(0.0),
        STRING_TYPE => Value::String(String::new()),
        _ => Value::Null,
    }
}

#[async_trait]
impl ManagementConnection for MemoryConnection {
    async fn operations(
        &self,
        target: &ObjectName,
    ) -> Result<Vec<OperationDescriptor>, ConnectionError> {
        self.metadata_requests.fetch_add(1, Ordering::SeqCst);
        let beans = self.beans.read().map_err(poisoned)?;
        let operations = beans
            .get(target)
            .ok_or_else(|| ConnectionError::InstanceNotFound(target.clone()))?;
        Ok(operations.iter().map(|op| op.descriptor.clone()).collect())
    }

    async fn invoke(
        &self,
        target: &ObjectName,
        operation: &str,
        args: &[Value],
        signature: &[String],
    ) -> Result<Value, ConnectionError> {
        let handler = {
            let beans = self.beans.read().map_err(poisoned)?;
            let operations = beans
                .get(target)
                .ok_or_else(|| ConnectionError::InstanceNotFound(target.clone()))?;
            operations
                .iter()
                .find(|op| op.descriptor.name == operation && op.descriptor.parameter_types == signature)
                .map(|op| Arc::clone(&op.handler))
                .ok_or_else(|| ConnectionError::OperationNotFound {
                    target: target.clone(),
                    operation: operation.to_string(),
                    signature: signature.join(", "),
                })?
        };

        self.calls.write().map_err(poisoned)?.push(RecordedCall {
            target: target.clone(),
            operation: operation.to_string(),
            args: args.to_vec(),
            signature: signature.to_vec(),
        });
        tracing::debug!(bean = %target, operation, "memory connection invoked");

        (*handler)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bean() -> ObjectName {
        ObjectName::new("demo:type=Echo")
    }

    #[tokio::test]
    async fn test_operations_in_registration_order() {
        let connection = MemoryConnection::new();
        connection
            .register(&bean(), OperationDescriptor::new("b", ["int"]), |_| Ok(Value::Null))
            .unwrap();
        connection
            .register(&bean(), OperationDescriptor::new("a", Vec::<String>::new()), |_| {
                Ok(Value::Null)
            })
            .unwrap();

        let ops = connection.operations(&bean()).await.unwrap();
        let names: Vec<_> = ops.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(connection.metadata_requests(), 1);
    }

    #[tokio::test]
    async fn test_unknown_bean() {
        let connection = MemoryConnection::new();
        let err = connection.operations(&bean()).await.unwrap_err();
        assert!(matches!(err, ConnectionError::InstanceNotFound(name) if name == bean()));
    }

    #[tokio::test]
    async fn test_invoke_matches_exact_signature() {
        let connection = MemoryConnection::new();
        connection
            .register(&bean(), OperationDescriptor::new("echo", [STRING_TYPE]), |args| {
                Ok(args[0].clone())
            })
            .unwrap();

        let signature = vec![STRING_TYPE.to_string()];
        let result = connection
            .invoke(&bean(), "echo", &[Value::from("hi")], &signature)
            .await
            .unwrap();
        assert_eq!(result, Value::from("hi"));

        let err = connection
            .invoke(&bean(), "echo", &[Value::Int(1)], &["int".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::OperationNotFound { .. }));
        assert_eq!(connection.calls().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_descriptors() {
        let connection = MemoryConnection::new();
        let json = r#"[
            {"name": "gc"},
            {"name": "count", "parameter_types": ["java.lang.String"], "return_type": "long"}
        ]"#;
        assert_eq!(connection.load_descriptors(&bean(), json).unwrap(), 2);

        let result = connection
            .invoke(&bean(), "count", &[Value::from("x")], &[STRING_TYPE.to_string()])
            .await
            .unwrap();
        assert_eq!(result, Value::Long(0));

        assert!(matches!(
            connection.load_descriptors(&bean(), "{not json"),
            Err(MemoryError::Json(_))
        ));
    }
}
