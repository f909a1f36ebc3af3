//! Remote invocation with optional latency measurement.

use std::time::{Duration, Instant};

use mbean_run_core::{
    ConnectionError, ManagementConnection, ObjectName, OperationDescriptor, TypedArgument, Value,
};

/// Receives the latency of a measured invocation.
pub trait LatencyObserver: Send + Sync {
    fn observe(&self, latency: Duration);
}

/// Outcome of one remote call.
#[derive(Debug)]
pub struct Invocation {
    /// Remote result or error, passed through unchanged.
    pub result: Result<Value, ConnectionError>,
    /// Elapsed time, when measured.
    pub latency: Option<Duration>,
}

/// Reports elapsed time exactly once, on `stop` or when dropped.
///
/// Dropping covers unwinding and cancellation of the enclosing future.
struct Stopwatch<'a> {
    started: Instant,
    observer: &'a dyn LatencyObserver,
    reported: bool,
}

impl<'a> Stopwatch<'a> {
    fn start(observer: &'a dyn LatencyObserver) -> Self {
        Self {
            started: Instant::now(),
            observer,
            reported: false,
        }
    }

    fn stop(mut self) -> Duration {
        let latency = self.started.elapsed();
        self.reported = true;
        self.observer.observe(latency);
        latency
    }
}

impl Drop for Stopwatch<'_> {
    fn drop(&mut self) {
        if !self.reported {
            self.reported = true;
            self.observer.observe(self.started.elapsed());
        }
    }
}

/// Performs remote calls against resolved descriptors.
pub struct Invoker<'c, C: ?Sized> {
    connection: &'c C,
}

impl<'c, C> Invoker<'c, C>
where
    C: ManagementConnection + ?Sized,
{
    #[must_use]
    pub const fn new(connection: &'c C) -> Self {
        Self { connection }
    }

    /// Call `operation` on `target` exactly once.
    ///
    /// With an observer the call is timed and the observer notified on every
    /// exit path, including a panic in the connection.
    pub async fn invoke(
        &self,
        target: &ObjectName,
        operation: &OperationDescriptor,
        args: &[TypedArgument],
        measure: Option<&dyn LatencyObserver>,
    ) -> Invocation {
        let values: Vec<Value> = args.iter().map(|a| a.value.clone()).collect();
        let signature = &operation.parameter_types;

        let Some(observer) = measure else {
            let result = self
                .connection
                .invoke(target, &operation.name, &values, signature)
                .await;
            return Invocation {
                result,
                latency: None,
            };
        };

        let stopwatch = Stopwatch::start(observer);
        let result = self
            .connection
            .invoke(target, &operation.name, &values, signature)
            .await;
        let latency = stopwatch.stop();
        tracing::debug!(bean = %target, latency_ms = latency.as_millis(), "invocation timed");

        Invocation {
            result,
            latency: Some(latency),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{panic::AssertUnwindSafe, sync::Mutex};

    use async_trait::async_trait;
    use futures::FutureExt;
    use mbean_run_session::MemoryConnection;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    impl LatencyObserver for Recorder {
        fn observe(&self, latency: Duration) {
            self.0.lock().unwrap().push(latency);
        }
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    struct Panicking;

    #[async_trait]
    impl ManagementConnection for Panicking {
        async fn operations(
            &self,
            _target: &ObjectName,
        ) -> Result<Vec<OperationDescriptor>, ConnectionError> {
            Ok(vec![])
        }

        async fn invoke(
            &self,
            _target: &ObjectName,
            _operation: &str,
            _args: &[Value],
            _signature: &[String],
        ) -> Result<Value, ConnectionError> {
            panic!("connection dropped mid-call")
        }
    }

    fn counter() -> (MemoryConnection, ObjectName) {
        let bean = ObjectName::new("demo:type=Counter");
        let connection = MemoryConnection::new();
        connection
            .register(&bean, OperationDescriptor::new("add", ["int", "int"]).returns("int"), |args| {
                match args {
                    [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
                    _ => Err(ConnectionError::Remote("bad arguments".to_string())),
                }
            })
            .unwrap();
        connection
            .register(&bean, OperationDescriptor::new("fail", Vec::<String>::new()), |_| {
                Err(ConnectionError::Remote("boom".to_string()))
            })
            .unwrap();
        (connection, bean)
    }

    #[tokio::test]
    async fn test_passes_values_and_signature() {
        let (connection, bean) = counter();
        let op = OperationDescriptor::new("add", ["int", "int"]).returns("int");
        let args = [
            TypedArgument::new(Value::Int(2), "int"),
            TypedArgument::new(Value::Int(3), "int"),
        ];

        let invocation = Invoker::new(&connection).invoke(&bean, &op, &args, None).await;
        assert_eq!(invocation.result.unwrap(), Value::Int(5));
        assert!(invocation.latency.is_none());

        let calls = connection.calls().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].signature, vec!["int".to_string(), "int".to_string()]);
    }

    #[tokio::test]
    async fn test_measured_success_reports_once() {
        let (connection, bean) = counter();
        let op = OperationDescriptor::new("add", ["int", "int"]).returns("int");
        let args = [
            TypedArgument::new(Value::Int(1), "int"),
            TypedArgument::new(Value::Int(1), "int"),
        ];
        let recorder = Recorder::default();

        let invocation = Invoker::new(&connection)
            .invoke(&bean, &op, &args, Some(&recorder))
            .await;
        assert!(invocation.result.is_ok());
        assert!(invocation.latency.is_some());
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_measured_failure_still_reports() {
        let (connection, bean) = counter();
        let op = OperationDescriptor::new("fail", Vec::<String>::new());
        let recorder = Recorder::default();

        let invocation = tokio_test::block_on(
            Invoker::new(&connection).invoke(&bean, &op, &[], Some(&recorder)),
        );
        assert!(matches!(invocation.result, Err(ConnectionError::Remote(_))));
        assert!(invocation.latency.is_some());
        assert_eq!(recorder.count(), 1);
    }

    #[tokio::test]
    async fn test_measured_panic_still_reports() {
        let bean = ObjectName::new("demo:type=Broken");
        let op = OperationDescriptor::new("explode", Vec::<String>::new());
        let recorder = Recorder::default();

        let outcome = AssertUnwindSafe(Invoker::new(&Panicking).invoke(&bean, &op, &[], Some(&recorder)))
            .catch_unwind()
            .await;
        assert!(outcome.is_err());
        assert_eq!(recorder.count(), 1);
    }
}
