//! Beans served by the demo connection.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::Duration,
};

use mbean_run_core::{ConnectionError, ObjectName, OperationDescriptor, STRING_TYPE, Value};
use mbean_run_session::{MemoryConnection, MemoryError};

pub const COUNTER: &str = "demo:type=Counter";
pub const TEXT: &str = "demo:type=Text";
pub const MEMORY: &str = "java.lang:type=Memory";

/// Longest pause `sleep` will take.
const MAX_SLEEP: Duration = Duration::from_secs(1);

const MEMORY_OPERATIONS: &str = r#"[
    {"name": "gc"},
    {"name": "getObjectPendingFinalizationCount", "return_type": "int"}
]"#;

fn bad_arguments(args: &[Value]) -> ConnectionError {
    ConnectionError::Remote(format!("java.lang.IllegalArgumentException: {args:?}"))
}

/// A connection exposing a counter, some text utilities and a memory bean.
pub fn connection() -> Result<MemoryConnection, MemoryError> {
    let connection = MemoryConnection::new();
    register_counter(&connection)?;
    register_text(&connection)?;
    connection.load_descriptors(&ObjectName::new(MEMORY), MEMORY_OPERATIONS)?;
    Ok(connection)
}

fn register_counter(connection: &MemoryConnection) -> Result<(), MemoryError> {
    let bean = ObjectName::new(COUNTER);
    let count = Arc::new(AtomicI64::new(0));

    let c = Arc::clone(&count);
    connection.register(&bean, OperationDescriptor::new("reset", Vec::<String>::new()), move |_| {
        c.store(0, Ordering::SeqCst);
        Ok(Value::Null)
    })?;

    let c = Arc::clone(&count);
    connection.register(
        &bean,
        OperationDescriptor::new("get", Vec::<String>::new()).returns("long"),
        move |_| Ok(Value::Long(c.load(Ordering::SeqCst))),
    )?;

    let c = Arc::clone(&count);
    connection.register(
        &bean,
        OperationDescriptor::new("add", ["long"]).returns("long"),
        move |args| match args {
            [Value::Long(n)] => {
                let previous = c.fetch_add(*n, Ordering::SeqCst);
                Ok(Value::Long(previous.wrapping_add(*n)))
            }
            _ => Err(bad_arguments(args)),
        },
    )?;

    let c = Arc::clone(&count);
    connection.register(&bean, OperationDescriptor::new("set", ["int"]), move |args| match args {
        [Value::Int(n)] => {
            c.store(i64::from(*n), Ordering::SeqCst);
            Ok(Value::Null)
        }
        _ => Err(bad_arguments(args)),
    })?;

    let c = Arc::clone(&count);
    connection.register(&bean, OperationDescriptor::new("set", [STRING_TYPE]), move |args| {
        match args {
            [Value::String(s)] => {
                let n = s
                    .trim()
                    .parse()
                    .map_err(|_| ConnectionError::Remote(format!("java.lang.NumberFormatException: {s}")))?;
                c.store(n, Ordering::SeqCst);
                Ok(Value::Null)
            }
            _ => Err(bad_arguments(args)),
        }
    })?;

    // Handlers are synchronous, so this blocks the runtime thread; keep it short.
    connection.register(&bean, OperationDescriptor::new("sleep", ["long"]), |args| match args {
        [Value::Long(ms)] => {
            let pause = Duration::from_millis(u64::try_from(*ms).unwrap_or(0));
            std::thread::sleep(pause.min(MAX_SLEEP));
            Ok(Value::Null)
        }
        _ => Err(bad_arguments(args)),
    })?;

    Ok(())
}

fn register_text(connection: &MemoryConnection) -> Result<(), MemoryError> {
    let bean = ObjectName::new(TEXT);

    connection.register(
        &bean,
        OperationDescriptor::new("echo", [STRING_TYPE]).returns(STRING_TYPE),
        |args| Ok(args.first().cloned().unwrap_or(Value::Null)),
    )?;

    connection.register(
        &bean,
        OperationDescriptor::new("join", ["[Ljava.lang.String;", STRING_TYPE]).returns(STRING_TYPE),
        |args| match args {
            [Value::Array(items), Value::String(sep)] => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                Ok(Value::String(parts.join(sep)))
            }
            _ => Err(bad_arguments(args)),
        },
    )?;

    connection.register(
        &bean,
        OperationDescriptor::new("stats", ["[I"]).returns("javax.management.openmbean.CompositeData"),
        |args| match args {
            [Value::Array(items)] => {
                let numbers: Vec<i64> = items
                    .iter()
                    .filter_map(|v| match v {
                        Value::Int(n) => Some(i64::from(*n)),
                        _ => None,
                    })
                    .collect();
                let mut fields = BTreeMap::new();
                fields.insert("count".to_string(), Value::Int(i32::try_from(numbers.len()).unwrap_or(i32::MAX)));
                fields.insert("sum".to_string(), Value::Long(numbers.iter().sum()));
                fields.insert(
                    "sorted".to_string(),
                    Value::Array({
                        let mut sorted = numbers.clone();
                        sorted.sort_unstable();
                        sorted.into_iter().map(Value::Long).collect()
                    }),
                );
                Ok(Value::Composite(fields))
            }
            _ => Err(bad_arguments(args)),
        },
    )?;

    connection.register(&bean, OperationDescriptor::new("fail", Vec::<String>::new()), |_| {
        Err(ConnectionError::Remote(
            "java.lang.UnsupportedOperationException: always fails".to_string(),
        ))
    })?;

    Ok(())
}
