//! Resolution, coercion and invocation behind the `run` command.
//!
//! Provides:
//! - Literal unwrapping and parameter coercion
//! - Overload resolution with type hints
//! - Timed remote invocation
//! - The `run` orchestration

pub mod coerce;
pub mod command;
pub mod invoker;
pub mod literal;
pub mod resolver;

pub use coerce::{CoerceError, ParameterType, coerce};
pub use command::{RunError, RunOptions, RunRequest, execute, run, suggest_operation_names};
pub use invoker::{Invocation, Invoker, LatencyObserver};
pub use resolver::{ResolveError, TypeHints, resolve};
