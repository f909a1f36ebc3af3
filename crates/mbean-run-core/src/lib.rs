//! Core abstractions for remote MBean operation invocation.
//!
//! This crate provides the fundamental building blocks:
//! - `ObjectName` / `OperationDescriptor` - Remote object and operation metadata
//! - `Value` / `TypedArgument` - Values exchanged with the remote side
//! - `ValueOutputFormat` - Indented rendering of result values
//! - Connection, bean resolution and output traits

pub mod descriptor;
pub mod format;
pub mod traits;
pub mod value;

pub use descriptor::{ObjectName, OperationDescriptor, STRING_TYPE};
pub use format::ValueOutputFormat;
pub use traits::{BeanResolver, ConnectionError, ManagementConnection, Output};
pub use value::{TypedArgument, Value};
