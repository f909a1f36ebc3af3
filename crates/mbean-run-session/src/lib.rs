//! Session collaborators for the `run` command.
//!
//! Provides:
//! - `SessionBeans` - Current bean and domain of an interactive session
//! - `WriterOutput` / `BufferOutput` - Output sinks
//! - `MemoryConnection` - In-process management connection (feature: memory)

pub mod beans;
pub mod output;

#[cfg(feature = "memory")]
pub mod memory;

pub use beans::SessionBeans;
#[cfg(feature = "memory")]
pub use memory::{MemoryConnection, MemoryError, RecordedCall};
pub use output::{BufferOutput, WriterOutput};
