//! Output sinks.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use mbean_run_core::Output;

/// Writes command output and messages to two streams.
///
/// Write failures are logged, not propagated.
pub struct WriterOutput<O, M> {
    out: Mutex<O>,
    messages: Mutex<M>,
}

impl WriterOutput<io::Stdout, io::Stderr> {
    /// Output on stdout, messages on stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O, M> WriterOutput<O, M>
where
    O: Write + Send,
    M: Write + Send,
{
    /// Create an output over `out` and `messages`.
    #[must_use]
    pub const fn new(out: O, messages: M) -> Self {
        Self {
            out: Mutex::new(out),
            messages: Mutex::new(messages),
        }
    }

    /// Recover the underlying streams.
    pub fn into_inner(self) -> (O, M) {
        (
            self.out.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.messages
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

fn write_line(stream: &Mutex<impl Write>, line: &str) {
    let mut guard = stream.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(guard, "{line}").and_then(|()| guard.flush()) {
        tracing::error!("Failed to write output: {e}");
    }
}

impl<O, M> Output for WriterOutput<O, M>
where
    O: Write + Send,
    M: Write + Send,
{
    fn print_message(&self, message: &str) {
        write_line(&self.messages, message);
    }

    fn println(&self, line: &str) {
        write_line(&self.out, line);
    }
}

/// Collects every line, messages included, in order.
#[derive(Debug, Default)]
pub struct BufferOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

impl Output for BufferOutput {
    fn print_message(&self, message: &str) {
        self.push(message);
    }

    fn println(&self, line: &str) {
        self.push(line);
    }
}

#[cfg(test)]
mod tests {
    use mbean_run_core::{Value, ValueOutputFormat};

    use super::*;

    #[test]
    fn test_writer_splits_streams() {
        let output = WriterOutput::new(Vec::new(), Vec::new());
        output.print_message("calling");
        output.print_value(&Value::Int(3), ValueOutputFormat::new(2, false));
        output.println("");

        let (out, messages) = output.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "  3\n\n");
        assert_eq!(String::from_utf8(messages).unwrap(), "calling\n");
    }

    #[test]
    fn test_buffer_keeps_order() {
        let output = BufferOutput::new();
        output.println("a");
        output.print_message("b");
        assert_eq!(output.lines(), vec!["a".to_string(), "b".to_string()]);
    }
}
