//! Output sinks that reporters write to.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A destination for reporter text.
pub trait Output {
    /// Writes the given text without a trailing newline.
    fn write(&mut self, text: &str) -> std::io::Result<()>;

    /// Writes the given text followed by a newline.
    fn writeln(&mut self, text: &str) -> std::io::Result<()> {
        self.write(text)?;
        self.write("\n")
    }
}

/// An output shared between a reporter and its listeners.
pub type SharedOutput = Rc<RefCell<dyn Output>>;

/// Output backed by any [`std::io::Write`] implementation.
pub struct WriterOutput<W: Write> {
    writer: W,
}

impl<W: Write> WriterOutput<W> {
    /// Wraps the given writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwraps the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Output for WriterOutput<W> {
    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn writeln(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{text}")?;
        self.writer.flush()
    }
}

/// Returns an output that writes to the process's standard output.
pub fn stdout() -> SharedOutput {
    Rc::new(RefCell::new(WriterOutput::new(std::io::stdout())))
}

/// Output that accumulates everything written to it in memory.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    buffer: String,
}

impl BufferedOutput {
    /// Returns a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Returns everything written so far and clears the buffer.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

impl Output for BufferedOutput {
    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}
