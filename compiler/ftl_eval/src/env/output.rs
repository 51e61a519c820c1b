//! The output writer and its capture buffers.

use std::io::{self, Write};

/// Root output is handed to the writer once this much has accumulated.
const WRITE_THRESHOLD: usize = 8 * 1024;

/// Buffered output with a stack of capture buffers.
///
/// Text goes to the innermost capture (`#attempt`, capture assignments,
/// `#compress`, function bodies) or, when none is open, to the root buffer
/// that is written through to the sink.
pub(crate) struct Output<'a> {
    sink: &'a mut dyn Write,
    root: String,
    captures: Vec<String>,
}

impl<'a> Output<'a> {
    pub(crate) fn new(sink: &'a mut dyn Write) -> Self {
        Output {
            sink,
            root: String::new(),
            captures: Vec::new(),
        }
    }

    pub(crate) fn push_str(&mut self, text: &str) -> io::Result<()> {
        match self.captures.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => {
                self.root.push_str(text);
                if self.root.len() >= WRITE_THRESHOLD {
                    self.write_root()?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn begin_capture(&mut self) {
        self.captures.push(String::new());
    }

    pub(crate) fn end_capture(&mut self) -> String {
        self.captures.pop().unwrap_or_default()
    }

    pub(crate) fn depth(&self) -> usize {
        self.captures.len()
    }

    /// Drop captures opened after `depth` was taken.
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.captures.truncate(depth);
    }

    /// `#flush`: write the root buffer and flush the sink. Output inside a
    /// capture isn't final yet, so nothing happens there.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if !self.captures.is_empty() {
            return Ok(());
        }
        self.write_root()?;
        self.sink.flush()
    }

    /// End of the render: root output is written, open captures are dropped.
    pub(crate) fn finish(&mut self) -> io::Result<()> {
        self.captures.clear();
        self.write_root()?;
        self.sink.flush()
    }

    fn write_root(&mut self) -> io::Result<()> {
        if !self.root.is_empty() {
            self.sink.write_all(self.root.as_bytes())?;
            self.root.clear();
        }
        Ok(())
    }
}
