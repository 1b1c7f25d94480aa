//! Shared helpers for unit tests

use crate::cli::OutputFormat;
use crate::output::OutputWriter;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-memory writer that stays readable after being handed to an `OutputWriter`
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A colorless, non-quiet writer and the buffer it writes to
pub fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, false, Box::new(buffer.clone()));
    (writer, buffer)
}
