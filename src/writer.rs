//! Writing events to an event file

use crate::event::Event;
use eyre::{Result, WrapErr};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Writer of JSON Lines event files
pub struct EventWriter<Stream: Write> {
    stream: BufWriter<Stream>,
    written: usize,
}
//
impl EventWriter<File> {
    /// Create (or truncate) an event file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create event file {}", path.display()))?;
        Ok(Self::new(file))
    }
}
//
impl<Stream: Write> EventWriter<Stream> {
    /// Write events into an arbitrary stream
    pub fn new(stream: Stream) -> Self {
        Self {
            stream: BufWriter::new(stream),
            written: 0,
        }
    }

    /// Append one event
    pub fn write(&mut self, event: &Event) -> Result<()> {
        serde_json::to_writer(&mut self.stream, event)?;
        self.stream.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush everything to the underlying stream, returning the event count
    pub fn finish(mut self) -> Result<usize> {
        self.stream.flush()?;
        Ok(self.written)
    }
}
