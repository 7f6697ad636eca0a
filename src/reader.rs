//! Reading events from one or more event files
//!
//! Event files hold one JSON-encoded event per line. When several files are
//! given, they are read one after another as if they were a single stream.

use crate::event::Event;
use eyre::{ensure, Result, WrapErr};
use log::debug;
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

/// An event stream that is currently being read
struct Source {
    /// Name of the stream, for error reporting
    name: String,

    /// Remaining lines of the stream
    lines: Lines<Box<dyn BufRead>>,

    /// Number of the last line that was read
    line_no: usize,
}

/// Sequential reader over a chain of event files
pub struct EventReader {
    /// Files that have not been opened yet
    pending: VecDeque<PathBuf>,

    /// Stream being read
    current: Option<Source>,
}
//
impl EventReader {
    /// Prepare to read events from a list of files, in order
    ///
    /// All files are checked for existence upfront, so that a typo in the
    /// last file name is reported before spending time on the first ones.
    ///
    pub fn open<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let pending = paths
            .into_iter()
            .map(|path| path.as_ref().to_owned())
            .collect::<VecDeque<_>>();
        ensure!(!pending.is_empty(), "No input file was specified");
        for path in &pending {
            ensure!(path.is_file(), "Input file {} does not exist", path.display());
        }
        Ok(Self {
            pending,
            current: None,
        })
    }

    /// Read events from an arbitrary buffered stream
    #[cfg(test)]
    pub fn from_reader(name: impl Into<String>, stream: impl BufRead + 'static) -> Self {
        let stream: Box<dyn BufRead> = Box::new(stream);
        Self {
            pending: VecDeque::new(),
            current: Some(Source {
                name: name.into(),
                lines: stream.lines(),
                line_no: 0,
            }),
        }
    }

    /// Open the next pending file, if any
    fn open_next(&mut self) -> Result<bool> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(false);
        };
        debug!("Opening event file {}", path.display());
        let file = File::open(&path)
            .wrap_err_with(|| format!("Failed to open event file {}", path.display()))?;
        let stream: Box<dyn BufRead> = Box::new(BufReader::new(file));
        self.current = Some(Source {
            name: path.display().to_string(),
            lines: stream.lines(),
            line_no: 0,
        });
        Ok(true)
    }

    /// Read the next event, or None at the end of the last file
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            if let Some(source) = &mut self.current {
                match source.lines.next() {
                    Some(line) => {
                        source.line_no += 1;
                        let line = line.wrap_err_with(|| {
                            format!("Failed to read line {} of {}", source.line_no, source.name)
                        })?;
                        if line.trim().is_empty() {
                            continue;
                        }
                        let event = serde_json::from_str(&line).wrap_err_with(|| {
                            format!("Malformed event at line {} of {}", source.line_no, source.name)
                        })?;
                        return Ok(Some(event));
                    }
                    None => self.current = None,
                }
            } else if !self.open_next()? {
                return Ok(None);
            }
        }
    }
}

impl Iterator for EventReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Result<Event>> {
        self.next_event().transpose()
    }
}
