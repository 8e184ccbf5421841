//! Newline-delimited JSON readers and writers.
//!
//! Readers never fail on a bad line: a process killed mid-write can leave a
//! truncated final line, and hand-edited files may contain garbage. Such lines
//! surface as [`NdjsonLine::Malformed`] so callers can count and skip them.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SieveError};

/// How a writer opens its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Start from an empty file.
    Truncate,
    /// Keep existing lines and add after them.
    Append,
}

/// Buffered NDJSON writer owning its output file for one stage run.
pub struct NdjsonWriter<T> {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
    _record: PhantomData<fn(&T)>,
}

impl<T: Serialize> NdjsonWriter<T> {
    /// Open `path`, creating missing parent directories.
    pub fn create(path: impl AsRef<Path>, mode: WriteMode) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            WriteMode::Truncate => options.write(true).truncate(true),
            WriteMode::Append => options.append(true),
        };
        let file = options.open(path).map_err(|e| SieveError::io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
            _record: PhantomData,
        })
    }

    /// Serialize one record as a single line.
    pub fn write(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| SieveError::io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered lines so the next stage sees the complete file.
    pub fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .map_err(|e| SieveError::io(&self.path, e))?;
        Ok(self.written)
    }
}

/// One non-blank line from an NDJSON file.
#[derive(Debug)]
pub enum NdjsonLine<T> {
    Parsed(T),
    Malformed { line: usize, error: String },
}

/// Line-by-line NDJSON reader that tolerates bad lines.
pub struct NdjsonReader<T> {
    reader: BufReader<File>,
    path: PathBuf,
    line: usize,
    buf: Vec<u8>,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> NdjsonReader<T> {
    /// Open an existing NDJSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SieveError::io(path, e))?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            line: 0,
            buf: Vec::new(),
            _record: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for NdjsonReader<T> {
    type Item = Result<NdjsonLine<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(SieveError::io(&self.path, e))),
            }
            self.line += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(s) => s.trim(),
                Err(e) => {
                    return Some(Ok(NdjsonLine::Malformed {
                        line: self.line,
                        error: e.to_string(),
                    }));
                }
            };
            if line.is_empty() {
                continue;
            }

            return Some(Ok(match serde_json::from_str(line) {
                Ok(record) => NdjsonLine::Parsed(record),
                Err(e) => NdjsonLine::Malformed {
                    line: self.line,
                    error: e.to_string(),
                },
            }));
        }
    }
}

/// Create the parent directory of `path` if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SieveError::io(parent, e))?;
        }
    }
    Ok(())
}
