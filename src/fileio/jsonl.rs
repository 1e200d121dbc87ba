use super::{not_open, wrong_mode, AccessMode, FileIo};
use crate::sample::SampleRecord;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug)]
enum Handle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

/// Local-filesystem [`FileIo`] storing one JSON [`SampleRecord`] per line
///
/// Paths are resolved against an optional root directory. Blank lines are
/// skipped; a line that does not decode is an [`io::ErrorKind::InvalidData`]
/// error.
#[derive(Debug, Default)]
pub struct JsonLinesFileIo {
    root: Option<PathBuf>,
    handle: Option<Handle>,
    line: String,
}

impl JsonLinesFileIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl FileIo for JsonLinesFileIo {
    fn open(&mut self, path: &str, mode: AccessMode) -> io::Result<()> {
        let path = self.resolve(path);
        let handle = match mode {
            AccessMode::Read => Handle::Reader(BufReader::new(File::open(path)?)),
            AccessMode::Write => Handle::Writer(BufWriter::new(File::create(path)?)),
            AccessMode::Append => Handle::Writer(BufWriter::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
        };
        self.handle = Some(handle);
        Ok(())
    }

    fn read(&mut self) -> io::Result<Option<SampleRecord>> {
        let reader = match self.handle.as_mut() {
            Some(Handle::Reader(reader)) => reader,
            Some(Handle::Writer(_)) => return Err(wrong_mode(AccessMode::Write)),
            None => return Err(not_open()),
        };

        loop {
            self.line.clear();
            if reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str(line)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        }
    }

    fn write(&mut self, record: &SampleRecord) -> io::Result<()> {
        let writer = match self.handle.as_mut() {
            Some(Handle::Writer(writer)) => writer,
            Some(Handle::Reader(_)) => return Err(wrong_mode(AccessMode::Read)),
            None => return Err(not_open()),
        };
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")
    }

    fn close(&mut self) -> io::Result<()> {
        match self.handle.take() {
            Some(Handle::Writer(mut writer)) => writer.flush(),
            Some(Handle::Reader(_)) => Ok(()),
            None => Err(not_open()),
        }
    }
}
