use super::{not_open, wrong_mode, AccessMode, FileIo};
use crate::sample::SampleRecord;
use std::collections::HashMap;
use std::io;

#[derive(Debug)]
struct OpenFile {
    path: String,
    mode: AccessMode,
    cursor: usize,
}

/// In-memory [`FileIo`] keyed by path
#[derive(Debug, Default)]
pub struct MemoryFileIo {
    files: HashMap<String, Vec<SampleRecord>>,
    open: Option<OpenFile>,
}

impl MemoryFileIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `path`
    pub fn insert<I, R>(&mut self, path: impl Into<String>, records: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<SampleRecord>,
    {
        self.files
            .insert(path.into(), records.into_iter().map(Into::into).collect());
    }

    /// Current contents of `path`
    pub fn records(&self, path: &str) -> Option<&[SampleRecord]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

impl FileIo for MemoryFileIo {
    fn open(&mut self, path: &str, mode: AccessMode) -> io::Result<()> {
        match mode {
            AccessMode::Read => {
                if !self.files.contains_key(path) {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no such file: {}", path),
                    ));
                }
            }
            AccessMode::Write => {
                self.files.insert(path.to_owned(), Vec::new());
            }
            AccessMode::Append => {
                self.files.entry(path.to_owned()).or_default();
            }
        }
        self.open = Some(OpenFile {
            path: path.to_owned(),
            mode,
            cursor: 0,
        });
        Ok(())
    }

    fn read(&mut self) -> io::Result<Option<SampleRecord>> {
        let open = self.open.as_mut().ok_or_else(not_open)?;
        if open.mode != AccessMode::Read {
            return Err(wrong_mode(open.mode));
        }
        let record = self
            .files
            .get(&open.path)
            .and_then(|records| records.get(open.cursor))
            .cloned();
        if record.is_some() {
            open.cursor += 1;
        }
        Ok(record)
    }

    fn write(&mut self, record: &SampleRecord) -> io::Result<()> {
        let open = self.open.as_ref().ok_or_else(not_open)?;
        if open.mode == AccessMode::Read {
            return Err(wrong_mode(open.mode));
        }
        self.files
            .entry(open.path.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.open.take().map(|_| ()).ok_or_else(not_open)
    }
}
