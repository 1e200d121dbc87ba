//! Sequential record storage used by the file-driven driver
//!
//! A [`FileIo`] reads and writes [`SampleRecord`]s one at a time. The
//! driver opens a file, streams it to the end, closes it and may reopen it
//! for appending.
//!
//! Two implementations are provided:
//!
//! - [`MemoryFileIo`]: records kept in a map keyed by path
//! - [`JsonLinesFileIo`]: one JSON record per line on the local filesystem

use crate::sample::SampleRecord;
use std::io;

mod jsonl;
mod memory;

pub use jsonl::JsonLinesFileIo;
pub use memory::MemoryFileIo;

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read from the first record
    Read,
    /// Truncate, then write
    Write,
    /// Keep existing records, write after them
    Append,
}

/// A sequential reader and writer of sample records
///
/// At most one file is open at a time.
pub trait FileIo {
    fn open(&mut self, path: &str, mode: AccessMode) -> io::Result<()>;

    /// Next record, or `Ok(None)` at the end of the file
    fn read(&mut self) -> io::Result<Option<SampleRecord>>;

    fn write(&mut self, record: &SampleRecord) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()>;
}

pub(crate) fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "no file is open")
}

pub(crate) fn wrong_mode(mode: AccessMode) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("operation not permitted on a file opened for {:?}", mode),
    )
}
