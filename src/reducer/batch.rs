//! File-driven batch reduction

use super::config::RwrConfig;
use super::rolling::RollingWindowReducer;
use crate::error::{IoPhase, ReduceError};
use crate::fileio::{AccessMode, FileIo};
use crate::sample::{AddPointsInput, SamplePoint, SampleRecord};
use std::io;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Tuning for [`reduce`] and [`reduce_files`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Buffer budget per `add_points` call
    ///
    /// A point costs one unit per metric value; an error costs its encoded
    /// size in bytes.
    pub max_buffer_size: usize,
    /// Seed for the reservoir generator; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            max_buffer_size: 100_000,
            seed: None,
        }
    }
}

impl DriverOptions {
    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Closes the open file when dropped unless [`finish`](Self::finish) ran
struct OpenFile<'a, F: FileIo + ?Sized> {
    file_io: &'a mut F,
    path: &'a str,
    closed: bool,
}

impl<'a, F: FileIo + ?Sized> OpenFile<'a, F> {
    fn open(file_io: &'a mut F, path: &'a str, mode: AccessMode) -> Result<Self, ReduceError> {
        file_io
            .open(path, mode)
            .map_err(|e| ReduceError::io(IoPhase::Open, path, e))?;
        Ok(Self {
            file_io,
            path,
            closed: false,
        })
    }

    fn finish(mut self) -> io::Result<()> {
        self.closed = true;
        self.file_io.close()
    }
}

impl<F: FileIo + ?Sized> Deref for OpenFile<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.file_io
    }
}

impl<F: FileIo + ?Sized> DerefMut for OpenFile<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.file_io
    }
}

impl<F: FileIo + ?Sized> Drop for OpenFile<'_, F> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.file_io.close() {
            warn!(path = self.path, error = %err, "closing file failed");
        }
    }
}

fn flush_batch(reducer: &mut RollingWindowReducer, batch: &mut AddPointsInput, path: &str, units: usize) {
    debug!(
        path,
        points = batch.points.len(),
        errors = batch.errors.len(),
        units,
        "adding batch"
    );
    reducer.add_points(batch);
    batch.clear();
}

/// Stream every record of the open file into `reducer` in bounded batches
fn process_file_data<F: FileIo + ?Sized>(
    file: &mut OpenFile<'_, F>,
    reducer: &mut RollingWindowReducer,
    options: &DriverOptions,
) -> Result<(), ReduceError> {
    let path = file.path;
    let mut batch = AddPointsInput::new();
    let mut buffer_size = 0usize;

    while let Some(record) = file
        .read()
        .map_err(|e| ReduceError::io(IoPhase::Read, path, e))?
    {
        match record {
            SampleRecord::SamplePoint(point) => {
                buffer_size += point.metric_values.len();
                batch.points.push(point);
            }
            SampleRecord::SampleError(error) => {
                buffer_size += error.encoded_len();
                batch.errors.push(error);
            }
        }

        if buffer_size >= options.max_buffer_size {
            flush_batch(reducer, &mut batch, path, buffer_size);
            buffer_size = 0;
        }
    }

    if !batch.is_empty() {
        flush_batch(reducer, &mut batch, path, buffer_size);
    }
    Ok(())
}

/// Reduce the records of several files with one merged reducer
///
/// Files are read in order, each opened for reading and closed afterwards.
/// Nothing is written.
pub fn reduce_files<F, P>(
    paths: &[P],
    configs: &[RwrConfig],
    file_io: &mut F,
    options: &DriverOptions,
) -> Result<Vec<SamplePoint>, ReduceError>
where
    F: FileIo + ?Sized,
    P: AsRef<str>,
{
    let mut reducer = match options.seed {
        Some(seed) => RollingWindowReducer::with_seed(configs, seed)?,
        None => RollingWindowReducer::new_merged(configs)?,
    };

    for path in paths {
        let path = path.as_ref();
        let mut file = OpenFile::open(&mut *file_io, path, AccessMode::Read)?;
        process_file_data(&mut file, &mut reducer, options)?;
        file.finish()
            .map_err(|e| ReduceError::io(IoPhase::Read, path, e))?;
    }

    Ok(reducer.complete().points)
}

/// Reduce one file and append the reduced points to it
///
/// Returns the number of records appended.
pub fn reduce<F: FileIo + ?Sized>(
    path: &str,
    configs: &[RwrConfig],
    file_io: &mut F,
    options: &DriverOptions,
) -> Result<usize, ReduceError> {
    let points = reduce_files(&[path], configs, file_io, options)?;

    let mut file = OpenFile::open(file_io, path, AccessMode::Append)?;
    let written = points.len();
    for point in points {
        file.write(&SampleRecord::SamplePoint(point))
            .map_err(|e| ReduceError::io(IoPhase::Write, path, e))?;
    }
    file.finish()
        .map_err(|e| ReduceError::io(IoPhase::Write, path, e))?;

    Ok(written)
}
