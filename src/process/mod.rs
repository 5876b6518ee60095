//! Driving loops: read lines, parse them, and fold them into a [`Stations`]
//! table.

pub mod parallel;
pub mod sequential;
pub mod stream;

use std::{fs::File, path::Path, time::Instant};

use log::{debug, info};

use crate::{
    config::{Config, Mode},
    error::{Error, Result},
    lines, Stations,
};

/// Aggregate the file named by `config` with the configured strategy.
pub fn run(config: &Config) -> Result<Stations> {
    let path = &config.input_path;
    let progress = config.progress_interval_lines;
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let start = Instant::now();
    debug!("Processing {} in {:?} mode", path.display(), config.mode);
    let stations = match config.mode {
        Mode::Sequential => with_mmap(&file, path, |buf| sequential::process(buf, progress))?,
        Mode::Parallel { threads } => {
            with_mmap(&file, path, |buf| parallel::process(buf, threads, progress))?
        }
        Mode::Stream => stream::process(file, path, progress)?,
    };
    debug!(
        "Aggregated {} stations in {:.2?}",
        stations.len(),
        start.elapsed()
    );

    Ok(stations)
}

fn with_mmap<F>(file: &File, path: &Path, process: F) -> Result<Stations>
where
    F: FnOnce(&[u8]) -> Result<Stations>,
{
    let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
    // Zero length mappings are rejected by the OS
    if len == 0 {
        debug!("{} is empty", path.display());
        return Ok(Stations::default());
    }
    let mmap = lines::mmap(file).map_err(|e| Error::io(path, e))?;
    process(&mmap)
}

/// Logs every `interval` lines.
pub(crate) struct Progress {
    interval: u64,
    lines: u64,
    next: u64,
    /// Byte offset of the chunk being counted, in parallel mode
    chunk: Option<usize>,
}

impl Progress {
    pub(crate) fn new(interval: Option<u64>) -> Self {
        let interval = interval.unwrap_or(u64::MAX);
        Self {
            interval,
            lines: 0,
            next: interval,
            chunk: None,
        }
    }

    /// Counts the lines of one chunk; every worker logs on its own.
    pub(crate) fn for_chunk(interval: Option<u64>, base: usize) -> Self {
        Self {
            chunk: Some(base),
            ..Self::new(interval)
        }
    }

    /// Returns whether this line was logged.
    #[inline]
    pub(crate) fn tick(&mut self) -> bool {
        self.lines += 1;
        if self.lines != self.next {
            return false;
        }
        match self.chunk {
            Some(base) => info!("Parsed {} lines of chunk at byte {}", self.lines, base),
            None => info!("Parsed {} lines", self.lines),
        }
        self.next = self.next.saturating_add(self.interval);
        true
    }

    pub(crate) fn lines(&self) -> u64 {
        self.lines
    }
}
