//! Optional CPU and memory profiling around a run.

use std::{
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use pprof::{protos::Message, ProfilerGuard, ProfilerGuardBuilder};

use crate::{error::Error, Result, Stations};

const SAMPLE_FREQUENCY: i32 = 1000;

impl Error {
    fn profile(path: &Path, message: impl fmt::Display) -> Self {
        Error::Profile {
            path: path.to_owned(),
            message: message.to_string(),
        }
    }
}

/// Samples the process until [`CpuProfiler::finish`] writes the report.
pub struct CpuProfiler {
    guard: ProfilerGuard<'static>,
    path: PathBuf,
}

impl CpuProfiler {
    pub fn start(path: &Path) -> Result<Self> {
        let guard = ProfilerGuardBuilder::default()
            .frequency(SAMPLE_FREQUENCY)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()
            .map_err(|e| Error::profile(path, e))?;
        Ok(Self {
            guard,
            path: path.to_owned(),
        })
    }

    /// Flamegraph SVG if the path ends in `.svg`, pprof protobuf otherwise.
    pub fn finish(self) -> Result<()> {
        let path = &self.path;
        let report = self
            .guard
            .report()
            .build()
            .map_err(|e| Error::profile(path, e))?;
        let file = File::create(path).map_err(|e| Error::io(path, e))?;

        if path.extension().is_some_and(|ext| ext == "svg") {
            report.flamegraph(file).map_err(|e| Error::profile(path, e))?;
        } else {
            let profile = report.pprof().map_err(|e| Error::profile(path, e))?;
            let mut content = Vec::new();
            profile
                .encode(&mut content)
                .map_err(|e| Error::profile(path, e))?;
            let mut file = file;
            file.write_all(&content).map_err(|e| Error::io(path, e))?;
        }
        info!("Wrote CPU profile to {}", path.display());
        Ok(())
    }
}

/// Allocator statistics after the run, one `key value` pair per line.
pub fn write_memory_report(path: &Path, stations: &Stations) -> Result<()> {
    jemalloc_ctl::epoch::advance().map_err(|e| Error::profile(path, e))?;
    let allocated = jemalloc_ctl::stats::allocated::read().map_err(|e| Error::profile(path, e))?;
    let resident = jemalloc_ctl::stats::resident::read().map_err(|e| Error::profile(path, e))?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "allocated_bytes {}", allocated)
        .and_then(|_| writeln!(out, "resident_bytes {}", resident))
        .and_then(|_| writeln!(out, "stations {}", stations.len()))
        .and_then(|_| out.flush())
        .map_err(|e| Error::io(path, e))?;
    info!("Wrote memory profile to {}", path.display());
    Ok(())
}
