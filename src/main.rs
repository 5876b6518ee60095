use std::{env, process};

use anyhow::{Context, Result};
use log::warn;
use station_stats::{
    config::USAGE,
    profile::{self, CpuProfiler},
    run, Config,
};

#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    let profiler = config
        .cpu_profile_path
        .as_deref()
        .map(CpuProfiler::start)
        .transpose()?;

    let stations = run(&config)
        .with_context(|| format!("failed to aggregate {}", config.input_path.display()))?;

    println!("{}", stations);

    // The summary is already out, so profiling problems only warn
    if let Some(profiler) = profiler {
        if let Err(e) = profiler.finish() {
            warn!("{}", e);
        }
    }
    if let Some(path) = &config.mem_profile_path {
        if let Err(e) = profile::write_memory_report(path, &stations) {
            warn!("{}", e);
        }
    }

    Ok(())
}
