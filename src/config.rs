use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 50_000_000;

pub const USAGE: &str = "\
usage: station-stats --file <path> [options]

options:
    --file <path>          measurements file, one `<station>;<value>` per line
    --threads <n>          aggregate with n worker threads (default 1)
    --stream               read lines on a background thread instead of mmap
    --progress <lines>     log progress every n lines (per worker with --threads),
                           0 disables (default 50000000)
    --cpuprofile <path>    write a CPU profile (.svg for a flamegraph, else pprof protobuf)
    --memprofile <path>    write allocator statistics after the run";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single pass over the memory mapped file.
    Sequential,
    /// Line aligned chunks aggregated on a thread pool and merged.
    Parallel { threads: usize },
    /// Lines read on a background thread and handed over a channel.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_path: PathBuf,
    pub progress_interval_lines: Option<u64>,
    pub cpu_profile_path: Option<PathBuf>,
    pub mem_profile_path: Option<PathBuf>,
    pub mode: Mode,
}

impl Config {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            progress_interval_lines: Some(DEFAULT_PROGRESS_INTERVAL),
            cpu_profile_path: None,
            mem_profile_path: None,
            mode: Mode::Sequential,
        }
    }

    /// Parse command line flags, excluding the program name.
    ///
    /// Both `--flag value` and `--flag=value` are accepted, with one or two
    /// leading dashes.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut input_path = None;
        let mut progress_interval_lines = Some(DEFAULT_PROGRESS_INTERVAL);
        let mut cpu_profile_path = None;
        let mut mem_profile_path = None;
        let mut threads = 1;
        let mut stream = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let flag = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .ok_or_else(|| Error::Config(format!("unexpected argument `{}`", arg)))?;
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_owned())),
                None => (flag, None),
            };
            let mut value = || {
                inline_value
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| Error::Config(format!("`--{}` requires a value", name)))
            };
            match name {
                "file" => input_path = Some(PathBuf::from(value()?)),
                "cpuprofile" => cpu_profile_path = Some(PathBuf::from(value()?)),
                "memprofile" => mem_profile_path = Some(PathBuf::from(value()?)),
                "progress" => {
                    progress_interval_lines = match parse_number(name, &value()?)? {
                        0 => None,
                        n => Some(n),
                    }
                }
                "threads" => {
                    threads = parse_number(name, &value()?)? as usize;
                    if threads == 0 {
                        return Err(Error::Config("`--threads` must be at least 1".to_owned()));
                    }
                }
                "stream" => {
                    if inline_value.is_some() {
                        return Err(Error::Config("`--stream` takes no value".to_owned()));
                    }
                    stream = true;
                }
                _ => return Err(Error::Config(format!("unknown flag `{}`", arg))),
            }
        }

        let input_path =
            input_path.ok_or_else(|| Error::Config("`--file` is required".to_owned()))?;
        let mode = match (stream, threads) {
            (true, 1) => Mode::Stream,
            (true, _) => {
                return Err(Error::Config(
                    "`--stream` and `--threads` cannot be combined".to_owned(),
                ))
            }
            (false, 1) => Mode::Sequential,
            (false, threads) => Mode::Parallel { threads },
        };

        Ok(Self {
            input_path,
            progress_interval_lines,
            cpu_profile_path,
            mem_profile_path,
            mode,
        })
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .replace('_', "")
        .parse()
        .map_err(|_| Error::Config(format!("`--{}` expects a number, got `{}`", name, value)))
}
