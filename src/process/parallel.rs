//! Line aligned chunks aggregated independently and merged.
//!
//! Every chunk produces its own [`Stations`]; since merging is associative and
//! commutative the result does not depend on how the file was cut.

use log::debug;
use memchr::memchr;
use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};

use super::{sequential, Progress};
use crate::{error::Error, Result, Stations};

/// Cut `buf` into at most `n` chunks, each ending just after a `\n` (or at the
/// end of the buffer). Returns the offset of every chunk along with it.
pub fn split_chunks(buf: &[u8], n: usize) -> Vec<(usize, &[u8])> {
    let chunk_len = buf.len() / n.max(1);
    let mut chunks = Vec::with_capacity(n);
    let mut start = 0;
    for k in 1..n {
        let approx = (k * chunk_len).max(start);
        if approx >= buf.len() {
            break;
        }
        let end = match memchr(b'\n', &buf[approx..]) {
            Some(newline_idx) => approx + newline_idx + 1,
            None => buf.len(),
        };
        chunks.push((start, &buf[start..end]));
        start = end;
    }
    if start < buf.len() {
        chunks.push((start, &buf[start..]));
    }
    chunks
}

/// `progress` applies to each chunk separately.
pub fn process(buf: &[u8], threads: usize, progress: Option<u64>) -> Result<Stations> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("aggregate-{}", i))
        .build()
        .map_err(|e| Error::Config(format!("could not start thread pool: {}", e)))?;

    let chunks = split_chunks(buf, threads);
    debug!("Split {} bytes into {} chunks", buf.len(), chunks.len());

    pool.install(|| {
        chunks
            .into_par_iter()
            .map(|(base, chunk)| {
                sequential::process_chunk(chunk, base, Progress::for_chunk(progress, base))
            })
            .try_reduce(Stations::default, |mut stations, other| {
                stations.merge(other)?;
                Ok(stations)
            })
    })
}
