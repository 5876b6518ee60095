use log::debug;

use super::Progress;
use crate::{error::Error, lines::Lines, parse::parse_line, Result, Stations};

/// One pass over a buffer of whole lines.
pub fn process(buf: &[u8], progress: Option<u64>) -> Result<Stations> {
    process_chunk(buf, 0, Progress::new(progress))
}

/// `buf` starts at byte `base` of the file; offsets in errors are absolute.
pub(crate) fn process_chunk(buf: &[u8], base: usize, mut progress: Progress) -> Result<Stations> {
    let mut stations = Stations::default();

    for (offset, line) in Lines::with_offset(buf, base) {
        let (name, temp) =
            parse_line(line).map_err(|reason| Error::malformed(offset, line, reason))?;
        stations.observe(name, temp)?;
        progress.tick();
    }

    debug!(
        "Chunk at {}: {} lines, {} stations",
        base,
        progress.lines(),
        stations.len()
    );
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test;

    #[test]
    fn test_correctness() {
        test::correctness(|buf| process(buf, Some(3)));
    }

    #[test]
    fn test_malformed() {
        test::malformed(|buf| process(buf, None));
    }

    #[test]
    fn test_absolute_offsets() {
        match process_chunk(b"a;1.0\nb;x\n", 1000, Progress::new(None)) {
            Err(Error::MalformedRecord { offset, record, .. }) => {
                assert_eq!(offset, 1006);
                assert_eq!(record, "b;x");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
