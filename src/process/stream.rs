//! Producer/consumer pipeline: a background thread reads the file in batches of
//! whole lines while this thread parses and aggregates them in file order.

use std::{io::Read, path::Path};

use super::Progress;
use crate::{error::Error, lines::StreamLines, parse::parse_line, Result, Stations};

pub fn process<R>(reader: R, path: &Path, progress: Option<u64>) -> Result<Stations>
where
    R: Read + Send + 'static,
{
    let mut stations = Stations::default();
    let mut progress = Progress::new(progress);

    let mut batches = StreamLines::spawn(reader).map_err(|e| Error::io(path, e))?;
    for batch in &mut batches {
        let batch = batch.map_err(|e| Error::io(path, e))?;
        for (offset, line) in batch.lines() {
            let (name, temp) =
                parse_line(line).map_err(|reason| Error::malformed(offset, line, reason))?;
            stations.observe(name, temp)?;
            progress.tick();
        }
    }
    batches.join();

    Ok(stations)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;
    use crate::{test, ErrorKind};

    fn process_buf(buf: &[u8]) -> Result<Stations> {
        process(Cursor::new(buf.to_vec()), Path::new("<memory>"), Some(2))
    }

    #[test]
    fn test_correctness() {
        test::correctness(process_buf);
    }

    #[test]
    fn test_malformed() {
        test::malformed(process_buf);
    }

    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "disk on fire")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error() {
        let reader = FailingReader {
            data: Cursor::new(b"a;1.0\nb;2.0\n".to_vec()),
        };
        let err = process(reader, Path::new("broken.txt"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("broken.txt"));
    }
}
