//! Line sources feeding the parser.
//!
//! Both sources hand out lines without their `\n` terminator and strip a single
//! trailing `\r`. Every line comes with the byte offset of its first byte so
//! errors can point back into the file.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    sync::mpsc::{sync_channel, Receiver, SyncSender},
    thread::{self, JoinHandle},
};

use memchr::memchr;
use memmap2::Mmap;

/// Target size of one batch handed from the reader thread to the consumer.
pub const BATCH_SIZE: usize = 1 << 20;
/// Batches in flight between the reader thread and the consumer.
const CHANNEL_BOUND: usize = 8;

pub fn mmap(file: &File) -> io::Result<Mmap> {
    let mmap = unsafe { Mmap::map(file)? };
    #[cfg(unix)]
    mmap.advise(memmap2::Advice::Sequential)?;
    Ok(mmap)
}

#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Iterator over the lines of an in-memory buffer.
pub struct Lines<'a> {
    buf: &'a [u8],
    i: usize,
    base: usize,
}

impl<'a> Lines<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_offset(buf, 0)
    }

    /// Lines of `buf`, which starts at byte `base` of the underlying file.
    pub fn with_offset(buf: &'a [u8], base: usize) -> Self {
        Self { buf, i: 0, base }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.i >= self.buf.len() {
            return None;
        }
        let line_idx = self.i;
        let rest = &self.buf[line_idx..];
        let line = match memchr(b'\n', rest) {
            Some(newline_idx) => {
                self.i = line_idx + newline_idx + 1;
                &rest[..newline_idx]
            }
            // Last line without a terminator
            None => {
                self.i = self.buf.len();
                rest
            }
        };
        Some((self.base + line_idx, trim_cr(line)))
    }
}

/// A run of whole lines read by the background reader.
#[derive(Debug)]
pub struct Batch {
    pub offset: usize,
    pub data: Vec<u8>,
}

impl Batch {
    pub fn lines(&self) -> Lines<'_> {
        Lines::with_offset(&self.data, self.offset)
    }
}

/// Single producer reading a file on its own thread and handing batches of
/// complete lines to the consumer in file order.
pub struct StreamLines {
    rx: Receiver<io::Result<Batch>>,
    handle: JoinHandle<()>,
}

impl StreamLines {
    pub fn spawn<R: Read + Send + 'static>(reader: R) -> io::Result<Self> {
        let (tx, rx) = sync_channel(CHANNEL_BOUND);
        let handle = thread::Builder::new()
            .name("line-reader".to_owned())
            .spawn(move || read_batches(reader, tx))?;
        Ok(Self { rx, handle })
    }

    /// Wait for the reader thread. Only call once the iterator is exhausted.
    pub fn join(self) {
        drop(self.rx);
        if let Err(panic) = self.handle.join() {
            std::panic::resume_unwind(panic);
        }
    }
}

impl Iterator for StreamLines {
    type Item = io::Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}

fn read_batches<R: Read>(reader: R, tx: SyncSender<io::Result<Batch>>) {
    let mut reader = BufReader::with_capacity(BATCH_SIZE, reader);
    let mut offset = 0;
    loop {
        let mut data = Vec::with_capacity(BATCH_SIZE + 128);
        while data.len() < BATCH_SIZE {
            match reader.read_until(b'\n', &mut data) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }
        }
        if data.is_empty() {
            return;
        }
        let len = data.len();
        // The consumer hung up after an error of its own
        if tx.send(Ok(Batch { offset, data })).is_err() {
            return;
        }
        offset += len;
    }
}
