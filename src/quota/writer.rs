use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::quota::config::QuotaConfig;

/// Errors that can occur when writing through a [`BoundedWriter`].
#[derive(Error, Debug)]
pub enum QuotaError {
    /// The write would push the file past its byte limit.
    #[error("Writing would exceed max file size of {limit} bytes ({attempted})")]
    QuotaExceeded {
        /// Total size the file would have had after the write.
        attempted: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Non-text content was written.
    #[error("Cannot write non-text content: {0}")]
    TypeMismatch(String),

    /// IO error from the underlying sink.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<QuotaError> for io::Error {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::Io(err) => err,
            QuotaError::TypeMismatch(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            QuotaError::QuotaExceeded { .. } => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}

/// A writable sink that can report how many bytes it already holds.
pub trait SizedSink: Write {
    fn current_size(&self) -> io::Result<u64>;
}

impl SizedSink for File {
    fn current_size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

impl SizedSink for Vec<u8> {
    fn current_size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl SizedSink for Cursor<Vec<u8>> {
    fn current_size(&self) -> io::Result<u64> {
        Ok(self.get_ref().len() as u64)
    }
}

impl<S: SizedSink + ?Sized> SizedSink for &mut S {
    fn current_size(&self) -> io::Result<u64> {
        (**self).current_size()
    }
}

/// Write guard enforcing a cumulative byte limit on a sink.
///
/// Only the write path is checked. Reads, seeks and line iteration are
/// forwarded to the sink unchanged when it supports them. Passing `&mut sink`
/// keeps ownership with the caller.
///
/// Sizes are counted in UTF-8 encoded bytes, starting from whatever the sink
/// already held when the guard was created.
///
/// Through `io::Write`, a character split across two `write` calls is held
/// back (at most 3 bytes) until its remaining bytes arrive.
#[derive(Debug)]
pub struct BoundedWriter<W: Write> {
    sink: W,
    bytes_written: u64,
    byte_limit: i64,
    /// Leading bytes of an incomplete UTF-8 sequence from the last `write`.
    pending: Vec<u8>,
}

impl<W: SizedSink> BoundedWriter<W> {
    /// Wrap `sink`, counting its current size against `byte_limit`.
    pub fn new(sink: W, byte_limit: i64) -> Result<Self, QuotaError> {
        let initial_size = sink.current_size()?;
        Ok(Self::with_initial_size(sink, initial_size, byte_limit))
    }
}

impl<W: Write> BoundedWriter<W> {
    /// Wrap a sink whose current size is known to the caller.
    pub fn with_initial_size(sink: W, initial_size: u64, byte_limit: i64) -> Self {
        Self {
            sink,
            bytes_written: initial_size,
            byte_limit,
            pending: Vec::new(),
        }
    }

    /// Write text, failing without touching the sink if the limit would be passed.
    pub fn write_str(&mut self, text: &str) -> Result<(), QuotaError> {
        let size = text.len() as u64;
        let attempted = self.bytes_written.saturating_add(size);

        if self.byte_limit > 0 && attempted > self.byte_limit as u64 {
            warn!(
                attempted,
                limit = self.byte_limit,
                "rejecting write over byte limit"
            );
            return Err(QuotaError::QuotaExceeded {
                attempted,
                limit: self.byte_limit as u64,
            });
        }

        self.sink.write_all(text.as_bytes())?;
        self.bytes_written = attempted;
        Ok(())
    }

    /// Write a buffer that must hold UTF-8 text.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), QuotaError> {
        let text = std::str::from_utf8(buf).map_err(|e| {
            QuotaError::TypeMismatch(format!(
                "{} byte buffer is not UTF-8 text ({})",
                buf.len(),
                e
            ))
        })?;
        self.write_str(text)
    }

    /// Bytes counted so far, including the sink's initial size.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn byte_limit(&self) -> i64 {
        self.byte_limit
    }

    /// Bytes still allowed, or `None` when the limit is disabled.
    pub fn remaining(&self) -> Option<u64> {
        if self.byte_limit > 0 {
            Some((self.byte_limit as u64).saturating_sub(self.bytes_written))
        } else {
            None
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Mutable access to the sink. Writes made here bypass the limit.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Return the sink without releasing it. A pending partial character is
    /// discarded.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Flush and release the sink.
    ///
    /// Dropping the writer releases the sink as well; `close` additionally
    /// reports flush errors and a partial character left by `io::Write`.
    /// The sink is released in every case.
    pub fn close(mut self) -> io::Result<()> {
        let result = self.flush();
        debug!(bytes = self.bytes_written, "closing bounded writer");
        drop(self.sink);
        result
    }

    fn incomplete_tail_error(&self) -> QuotaError {
        QuotaError::TypeMismatch(format!(
            "stream ended inside a UTF-8 sequence ({} byte(s) pending)",
            self.pending.len()
        ))
    }
}

impl<W: Write> Write for BoundedWriter<W> {
    /// All-or-nothing: on error neither the sink nor the pending tail changes.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.pending.clone();
        bytes.extend_from_slice(buf);

        let (text, tail) = match std::str::from_utf8(&bytes) {
            Ok(text) => (text, &[][..]),
            Err(e) if e.error_len().is_none() => {
                let (valid, tail) = bytes.split_at(e.valid_up_to());
                // Everything before valid_up_to() was checked by from_utf8.
                let text = std::str::from_utf8(valid).map_err(|e| {
                    QuotaError::TypeMismatch(format!("buffer is not UTF-8 text ({})", e))
                })?;
                (text, tail)
            }
            Err(e) => {
                return Err(QuotaError::TypeMismatch(format!(
                    "{} byte buffer is not UTF-8 text ({})",
                    buf.len(),
                    e
                ))
                .into())
            }
        };

        if !text.is_empty() {
            self.write_str(text)?;
        }
        self.pending = tail.to_vec();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()?;
        if !self.pending.is_empty() {
            return Err(self.incomplete_tail_error().into());
        }
        Ok(())
    }
}

impl<W: Write + Read> Read for BoundedWriter<W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.sink.read(buf)
    }
}

impl<W: Write + BufRead> BufRead for BoundedWriter<W> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.sink.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.sink.consume(amt)
    }
}

impl<W: Write + Seek> Seek for BoundedWriter<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.sink.seek(pos)
    }
}

/// Open a file whose total size is capped by `config`.
pub fn open_limited(
    path: impl AsRef<Path>,
    options: &OpenOptions,
    config: &QuotaConfig,
) -> Result<BoundedWriter<File>, QuotaError> {
    let file = options.open(path.as_ref())?;
    debug!(
        path = %path.as_ref().display(),
        limit = config.byte_limit,
        "opened quota-limited file"
    );
    BoundedWriter::new(file, config.byte_limit)
}

/// Create (or truncate) a file under the default byte limit.
pub fn create_limited(path: impl AsRef<Path>) -> Result<BoundedWriter<File>, QuotaError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    open_limited(path, &options, &QuotaConfig::default())
}
