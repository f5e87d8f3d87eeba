use std::{
    io::{self, Write},
    path::PathBuf,
};

use super::{LineAccumulator, LineChain};
use crate::{Error, Result};

/// Writer that runs rendered output through a [`LineChain`] line by line
/// before passing it on to the file at `path`.
///
/// With an empty chain bytes go straight through. Processor errors and
/// failures of the destination fail the write and are kept for
/// [`take_error`](Self::take_error), since the templating service only
/// sees an opaque I/O error.
#[derive(Debug)]
pub struct LineProcessingWriter<'c, W: Write> {
    inner: W,
    chain: &'c mut LineChain,
    path: PathBuf,
    accumulator: LineAccumulator,
    pending: Vec<u8>,
    error: Option<Error>,
}

impl<'c, W: Write> LineProcessingWriter<'c, W> {
    pub fn new(inner: W, chain: &'c mut LineChain, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            chain,
            path: path.into(),
            accumulator: LineAccumulator::new(),
            pending: Vec::new(),
            error: None,
        }
    }

    /// The error that failed the last write, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Flush the trailing partial line and return the inner writer.
    pub fn finish(mut self) -> Result<W> {
        if !self.pending.is_empty() {
            return Err(Error::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "output ends with an incomplete UTF-8 sequence",
                ),
            ));
        }
        let accumulator = std::mem::take(&mut self.accumulator);
        if let Some(line) = accumulator.finish() {
            if let Some(line) = self.chain.apply(line)? {
                self.write_line(&line.content, &line.terminator)
                    .map_err(|e| Error::io(&self.path, e))?;
            }
        }
        Ok(self.inner)
    }

    fn write_line(&mut self, content: &str, terminator: &str) -> io::Result<()> {
        self.inner.write_all(content.as_bytes())?;
        self.inner.write_all(terminator.as_bytes())
    }

    /// Keep `err` for the caller and hand the templating service an
    /// equivalent I/O error.
    fn fail(&mut self, err: Error) -> io::Error {
        let surfaced = match &err {
            Error::Io { source, .. } => io::Error::new(source.kind(), source.to_string()),
            other => io::Error::other(other.to_string()),
        };
        self.error = Some(err);
        surfaced
    }

    fn process_chunk(&mut self, chunk: &str) -> io::Result<()> {
        for line in self.accumulator.push(chunk) {
            match self.chain.apply(line) {
                Ok(Some(line)) => {
                    if let Err(e) = self.write_line(&line.content, &line.terminator) {
                        let err = Error::io(&self.path, e);
                        return Err(self.fail(err));
                    }
                }
                Ok(None) => {}
                Err(err) => return Err(self.fail(err)),
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for LineProcessingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.chain.is_empty() {
            return match self.inner.write_all(buf) {
                Ok(()) => Ok(buf.len()),
                Err(e) => {
                    let err = Error::io(&self.path, e);
                    Err(self.fail(err))
                }
            };
        }
        self.pending.extend_from_slice(buf);
        let pending = std::mem::take(&mut self.pending);
        let (valid, rest) = match std::str::from_utf8(&pending) {
            Ok(text) => (text, &[][..]),
            Err(e) if e.error_len().is_none() => {
                let (valid, rest) = pending.split_at(e.valid_up_to());
                // The prefix was just validated.
                (std::str::from_utf8(valid).map_err(io::Error::other)?, rest)
            }
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        self.process_chunk(valid)?;
        self.pending = rest.to_vec();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
