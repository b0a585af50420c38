use std::io::{self, Read};

/// A reader wrapper that can mirror everything it reads into a capture
/// buffer, so a subtree can be reproduced verbatim after it has been
/// consumed.
pub(crate) struct LogInput<R> {
    inner: R,
    log: Option<Vec<u8>>,
}

impl<R: Read> LogInput<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, log: None }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Start mirroring reads. Any previous capture is discarded.
    pub fn start_log(&mut self) {
        self.log = Some(Vec::new());
    }

    /// Stop mirroring and return the captured bytes.
    pub fn stop_log(&mut self) -> Vec<u8> {
        self.log.take().unwrap_or_default()
    }

    /// Append bytes to the capture buffer without reading them from the
    /// stream. Used to reconstruct parts of a token that were consumed
    /// before the capture started.
    pub fn log_raw(&mut self, bytes: &[u8]) {
        if let Some(log) = &mut self.log {
            log.extend_from_slice(bytes);
        }
    }

    /// Discard exactly `n` bytes. While a capture is active the bytes are
    /// read (and logged) instead of skipped.
    pub fn skip_bytes(&mut self, mut n: u64) -> io::Result<()> {
        let mut scratch = [0u8; 512];
        while n > 0 {
            let take = scratch.len().min(n as usize);
            self.read_exact(&mut scratch[..take])?;
            n -= take as u64;
        }
        Ok(())
    }
}

impl<R: Read> Read for LogInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(log) = &mut self.log {
            log.extend_from_slice(&buf[..n]);
        }
        Ok(n)
    }
}
