// src/tail/reader.rs

//! Incremental reader over a log file another process is appending to.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, trace};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Upper bound on bytes pulled by a single `read_available` call, so one
/// iteration of the session loop stays short even if the writer floods the
/// file.
pub const MAX_READ_PER_POLL: usize = 1024 * 1024;

const READ_BUF_SIZE: usize = 8 * 1024;

/// Shared-read handle on the build log plus the decoding state between reads.
///
/// The handle is opened in [`LogTailReader::open`] and released when the
/// reader is dropped.
pub struct LogTailReader {
    path: PathBuf,
    source: Box<dyn Read + Send>,
    /// Trailing bytes of a UTF-8 sequence that has not fully arrived yet.
    pending: Vec<u8>,
    bytes_read: u64,
}

impl std::fmt::Debug for LogTailReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogTailReader")
            .field("path", &self.path)
            .field("pending", &self.pending.len())
            .field("bytes_read", &self.bytes_read)
            .finish_non_exhaustive()
    }
}

impl LogTailReader {
    /// Open `path` for shared reading, creating it if it does not exist yet.
    pub fn open(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let source = fs
            .open_shared_read(path)
            .with_context(|| format!("opening build log {path:?} for shared reading"))?;

        debug!(path = ?path, "opened build log for tailing");

        Ok(Self {
            path: path.to_path_buf(),
            source,
            pending: Vec::new(),
            bytes_read: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total bytes consumed from the file so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Return text appended since the previous call, or an empty string.
    ///
    /// Never waits for the writer: end-of-file only means "nothing more yet".
    /// Read errors are treated the same way and retried on the next call.
    /// At most [`MAX_READ_PER_POLL`] bytes are pulled; use [`Self::drain`]
    /// when everything written so far is needed.
    pub fn read_available(&mut self) -> String {
        if self.pull() == 0 {
            return String::new();
        }
        take_decodable(&mut self.pending)
    }

    /// Return all text appended since the previous call, however much that
    /// is. Used when the session is about to stop reading.
    pub fn drain(&mut self) -> String {
        let mut pulled = 0;
        loop {
            let fresh = self.pull();
            if fresh == 0 {
                break;
            }
            pulled += fresh;
        }

        if pulled == 0 {
            return String::new();
        }
        take_decodable(&mut self.pending)
    }

    /// Drain the file, then flush an incomplete trailing sequence (decoded
    /// lossily). Used once the session stops tailing.
    pub fn finish(&mut self) -> String {
        let mut text = self.drain();
        if !self.pending.is_empty() {
            text.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        text
    }

    /// Move up to `MAX_READ_PER_POLL` new bytes into `pending`.
    fn pull(&mut self) -> usize {
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut fresh = 0usize;

        while fresh < MAX_READ_PER_POLL {
            match self.source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    fresh += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(path = ?self.path, error = %e, "build log not readable right now");
                    break;
                }
            }
        }

        if fresh > 0 {
            self.bytes_read += fresh as u64;
            trace!(path = ?self.path, bytes = fresh, "read from build log");
        }
        fresh
    }
}

/// Decode the longest prefix of `buf` that can be decoded now, leaving an
/// incomplete final UTF-8 sequence in place. Invalid bytes become U+FFFD.
fn take_decodable(buf: &mut Vec<u8>) -> String {
    let mut out = String::with_capacity(buf.len());
    let mut start = 0;

    while start < buf.len() {
        match std::str::from_utf8(&buf[start..]) {
            Ok(s) => {
                out.push_str(s);
                start = buf.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&buf[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }

    buf.drain(..start);
    out
}
