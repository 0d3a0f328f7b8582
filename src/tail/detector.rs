// src/tail/detector.rs

//! Completion detection over the accumulated build log.

use std::io::Write;

use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind};
use tracing::{debug, warn};

/// Accumulates every chunk of the build log, mirrors it to `echo`, and
/// reports whether the completion pattern has appeared anywhere in the text
/// seen so far.
///
/// Matching runs against the whole buffer, so a banner split across reads
/// is found once its last piece arrives. The buffer only grows, which means
/// a match never goes away; the result is latched.
///
/// When the pattern cannot match a newline, a match involving new text must
/// lie on the line that was still open before the chunk arrived, so only
/// that line onwards is searched again.
pub struct CompletionDetector<W: Write> {
    pattern: Regex,
    single_line: bool,
    buffer: String,
    echo: W,
    complete: bool,
    echo_failed: bool,
}

impl<W: Write> std::fmt::Debug for CompletionDetector<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionDetector")
            .field("pattern", &self.pattern.as_str())
            .field("buffered", &self.buffer.len())
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}

impl<W: Write> CompletionDetector<W> {
    pub fn new(pattern: Regex, echo: W) -> Self {
        let single_line = match regex_syntax::Parser::new().parse(pattern.as_str()) {
            Ok(hir) => !can_match_newline(&hir),
            Err(_) => false,
        };

        Self {
            pattern,
            single_line,
            buffer: String::new(),
            echo,
            complete: false,
            echo_failed: false,
        }
    }

    /// Append `chunk` to the buffer and write it, unchanged, to the echo sink.
    pub fn consume(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }

        self.mirror(chunk);
        let previous_len = self.buffer.len();
        self.buffer.push_str(chunk);

        let start = self.scan_start(previous_len);
        if !self.complete && self.pattern.is_match_at(&self.buffer, start) {
            debug!(buffered = self.buffer.len(), "completion pattern matched");
            self.complete = true;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Everything consumed so far.
    pub fn accumulated(&self) -> &str {
        &self.buffer
    }

    pub fn echo(&self) -> &W {
        &self.echo
    }

    pub fn into_echo(self) -> W {
        self.echo
    }

    /// Where a match that ends in text appended after `previous_len` can
    /// begin.
    fn scan_start(&self, previous_len: usize) -> usize {
        if !self.single_line {
            return 0;
        }
        self.buffer[..previous_len]
            .rfind('\n')
            .map_or(0, |i| i + 1)
    }

    fn mirror(&mut self, chunk: &str) {
        let result = self
            .echo
            .write_all(chunk.as_bytes())
            .and_then(|()| self.echo.flush());

        // A closed console must not stop supervision; say so once.
        if let Err(e) = result {
            if !self.echo_failed {
                warn!(error = %e, "failed to mirror build log to console");
                self.echo_failed = true;
            }
        }
    }
}

/// Whether any text matched by `hir` can contain a line feed.
fn can_match_newline(hir: &Hir) -> bool {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => false,
        HirKind::Literal(lit) => lit.0.contains(&b'\n'),
        HirKind::Class(Class::Unicode(class)) => class
            .ranges()
            .iter()
            .any(|r| r.start() <= '\n' && '\n' <= r.end()),
        HirKind::Class(Class::Bytes(class)) => class
            .ranges()
            .iter()
            .any(|r| r.start() <= b'\n' && b'\n' <= r.end()),
        HirKind::Repetition(rep) => can_match_newline(&rep.sub),
        HirKind::Capture(cap) => can_match_newline(&cap.sub),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => subs.iter().any(can_match_newline),
    }
}
