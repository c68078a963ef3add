//! Byte-level progress reporting for the compress and upload phases.
//!
//! A [`TransferProgress`] is a passive tap: it only counts bytes as the
//! reader or body stream it wraps is consumed.

use indicatif::{ProgressBar, ProgressBarIter, ProgressStyle};
use std::io::Read;

/// Label shown while the archive is built.
pub const COMPRESS_LABEL: &str = "Compressing files";

/// Label shown while the archive is uploaded.
pub const UPLOAD_LABEL: &str = "Uploading";

const BAR_TEMPLATE: &str = "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const BAR_CHARS: &str = "=> ";

/// Labeled byte counter, optionally drawn as a progress bar on stderr.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Creates a counter for `total_bytes`. Hidden counters still count.
    pub fn new(label: &str, total_bytes: u64, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total_bytes)
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(total_bytes);
        bar.set_style(bar_style());
        bar.set_message(label.to_string());
        Self { bar }
    }

    /// Creates a counter that is never drawn.
    pub fn hidden(label: &str, total_bytes: u64) -> Self {
        Self::new(label, total_bytes, false)
    }

    /// Adds `bytes` to the counter.
    pub fn inc(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Bytes counted so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// The scale the counter is drawn against.
    pub fn total(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }

    /// Wraps a reader so every byte read is counted.
    pub fn wrap_read<R: Read>(&self, reader: R) -> ProgressBarIter<R> {
        self.bar.wrap_read(reader)
    }

    /// Leaves the finished bar on screen.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Stops drawing without marking the bar complete.
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars(BAR_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = TransferProgress::hidden(UPLOAD_LABEL, 100);
        assert_eq!(progress.total(), 100);
        assert_eq!(progress.position(), 0);

        progress.inc(40);
        progress.inc(2);
        assert_eq!(progress.position(), 42);
        progress.finish();
    }

    #[test]
    fn test_wrap_read_counts_bytes_read() {
        let progress = TransferProgress::hidden(COMPRESS_LABEL, 11);
        let mut reader = progress.wrap_read(Cursor::new(b"hello world".to_vec()));

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(out, b"hello world");
        assert_eq!(progress.position(), 11);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let progress = TransferProgress::hidden(UPLOAD_LABEL, 10);
        let tap = progress.clone();
        tap.inc(7);
        assert_eq!(progress.position(), 7);
        progress.abandon();
    }

    #[test]
    fn test_bar_template_is_valid() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
    }
}
