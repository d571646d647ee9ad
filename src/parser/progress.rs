//! Load progress notifications for whoever renders them.
//!
//! Purely informational: nothing reported here feeds back into parsing.

use crate::utils::config::{COMPLETE_PROGRESS, HEADER_PROGRESS_SPAN};

/// Receiver of progress values on a 0-100 scale
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Sink for callers that don't care about progress
pub fn no_progress(_percent: u8) {}

/// Monotonic progress reporter
///
/// Values are clamped to 100 and only forwarded when they increase.
pub struct Progress<'a> {
    sink: &'a mut dyn ProgressSink,
    last: Option<u8>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink, last: None }
    }

    /// Report an absolute milestone
    pub fn advance(&mut self, percent: u8) {
        let percent = percent.min(COMPLETE_PROGRESS);
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            self.sink.report(percent);
        }
    }

    /// Map a stream position onto the 0-80 reading span
    ///
    /// Without a known total length only the milestones are reported.
    pub fn stream_position(&mut self, bytes_read: u64, total_len: Option<u64>) {
        let Some(total) = total_len.filter(|&total| total > 0) else {
            return;
        };
        let scaled = (HEADER_PROGRESS_SPAN.saturating_mul(bytes_read) / total).min(HEADER_PROGRESS_SPAN);
        self.advance(scaled as u8);
    }

    /// Last value forwarded to the sink
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}
