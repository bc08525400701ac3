//! Throughput accounting

use std::time::Duration;

/// Width of one throughput reporting window.
pub const THROUGHPUT_WINDOW: Duration = Duration::from_secs(1);

/// One reported throughput window. Recreated every window, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub bytes_in_window: u64,
    pub window: Duration,
}

/// Bytes-per-window counter, reset on every report.
///
/// The 1 s cadence is driven by the connection manager's tick and runs
/// regardless of connection state; while disconnected the meter simply
/// reports zero. The meter itself is plain state. Lifetime totals are kept
/// alongside the window counter for diagnostics.
#[derive(Debug, Default)]
pub struct ThroughputMeter {
    bytes_in_window: u64,
    total_received: u64,
    total_sent: u64,
}

impl ThroughputMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one inbound chunk.
    pub fn record_received(&mut self, len: usize) {
        self.bytes_in_window += len as u64;
        self.total_received += len as u64;
    }

    /// Account for one outbound write.
    pub fn record_sent(&mut self, len: usize) {
        self.total_sent += len as u64;
    }

    /// Report the bytes received since the previous report and reset the
    /// window counter.
    pub fn take_sample(&mut self) -> ThroughputSample {
        let sample = ThroughputSample {
            bytes_in_window: self.bytes_in_window,
            window: THROUGHPUT_WINDOW,
        };
        self.bytes_in_window = 0;
        sample
    }

    pub fn total_received(&self) -> u64 {
        self.total_received
    }

    pub fn total_sent(&self) -> u64 {
        self.total_sent
    }
}
