//! Metric sink capability interface.
//!
//! The exporter itself lives outside the core; the pipeline reports per-frame
//! points through this trait and never blocks on them.

/// Receiver for the per-frame metric points. All methods default to no-ops so
/// sinks only implement the points they care about.
pub trait MetricSink: Send {
    fn demodulator_fifo_usage(&self, _percent: u8) {}
    fn decoder_fifo_usage(&self, _percent: u8) {}
    fn sync_correlation(&self, _bits: u8) {}
    fn viterbi_errors(&self, _bits: u32) {}
    fn rs_bytes_fixed(&self, _bytes: u32) {}
    fn signal_quality(&self, _percent: u8) {}
    fn signal_status(&self, _locked: bool) {}
}

/// Discards every metric point.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetrics;

impl MetricSink for NullMetrics {}
