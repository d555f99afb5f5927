//! Frame decoder core for GOES LRIT/HRIT satellite downlinks.
//!
//! The crate receives a continuous stream of soft symbols from an upstream
//! demodulator, recovers frame boundaries, corrects channel errors, and
//! emits validated transport-frame payloads to a downstream demultiplexer.
//! The pipeline is a cascade of sync-word correlation, phase correction,
//! soft-decision Viterbi decoding, CCSDS de-randomization, and interleaved
//! Reed-Solomon, with per-frame statistics and per-channel continuity
//! counters threaded through every stage.

pub mod config;
pub mod correlator;
pub mod derandomizer;
pub mod errors;
pub mod fifo;
pub mod frame;
pub mod metrics;
pub mod nrzm;
pub mod packet_fixer;
pub mod pipeline;
pub mod reed_solomon;
pub mod statistics;
pub mod viterbi;

pub use config::{DecoderConfig, Mode};
pub use errors::DecoderError;
pub use fifo::SymbolFifo;
pub use pipeline::{FrameDecoder, FrameStatus};
pub use statistics::Statistics;
