//! Decoder error types.

use thiserror::Error;

/// Per-frame decoder errors.
///
/// Everything except `ChannelClosed` is a recoverable per-frame event: the
/// pipeline records it in the statistics and moves on to the next frame.
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("sync correlation {correlation} below the required {minimum} bits")]
    LowCorrelation { correlation: u8, minimum: u8 },

    #[error("insufficient soft symbols: need {required}, have {available}")]
    InsufficientSymbols { required: usize, available: usize },

    #[error("payload channel disconnected")]
    ChannelClosed,
}

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, DecoderError>;
