//! Decoder configuration types.
use serde::{Deserialize, Serialize};

/// Downlink mode. Selects the sync-word pair and the mode-specific pipeline
/// stages (phase fixing for LRIT, NRZ-M differential decoding for HRIT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Lrit,
    Hrit,
}

impl Mode {
    /// The 64-bit coded sync words for this mode: the normal pattern and its
    /// 180-degree rotated counterpart.
    ///
    /// These are the convolutionally coded images of the 32-bit ASM. The HRIT
    /// pair bakes in the NRZ-M line coding that mode carries inside the
    /// convolutional code.
    pub fn sync_words(self) -> [u64; 2] {
        match self {
            Mode::Lrit => [0xFCA2_B63D_B00D_9794, 0x035D_49C2_4FF2_686B],
            Mode::Hrit => [0xFC4E_F4FD_0CC2_DF89, 0x035B_110B_F33D_2076],
        }
    }
}

/// Immutable decoder configuration, constructed once at start and passed into
/// the pipeline. The only runtime-mutable control is the shutdown flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub mode: Mode,
    /// Enable tail carry: seed each Viterbi pass with the final coded symbols
    /// of the previous frame to reduce edge-bit errors.
    pub use_last_frame_data: bool,
    /// Minimum sync correlation, in matched bits out of 64.
    pub min_correlation: u8,
    /// Rolling-average window for the RS/Viterbi correction displays.
    pub frames_per_average: u64,
    /// Forced full-rescan period of the flywheel, in frames.
    pub flywheel_recheck: u32,
    /// Soft-symbol FIFO capacity in bytes.
    pub fifo_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Lrit,
            use_last_frame_data: true,
            min_correlation: 45,
            frames_per_average: 25,
            flywheel_recheck: 4,
            fifo_capacity: 1 << 20,
        }
    }
}
