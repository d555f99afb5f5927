//! QPSK phase-ambiguity correction over soft-symbol frames.

use serde::{Deserialize, Serialize};

/// Constellation rotation detected at lock, encoded 0-3 on the wire.
///
/// The correlator only distinguishes the normal and 180-degree words, so in
/// practice `Deg90`/`Deg270` are never commanded; the full set is kept for
/// the statistics encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PhaseShift {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl PhaseShift {
    pub fn wire_code(self) -> u8 {
        match self {
            PhaseShift::Deg0 => 0,
            PhaseShift::Deg90 => 1,
            PhaseShift::Deg180 => 2,
            PhaseShift::Deg270 => 3,
        }
    }
}

/// Soft-symbol negation in the offset-128 encoding.
#[inline]
fn negate(symbol: u8) -> u8 {
    !symbol
}

/// Apply the inverse of the detected rotation in place so the downstream
/// convolutional decoder sees the canonical constellation. Symbols are
/// treated as interleaved I/Q pairs. `swap_iq` additionally exchanges the
/// rails, for front ends that present a mirrored spectrum.
pub fn fix_packet(symbols: &mut [u8], phase: PhaseShift, swap_iq: bool) {
    match phase {
        PhaseShift::Deg0 => {}
        PhaseShift::Deg180 => {
            for symbol in symbols.iter_mut() {
                *symbol = negate(*symbol);
            }
        }
        PhaseShift::Deg90 => {
            for pair in symbols.chunks_exact_mut(2) {
                let (i, q) = (pair[0], pair[1]);
                pair[0] = q;
                pair[1] = negate(i);
            }
        }
        PhaseShift::Deg270 => {
            for pair in symbols.chunks_exact_mut(2) {
                let (i, q) = (pair[0], pair[1]);
                pair[0] = negate(q);
                pair[1] = i;
            }
        }
    }
    if swap_iq {
        for pair in symbols.chunks_exact_mut(2) {
            pair.swap(0, 1);
        }
    }
}
