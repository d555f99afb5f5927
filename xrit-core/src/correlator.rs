//! Sync-word correlation over soft-symbol buffers.

/// Width of the configured sync words in coded bits.
pub const WORD_BITS: usize = 64;

/// Best sync-word match found in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncMatch {
    /// Which configured word matched: 0 = normal, 1 = 180-degree rotated.
    pub word_index: u8,
    /// Symbol offset of the match within the scanned buffer.
    pub position: usize,
    /// Matched bits, in [0, 64].
    pub correlation: u8,
}

/// Slides the configured sync-word pair across a soft-symbol buffer and
/// reports the strongest bit-level match.
///
/// Soft symbols are reduced to hard decisions by sign (>= 0x80 is a one);
/// correlation is the popcount of agreeing bits. Ties go to the lowest
/// position, and the normal word wins over the rotated one on equal strength.
#[derive(Debug, Clone)]
pub struct Correlator {
    words: [u64; 2],
}

impl Correlator {
    pub fn new(words: [u64; 2]) -> Self {
        Self { words }
    }

    /// Scan up to `scan` candidate positions of `buffer` and return the best
    /// match. The scan never runs past the last full 64-symbol window.
    pub fn correlate(&self, buffer: &[u8], scan: usize) -> SyncMatch {
        let mut best = SyncMatch {
            word_index: 0,
            position: 0,
            correlation: 0,
        };
        if buffer.len() < WORD_BITS {
            return best;
        }
        let limit = scan.min(buffer.len() - WORD_BITS + 1);

        let mut window = 0u64;
        for &symbol in &buffer[..WORD_BITS - 1] {
            window = (window << 1) | u64::from(symbol >= 0x80);
        }
        for position in 0..limit {
            let symbol = buffer[position + WORD_BITS - 1];
            window = (window << 1) | u64::from(symbol >= 0x80);
            for (word_index, &word) in self.words.iter().enumerate() {
                let correlation = (WORD_BITS as u32 - (window ^ word).count_ones()) as u8;
                if correlation > best.correlation {
                    best = SyncMatch {
                        word_index: word_index as u8,
                        position,
                        correlation,
                    };
                }
            }
        }
        best
    }
}
