//! CCSDS pseudo-noise de-randomization.

/// Period of the CCSDS randomizer sequence in bytes.
const PN_PERIOD: usize = 255;

/// XORs the CCSDS PN sequence over the frame body. The sequence is generated
/// by the h(x) = x^8 + x^7 + x^5 + x^3 + 1 shift register seeded with all
/// ones, giving the well-known FF 48 0E C0 9A... byte stream. Self-inverse.
#[derive(Debug, Clone)]
pub struct Derandomizer {
    table: [u8; PN_PERIOD],
}

impl Derandomizer {
    pub fn new() -> Self {
        let mut table = [0u8; PN_PERIOD];
        let mut state = 0xFFu8;
        for byte in table.iter_mut() {
            let mut out = 0u8;
            for _ in 0..8 {
                out = (out << 1) | (state >> 7);
                let feedback = (state ^ (state >> 2) ^ (state >> 4) ^ (state >> 7)) & 1;
                state = (state << 1) | feedback;
            }
            *byte = out;
        }
        Self { table }
    }

    /// XOR the PN sequence over `data`, wrapping every 255 bytes. The sync
    /// word must already be stripped; the sequence starts at the body head.
    pub fn apply(&self, data: &mut [u8]) {
        for (i, byte) in data.iter_mut().enumerate() {
            *byte ^= self.table[i % PN_PERIOD];
        }
    }
}

impl Default for Derandomizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_head_matches_ccsds() {
        let d = Derandomizer::new();
        assert_eq!(
            &d.table[..8],
            &[0xFF, 0x48, 0x0E, 0xC0, 0x9A, 0x0D, 0x70, 0xBC]
        );
    }

    #[test]
    fn applying_twice_is_identity() {
        let d = Derandomizer::new();
        let original: Vec<u8> = (0u8..=255).cycle().take(1020).collect();
        let mut data = original.clone();
        d.apply(&mut data);
        assert_ne!(data, original);
        d.apply(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn zeros_become_the_sequence() {
        let d = Derandomizer::new();
        let mut data = vec![0u8; 300];
        d.apply(&mut data);
        assert_eq!(&data[..PN_PERIOD], &d.table[..]);
        // wraps after one period
        assert_eq!(&data[PN_PERIOD..], &d.table[..300 - PN_PERIOD]);
    }
}
