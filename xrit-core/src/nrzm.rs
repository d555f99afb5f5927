//! NRZ-M differential decoding for the HRIT line code.

/// Differentially decode a byte stream in place, MSB first: each output bit
/// is the XOR of the received bit with its predecessor. Length-preserving.
pub fn nrzm_decode(data: &mut [u8]) {
    let mut prev = 0u8;
    for byte in data.iter_mut() {
        let current = *byte;
        *byte = current ^ (current >> 1) ^ (prev << 7);
        prev = current & 1;
    }
}

/// The matching differential encoder, used to build loopback test streams.
pub fn nrzm_encode(data: &mut [u8]) {
    let mut prev = 0u8;
    for byte in data.iter_mut() {
        let mut out = 0u8;
        for shift in (0..8).rev() {
            prev ^= (*byte >> shift) & 1;
            out = (out << 1) | prev;
        }
        *byte = out;
    }
}
