//! Byte ↔ bit conversion shared by the embedder and the detector.
//!
//! Bits are stored one per `u8` (0 or 1), least-significant bit of each byte
//! first.

/// Expand `bytes` into bits, LSB of each byte first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1))
        .collect()
}

/// Pack bits back into bytes, 8 per byte, LSB first.
///
/// A trailing group shorter than 8 bits is zero-padded in its high bits.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << i))
        })
        .collect()
}
