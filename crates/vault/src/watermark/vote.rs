//! Majority-vote recovery of a repeated payload from a noisy bit stream.
//!
//! The stream is assumed to hold the payload `[length][identity]` repeated
//! back to back from index 0. Because the period depends on the length being
//! recovered, every candidate length `L` is tried with period `P = 8 + 8L`:
//! the length field is voted at `k*P + j` and payload bit `i` at
//! `k*P + 8 + i` over every whole repeat `k`. A candidate counts only if its
//! voted length byte equals `L`.

use super::accept_identity;
use super::bits::bits_to_bytes;
use super::MAX_IDENTITY_LEN;

/// Fewest whole repeats a candidate needs before its vote is trusted.
pub const MIN_REPEATS: usize = 3;

/// Lowest mean per-position agreement a candidate may have.
pub const MIN_AGREEMENT: f64 = 0.85;

/// Recover the identity carried by `bits`, or `None`.
///
/// Among self-consistent candidates whose text is plausible, the one with
/// the highest mean agreement wins; ties go to the shorter length.
pub fn majority_vote(bits: &[u8]) -> Option<String> {
    let mut best: Option<(f64, String)> = None;

    for len in 1..=MAX_IDENTITY_LEN {
        let period = 8 + len * 8;
        let repeats = bits.len() / period;
        if repeats < MIN_REPEATS {
            break;
        }

        let mut agreement = 0.0;
        let mut length_bits = [0u8; 8];
        for (j, slot) in length_bits.iter_mut().enumerate() {
            let (bit, share) = vote_position(bits, j, period, repeats);
            *slot = bit;
            agreement += share;
        }
        if usize::from(bits_to_bytes(&length_bits)[0]) != len {
            continue;
        }

        let mut payload_bits = Vec::with_capacity(len * 8);
        for i in 0..len * 8 {
            let (bit, share) = vote_position(bits, 8 + i, period, repeats);
            payload_bits.push(bit);
            agreement += share;
        }
        let agreement = agreement / period as f64;
        if agreement < MIN_AGREEMENT {
            continue;
        }
        if best.as_ref().is_some_and(|(score, _)| *score >= agreement) {
            continue;
        }
        if let Some(text) = accept_identity(bits_to_bytes(&payload_bits)) {
            best = Some((agreement, text));
        }
    }

    best.map(|(_, text)| text)
}

/// Majority bit at `offset` across `repeats` periods, with the share of
/// votes that agreed. Ties resolve to 1.
fn vote_position(bits: &[u8], offset: usize, period: usize, repeats: usize) -> (u8, f64) {
    let ones = (0..repeats)
        .filter(|k| bits[k * period + offset] == 1)
        .count();
    let zeros = repeats - ones;
    let bit = u8::from(ones >= zeros);
    (bit, ones.max(zeros) as f64 / repeats as f64)
}
