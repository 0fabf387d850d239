//! Forensic watermarking of rendered images.
//!
//! # Payload
//!
//! ```text
//! [length: u8][identity: length bytes of UTF-8]
//! ```
//!
//! expanded to bits LSB-first. The embedder writes it twice: cycled through
//! the blue samples of a centred square (surviving moderate crops), and
//! repeated over the LSB of every sample in the image. The detector tries a
//! brightness grid, a centre-region majority vote and a full-image LSB
//! majority vote, in that order.
//!
//! # Module invariants
//!
//! - **Inputs are never mutated.** Embedding works on an owned copy of the
//!   raster and returns freshly encoded bytes.
//! - **Absence is not an error.** Detection returns `None` when nothing
//!   plausible is recovered; only undecodable image bytes produce an error.
//! - **Strategy order is part of the format.** Images already in circulation
//!   were marked assuming pattern → centre vote → full LSB vote.

pub mod bits;
pub mod detect;
pub mod embed;
pub mod error;
pub mod overlay;
pub mod raster;
pub mod region;
pub mod vote;

pub use detect::{detect_in, detect_watermark};
pub use embed::embed_watermark;
pub use error::WatermarkError;
pub use overlay::apply_visible_mark;
pub use raster::RawImage;

/// Longest identity that fits the one-byte length field.
pub const MAX_IDENTITY_LEN: usize = u8::MAX as usize;

/// Largest payload in bits: length byte plus [`MAX_IDENTITY_LEN`] bytes.
pub const MAX_PAYLOAD_BITS: usize = 8 + MAX_IDENTITY_LEN * 8;

/// Build `[length, identity...]` for `identity`.
///
/// # Errors
///
/// Returns [`WatermarkError::PayloadTooLarge`] above 255 bytes,
/// [`WatermarkError::EmptyIdentity`] for an empty string and
/// [`WatermarkError::RepeatedIdentity`] for text the detector would reject
/// as a repeated unit.
pub fn encode_payload(identity: &str) -> Result<Vec<u8>, WatermarkError> {
    let bytes = identity.as_bytes();
    if bytes.len() > MAX_IDENTITY_LEN {
        return Err(WatermarkError::PayloadTooLarge(bytes.len()));
    }
    if bytes.is_empty() {
        return Err(WatermarkError::EmptyIdentity);
    }
    if is_repetition(bytes) {
        return Err(WatermarkError::RepeatedIdentity);
    }
    let mut payload = Vec::with_capacity(bytes.len() + 1);
    payload.push(bytes.len() as u8);
    payload.extend_from_slice(bytes);
    Ok(payload)
}

/// Accept recovered bytes as an identity only if they look like one.
///
/// Invalid UTF-8, U+FFFD and control characters all indicate a corrupted or
/// coincidental decode. So does text that is one shorter unit repeated, which
/// is what reading the scattered LSB pattern at the wrong geometry yields.
pub(crate) fn accept_identity(bytes: Vec<u8>) -> Option<String> {
    let text = String::from_utf8(bytes).ok()?;
    let implausible = text
        .chars()
        .any(|c| c == char::REPLACEMENT_CHARACTER || c.is_control());
    if text.is_empty() || implausible || is_repetition(text.as_bytes()) {
        return None;
    }
    Some(text)
}

/// Returns `true` if `bytes` is some shorter unit repeated two or more times.
fn is_repetition(bytes: &[u8]) -> bool {
    let len = bytes.len();
    (1..=len / 2).any(|unit| {
        len % unit == 0 && bytes.chunks(unit).all(|chunk| chunk == &bytes[..unit])
    })
}
