//! Invisible watermark embedding.

use tracing::debug;

use super::bits::bytes_to_bits;
use super::region::{CenterRegion, BLUE};
use super::{encode_payload, RawImage, WatermarkError};

/// Step applied to a centre-region blue sample after its LSB is set: up for
/// a 1 bit, down for a 0 bit.
const MODULATION: u8 = 1;

/// Embed `identity` into a copy of `image` and return it encoded as PNG.
///
/// The raster is widened to RGBA first. Two passes then run over the copy:
///
/// 1. the centre-region pattern: every blue sample in the centre square,
///    row-major, takes the next payload bit (cycling) in its LSB and is then
///    nudged by one toward that bit;
/// 2. the scattered LSB pass: the payload bits are repeated over the LSB of
///    every sample of the buffer, for as many whole repeats as fit.
///
/// # Errors
///
/// Returns [`WatermarkError::PayloadTooLarge`] for identities over 255 bytes,
/// [`WatermarkError::ImageTooSmall`] if the raster has fewer samples than the
/// payload has bits, and [`WatermarkError::Codec`] if PNG encoding fails.
pub fn embed_watermark(image: &RawImage, identity: &str) -> Result<Vec<u8>, WatermarkError> {
    let payload = encode_payload(identity)?;
    let bits = bytes_to_bits(&payload);

    let mut canvas = image.to_rgba();
    let capacity = canvas.pixels().len();
    if capacity < bits.len() {
        return Err(WatermarkError::ImageTooSmall {
            needed: bits.len(),
            capacity,
        });
    }

    embed_center_pattern(&mut canvas, &bits);
    let repeats = embed_scattered_lsb(canvas.pixels_mut(), &bits);

    debug!(
        width = canvas.width(),
        height = canvas.height(),
        payload_bits = bits.len(),
        repeats,
        "watermark embedded"
    );
    canvas.encode_png()
}

/// Write `bits` cyclically into the blue samples of the centre square.
fn embed_center_pattern(canvas: &mut RawImage, bits: &[u8]) {
    let region = CenterRegion::of(canvas.width(), canvas.height());
    let indices = region.sample_indices(canvas.width(), canvas.channels() as usize, BLUE);
    let pixels = canvas.pixels_mut();
    for (idx, &bit) in indices.zip(bits.iter().cycle()) {
        let marked = (pixels[idx] & 0xFE) | bit;
        pixels[idx] = if bit == 1 {
            marked.saturating_add(MODULATION)
        } else {
            marked.saturating_sub(MODULATION)
        };
    }
}

/// Overwrite sample LSBs with whole repeats of `bits`; returns the repeat count.
fn embed_scattered_lsb(samples: &mut [u8], bits: &[u8]) -> usize {
    let mut repeats = 0;
    for chunk in samples.chunks_exact_mut(bits.len()) {
        for (sample, &bit) in chunk.iter_mut().zip(bits) {
            *sample = (*sample & 0xFE) | bit;
        }
        repeats += 1;
    }
    repeats
}
