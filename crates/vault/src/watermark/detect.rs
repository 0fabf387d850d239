//! Watermark detection on suspect images.

use image::imageops::{self, FilterType};
use tracing::debug;

use super::bits::bits_to_bytes;
use super::region::{CenterRegion, BLUE};
use super::vote::majority_vote;
use super::{accept_identity, RawImage, WatermarkError, MAX_PAYLOAD_BITS};

/// Side of the brightness grid the central crop is resampled to.
pub const GRID_SIZE: u32 = 21;

/// Fraction of the shorter side kept by the pattern-grid crop.
const PATTERN_CROP: f64 = 0.5;

/// Decode `bytes` and try to recover an embedded identity.
///
/// # Errors
///
/// Returns a [`WatermarkError`] only if the bytes are not a decodable RGB(A)
/// image. An image without a recoverable mark yields `Ok(None)`.
pub fn detect_watermark(bytes: &[u8]) -> Result<Option<String>, WatermarkError> {
    let image = RawImage::decode(bytes)?;
    Ok(detect_in(&image))
}

/// Run the detection strategies over an already decoded raster.
///
/// Strategies run in a fixed order and the first plausible identity wins:
/// pattern grid, centre-region vote, full-image LSB vote.
pub fn detect_in(image: &RawImage) -> Option<String> {
    let image = image.to_rgba();
    if image.pixels().len() < 8 {
        return None;
    }

    let strategies: [(&str, fn(&RawImage) -> Option<String>); 3] = [
        ("pattern_grid", pattern_grid),
        ("center_vote", center_vote),
        ("full_lsb_vote", full_lsb_vote),
    ];
    for (name, strategy) in strategies {
        if let Some(identity) = strategy(&image) {
            debug!(strategy = name, identity_len = identity.len(), "watermark recovered");
            return Some(identity);
        }
    }
    debug!("no watermark recovered");
    None
}

/// Threshold a downsampled central crop against its mean brightness and read
/// the cells as a length-prefixed payload.
fn pattern_grid(image: &RawImage) -> Option<String> {
    let (width, height) = (image.width(), image.height());
    let crop = (f64::from(width.min(height)) * PATTERN_CROP) as u32;
    if crop == 0 {
        return None;
    }
    let left = (width - crop) / 2;
    let top = (height - crop) / 2;

    let rgba = image.to_rgba_image();
    let cropped = imageops::crop_imm(&rgba, left, top, crop, crop).to_image();
    let grid = imageops::resize(&cropped, GRID_SIZE, GRID_SIZE, FilterType::Triangle);

    let brightness: Vec<f64> = grid
        .pixels()
        .map(|p| (f64::from(p[0]) + f64::from(p[1]) + f64::from(p[2])) / 3.0)
        .collect();
    let mean = brightness.iter().sum::<f64>() / brightness.len() as f64;
    let bits: Vec<u8> = brightness.iter().map(|&v| u8::from(v > mean)).collect();

    let len = usize::from(bits_to_bytes(&bits[..8])[0]);
    if len == 0 || 8 + len * 8 > bits.len() {
        return None;
    }
    accept_identity(bits_to_bytes(&bits[8..8 + len * 8]))
}

/// Classify centre-square blue samples against their mean and vote.
///
/// Squares are tried in [`CenterRegion::candidates`] order so that a
/// centrally cropped copy, whose own centre square no longer lines up with
/// the marked one, is still read at the marked geometry.
fn center_vote(image: &RawImage) -> Option<String> {
    CenterRegion::candidates(image.width(), image.height())
        .iter()
        .find_map(|region| vote_region(image, region))
}

fn vote_region(image: &RawImage, region: &CenterRegion) -> Option<String> {
    let pixels = image.pixels();
    let blues: Vec<u8> = region
        .sample_indices(image.width(), image.channels() as usize, BLUE)
        .take(MAX_PAYLOAD_BITS)
        .map(|idx| pixels[idx])
        .collect();
    if blues.is_empty() {
        return None;
    }
    let mean = blues.iter().map(|&b| f64::from(b)).sum::<f64>() / blues.len() as f64;
    let bits: Vec<u8> = blues.iter().map(|&b| u8::from(f64::from(b) > mean)).collect();
    majority_vote(&bits)
}

/// Vote over the LSB of every sample in the buffer.
fn full_lsb_vote(image: &RawImage) -> Option<String> {
    let bits: Vec<u8> = image.pixels().iter().map(|s| s & 1).collect();
    majority_vote(&bits)
}
