//! Visible identity stamp in the bottom-right corner.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use super::{RawImage, WatermarkError};

/// Native glyph size of the bitmap font.
const GLYPH_PX: u32 = 8;

/// Distance of the label from the right and bottom borders.
const MARGIN_PX: i64 = 20;

/// Opacity of the black label.
const LABEL_ALPHA: f32 = 0.45;

/// Composite `text` as a semi-transparent black label anchored at the
/// bottom-right corner, and re-encode as PNG.
///
/// Characters outside the basic Latin font are skipped; glyph pixels that
/// fall outside the canvas are clipped.
///
/// # Errors
///
/// Returns a [`WatermarkError`] if `image_bytes` does not decode or the PNG
/// encoder fails.
pub fn apply_visible_mark(image_bytes: &[u8], text: &str) -> Result<Vec<u8>, WatermarkError> {
    let mut canvas = RawImage::decode(image_bytes)?.to_rgba_image();
    stamp(&mut canvas, text);
    RawImage::from_rgba(canvas).encode_png()
}

fn stamp(canvas: &mut RgbaImage, text: &str) {
    let (width, height) = canvas.dimensions();
    let font_px = (width / 40).max(18);
    let scale = (font_px / GLYPH_PX).max(1);
    let advance = i64::from(GLYPH_PX * scale);

    let glyphs: Vec<[u8; 8]> = text.chars().filter_map(|c| BASIC_FONTS.get(c)).collect();
    let label_width = advance * glyphs.len() as i64;
    let left = i64::from(width) - MARGIN_PX - label_width;
    let top = i64::from(height) - MARGIN_PX - advance;

    for (n, glyph) in glyphs.iter().enumerate() {
        let glyph_left = left + advance * n as i64;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_PX {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x0 = glyph_left + i64::from(col * scale);
                let y0 = top + row as i64 * i64::from(scale);
                fill_block(canvas, x0, y0, scale);
            }
        }
    }
}

/// Blend a `scale`×`scale` block of the label colour at (`x0`, `y0`).
fn fill_block(canvas: &mut RgbaImage, x0: i64, y0: i64, scale: u32) {
    let (width, height) = canvas.dimensions();
    for y in y0..y0 + i64::from(scale) {
        for x in x0..x0 + i64::from(scale) {
            let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
                continue;
            };
            if px >= width || py >= height {
                continue;
            }
            let dst = canvas.get_pixel_mut(px, py);
            *dst = blend_black_over(*dst);
        }
    }
}

/// Source-over compositing of black at [`LABEL_ALPHA`].
fn blend_black_over(dst: Rgba<u8>) -> Rgba<u8> {
    let dst_alpha = f32::from(dst[3]) / 255.0;
    let out_alpha = LABEL_ALPHA + dst_alpha * (1.0 - LABEL_ALPHA);
    let keep = dst_alpha * (1.0 - LABEL_ALPHA) / out_alpha;
    let channel = |c: u8| (f32::from(c) * keep).round() as u8;
    Rgba([
        channel(dst[0]),
        channel(dst[1]),
        channel(dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
