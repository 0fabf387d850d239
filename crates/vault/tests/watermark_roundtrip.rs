//! Embed/detect integration tests over synthetic rasters.

use std::sync::Arc;

use image::imageops;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use vault::keys::MasterKey;
use vault::watermark::{detect_watermark, embed_watermark, RawImage, WatermarkError};
use vault::ImageVault;

/// Top half dark red, bottom half bright red; green and blue flat.
fn split_tone(width: u32, height: u32) -> RawImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let red = if y < height / 2 { 0 } else { 255 };
        for _ in 0..width {
            pixels.extend_from_slice(&[red, 128, 128, 255]);
        }
    }
    RawImage::new(width, height, 4, pixels).unwrap()
}

fn lowercase_identity(len: usize) -> String {
    (0..len).map(|i| (b'a' + (i * 7 % 26) as u8) as char).collect()
}

#[test]
fn identities_up_to_32_bytes_survive_48px() {
    let cover = split_tone(48, 48);
    for len in 1..=32 {
        let identity = lowercase_identity(len);
        let marked = embed_watermark(&cover, &identity).unwrap();
        assert_eq!(
            detect_watermark(&marked).unwrap().as_deref(),
            Some(identity.as_str()),
            "identity of {len} bytes"
        );
    }
}

#[test]
fn marked_output_is_png_of_same_size() {
    let marked = embed_watermark(&split_tone(40, 30), "erin").unwrap();
    assert_eq!(&marked[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = RawImage::decode(&marked).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn embedding_leaves_the_input_untouched() {
    let cover = split_tone(48, 48);
    let before = cover.clone();
    embed_watermark(&cover, "frank").unwrap();
    assert_eq!(cover, before);
}

/// Crop `png` to `width`×`height` at (`x`, `y`) and re-encode.
fn crop_png(png: &[u8], x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
    let rgba = image::load_from_memory(png).unwrap().to_rgba8();
    let cropped = imageops::crop_imm(&rgba, x, y, width, height).to_image();
    RawImage::from_rgba(cropped).encode_png().unwrap()
}

/// Keep the central 60% of each side.
fn central_crop(png: &[u8], side: u32) -> Vec<u8> {
    let kept = (f64::from(side) * 0.6).round() as u32;
    let offset = (side - kept) / 2;
    crop_png(png, offset, offset, kept, kept)
}

#[test]
fn central_crop_keeps_short_identity() {
    for side in [48, 50, 64, 75, 96, 120] {
        let marked = embed_watermark(&split_tone(side, side), "alice").unwrap();
        assert_eq!(
            detect_watermark(&central_crop(&marked, side)).unwrap().as_deref(),
            Some("alice"),
            "{side}px original"
        );
    }
}

#[test]
fn off_centre_crop_keeps_short_identity() {
    let marked = embed_watermark(&split_tone(80, 80), "alice").unwrap();
    let cropped = crop_png(&marked, 17, 15, 48, 50);
    assert_eq!(detect_watermark(&cropped).unwrap().as_deref(), Some("alice"));
}

#[test]
fn crop_loses_identity_too_long_for_the_centre_square() {
    // 20 bytes need 168 bits per repeat; the 21px square of a 64px original
    // holds 441 samples, fewer than three repeats. Only the scattered LSB
    // pattern carries it, and that does not survive cropping.
    let identity = lowercase_identity(20);
    let marked = embed_watermark(&split_tone(64, 64), &identity).unwrap();
    assert_eq!(
        detect_watermark(&marked).unwrap().as_deref(),
        Some(identity.as_str())
    );
    assert_eq!(detect_watermark(&central_crop(&marked, 64)).unwrap(), None);

    // A 96px original has a 32px square, so the same identity survives.
    let marked = embed_watermark(&split_tone(96, 96), &identity).unwrap();
    assert_eq!(
        detect_watermark(&central_crop(&marked, 96)).unwrap().as_deref(),
        Some(identity.as_str())
    );
}

#[test]
fn unmarked_images_report_absent() {
    assert_eq!(detect_watermark(&split_tone(48, 48).encode_png().unwrap()).unwrap(), None);

    let mut rng = StdRng::seed_from_u64(42);
    let mut pixels = vec![0u8; 64 * 64 * 4];
    rng.fill_bytes(&mut pixels);
    for alpha in pixels.iter_mut().skip(3).step_by(4) {
        *alpha = 255;
    }
    let noise = RawImage::new(64, 64, 4, pixels).unwrap();
    assert_eq!(detect_watermark(&noise.encode_png().unwrap()).unwrap(), None);
}

#[test]
fn rgb_input_gains_alpha() {
    let rgb = RawImage::new(48, 48, 3, vec![128; 48 * 48 * 3]).unwrap();
    let marked = RawImage::decode(&embed_watermark(&rgb, "gina").unwrap()).unwrap();
    assert_eq!(marked.channels(), 4);
}

#[test]
fn payload_limits_are_enforced() {
    let cover = split_tone(64, 64);
    assert!(matches!(
        embed_watermark(&cover, &"x".repeat(256)),
        Err(WatermarkError::PayloadTooLarge(256))
    ));
    assert!(matches!(
        embed_watermark(&cover, ""),
        Err(WatermarkError::EmptyIdentity)
    ));
    assert!(matches!(
        embed_watermark(&cover, "abcabc"),
        Err(WatermarkError::RepeatedIdentity)
    ));

    let tiny = split_tone(2, 2);
    assert!(matches!(
        embed_watermark(&tiny, "alice"),
        Err(WatermarkError::ImageTooSmall {
            needed: 48,
            capacity: 16
        })
    ));
}

#[tokio::test]
async fn viewer_render_traces_back_to_viewer() {
    let vault = ImageVault::new(Arc::new(MasterKey::ephemeral()), false);
    let upload = split_tone(48, 48).encode_png().unwrap();
    let sealed = vault.seal(upload).await.unwrap();

    let rendered = vault.view(&sealed, "dave").await.unwrap();
    let report = vault.detect(rendered).await.unwrap();
    assert_eq!(report.watermark_id.as_deref(), Some("dave"));

    let preview = vault.preview(&sealed).await.unwrap();
    assert!(!vault.detect(preview).await.unwrap().is_found());
}

#[tokio::test]
async fn visible_stamp_does_not_hide_the_invisible_mark() {
    let vault = ImageVault::new(Arc::new(MasterKey::ephemeral()), true);
    let upload = split_tone(200, 200).encode_png().unwrap();
    let sealed = vault.seal(upload).await.unwrap();

    let rendered = vault.view(&sealed, "dave").await.unwrap();
    let raw = RawImage::decode(&rendered).unwrap();
    // Bottom-right corner carries the darkened label.
    let stamped = (116..180u32)
        .flat_map(|x| (164..180u32).map(move |y| (x, y)))
        .any(|(x, y)| {
            let idx = ((y * 200 + x) * 4 + 1) as usize;
            raw.pixels()[idx] < 100
        });
    assert!(stamped);

    let report = vault.detect(rendered).await.unwrap();
    assert_eq!(report.watermark_id.as_deref(), Some("dave"));
}
