//! [`RawImage`]: a validated, row-major interleaved pixel buffer.

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, RgbaImage};

use super::WatermarkError;

/// Decoded raster with mandatory geometry.
///
/// Invariant: `channels` is 3 or 4, both dimensions are non-zero and
/// `pixels.len() == width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl RawImage {
    /// Wrap an interleaved sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::UnsupportedChannels`],
    /// [`WatermarkError::InvalidDimensions`] or [`WatermarkError::BufferSize`]
    /// when the geometry is inconsistent.
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, WatermarkError> {
        if !(3..=4).contains(&channels) {
            return Err(WatermarkError::UnsupportedChannels(channels));
        }
        if width == 0 || height == 0 {
            return Err(WatermarkError::InvalidDimensions);
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or(WatermarkError::InvalidDimensions)?;
        if pixels.len() != expected {
            return Err(WatermarkError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Decode image bytes in any format the codec supports.
    ///
    /// Sources with an alpha channel decode to 4 channels, others to 3.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::Codec`] if the bytes do not decode and
    /// [`WatermarkError::UnsupportedChannels`] for greyscale sources.
    pub fn decode(bytes: &[u8]) -> Result<Self, WatermarkError> {
        let img = image::load_from_memory(bytes)?;
        let color = img.color();
        if color.channel_count() < 3 {
            return Err(WatermarkError::UnsupportedChannels(color.channel_count()));
        }
        let (width, height) = (img.width(), img.height());
        if color.has_alpha() {
            Self::new(width, height, 4, img.to_rgba8().into_raw())
        } else {
            Self::new(width, height, 3, img.to_rgb8().into_raw())
        }
    }

    /// Take ownership of an RGBA image buffer.
    pub fn from_rgba(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: 4,
            pixels: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Return an independent 4-channel copy, adding opaque alpha if needed.
    pub fn to_rgba(&self) -> RawImage {
        if self.channels == 4 {
            return self.clone();
        }
        let mut pixels = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for rgb in self.pixels.chunks_exact(3) {
            pixels.extend_from_slice(rgb);
            pixels.push(u8::MAX);
        }
        RawImage {
            width: self.width,
            height: self.height,
            channels: 4,
            pixels,
        }
    }

    /// Copy into an [`RgbaImage`] for use with `image::imageops`.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let rgba = self.to_rgba();
        // Geometry is validated on construction, so `from_raw` cannot fail.
        RgbaImage::from_raw(rgba.width, rgba.height, rgba.pixels)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Encode losslessly as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::Codec`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, WatermarkError> {
        let color = if self.channels == 4 {
            ExtendedColorType::Rgba8
        } else {
            ExtendedColorType::Rgb8
        };
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(&self.pixels, self.width, self.height, color)?;
        Ok(out)
    }
}
