//! Error type for watermark embedding, detection and raster handling.

use thiserror::Error;

use super::MAX_IDENTITY_LEN;

/// Errors produced by the watermark layer.
///
/// A watermark that cannot be found is not an error; detection reports it as
/// `None`. Only undecodable input surfaces here.
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Identity text does not fit the one-byte length field.
    #[error("watermark text is {0} bytes; at most {MAX_IDENTITY_LEN} fit")]
    PayloadTooLarge(usize),

    /// An empty identity would produce a mark no detector accepts.
    #[error("watermark text must not be empty")]
    EmptyIdentity,

    /// Text made of one shorter unit repeated reads back as a misaligned
    /// decode and is never reported.
    #[error("watermark text must not be a repeated unit")]
    RepeatedIdentity,

    /// The raster holds fewer samples than the payload has bits.
    #[error("image too small to embed watermark: need {needed} samples, have {capacity}")]
    ImageTooSmall { needed: usize, capacity: usize },

    /// Only RGB and RGBA rasters are supported.
    #[error("unsupported channel count {0}; expected 3 or 4")]
    UnsupportedChannels(u8),

    /// Width or height is zero.
    #[error("image dimensions must be non-zero")]
    InvalidDimensions,

    /// The pixel buffer length disagrees with the declared geometry.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// The underlying image codec could not decode or encode the bytes.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}
