//! Seam to the compressed pixel format.
//!
//! Frames can arrive holding only compressed data. Transforms work on
//! uncompressed pixels, so they decompress on demand through a `FrameCodec`
//! and, where the frame started out compressed, compress again afterwards.

use crate::error::TransformError;

/// Compresses and decompresses a frame's indexed pixels.
pub trait FrameCodec {
    /// Compress `width * height` row-major pixels.
    fn compress(&self, width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Restore `width * height` row-major pixels from compressed data.
    fn decompress(&self, width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Stores pixel bytes verbatim.
///
/// Useful when no real codec is wired in, or as the storage form for frames
/// that should round-trip exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl FrameCodec for RawCodec {
    fn compress(&self, _width: u32, _height: u32, pixels: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(pixels.to_vec())
    }

    fn decompress(&self, width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(TransformError::Codec(format!(
                "stored frame holds {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(data.to_vec())
    }
}
