//! A single indexed-color frame positioned on the stream canvas.

use crate::error::TransformError;
use crate::palette::Palette;

use super::buffer::PixelBuffer;
use super::codec::FrameCodec;

/// One frame of an animated stream.
///
/// Storage is either an uncompressed [`PixelBuffer`], compressed bytes, or
/// both. A frame with neither is empty: it has zero width and height and
/// draws nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Horizontal offset on the canvas.
    pub left: i32,
    /// Vertical offset on the canvas.
    pub top: i32,
    width: u32,
    height: u32,
    pixels: Option<PixelBuffer>,
    compressed: Option<Vec<u8>>,
    /// Private palette, overriding the stream's global palette.
    pub palette: Option<Palette>,
    /// Palette index drawn as transparent.
    pub transparent: Option<u8>,
}

impl Frame {
    /// Create a frame at the canvas origin from row-major pixel indices.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::BufferSize` if `data.len() != width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TransformError> {
        Ok(Self::from_buffer(PixelBuffer::new(width, height, data)?))
    }

    /// Create a frame at the canvas origin from an existing buffer.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            left: 0,
            top: 0,
            width: buffer.width(),
            height: buffer.height(),
            pixels: Some(buffer),
            compressed: None,
            palette: None,
            transparent: None,
        }
    }

    /// Create a frame that only holds compressed data.
    pub fn from_compressed(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            pixels: None,
            compressed: Some(data),
            palette: None,
            transparent: None,
        }
    }

    /// Create an empty frame.
    pub fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            pixels: None,
            compressed: None,
            palette: None,
            transparent: None,
        }
    }

    /// Place the frame at `(left, top)`.
    pub fn at(mut self, left: i32, top: i32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_transparent(mut self, index: u8) -> Self {
        self.transparent = Some(index);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Right edge on the canvas (exclusive).
    pub fn right(&self) -> i64 {
        i64::from(self.left) + i64::from(self.width)
    }

    /// Bottom edge on the canvas (exclusive).
    pub fn bottom(&self) -> i64 {
        i64::from(self.top) + i64::from(self.height)
    }

    /// Uncompressed pixels, if present.
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        self.pixels.as_ref()
    }

    /// Compressed data, if present.
    pub fn compressed_data(&self) -> Option<&[u8]> {
        self.compressed.as_deref()
    }

    /// Check if the frame has no storage at all.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_none() && self.compressed.is_none()
    }

    /// Check if the frame only holds compressed data.
    pub fn is_compressed(&self) -> bool {
        self.pixels.is_none() && self.compressed.is_some()
    }

    /// Decompress into a pixel buffer if the frame only holds compressed data.
    pub fn uncompress(&mut self, codec: &dyn FrameCodec) -> Result<(), TransformError> {
        if self.pixels.is_some() {
            return Ok(());
        }
        if let Some(data) = &self.compressed {
            let pixels = codec.decompress(self.width, self.height, data)?;
            self.pixels = Some(PixelBuffer::new(self.width, self.height, pixels)?);
        }
        Ok(())
    }

    /// Compress the current pixels, replacing any older compressed data.
    pub fn compress(&mut self, codec: &dyn FrameCodec) -> Result<(), TransformError> {
        if let Some(pixels) = &self.pixels {
            self.compressed = Some(codec.compress(self.width, self.height, &pixels.to_vec())?);
        }
        Ok(())
    }

    /// Drop the uncompressed pixels when a compressed copy exists.
    pub fn release_uncompressed(&mut self) {
        if self.compressed.is_some() {
            self.pixels = None;
        }
    }

    /// Drop the compressed copy when uncompressed pixels exist.
    pub fn release_compressed(&mut self) {
        if self.pixels.is_some() {
            self.compressed = None;
        }
    }

    /// Pixels about to be mutated.
    ///
    /// Any compressed copy goes stale and is dropped. Empty frames yield
    /// `Ok(None)`.
    pub(crate) fn edit_pixels(&mut self) -> Result<Option<&mut PixelBuffer>, TransformError> {
        if self.is_compressed() {
            return Err(TransformError::Compressed);
        }
        self.compressed = None;
        Ok(self.pixels.as_mut())
    }

    /// Swap in new pixels; dimensions follow the buffer.
    pub(crate) fn set_pixels(&mut self, buffer: PixelBuffer) {
        self.width = buffer.width();
        self.height = buffer.height();
        self.pixels = Some(buffer);
        self.compressed = None;
    }

    /// Resync dimensions after the buffer was narrowed in place.
    pub(crate) fn sync_dimensions(&mut self) {
        if let Some(pixels) = &self.pixels {
            self.width = pixels.width();
            self.height = pixels.height();
        }
    }

    /// Drop all storage.
    pub(crate) fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pixels = None;
        self.compressed = None;
    }

    /// Render the frame through `palette` as RGBA.
    ///
    /// The transparent index gets alpha 0. Indices past the end of the
    /// palette render as opaque black. Returns `None` without uncompressed
    /// pixels.
    pub fn to_rgba_image(&self, palette: &Palette) -> Option<image::RgbaImage> {
        let pixels = self.pixels.as_ref()?;
        let mut out = image::RgbaImage::new(self.width, self.height);
        for (y, row) in pixels.rows().enumerate() {
            for (x, &index) in row.iter().enumerate() {
                let rgba = if self.transparent == Some(index) {
                    image::Rgba([0, 0, 0, 0])
                } else {
                    palette
                        .get(index as usize)
                        .map_or(image::Rgba([0, 0, 0, 255]), |color| color.to_rgba(255))
                };
                out.put_pixel(x as u32, y as u32, rgba);
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;
    use crate::stream::RawCodec;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(3, 2, vec![0; 6]).unwrap().at(5, -1);
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.right(), 8);
        assert_eq!(frame.bottom(), 1);
        assert!(!frame.is_empty());
        assert!(!frame.is_compressed());
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::empty();
        assert!(frame.is_empty());
        assert!(frame.pixels().is_none());
        assert_eq!(frame.width(), 0);
    }

    #[test]
    fn test_uncompress_and_release() {
        let mut frame = Frame::from_compressed(2, 2, vec![1, 2, 3, 4]);
        assert!(frame.is_compressed());

        frame.uncompress(&RawCodec).unwrap();
        assert!(!frame.is_compressed());
        assert_eq!(frame.pixels().unwrap().row(1), &[3, 4]);

        frame.release_uncompressed();
        assert!(frame.is_compressed());
    }

    #[test]
    fn test_release_uncompressed_keeps_only_copy() {
        let mut frame = Frame::new(1, 1, vec![9]).unwrap();
        frame.release_uncompressed();
        assert!(frame.pixels().is_some());
    }

    #[test]
    fn test_compress_replaces_stale_data() {
        let mut frame = Frame::new(2, 1, vec![7, 8]).unwrap();
        frame.compress(&RawCodec).unwrap();
        assert_eq!(frame.compressed_data(), Some(&[7u8, 8][..]));

        frame.release_compressed();
        assert!(frame.compressed_data().is_none());
    }

    #[test]
    fn test_edit_pixels_rejects_compressed() {
        let mut frame = Frame::from_compressed(1, 1, vec![0]);
        assert!(matches!(
            frame.edit_pixels(),
            Err(TransformError::Compressed)
        ));
    }

    #[test]
    fn test_to_rgba_image() {
        let palette = Palette::new(vec![Color::rgb(255, 0, 0), Color::rgb(0, 255, 0)]);
        let frame = Frame::new(3, 1, vec![0, 1, 5]).unwrap().with_transparent(1);
        let img = frame.to_rgba_image(&palette).unwrap();

        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(0, 0), &image::Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 0), &image::Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(2, 0), &image::Rgba([0, 0, 0, 255]));
    }
}
