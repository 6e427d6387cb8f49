//! Mirroring frames across the canvas.
//!
//! A flip mirrors both the pixels and the frame's position, so a frame in the
//! top-left corner of the canvas ends up in the top-right (horizontal) or
//! bottom-left (vertical) corner.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::stream::{Canvas, Frame, FrameCodec, ImageStream};

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipAxis {
    /// Mirror left to right.
    Horizontal,
    /// Mirror top to bottom.
    Vertical,
}

/// Flip a frame in place.
///
/// Horizontal flips reverse every row; vertical flips reverse the row order
/// without moving any pixels.
///
/// # Errors
///
/// Returns `TransformError::Compressed` for compressed-only frames and
/// `TransformError::PositionOverflow` if the mirrored offset leaves `i32`.
pub fn flip_image(frame: &mut Frame, canvas: Canvas, axis: FlipAxis) -> Result<(), TransformError> {
    if let Some(pixels) = frame.edit_pixels()? {
        match axis {
            FlipAxis::Horizontal => pixels.reverse_columns(),
            FlipAxis::Vertical => pixels.reverse_rows(),
        }
    }

    match axis {
        FlipAxis::Horizontal => frame.left = mirror(canvas.width, frame.right())?,
        FlipAxis::Vertical => frame.top = mirror(canvas.height, frame.bottom())?,
    }
    Ok(())
}

/// Flip every frame of a stream. The canvas is unchanged.
pub fn flip_stream(
    stream: &mut ImageStream,
    axis: FlipAxis,
    codec: &dyn FrameCodec,
) -> Result<(), TransformError> {
    let canvas = stream.canvas;
    for frame in &mut stream.frames {
        frame.uncompress(codec)?;
        flip_image(frame, canvas, axis)?;
    }
    Ok(())
}

/// Offset of the near edge after mirroring `far_edge` across `extent`.
pub(crate) fn mirror(extent: u32, far_edge: i64) -> Result<i32, TransformError> {
    i32::try_from(i64::from(extent) - far_edge).map_err(|_| TransformError::PositionOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::RawCodec;

    fn numbered(width: u32, height: u32) -> Frame {
        Frame::new(width, height, (0..(width * height) as u8).collect()).unwrap()
    }

    #[test]
    fn test_flip_horizontal() {
        let mut frame = numbered(3, 2).at(1, 4);
        flip_image(&mut frame, Canvas::new(10, 10), FlipAxis::Horizontal).unwrap();

        assert_eq!(frame.pixels().unwrap().to_vec(), vec![2, 1, 0, 5, 4, 3]);
        assert_eq!((frame.left, frame.top), (6, 4));
    }

    #[test]
    fn test_flip_vertical() {
        let mut frame = numbered(3, 2).at(1, 4);
        flip_image(&mut frame, Canvas::new(10, 10), FlipAxis::Vertical).unwrap();

        assert_eq!(frame.pixels().unwrap().to_vec(), vec![3, 4, 5, 0, 1, 2]);
        assert_eq!((frame.left, frame.top), (1, 4));
    }

    #[test]
    fn test_flip_past_canvas_goes_negative() {
        let mut frame = numbered(4, 1).at(8, 0);
        flip_image(&mut frame, Canvas::new(10, 10), FlipAxis::Horizontal).unwrap();
        assert_eq!(frame.left, -2);
    }

    #[test]
    fn test_flip_drops_stale_compressed_copy() {
        let mut frame = numbered(2, 2);
        frame.compress(&RawCodec).unwrap();
        flip_image(&mut frame, Canvas::new(2, 2), FlipAxis::Vertical).unwrap();
        assert!(frame.compressed_data().is_none());
    }

    #[test]
    fn test_flip_stream_uncompresses() {
        let mut stream = ImageStream::new(4, 4)
            .with_frame(Frame::from_compressed(2, 1, vec![7, 9]).at(0, 3));
        flip_stream(&mut stream, FlipAxis::Horizontal, &RawCodec).unwrap();

        let frame = &stream.frames[0];
        assert_eq!(frame.pixels().unwrap().to_vec(), vec![9, 7]);
        assert_eq!((frame.left, frame.top), (2, 3));
    }

    #[test]
    fn test_flip_after_crop_view() {
        use crate::transform::{crop_image, CropRect, CropRequest};

        let mut frame = numbered(4, 4);
        crop_image(&mut frame, &CropRequest::new(CropRect::new(1, 1, 2, 2)), false).unwrap();
        flip_image(&mut frame, Canvas::new(4, 4), FlipAxis::Horizontal).unwrap();
        flip_image(&mut frame, Canvas::new(4, 4), FlipAxis::Vertical).unwrap();

        assert_eq!(frame.pixels().unwrap().to_vec(), vec![10, 9, 6, 5]);
        assert_eq!((frame.left, frame.top), (1, 1));
    }
}
