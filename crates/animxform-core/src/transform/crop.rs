//! Frame cropping against a canvas-relative rectangle.
//!
//! Crops never copy pixels: the frame's buffer is narrowed to a view of the
//! rows and columns that survive. A rectangle that misses a frame entirely
//! either empties the frame or, when asked to preserve it, collapses it to a
//! single transparent pixel so that an animation keeps its frame count.
//!
//! # Coordinate System
//!
//! - `CropRect` is given in canvas coordinates
//! - `combine_crop` translates it into frame-local coordinates
//! - `left_offset`/`top_offset` are subtracted from the surviving frame's
//!   position, so the crop origin becomes the new canvas origin

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::stream::{Canvas, Frame, FrameCodec, ImageStream};

/// A rectangle in canvas (or, after `combine_crop`, frame) coordinates.
///
/// `w` or `h` of zero or less means the rectangle is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CropRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Check if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Intersect with the canvas `(0, 0)-(width, height)`.
    pub fn clip_to(&self, canvas: Canvas) -> CropRect {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(canvas.width));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(canvas.height));
        CropRect {
            x: clamp_i32(x0),
            y: clamp_i32(y0),
            w: clamp_i32(x1 - x0),
            h: clamp_i32(y1 - y0),
        }
    }
}

/// A crop rectangle plus the offset subtracted from surviving frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropRequest {
    pub rect: CropRect,
    pub left_offset: i32,
    pub top_offset: i32,
}

impl CropRequest {
    /// Crop without moving the surviving frames.
    pub fn new(rect: CropRect) -> Self {
        Self {
            rect,
            left_offset: 0,
            top_offset: 0,
        }
    }

    /// Crop and shift frames so the rectangle's origin becomes `(0, 0)`.
    pub fn to_origin(rect: CropRect) -> Self {
        Self {
            rect,
            left_offset: rect.x,
            top_offset: rect.y,
        }
    }
}

/// Translate a canvas rectangle into `frame`'s local coordinates, clipped to
/// the frame.
///
/// The result has non-positive width or height when the rectangle misses the
/// frame.
pub fn combine_crop(rect: &CropRect, frame: &Frame) -> CropRect {
    let mut x = i64::from(rect.x) - i64::from(frame.left);
    let mut y = i64::from(rect.y) - i64::from(frame.top);
    let mut w = i64::from(rect.w);
    let mut h = i64::from(rect.h);
    let frame_w = i64::from(frame.width());
    let frame_h = i64::from(frame.height());

    if x < 0 {
        w += x;
        x = 0;
    }
    if y < 0 {
        h += y;
        y = 0;
    }
    if x + w > frame_w {
        w = frame_w - x;
    }
    if y + h > frame_h {
        h = frame_h - y;
    }

    CropRect {
        x: clamp_i32(x),
        y: clamp_i32(y),
        w: clamp_i32(w),
        h: clamp_i32(h),
    }
}

/// Crop a frame in place.
///
/// # Arguments
///
/// * `frame` - Frame to crop; must not be compressed-only
/// * `request` - Canvas rectangle and the offset to subtract afterwards
/// * `preserve_empty` - Keep a 1x1 transparent frame when nothing intersects
///
/// # Returns
///
/// Whether the frame still has pixel content.
///
/// # Behavior
///
/// - Intersection: the buffer becomes a view of the clipped area, the frame
///   moves by `clip origin - request offset`
/// - No intersection, `preserve_empty`: the frame keeps only its top-left
///   pixel, whose value becomes the transparent index
/// - No intersection otherwise: the frame is emptied
///
/// # Errors
///
/// Returns `TransformError::Compressed` for compressed-only frames and
/// `TransformError::PositionOverflow` if the new offset leaves `i32`.
pub fn crop_image(
    frame: &mut Frame,
    request: &CropRequest,
    preserve_empty: bool,
) -> Result<bool, TransformError> {
    let clip = combine_crop(&request.rect, frame);
    let (left, top) = (frame.left, frame.top);

    let Some(pixels) = frame.edit_pixels()? else {
        return Ok(false);
    };

    if !clip.is_empty() {
        pixels.view(
            clip.x as usize,
            clip.y as usize,
            clip.w as usize,
            clip.h as usize,
        );
        frame.sync_dimensions();
        frame.left = shifted(left, clip.x, request.left_offset)?;
        frame.top = shifted(top, clip.y, request.top_offset)?;
        Ok(true)
    } else if preserve_empty && !pixels.is_empty() {
        pixels.view(0, 0, 1, 1);
        let kept = pixels.row(0)[0];
        frame.sync_dimensions();
        frame.transparent = Some(kept);
        Ok(true)
    } else {
        frame.clear();
        Ok(false)
    }
}

/// Crop every frame of a stream to `rect` and make it the new canvas.
///
/// The rectangle is first clipped to the current canvas. Compressed frames
/// are decompressed on demand. Frames that end up empty stay in the stream.
///
/// # Returns
///
/// The number of frames left with pixel content.
pub fn crop_stream(
    stream: &mut ImageStream,
    rect: CropRect,
    preserve_empty: bool,
    codec: &dyn FrameCodec,
) -> Result<usize, TransformError> {
    let clipped = rect.clip_to(stream.canvas);
    let request = CropRequest::to_origin(clipped);

    let mut visible = 0;
    for frame in &mut stream.frames {
        frame.uncompress(codec)?;
        if crop_image(frame, &request, preserve_empty)? {
            visible += 1;
        }
    }

    stream.canvas = Canvas::new(clipped.w.max(0) as u32, clipped.h.max(0) as u32);
    tracing::debug!(
        x = clipped.x,
        y = clipped.y,
        w = clipped.w,
        h = clipped.h,
        visible,
        frames = stream.frames.len(),
        "cropped stream"
    );
    Ok(visible)
}

fn shifted(position: i32, delta: i32, offset: i32) -> Result<i32, TransformError> {
    i32::try_from(i64::from(position) + i64::from(delta) - i64::from(offset))
        .map_err(|_| TransformError::PositionOverflow)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::RawCodec;

    /// Frame where each pixel is `(y * width + x) % 256`.
    fn test_frame(width: u32, height: u32) -> Frame {
        let pixels = (0..width * height).map(|i| (i % 256) as u8).collect();
        Frame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_combine_crop_inside() {
        let frame = test_frame(20, 20).at(10, 10);
        let clip = combine_crop(&CropRect::new(12, 15, 5, 5), &frame);
        assert_eq!(clip, CropRect::new(2, 5, 5, 5));
    }

    #[test]
    fn test_combine_crop_clips_start() {
        let frame = test_frame(20, 20).at(10, 10);
        let clip = combine_crop(&CropRect::new(5, 0, 10, 20), &frame);
        assert_eq!(clip, CropRect::new(0, 0, 5, 10));
    }

    #[test]
    fn test_combine_crop_clips_end() {
        let frame = test_frame(8, 8);
        let clip = combine_crop(&CropRect::new(5, 5, 10, 10), &frame);
        assert_eq!(clip, CropRect::new(5, 5, 3, 3));
    }

    #[test]
    fn test_combine_crop_miss() {
        let frame = test_frame(8, 8);
        let clip = combine_crop(&CropRect::new(9, 0, 4, 4), &frame);
        assert!(clip.is_empty());

        let frame = test_frame(8, 8).at(20, 20);
        let clip = combine_crop(&CropRect::new(0, 0, 10, 10), &frame);
        assert!(clip.is_empty());
    }

    #[test]
    fn test_crop_image_view() {
        let mut frame = test_frame(10, 10).at(4, 4);
        let request = CropRequest::to_origin(CropRect::new(6, 7, 3, 2));

        assert!(crop_image(&mut frame, &request, false).unwrap());

        assert_eq!((frame.width(), frame.height()), (3, 2));
        // Clip origin is (2, 3) inside the frame; offset subtracts (6, 7).
        assert_eq!((frame.left, frame.top), (0, 0));
        let pixels = frame.pixels().unwrap();
        assert_eq!(pixels.row(0), &[32, 33, 34]);
        assert_eq!(pixels.row(1), &[42, 43, 44]);
    }

    #[test]
    fn test_crop_image_keeps_relative_position() {
        let mut frame = test_frame(4, 4).at(10, 12);
        let request = CropRequest::to_origin(CropRect::new(5, 5, 20, 20));

        assert!(crop_image(&mut frame, &request, false).unwrap());
        assert_eq!((frame.left, frame.top), (5, 7));
        assert_eq!((frame.width(), frame.height()), (4, 4));
    }

    #[test]
    fn test_crop_image_no_intersection_preserved() {
        let mut frame = test_frame(8, 8).with_transparent(200);
        let request = CropRequest::new(CropRect::new(8, 8, 10, 10));

        assert!(crop_image(&mut frame, &request, true).unwrap());
        assert_eq!((frame.width(), frame.height()), (1, 1));
        let pixel = frame.pixels().unwrap().get(0, 0).unwrap();
        assert_eq!(pixel, 0);
        assert_eq!(frame.transparent, Some(pixel));
    }

    #[test]
    fn test_crop_image_no_intersection_dropped() {
        let mut frame = test_frame(8, 8);
        let request = CropRequest::new(CropRect::new(8, 8, 10, 10));

        assert!(!crop_image(&mut frame, &request, false).unwrap());
        assert!(frame.is_empty());
        assert_eq!((frame.width(), frame.height()), (0, 0));
    }

    #[test]
    fn test_crop_image_overlapping_corner() {
        // Overlaps the bottom-right 3x3 corner of an 8x8 frame.
        let mut frame = test_frame(8, 8);
        let request = CropRequest::new(CropRect::new(5, 5, 10, 10));

        assert!(crop_image(&mut frame, &request, false).unwrap());
        assert_eq!((frame.width(), frame.height()), (3, 3));
        assert_eq!((frame.left, frame.top), (5, 5));
        assert_eq!(frame.pixels().unwrap().row(0), &[45, 46, 47]);
    }

    #[test]
    fn test_crop_image_empty_frame() {
        let mut frame = Frame::empty();
        let request = CropRequest::new(CropRect::new(0, 0, 10, 10));
        assert!(!crop_image(&mut frame, &request, true).unwrap());
        assert!(frame.is_empty());
    }

    #[test]
    fn test_crop_image_rejects_compressed() {
        let mut frame = Frame::from_compressed(2, 2, vec![0; 4]);
        let request = CropRequest::new(CropRect::new(0, 0, 1, 1));
        assert!(matches!(
            crop_image(&mut frame, &request, false),
            Err(TransformError::Compressed)
        ));
    }

    #[test]
    fn test_crop_image_twice_composes() {
        let mut frame = test_frame(10, 10);
        crop_image(
            &mut frame,
            &CropRequest::to_origin(CropRect::new(2, 2, 6, 6)),
            false,
        )
        .unwrap();
        crop_image(
            &mut frame,
            &CropRequest::to_origin(CropRect::new(1, 1, 2, 2)),
            false,
        )
        .unwrap();

        assert_eq!((frame.left, frame.top), (0, 0));
        assert_eq!(frame.pixels().unwrap().to_vec(), vec![33, 34, 43, 44]);
    }

    #[test]
    fn test_clip_to_canvas() {
        let rect = CropRect::new(-5, 2, 20, 50);
        assert_eq!(rect.clip_to(Canvas::new(10, 10)), CropRect::new(0, 2, 10, 8));
    }

    #[test]
    fn test_crop_stream() {
        let mut stream = ImageStream::new(20, 20)
            .with_frame(test_frame(20, 20))
            .with_frame(test_frame(4, 4).at(12, 12))
            .with_frame(Frame::from_compressed(2, 2, vec![1, 2, 3, 4]).at(1, 1));

        let visible = crop_stream(&mut stream, CropRect::new(0, 0, 10, 10), false, &RawCodec).unwrap();

        assert_eq!(visible, 2);
        assert_eq!(stream.canvas, Canvas::new(10, 10));
        assert_eq!(stream.frames[0].width(), 10);
        assert!(stream.frames[1].is_empty());
        assert_eq!(stream.frames[2].pixels().unwrap().to_vec(), vec![1, 2, 3, 4]);
        assert!(stream.frames[2].compressed_data().is_none());
    }

    #[test]
    fn test_crop_stream_preserve_keeps_frame_count() {
        let mut stream = ImageStream::new(20, 20)
            .with_frame(test_frame(20, 20))
            .with_frame(test_frame(4, 4).at(12, 12));

        let visible = crop_stream(&mut stream, CropRect::new(0, 0, 10, 10), true, &RawCodec).unwrap();

        assert_eq!(visible, 2);
        assert_eq!(stream.visible_frames(), 2);
        assert_eq!(stream.frames[1].width(), 1);
    }
}
