//! Quarter-turn rotation of frames and streams.
//!
//! Rotation is clockwise. A quarter turn writes a fresh, transposed buffer
//! and moves the frame to where its rectangle lands on the rotated canvas;
//! the canvas itself swaps width and height. A half turn is the two flips
//! combined and keeps the canvas as is.
//!
//! # Algorithm
//!
//! For a 90° turn each output row is a source column read bottom to top,
//! columns taken left to right. For 270° each output row is a source column
//! read top to bottom, columns taken right to left.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::stream::{Canvas, Frame, FrameCodec, ImageStream, PixelBuffer};

use super::flip::{flip_image, mirror, FlipAxis};

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Parse a clockwise angle in degrees.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::InvalidRotation` for anything other than 90,
    /// 180 or 270.
    pub fn from_degrees(degrees: u32) -> Result<Self, TransformError> {
        match degrees {
            90 => Ok(Rotation::Rotate90),
            180 => Ok(Rotation::Rotate180),
            270 => Ok(Rotation::Rotate270),
            other => Err(TransformError::InvalidRotation(other)),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }

    /// Returns true if this rotation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = TransformError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Rotate a frame positioned on `canvas`.
///
/// # Errors
///
/// Returns `TransformError::Compressed` for compressed-only frames and
/// `TransformError::PositionOverflow` if the new offset leaves `i32`.
pub fn rotate_image(
    frame: &mut Frame,
    canvas: Canvas,
    rotation: Rotation,
) -> Result<(), TransformError> {
    let (left, top) = match rotation {
        Rotation::Rotate180 => {
            flip_image(frame, canvas, FlipAxis::Horizontal)?;
            return flip_image(frame, canvas, FlipAxis::Vertical);
        }
        Rotation::Rotate90 => (mirror(canvas.height, frame.bottom())?, frame.left),
        Rotation::Rotate270 => (frame.top, mirror(canvas.width, frame.right())?),
    };

    if let Some(pixels) = frame.edit_pixels()? {
        let rotated = quarter_turn(pixels, rotation == Rotation::Rotate90);
        frame.set_pixels(rotated);
    }
    frame.left = left;
    frame.top = top;
    Ok(())
}

/// Rotate every frame of a stream and the canvas with them.
pub fn rotate_stream(
    stream: &mut ImageStream,
    rotation: Rotation,
    codec: &dyn FrameCodec,
) -> Result<(), TransformError> {
    let canvas = stream.canvas;
    for frame in &mut stream.frames {
        frame.uncompress(codec)?;
        rotate_image(frame, canvas, rotation)?;
    }
    if rotation.swaps_dimensions() {
        stream.canvas = Canvas::new(canvas.height, canvas.width);
    }
    Ok(())
}

/// Transpose `src` into a new buffer, turning it a quarter clockwise or
/// counter-clockwise.
fn quarter_turn(src: &PixelBuffer, clockwise: bool) -> PixelBuffer {
    let width = src.width() as usize;
    let height = src.height() as usize;
    let mut out = Vec::with_capacity(width * height);

    if clockwise {
        for x in 0..width {
            out.extend((0..height).rev().map(|y| src.row(y)[x]));
        }
    } else {
        for x in (0..width).rev() {
            out.extend((0..height).map(|y| src.row(y)[x]));
        }
    }

    PixelBuffer::from_parts(height, width, out)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn frame_strategy() -> impl Strategy<Value = Frame> {
        (1u32..=16, 1u32..=16, 0i32..16, 0i32..16).prop_flat_map(|(w, h, left, top)| {
            prop::collection::vec(any::<u8>(), (w * h) as usize).prop_map(move |pixels| {
                Frame::new(w, h, pixels).unwrap().at(left, top)
            })
        })
    }

    proptest! {
        /// Property: 90 then 270 degrees restores geometry and pixels.
        #[test]
        fn prop_quarter_turns_cancel(
            frame in frame_strategy(),
            (cw, ch) in (1u32..=40, 1u32..=40),
            clockwise_first in any::<bool>(),
        ) {
            let canvas = Canvas::new(cw, ch);
            let rotated_canvas = Canvas::new(ch, cw);
            let (first, second) = if clockwise_first {
                (Rotation::Rotate90, Rotation::Rotate270)
            } else {
                (Rotation::Rotate270, Rotation::Rotate90)
            };

            let mut turned = frame.clone();
            rotate_image(&mut turned, canvas, first).unwrap();
            rotate_image(&mut turned, rotated_canvas, second).unwrap();

            prop_assert_eq!((turned.width(), turned.height()), (frame.width(), frame.height()));
            prop_assert_eq!((turned.left, turned.top), (frame.left, frame.top));
            prop_assert_eq!(turned.pixels().unwrap().to_vec(), frame.pixels().unwrap().to_vec());
        }

        /// Property: a quarter turn transposes the buffer dimensions.
        #[test]
        fn prop_quarter_turn_transposes(
            frame in frame_strategy(),
            clockwise in any::<bool>(),
        ) {
            let rotation = if clockwise { Rotation::Rotate90 } else { Rotation::Rotate270 };
            let mut turned = frame.clone();
            rotate_image(&mut turned, Canvas::new(32, 32), rotation).unwrap();
            let pixels = turned.pixels().unwrap();

            prop_assert_eq!((turned.width(), turned.height()), (frame.height(), frame.width()));
            prop_assert_eq!((pixels.width(), pixels.height()), (frame.height(), frame.width()));
            for row in pixels.rows() {
                prop_assert_eq!(row.len(), turned.width() as usize);
            }
        }
    }
}
