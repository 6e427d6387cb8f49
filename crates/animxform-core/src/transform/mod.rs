//! Geometric frame transforms: cropping, flipping, rotation and scaling.
//!
//! Each operation has a per-frame form (`*_image`) that takes the canvas it
//! needs as an argument, and a stream form (`*_stream`) that applies it to
//! every frame and updates the stream canvas.
//!
//! # Transform Order
//!
//! [`TransformPlan`](crate::plan::TransformPlan) applies geometry in this
//! order:
//! 1. Crop
//! 2. Horizontal flip, then vertical flip
//! 3. Rotation
//! 4. Resize
//!
//! # Coordinate System
//!
//! - Crop rectangles and frame offsets are integer canvas pixels
//! - Origin is the top-left corner; offsets may be negative
//! - Rotation is clockwise in quarter turns
//!
//! Per-frame crop, flip and rotate need uncompressed pixels and fail with
//! `TransformError::Compressed` otherwise; the stream forms decompress on
//! demand. Scaling handles compressed frames itself.

mod crop;
mod flip;
mod rotation;
mod scale;

pub use crop::{combine_crop, crop_image, crop_stream, CropRect, CropRequest};
pub use flip::{flip_image, flip_stream, FlipAxis};
pub use rotation::{rotate_image, rotate_stream, Rotation};
pub use scale::{resize_stream, scale_image, FIXED_ONE, FIXED_SHIFT, MAX_DIMENSION};
