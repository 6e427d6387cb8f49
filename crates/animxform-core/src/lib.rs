//! animxform Core - Indexed-color animation transforms
//!
//! This crate rewrites already-decoded animated images: palette remapping
//! (color-change rules and external filter commands), cropping, flipping,
//! quarter-turn rotation and nearest-neighbor scaling. Every geometric
//! operation works on frames positioned on a shared canvas and keeps them
//! aligned with each other.
//!
//! Decoding, encoding and the pixel compression codec live outside this
//! crate; compressed frames are reached through [`FrameCodec`].
//!
//! Fatal problems are returned as [`TransformError`]. Recoverable ones, such
//! as a color filter that exits with an error, are reported through
//! `tracing` and leave the data unchanged.

pub mod color;
pub mod error;
pub mod palette;
pub mod plan;
pub mod stream;
pub mod transform;

pub use color::{
    apply_color_changes, ColorChange, ColorTransform, ColorTransformKind, ColorTransformPipeline,
    ExternalFilter,
};
pub use error::TransformError;
pub use palette::{Color, Palette, PaletteError};
pub use plan::{ResizeRequest, TransformPlan};
pub use stream::{Canvas, Frame, FrameCodec, ImageStream, PixelBuffer, RawCodec, DEFAULT_CANVAS};
pub use transform::{
    combine_crop, crop_image, crop_stream, flip_image, flip_stream, resize_stream, rotate_image,
    rotate_stream, scale_image, CropRect, CropRequest, FlipAxis, Rotation,
};
