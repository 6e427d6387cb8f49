//! Declarative transform requests.
//!
//! A [`TransformPlan`] bundles everything one request does to a stream and
//! can be loaded from JSON:
//!
//! ```json
//! {
//!   "colors": [{"kind": "external_filter", "command": "./remap.sh"}],
//!   "crop": {"x": 10, "y": 0, "w": 100, "h": 80},
//!   "flip_horizontal": true,
//!   "rotation": 90,
//!   "resize": {"width": 50, "fit": true}
//! }
//! ```
//!
//! Omitted fields mean "leave alone".

use serde::{Deserialize, Serialize};

use crate::color::ColorTransformPipeline;
use crate::error::TransformError;
use crate::stream::{FrameCodec, ImageStream};
use crate::transform::{
    crop_stream, flip_stream, resize_stream, rotate_stream, CropRect, FlipAxis, Rotation,
};

/// Target canvas size for a resize.
///
/// A dimension of zero or less is derived from the other one, keeping the
/// aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeRequest {
    pub width: i32,
    pub height: i32,
    /// Shrink uniformly to fit inside `width` x `height`; never enlarge.
    pub fit: bool,
}

/// Everything a single request does to a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPlan {
    /// Palette transforms, applied first.
    pub colors: ColorTransformPipeline,
    /// Canvas rectangle to keep.
    pub crop: Option<CropRect>,
    /// Collapse frames the crop misses to one transparent pixel instead of
    /// emptying them.
    pub preserve_empty: bool,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Clockwise rotation in degrees (90, 180 or 270).
    pub rotation: Option<Rotation>,
    pub resize: Option<ResizeRequest>,
}

impl TransformPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a plan from JSON.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::Config` for malformed JSON, unknown transform
    /// kinds or unsupported rotation angles.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check if the plan leaves a stream untouched.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the plan: colors, crop, flips, rotation, then resize.
    ///
    /// Stops at the first fatal error; frames already transformed stay
    /// transformed.
    pub fn apply(
        &self,
        stream: &mut ImageStream,
        codec: &dyn FrameCodec,
    ) -> Result<(), TransformError> {
        if self.is_identity() {
            return Ok(());
        }

        self.colors.apply(stream)?;

        if let Some(rect) = self.crop {
            crop_stream(stream, rect, self.preserve_empty, codec)?;
        }
        if self.flip_horizontal {
            flip_stream(stream, FlipAxis::Horizontal, codec)?;
        }
        if self.flip_vertical {
            flip_stream(stream, FlipAxis::Vertical, codec)?;
        }
        if let Some(rotation) = self.rotation {
            rotate_stream(stream, rotation, codec)?;
        }
        if let Some(resize) = self.resize {
            resize_stream(stream, resize.width, resize.height, resize.fit, codec)?;
        }

        tracing::debug!(
            frames = stream.frames.len(),
            width = stream.canvas.width,
            height = stream.canvas.height,
            "applied transform plan"
        );
        Ok(())
    }
}
