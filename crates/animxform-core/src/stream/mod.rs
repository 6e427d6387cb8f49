//! Frames, pixel storage and the stream that owns them.
//!
//! An [`ImageStream`] is an ordered list of [`Frame`]s sharing one canvas and,
//! optionally, one global palette. Streams arrive already decoded; this crate
//! only rewrites their contents and dimensions.
//!
//! # Coordinate System
//!
//! - Frame offsets (`left`, `top`) are canvas-relative and signed
//! - Origin is the top-left corner of the canvas
//! - Frames may extend past the canvas; nothing clips them implicitly

mod buffer;
mod codec;
mod frame;

pub use buffer::PixelBuffer;
pub use codec::{FrameCodec, RawCodec};
pub use frame::Frame;

use serde::{Deserialize, Serialize};

use crate::palette::Palette;

/// Canvas used when nothing else gives the stream a size.
pub const DEFAULT_CANVAS: Canvas = Canvas {
    width: 640,
    height: 480,
};

/// Logical area every frame is positioned within.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An animated image: frames plus their shared canvas and palette.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStream {
    pub canvas: Canvas,
    pub frames: Vec<Frame>,
    /// Palette for frames without a private one.
    pub global_palette: Option<Palette>,
}

impl ImageStream {
    /// Create an empty stream with the given canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            frames: Vec::new(),
            global_palette: None,
        }
    }

    pub fn with_global_palette(mut self, palette: Palette) -> Self {
        self.global_palette = Some(palette);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Palette that applies to frame `index`: its own, else the global one.
    pub fn palette_for(&self, index: usize) -> Option<&Palette> {
        self.frames
            .get(index)?
            .palette
            .as_ref()
            .or(self.global_palette.as_ref())
    }

    /// Grow the canvas to cover every frame.
    ///
    /// The canvas never shrinks unless `force` is set, in which case it is
    /// reset to exactly the frames' extent. When no frame gives an extent,
    /// the 640x480 default is used if the canvas has no size yet (or
    /// `force` is set).
    pub fn calculate_canvas_size(&mut self, force: bool) {
        let mut width = 0u32;
        let mut height = 0u32;
        for frame in &self.frames {
            width = width.max(clamp_extent(frame.right()));
            height = height.max(clamp_extent(frame.bottom()));
        }

        if width == 0 && (self.canvas.width == 0 || force) {
            width = DEFAULT_CANVAS.width;
        }
        if height == 0 && (self.canvas.height == 0 || force) {
            height = DEFAULT_CANVAS.height;
        }
        if self.canvas.width < width || force {
            self.canvas.width = width;
        }
        if self.canvas.height < height || force {
            self.canvas.height = height;
        }
    }

    /// Number of frames with pixel content.
    pub fn visible_frames(&self) -> usize {
        self.frames.iter().filter(|frame| !frame.is_empty()).count()
    }
}

fn clamp_extent(edge: i64) -> u32 {
    edge.clamp(0, i64::from(u32::MAX)) as u32
}
