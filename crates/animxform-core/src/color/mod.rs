//! Palette transforms: color-change rules and external filter commands.
//!
//! Transforms only ever rewrite palette entries. Pixel indices are left alone,
//! so a stream's frames pick up the new colors without being touched.
//!
//! # Application Order
//!
//! A [`ColorTransformPipeline`] runs each transform in turn over:
//! 1. The stream's global palette, if any
//! 2. Every frame's private palette, in frame order

mod change;
mod filter;
mod pipeline;

pub use change::{apply_color_changes, ColorChange};
pub use filter::ExternalFilter;
pub use pipeline::{ColorTransform, ColorTransformKind, ColorTransformPipeline};
