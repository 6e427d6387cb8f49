//! Nearest-neighbor scaling of whole streams.
//!
//! Every frame is scaled with the same canvas-wide factors. Rather than
//! scaling a frame's width and height, its four edges are scaled as canvas
//! coordinates and the new size is the difference between them. Frames that
//! share an edge before scaling still share it afterwards, so overlapping
//! frames of an animation stay pixel-aligned.
//!
//! # Algorithm
//!
//! Factors are converted to fixed point with 10 fractional bits. For each
//! axis a digital differential analyzer walks the source pixels, advancing
//! a fixed-point position by the step and emitting how many destination
//! pixels the source pixel covers. The final source pixel is pinned to the
//! precomputed far edge so rounding never changes the output size.
//!
//! All fixed-point values are `i64`. Frame edges fit in 33 bits and steps are
//! checked before multiplying, so positions can't overflow.

use crate::error::TransformError;
use crate::stream::{Canvas, Frame, FrameCodec, ImageStream, PixelBuffer};

/// Fractional bits of the fixed-point representation.
pub const FIXED_SHIFT: u32 = 10;

/// `1.0` in fixed point.
pub const FIXED_ONE: i64 = 1 << FIXED_SHIFT;

/// Largest width or height a scaled frame may have.
pub const MAX_DIMENSION: i64 = (i32::MAX >> FIXED_SHIFT) as i64;

#[inline]
fn to_fixed(value: i64) -> i64 {
    value << FIXED_SHIFT
}

/// Back to an integer, rounding half up.
#[inline]
fn from_fixed(value: i64) -> i64 {
    (value + (FIXED_ONE >> 1)) >> FIXED_SHIFT
}

/// Fixed-point step for a scale factor.
fn fixed_step(factor: f64) -> Result<i64, TransformError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(TransformError::InvalidScale(factor));
    }
    let step = (FIXED_ONE as f64 * factor + 0.5).floor();
    if step > i64::from(i32::MAX) as f64 {
        return Err(TransformError::InvalidScale(factor));
    }
    Ok(step as i64)
}

/// Scale one canvas coordinate.
fn scale_edge(step: i64, edge: i64, factor: f64) -> Result<i64, TransformError> {
    step.checked_mul(edge)
        .map(from_fixed)
        .ok_or(TransformError::InvalidScale(factor))
}

/// Destination run lengths along one axis.
///
/// Yields, for each source pixel, how many destination pixels it covers.
#[derive(Debug, Clone)]
struct DdaStep {
    /// Fixed-point destination position of the current source pixel's far
    /// edge.
    position: i64,
    step: i64,
    /// Integer destination edge reached so far.
    dest: i64,
    /// Integer edge the last source pixel must end on.
    far_edge: i64,
    remaining: u32,
    /// Emit nothing until the position reaches the next whole pixel.
    whole_pixels_only: bool,
}

impl DdaStep {
    /// Columns: partial coverage rounds to the nearest pixel.
    fn columns(geometry: &AxisGeometry) -> Self {
        Self::new(geometry, false)
    }

    /// Rows: a source row is dropped until it reaches the next whole row.
    fn rows(geometry: &AxisGeometry) -> Self {
        Self::new(geometry, true)
    }

    fn new(geometry: &AxisGeometry, whole_pixels_only: bool) -> Self {
        Self {
            position: geometry.step * geometry.source_start,
            step: geometry.step,
            dest: geometry.dest_start,
            far_edge: geometry.dest_end,
            remaining: geometry.source_len,
            whole_pixels_only,
        }
    }
}

impl Iterator for DdaStep {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.position += self.step;
        if self.remaining == 0 {
            // Absorb accumulated rounding so the output size is exact.
            self.position = to_fixed(self.far_edge);
        }

        if self.whole_pixels_only && self.position < to_fixed(self.dest + 1) {
            return Some(0);
        }
        let delta = from_fixed(self.position - to_fixed(self.dest)).max(0);
        self.dest += delta;
        Some(delta as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

/// Source and destination extent of a frame along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisGeometry {
    step: i64,
    source_start: i64,
    source_len: u32,
    dest_start: i64,
    dest_end: i64,
}

impl AxisGeometry {
    /// Scale the edges `start` and `start + len` by `factor`.
    ///
    /// Zero-length results are widened to one pixel.
    fn new(start: i32, len: u32, factor: f64) -> Result<Self, TransformError> {
        let step = fixed_step(factor)?;
        let source_start = i64::from(start);
        let dest_start = scale_edge(step, source_start, factor)?;
        let mut dest_end = scale_edge(step, source_start + i64::from(len), factor)?;
        if dest_end - dest_start <= 0 {
            dest_end = dest_start + 1;
        }
        Ok(Self {
            step,
            source_start,
            source_len: len,
            dest_start,
            dest_end,
        })
    }

    fn dest_len(&self) -> i64 {
        self.dest_end - self.dest_start
    }
}

/// Scale a frame by canvas-wide factors.
///
/// # Arguments
///
/// * `frame` - Frame to scale; compressed frames are decompressed on demand
///   and compressed again afterwards
/// * `x_factor` - Horizontal scale factor
/// * `y_factor` - Vertical scale factor
/// * `codec` - Codec for compressed frames
///
/// # Errors
///
/// - `TransformError::InvalidScale` for non-finite, non-positive or absurdly
///   large factors
/// - `TransformError::DimensionOverflow` if the new size exceeds
///   [`MAX_DIMENSION`]
/// - `TransformError::PositionOverflow` if the new edges leave `i32`
pub fn scale_image(
    frame: &mut Frame,
    x_factor: f64,
    y_factor: f64,
    codec: &dyn FrameCodec,
) -> Result<(), TransformError> {
    let x_axis = AxisGeometry::new(frame.left, frame.width(), x_factor)?;
    let y_axis = AxisGeometry::new(frame.top, frame.height(), y_factor)?;

    if frame.width() == 0 || frame.height() == 0 {
        frame.left = to_position(x_axis.dest_start)?;
        frame.top = to_position(y_axis.dest_start)?;
        return Ok(());
    }

    let (new_width, new_height) = (x_axis.dest_len(), y_axis.dest_len());
    if new_width > MAX_DIMENSION || new_height > MAX_DIMENSION {
        return Err(TransformError::DimensionOverflow {
            width: new_width,
            height: new_height,
        });
    }
    let left = to_position(x_axis.dest_start)?;
    let top = to_position(y_axis.dest_start)?;
    to_position(x_axis.dest_end)?;
    to_position(y_axis.dest_end)?;

    let was_compressed = frame.is_compressed();
    frame.uncompress(codec)?;
    let Some(source) = frame.pixels() else {
        return Ok(());
    };

    let scaled = resample(source, &x_axis, &y_axis);
    frame.set_pixels(scaled);
    frame.left = left;
    frame.top = top;

    if was_compressed {
        frame.compress(codec)?;
        frame.release_uncompressed();
    }
    Ok(())
}

/// Box-replicate `source` into a buffer of the destination size.
fn resample(source: &PixelBuffer, x_axis: &AxisGeometry, y_axis: &AxisGeometry) -> PixelBuffer {
    let width = x_axis.dest_len() as usize;
    let height = y_axis.dest_len() as usize;
    let mut out = vec![0u8; width * height];

    // Column runs are the same for every row.
    let columns: Vec<usize> = DdaStep::columns(x_axis).collect();

    let mut dest_y = 0;
    for (row, y_delta) in source.rows().zip(DdaStep::rows(y_axis)) {
        if y_delta == 0 {
            continue;
        }

        let line_start = dest_y * width;
        let line = &mut out[line_start..line_start + width];
        let mut dest_x = 0;
        for (&value, &x_delta) in row.iter().zip(&columns) {
            line[dest_x..dest_x + x_delta].fill(value);
            dest_x += x_delta;
        }

        for extra in 1..y_delta {
            out.copy_within(line_start..line_start + width, line_start + extra * width);
        }
        dest_y += y_delta;
    }

    PixelBuffer::from_parts(width, height, out)
}

/// Resize a whole stream to `new_width` x `new_height`.
///
/// # Arguments
///
/// * `new_width`, `new_height` - Requested canvas size; a value `<= 0`
///   derives that axis from the other one's factor
/// * `fit` - Treat the request as a bounding box: scale uniformly by the
///   smaller factor, and never enlarge
///
/// # Behavior
///
/// - The canvas first grows to cover every frame, whatever is requested
/// - Both dimensions `<= 0`: nothing else happens
/// - `fit` with a box at least as large as the canvas: nothing happens
/// - Otherwise every frame is scaled by the same factors and the canvas is
///   set to the new size
pub fn resize_stream(
    stream: &mut ImageStream,
    new_width: i32,
    new_height: i32,
    fit: bool,
    codec: &dyn FrameCodec,
) -> Result<(), TransformError> {
    stream.calculate_canvas_size(false);
    if new_width <= 0 && new_height <= 0 {
        return Ok(());
    }

    let canvas_width = f64::from(stream.canvas.width);
    let canvas_height = f64::from(stream.canvas.height);
    let mut width = i64::from(new_width);
    let mut height = i64::from(new_height);
    let mut x_factor = width as f64 / canvas_width;
    let mut y_factor = height as f64 / canvas_height;

    if width <= 0 {
        x_factor = y_factor;
        width = round_extent(canvas_width, x_factor);
    } else if height <= 0 {
        y_factor = x_factor;
        height = round_extent(canvas_height, y_factor);
    }

    if fit {
        if width >= i64::from(stream.canvas.width) && height >= i64::from(stream.canvas.height) {
            return Ok(());
        }
        if x_factor < y_factor {
            y_factor = x_factor;
            height = round_extent(canvas_height, y_factor);
        } else if y_factor < x_factor {
            x_factor = y_factor;
            width = round_extent(canvas_width, x_factor);
        }
    }

    let resized = match (u32::try_from(width.max(1)), u32::try_from(height.max(1))) {
        (Ok(w), Ok(h)) => Canvas::new(w, h),
        _ => return Err(TransformError::DimensionOverflow { width, height }),
    };

    tracing::debug!(
        from_width = stream.canvas.width,
        from_height = stream.canvas.height,
        width = resized.width,
        height = resized.height,
        x_factor,
        y_factor,
        "resizing stream"
    );

    for frame in &mut stream.frames {
        scale_image(frame, x_factor, y_factor, codec)?;
    }
    stream.canvas = resized;
    Ok(())
}

fn round_extent(extent: f64, factor: f64) -> i64 {
    (extent * factor + 0.5) as i64
}

fn to_position(value: i64) -> Result<i32, TransformError> {
    i32::try_from(value).map_err(|_| TransformError::PositionOverflow)
}
