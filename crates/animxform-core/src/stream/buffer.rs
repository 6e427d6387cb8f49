//! Indexed pixel storage with row views.
//!
//! A `PixelBuffer` owns its bytes and addresses them through a table of row
//! start offsets. Cropping rewrites that table to point inside the existing
//! rows and vertical flipping reverses it, so neither copies pixel data.
//! Rows never overlap.

use crate::error::TransformError;

/// Row-addressed indexed pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    /// Start offset of each row in `data`.
    rows: Vec<usize>,
    width: usize,
}

impl PixelBuffer {
    /// Wrap row-major pixel data of the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::BufferSize` if `data.len() != width * height`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TransformError> {
        let width = width as usize;
        let height = height as usize;
        let expected = width * height;
        if data.len() != expected {
            return Err(TransformError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(width, height, data))
    }

    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height, "Pixel buffer size mismatch");
        Self {
            data,
            rows: (0..height).map(|y| y * width).collect(),
            width,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Check if the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows.is_empty()
    }

    /// Pixel row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = self.rows[y];
        &self.data[start..start + self.width]
    }

    /// Iterate over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.rows
            .iter()
            .map(move |&start| &self.data[start..start + self.width])
    }

    /// Pixel value at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        let (x, y) = (x as usize, y as usize);
        if x >= self.width {
            return None;
        }
        self.rows.get(y).map(|&start| self.data[start + x])
    }

    /// Narrow the buffer to a sub-rectangle without copying.
    ///
    /// The caller guarantees the rectangle lies inside the buffer.
    pub(crate) fn view(&mut self, x: usize, y: usize, width: usize, height: usize) {
        debug_assert!(x + width <= self.width && y + height <= self.rows.len());
        self.rows = self.rows[y..y + height]
            .iter()
            .map(|&start| start + x)
            .collect();
        self.width = width;
    }

    /// Reverse the order of rows without moving pixels.
    pub(crate) fn reverse_rows(&mut self) {
        self.rows.reverse();
    }

    /// Reverse every row in place.
    pub(crate) fn reverse_columns(&mut self) {
        let width = self.width;
        for &start in &self.rows {
            self.data[start..start + width].reverse();
        }
    }

    /// Check if the rows are laid out back to back from offset 0.
    pub fn is_contiguous(&self) -> bool {
        self.rows
            .iter()
            .enumerate()
            .all(|(y, &start)| start == y * self.width)
    }

    /// Copy the visible pixels into a new row-major vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.rows.len());
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Consume the buffer, returning row-major pixels.
    ///
    /// Avoids the copy when the rows are already contiguous.
    pub fn into_vec(self) -> Vec<u8> {
        if self.is_contiguous() {
            let mut data = self.data;
            data.truncate(self.width * self.rows.len());
            data
        } else {
            self.to_vec()
        }
    }
}
