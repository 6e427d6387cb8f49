//! Fatal error channel for frame and stream transforms.
//!
//! Anything that can't be absorbed locally ends up here and is returned to the
//! caller of the whole transform request. Recoverable conditions (a failing
//! color filter, a palette size mismatch) are logged with `tracing` instead.

use thiserror::Error;

/// Errors that abort a transform request.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The external color filter could not get a temporary output file.
    #[error("can't create temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    /// A scaled frame would be larger than the fixed-point math can address.
    #[error("new image size is too big: {width}x{height}")]
    DimensionOverflow { width: i64, height: i64 },

    /// A frame offset left the `i32` range.
    #[error("frame position out of range after transform")]
    PositionOverflow,

    /// Only quarter turns are supported.
    #[error("invalid rotation: {0} degrees (expected 90, 180 or 270)")]
    InvalidRotation(u32),

    /// Scale factors must be finite and positive.
    #[error("invalid scale factor: {0}")]
    InvalidScale(f64),

    /// Pixel data length doesn't match the stated dimensions.
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// The frame only holds compressed data.
    #[error("frame pixels are compressed; uncompress before transforming")]
    Compressed,

    /// The frame codec failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// A transform plan could not be parsed.
    #[error("invalid transform plan: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::InvalidRotation(45);
        assert_eq!(
            err.to_string(),
            "invalid rotation: 45 degrees (expected 90, 180 or 270)"
        );

        let err = TransformError::BufferSize {
            expected: 12,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "pixel buffer size mismatch: expected 12 bytes, got 10"
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: TransformError = json_err.into();
        assert!(matches!(err, TransformError::Config(_)));
    }
}
