//! Terrain error types.

/// Errors reported by field construction and field-combining operators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TerrainError {
    /// A field was requested with a zero width or height.
    #[error("invalid field dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in samples.
        width: usize,
        /// Requested height in samples.
        height: usize,
    },

    /// Two fields combined element-wise do not share the same shape.
    #[error("field dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// `(width, height)` of the field being modified.
        expected: (usize, usize),
        /// `(width, height)` of the operand.
        actual: (usize, usize),
    },

    /// A sample buffer does not hold exactly `width * height` values.
    #[error("sample buffer holds {actual} values, expected {expected}")]
    BufferLength {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}
