//! Error types for mesh extraction and voxel grid construction.

/// Errors reported by the mesh crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// A sampling grid or voxel grid has a zero-sized axis.
    #[error("invalid grid dimensions {dims:?}: every axis must be at least 1")]
    InvalidDimensions {
        /// The rejected dimensions.
        dims: [usize; 3],
    },
    /// A voxel layer's pixel buffer does not match its declared size.
    #[error("layer {layer}: expected {expected} RGBA bytes, got {actual}")]
    LayerOutOfRange {
        /// Index of the offending layer.
        layer: usize,
        /// `width * height * 4`.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
    /// A heightfield solid's `base + relief` is not finite or exceeds the
    /// lattice level limit.
    #[error("solid height must be finite and at most {max_levels} cells")]
    SolidTooTall {
        /// Largest supported number of lattice levels.
        max_levels: usize,
    },
    /// The mesh has more triangles than the binary export format can count.
    #[error("mesh has {0} triangles, binary export supports at most u32::MAX")]
    TooManyTriangles(usize),
}
