//! Binary STL encoding.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 80 | Header, zero-filled |
//! | 80 | 4 | Triangle count (`u32`, little-endian) |
//! | 84 | N×50 | Triangle records |
//!
//! Each record holds a zeroed 12-byte normal, three vertices of three `f32`
//! each, and a zeroed 2-byte attribute word. Vertex components are written in
//! `(z, x, y)` order, each multiplied by the scale of its source axis.

use std::io::{self, Write};

use tracing::debug;

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Size of the reserved header.
pub const STL_HEADER_LEN: usize = 80;
/// Size of one triangle record.
pub const STL_TRIANGLE_LEN: usize = 50;
/// Source axis written at each position of a vertex record.
pub const STL_AXIS_ORDER: [usize; 3] = [2, 0, 1];

static_assertions::const_assert_eq!(STL_TRIANGLE_LEN, 3 * 4 + 3 * 3 * 4 + 2);

/// Total encoded size for `triangles` triangles.
pub fn stl_len(triangles: usize) -> usize {
    STL_HEADER_LEN + 4 + triangles * STL_TRIANGLE_LEN
}

/// Fixed-size little-endian byte writer.
///
/// The buffer is allocated up front at its final length; writes fill it
/// from a cursor.
#[derive(Debug)]
pub struct BinaryWriter {
    buf: Vec<u8>,
    pos: usize,
}

impl BinaryWriter {
    /// Creates a zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            buf: vec![0; len],
            pos: 0,
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    /// Writes a little-endian `f32`.
    pub fn write_f32(&mut self, value: f32) {
        self.put(&value.to_le_bytes());
    }

    /// Advances over `n` bytes, leaving them zero.
    pub fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Encodes `mesh` as binary STL with per-axis scale `scale` (indexed x, y, z).
///
/// Returns [`MeshError::TooManyTriangles`] if the count does not fit a `u32`.
pub fn encode_stl(mesh: &Mesh, scale: [f32; 3]) -> Result<Vec<u8>, MeshError> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| MeshError::TooManyTriangles(mesh.triangle_count()))?;

    let mut w = BinaryWriter::new(stl_len(mesh.triangle_count()));
    w.skip(STL_HEADER_LEN);
    w.write_u32(count);

    for tri in &mesh.triangles {
        w.skip(12);
        for &index in tri {
            let p = mesh.vertices[index as usize].position;
            for axis in STL_AXIS_ORDER {
                w.write_f32(p[axis] * scale[axis]);
            }
        }
        w.skip(2);
    }
    debug_assert_eq!(w.position(), stl_len(mesh.triangle_count()));

    debug!(triangles = count, bytes = w.position(), "STL encoded");
    Ok(w.into_inner())
}

/// Encodes `mesh` and writes it to `out`.
pub fn write_stl<W: Write>(mesh: &Mesh, scale: [f32; 3], mut out: W) -> io::Result<()> {
    let bytes = encode_stl(mesh, scale).map_err(io::Error::other)?;
    out.write_all(&bytes)
}
