//! Marching-cubes isosurface extraction over a sampled scalar volume.
//!
//! The volume is sampled on a `dims[0] × dims[1] × dims[2]` lattice. Every
//! unit cell between eight neighboring lattice points is classified by which
//! corners are inside (value `> 0`) and triangulated from the lookup tables
//! in [`crate::tables`]. Vertices are placed on crossed edges by linear
//! interpolation and are emitted per cell, never shared across cells.

use glam::Vec3;
use tracing::debug;

use crate::error::MeshError;
use crate::mesh::{Aabb, Mesh};
use crate::tables::{CUBE_CORNERS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Corner values closer than this interpolate to the first corner.
pub const EDGE_EPSILON: f32 = 1e-6;

/// One sampler result: a scalar plus an optional auxiliary payload.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    /// Field value. Strictly positive means inside.
    pub value: f32,
    /// Payload copied onto vertices generated next to this corner.
    pub aux: Option<u32>,
}

impl Sample {
    /// Whether this sample lies inside the surface. Non-finite values are outside.
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.value > 0.0
    }
}

impl From<f32> for Sample {
    fn from(value: f32) -> Self {
        Self { value, aux: None }
    }
}

impl From<(f32, u32)> for Sample {
    fn from((value, aux): (f32, u32)) -> Self {
        Self {
            value,
            aux: Some(aux),
        }
    }
}

impl From<(f32, Option<u32>)> for Sample {
    fn from((value, aux): (f32, Option<u32>)) -> Self {
        Self { value, aux }
    }
}

/// Marching-cubes extractor for a fixed lattice and world box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchingCubes {
    dims: [usize; 3],
    bounds: Aabb,
}

impl MarchingCubes {
    /// Creates an extractor whose world coordinates equal lattice coordinates.
    ///
    /// Returns [`MeshError::InvalidDimensions`] if any axis is zero.
    pub fn new(dims: [usize; 3]) -> Result<Self, MeshError> {
        if dims.contains(&0) {
            return Err(MeshError::InvalidDimensions { dims });
        }
        Ok(Self {
            dims,
            bounds: Aabb::from_dims(dims),
        })
    }

    /// Maps the lattice onto `bounds` instead.
    ///
    /// Lattice point `g` lands at `bounds.min + g * (bounds.max - bounds.min) / dims`.
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }

    /// Lattice dimensions.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// World box the lattice is mapped onto.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of cells visited by [`extract`](Self::extract).
    pub fn cell_count(&self) -> usize {
        self.dims.iter().map(|&d| d - 1).product()
    }

    /// Samples the volume and builds the isosurface mesh.
    ///
    /// `sampler` receives world coordinates and may return a bare `f32`, a
    /// `(f32, u32)` or a `(f32, Option<u32>)`. Cells are visited z-major,
    /// then y, then x.
    pub fn extract<S, F>(&self, mut sampler: F) -> Mesh
    where
        S: Into<Sample>,
        F: FnMut(f32, f32, f32) -> S,
    {
        let [nx, ny, nz] = self.dims;
        let step = self.bounds.extent() / Vec3::new(nx as f32, ny as f32, nz as f32);
        let corner_offsets =
            CUBE_CORNERS.map(|[x, y, z]| Vec3::new(x.into(), y.into(), z.into()));

        let mut mesh = Mesh::new();
        let mut positions = [Vec3::ZERO; 8];
        let mut samples = [Sample::default(); 8];
        let mut edge_vertices = [0_u32; 12];

        for z in 0..nz.saturating_sub(1) {
            for y in 0..ny.saturating_sub(1) {
                for x in 0..nx.saturating_sub(1) {
                    let cell = Vec3::new(x as f32, y as f32, z as f32);
                    let mut config = 0_usize;
                    for (i, offset) in corner_offsets.iter().enumerate() {
                        let p = self.bounds.min + (cell + *offset) * step;
                        let mut s: Sample = sampler(p.x, p.y, p.z).into();
                        if !s.value.is_finite() {
                            s.value = 0.0;
                        }
                        if s.is_inside() {
                            config |= 1 << i;
                        }
                        positions[i] = p;
                        samples[i] = s;
                    }

                    let mask = EDGE_TABLE[config];
                    if mask == 0 {
                        continue;
                    }

                    for (edge, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
                        if mask & (1 << edge) == 0 {
                            continue;
                        }
                        let (a, b) = (usize::from(a), usize::from(b));
                        let (sa, sb) = (samples[a], samples[b]);
                        let d = sa.value - sb.value;
                        let t = if d.abs() >= EDGE_EPSILON {
                            sa.value / d
                        } else {
                            0.0
                        };
                        let p = positions[a] + (positions[b] - positions[a]) * t;
                        let aux = if sa.is_inside() {
                            sa.aux.or(sb.aux)
                        } else {
                            sb.aux.or(sa.aux)
                        };
                        edge_vertices[edge] = mesh.push_vertex(p.to_array(), aux);
                    }

                    for tri in TRI_TABLE[config].chunks_exact(3) {
                        mesh.push_triangle([
                            edge_vertices[usize::from(tri[0])],
                            edge_vertices[usize::from(tri[1])],
                            edge_vertices[usize::from(tri[2])],
                        ]);
                    }
                }
            }
        }

        debug!(
            dims = ?self.dims,
            cells = self.cell_count(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "isosurface extracted"
        );
        mesh
    }
}

/// Extracts the isosurface of `sampler` over a `dims` lattice mapped onto
/// `bounds`.
///
/// Returns [`MeshError::InvalidDimensions`] if any axis is zero. Non-finite
/// samples count as outside.
pub fn extract_isosurface<S, F>(
    dims: [usize; 3],
    sampler: F,
    bounds: Aabb,
) -> Result<Mesh, MeshError>
where
    S: Into<Sample>,
    F: FnMut(f32, f32, f32) -> S,
{
    Ok(MarchingCubes::new(dims)?.with_bounds(bounds).extract(sampler))
}
