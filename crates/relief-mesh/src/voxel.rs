//! Dense colored voxel grid built from stacked RGBA layer images.
//!
//! Axis convention: `x` runs along image columns, `y` is the layer index
//! (vertical), `z` runs along image rows. Storage is layer-major:
//! `index = y * depth * width + z * width + x`.

use tracing::debug;

use crate::error::MeshError;
use crate::marching_cubes::{MarchingCubes, Sample};
use crate::mesh::Mesh;

/// Pixels with alpha strictly above this are solid.
pub const SOLID_ALPHA_THRESHOLD: u8 = 128;

/// Packs an RGBA color as `a << 24 | b << 16 | g << 8 | r`.
#[inline]
pub fn pack_rgba([r, g, b, a]: [u8; 4]) -> u32 {
    (u32::from(a) << 24) | (u32::from(b) << 16) | (u32::from(g) << 8) | u32::from(r)
}

/// Inverse of [`pack_rgba`].
#[inline]
pub fn unpack_rgba(color: u32) -> [u8; 4] {
    color.to_le_bytes()
}

/// One layer image placed on the grid's `x`/`z` plane.
#[derive(Clone, Copy, Debug)]
pub struct VoxelLayer<'a> {
    /// Column of the image's left edge in grid coordinates.
    pub offset_x: i64,
    /// Row of the image's top edge in grid coordinates.
    pub offset_z: i64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Row-major RGBA pixels, `width * height * 4` bytes.
    pub rgba: &'a [u8],
}

impl<'a> VoxelLayer<'a> {
    /// A layer image at the grid origin.
    pub fn new(width: usize, height: usize, rgba: &'a [u8]) -> Self {
        Self {
            offset_x: 0,
            offset_z: 0,
            width,
            height,
            rgba,
        }
    }

    /// Moves the image to `(offset_x, offset_z)`.
    pub fn at(mut self, offset_x: i64, offset_z: i64) -> Self {
        self.offset_x = offset_x;
        self.offset_z = offset_z;
        self
    }

    /// A layer with no pixels.
    pub fn empty() -> Self {
        Self::new(0, 0, &[])
    }
}

/// Dense grid of optional packed colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    width: usize,
    layers: usize,
    depth: usize,
    cells: Vec<Option<u32>>,
}

impl VoxelGrid {
    /// Creates an empty grid of `width × layers × depth` cells.
    ///
    /// Returns [`MeshError::InvalidDimensions`] if any axis is zero.
    pub fn new(width: usize, layers: usize, depth: usize) -> Result<Self, MeshError> {
        if width == 0 || layers == 0 || depth == 0 {
            return Err(MeshError::InvalidDimensions {
                dims: [width, layers, depth],
            });
        }
        Ok(Self {
            width,
            layers,
            depth,
            cells: vec![None; width * layers * depth],
        })
    }

    /// Builds a grid from one image per layer, bottom layer first.
    ///
    /// Pixels with alpha above [`SOLID_ALPHA_THRESHOLD`] become solid cells
    /// holding their packed color. Pixels that land outside the
    /// `width × depth` footprint are dropped.
    pub fn from_layers(
        width: usize,
        depth: usize,
        layers: &[VoxelLayer<'_>],
    ) -> Result<Self, MeshError> {
        let mut grid = Self::new(width, layers.len(), depth)?;

        for (y, layer) in layers.iter().enumerate() {
            let expected = layer.width * layer.height * 4;
            if layer.rgba.len() != expected {
                return Err(MeshError::LayerOutOfRange {
                    layer: y,
                    expected,
                    actual: layer.rgba.len(),
                });
            }
            if layer.width == 0 {
                continue;
            }

            for (row, pixels) in layer.rgba.chunks_exact(layer.width * 4).enumerate() {
                let z = layer.offset_z + row as i64;
                for (col, px) in pixels.chunks_exact(4).enumerate() {
                    if px[3] <= SOLID_ALPHA_THRESHOLD {
                        continue;
                    }
                    let x = layer.offset_x + col as i64;
                    if let Some(index) = grid.index_signed(x, y as i64, z) {
                        grid.cells[index] = Some(pack_rgba([px[0], px[1], px[2], px[3]]));
                    }
                }
            }
        }

        debug!(
            width,
            layers = layers.len(),
            depth,
            solid = grid.solid_count(),
            "voxel grid built"
        );
        Ok(grid)
    }

    /// Returns `(width, layers, depth)`.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.layers, self.depth)
    }

    fn index_signed(&self, x: i64, y: i64, z: i64) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.layers)?;
        let z = usize::try_from(z).ok().filter(|&z| z < self.depth)?;
        Some(y * self.depth * self.width + z * self.width + x)
    }

    /// Color of cell `(x, y, z)`, `None` when empty or out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u32> {
        if x >= self.width || y >= self.layers || z >= self.depth {
            return None;
        }
        self.cells[y * self.depth * self.width + z * self.width + x]
    }

    /// Sets cell `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    pub fn set(&mut self, x: usize, y: usize, z: usize, color: Option<u32>) {
        assert!(
            x < self.width && y < self.layers && z < self.depth,
            "voxel ({x}, {y}, {z}) out of range"
        );
        self.cells[y * self.depth * self.width + z * self.width + x] = color;
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Sampling lattice size: the grid plus one empty cell on every side.
    pub fn padded_dims(&self) -> [usize; 3] {
        [self.width + 2, self.layers + 2, self.depth + 2]
    }

    /// Samples the padded lattice at `(x, y, z)`.
    ///
    /// Solid cells give `(1.0, color)`; empty cells and the padding give `0.0`.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> Sample {
        let cell = self.index_signed(
            x.round() as i64 - 1,
            y.round() as i64 - 1,
            z.round() as i64 - 1,
        );
        match cell.and_then(|i| self.cells[i]) {
            Some(color) => Sample::from((1.0_f32, color)),
            None => Sample::from(0.0_f32),
        }
    }

    /// Extracts the closed surface around the solid cells.
    ///
    /// Vertices are in padded lattice coordinates and carry the color of the
    /// solid cell they were generated from.
    pub fn to_mesh(&self) -> Result<Mesh, MeshError> {
        let cubes = MarchingCubes::new(self.padded_dims())?;
        Ok(cubes.extract(|x, y, z| self.sample(x, y, z)))
    }
}
