//! Closed solid built from a heightfield, for printable terrain exports.
//!
//! Column `(x, z)` of the volume holds field sample `(x, z)`: a floor slab of
//! `base` cells topped by `value * relief` cells. The lattice is padded by one
//! empty column on each side. Samples are signed distances to the top and
//! bottom faces clamped to one cell, so the top surface follows the field
//! smoothly while the floor and walls stay flat.

use relief_terrain::ScalarField;

use crate::error::MeshError;
use crate::marching_cubes::MarchingCubes;
use crate::mesh::Mesh;

/// Default floor slab thickness in cells.
pub const DEFAULT_BASE: f32 = 2.0;

/// Largest `base + relief`, in cells, that [`HeightfieldVolume::dims`] accepts.
pub const MAX_LEVELS: usize = 4096;

/// A heightfield viewed as a solid volume.
#[derive(Clone, Copy, Debug)]
pub struct HeightfieldVolume<'a> {
    field: &'a ScalarField,
    relief: f32,
    base: f32,
}

impl<'a> HeightfieldVolume<'a> {
    /// Wraps `field`; a sample of `1.0` rises `relief` cells above the floor slab.
    pub fn new(field: &'a ScalarField, relief: f32) -> Self {
        Self {
            field,
            relief: relief.max(0.0),
            base: DEFAULT_BASE,
        }
    }

    /// Sets the floor slab thickness. Values at or below one cell let flat
    /// regions vanish from the lattice, so they are raised to just above it.
    pub fn with_base(mut self, base: f32) -> Self {
        self.base = base.max(1.0 + f32::EPSILON);
        self
    }

    /// Height of the top face above lattice `y = 0` for field sample `(x, z)`.
    pub fn top(&self, x: usize, z: usize) -> f32 {
        self.base + self.field.get(x, z).clamp(0.0, 1.0) * self.relief
    }

    /// Sampling lattice size `[width + 2, ceil(base + relief) + 2, height + 2]`.
    ///
    /// Returns [`MeshError::SolidTooTall`] if `base + relief` is infinite or
    /// above [`MAX_LEVELS`].
    pub fn dims(&self) -> Result<[usize; 3], MeshError> {
        let (w, h) = self.field.dimensions();
        let top = self.base + self.relief;
        if !top.is_finite() || top > MAX_LEVELS as f32 {
            return Err(MeshError::SolidTooTall {
                max_levels: MAX_LEVELS,
            });
        }
        let levels = top.ceil() as usize;
        Ok([w + 2, levels + 2, h + 2])
    }

    /// Signed sample at lattice point `(x, y, z)`; positive inside the solid.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let fx = x.round() as i64 - 1;
        let fz = z.round() as i64 - 1;
        match self.field.get_signed(fx, fz) {
            Some(value) => {
                let top = self.base + value.clamp(0.0, 1.0) * self.relief;
                (top - y).min(y).min(1.0)
            }
            None => 0.0,
        }
    }

    /// Extracts the closed solid.
    ///
    /// The mesh lies in lattice coordinates with `y` up; the floor sits at
    /// `y = 0` and the walls run through the padding columns.
    pub fn to_mesh(&self) -> Result<Mesh, MeshError> {
        let cubes = MarchingCubes::new(self.dims()?)?;
        Ok(cubes.extract(|x, y, z| self.sample(x, y, z)))
    }
}
