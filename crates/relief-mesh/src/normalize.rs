//! Centering and unit scaling of a mesh before export.

use glam::Vec3;
use tracing::debug;

use crate::mesh::Mesh;

/// Transform applied by [`normalize`]: `p' = (p - center) * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    /// Bounding-box center subtracted from every vertex.
    pub center: Vec3,
    /// Uniform factor, `1 / longest extent` or `1` for a flat point cloud.
    pub scale: f32,
}

impl Normalization {
    /// Applies the transform to one point.
    pub fn apply(&self, p: Vec3) -> Vec3 {
        (p - self.center) * self.scale
    }
}

/// Centers `mesh` on the origin and scales it so the longest axis of its
/// bounding box spans one unit.
///
/// Returns `None` and leaves the mesh untouched when it has no vertices.
pub fn normalize(mesh: &mut Mesh) -> Option<Normalization> {
    let bounds = mesh.bounds()?;
    let longest = bounds.longest_extent();
    let scale = if longest > 0.0 { 1.0 / longest } else { 1.0 };
    let transform = Normalization {
        center: bounds.center(),
        scale,
    };
    mesh.transform_positions(|p| transform.apply(p));

    debug!(center = ?transform.center, scale, "mesh normalized");
    Some(transform)
}
