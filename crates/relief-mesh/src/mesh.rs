//! Triangle mesh produced by isosurface extraction.

use glam::Vec3;

/// A single mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    /// Position in world coordinates.
    pub position: [f32; 3],
    /// Auxiliary value carried over from the sampler, e.g. a packed color.
    pub aux: Option<u32>,
}

impl MeshVertex {
    /// Creates a vertex at `position` with no auxiliary value.
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            aux: None,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The box `[0, dims]` used when grid coordinates double as world
    /// coordinates.
    pub fn from_dims(dims: [usize; 3]) -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::new(dims[0] as f32, dims[1] as f32, dims[2] as f32),
        }
    }

    /// Size along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the longest axis.
    pub fn longest_extent(&self) -> f32 {
        self.extent().max_element()
    }

    fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// An indexed triangle mesh.
///
/// Vertices are not shared between extraction cells, so adjacent triangles
/// usually reference distinct vertices at identical positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Triangles as triples of vertex indices.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    ///
    /// Indices are `u32`, so a mesh holds at most `u32::MAX` addressable
    /// vertices; debug builds panic past that.
    pub fn push_vertex(&mut self, position: [f32; 3], aux: Option<u32>) -> u32 {
        let index = vertex_index(self.vertices.len());
        self.vertices.push(MeshVertex { position, aux });
        index
    }

    /// Appends a triangle referencing existing vertices.
    pub fn push_triangle(&mut self, triangle: [u32; 3]) {
        debug_assert!(
            triangle.iter().all(|&i| (i as usize) < self.vertices.len()),
            "triangle {triangle:?} references a missing vertex"
        );
        self.triangles.push(triangle);
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn triangle_positions(&self, index: usize) -> [Vec3; 3] {
        self.triangles[index].map(|i| Vec3::from(self.vertices[i as usize].position))
    }

    /// Bounding box of all vertex positions, `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        let (first, rest) = self.vertices.split_first()?;
        let p = Vec3::from(first.position);
        let mut aabb = Aabb::new(p, p);
        for v in rest {
            aabb.include(Vec3::from(v.position));
        }
        Some(aabb)
    }

    /// Unit normal of every triangle by the right-hand rule over its winding.
    ///
    /// With the extractor's tables the normal points toward the positive
    /// (inside) side of the sampled field. Zero-area triangles get
    /// [`Vec3::ZERO`].
    pub fn face_normals(&self) -> Vec<Vec3> {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle_positions(i);
                (b - a).cross(c - a).normalize_or_zero()
            })
            .collect()
    }

    /// Applies `f` to every vertex position.
    pub fn transform_positions(&mut self, mut f: impl FnMut(Vec3) -> Vec3) {
        for v in &mut self.vertices {
            v.position = f(Vec3::from(v.position)).to_array();
        }
    }
}

/// Index of the vertex stored at slot `len`.
#[inline]
fn vertex_index(len: usize) -> u32 {
    let index = u32::try_from(len);
    debug_assert!(index.is_ok(), "vertex slot {len} exceeds the u32 index range");
    index.unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.push_vertex([0.0, 0.0, 0.0], None);
        let b = mesh.push_vertex([2.0, 0.0, 0.0], Some(7));
        let c = mesh.push_vertex([2.0, 1.0, 0.0], None);
        let d = mesh.push_vertex([0.0, 1.0, 0.0], None);
        mesh.push_triangle([a, b, c]);
        mesh.push_triangle([a, c, d]);
        mesh
    }

    #[test]
    fn test_counts() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.is_empty());
        assert!(Mesh::new().is_empty());
    }

    #[test]
    fn test_bounds() {
        let bounds = quad().bounds().unwrap();
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(bounds.longest_extent(), 2.0);
        assert!(Mesh::new().bounds().is_none(), "empty mesh has no bounds");
    }

    #[test]
    fn test_face_normals_follow_winding() {
        let normals = quad().face_normals();
        assert_eq!(normals, vec![Vec3::Z, Vec3::Z]);
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let mut mesh = Mesh::new();
        let a = mesh.push_vertex([1.0, 1.0, 1.0], None);
        let b = mesh.push_vertex([1.0, 1.0, 1.0], None);
        let c = mesh.push_vertex([2.0, 2.0, 2.0], None);
        mesh.push_triangle([a, b, c]);
        assert_eq!(mesh.face_normals(), vec![Vec3::ZERO]);
    }

    #[test]
    fn test_transform_positions() {
        let mut mesh = quad();
        mesh.transform_positions(|p| p * 2.0);
        assert_eq!(mesh.vertices[2].position, [4.0, 2.0, 0.0]);
        assert_eq!(mesh.vertices[1].aux, Some(7), "aux survives transforms");
    }

    #[test]
    fn test_vertex_indices_are_sequential() {
        assert_eq!(vertex_index(0), 0);
        assert_eq!(vertex_index(u32::MAX as usize), u32::MAX);
        let mut mesh = quad();
        assert_eq!(mesh.push_vertex([5.0, 5.0, 5.0], None), 4);
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "exceeds the u32 index range")]
    fn test_vertex_index_overflow_panics_in_debug() {
        vertex_index(u32::MAX as usize + 1);
    }
}
