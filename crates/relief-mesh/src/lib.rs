//! Isosurface meshing and export: marching cubes over sampled volumes, voxel
//! and heightfield solids, mesh normalization and binary STL encoding.

mod error;
mod heightfield;
mod marching_cubes;
mod mesh;
mod normalize;
mod stl;
pub mod tables;
mod voxel;

pub use error::MeshError;
pub use heightfield::{DEFAULT_BASE, HeightfieldVolume, MAX_LEVELS};
pub use marching_cubes::{EDGE_EPSILON, MarchingCubes, Sample, extract_isosurface};
pub use mesh::{Aabb, Mesh, MeshVertex};
pub use normalize::{Normalization, normalize};
pub use stl::{
    BinaryWriter, STL_AXIS_ORDER, STL_HEADER_LEN, STL_TRIANGLE_LEN, encode_stl, stl_len,
    write_stl,
};
pub use voxel::{SOLID_ALPHA_THRESHOLD, VoxelGrid, VoxelLayer, pack_rgba, unpack_rgba};
