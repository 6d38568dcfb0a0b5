//! Stateless lattice hash noise.
//!
//! Multiplies the two lattice coordinates by large odd constants, XORs them,
//! multiplies by the seed and keeps the low 16 bits. Cheap and fully
//! deterministic; not suitable for anything security related.

/// Multiplier applied to the x lattice coordinate.
pub const HASH_MUL_X: i32 = 1991;
/// Multiplier applied to the y lattice coordinate.
pub const HASH_MUL_Y: i32 = 2731;

const HASH_MASK: u32 = 0xFFFF;
const HASH_RANGE: f32 = 65_536.0;

/// Hash a lattice point to a value in `[0, 1)`.
#[inline]
pub fn hash_noise(ix: i32, iy: i32, seed: u32) -> f32 {
    let mixed = (ix.wrapping_mul(HASH_MUL_X) ^ iy.wrapping_mul(HASH_MUL_Y)) as u32;
    (mixed.wrapping_mul(seed) & HASH_MASK) as f32 / HASH_RANGE
}

/// Hash noise bound to a seed and a lattice origin.
///
/// The origin of a region is expressed in tiles of the region's own size:
/// the lattice offset along each axis is `(origin ^ seed) * extent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashNoise {
    seed: u32,
    offset_x: i32,
    offset_y: i32,
}

impl HashNoise {
    /// Noise with its lattice origin at `(0, 0)`.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Noise for the tile at `(origin_x, origin_y)` of a `width × height` region.
    pub fn for_region(
        origin_x: i32,
        origin_y: i32,
        width: usize,
        height: usize,
        seed: u32,
    ) -> Self {
        let s = seed as i32;
        Self {
            seed,
            offset_x: (origin_x ^ s).wrapping_mul(width as i32),
            offset_y: (origin_y ^ s).wrapping_mul(height as i32),
        }
    }

    /// Sample the lattice at `(x, y)` relative to the region origin.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        hash_noise(
            self.offset_x.wrapping_add(x),
            self.offset_y.wrapping_add(y),
            self.seed,
        )
    }

    /// The seed this noise was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_half_open_unit() {
        for seed in [1_u32, 7, 0xDEAD_BEEF, u32::MAX] {
            for ix in (-300..300).step_by(7) {
                for iy in (-300..300).step_by(11) {
                    let v = hash_noise(ix, iy, seed);
                    assert!((0.0..1.0).contains(&v), "value {v} out of [0,1)");
                }
            }
        }
        assert!(hash_noise(i32::MAX, i32::MIN, u32::MAX) < 1.0);
    }

    #[test]
    fn test_pure_function() {
        let a = hash_noise(123, -456, 0x1234_5678);
        let b = hash_noise(123, -456, 0x1234_5678);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_seed_changes_output() {
        let differing = (0..64)
            .filter(|&i| hash_noise(i, i * 3, 11) != hash_noise(i, i * 3, 13))
            .count();
        assert!(differing > 48, "only {differing}/64 samples changed with seed");
    }

    #[test]
    fn test_no_axis_banding() {
        // A constant row or column would show up as a single repeated value.
        let noise = HashNoise::new(0x9E37_79B9);
        let row: Vec<f32> = (0..32).map(|x| noise.sample(x, 5)).collect();
        let col: Vec<f32> = (0..32).map(|y| noise.sample(5, y)).collect();
        assert!(row.windows(2).any(|w| w[0] != w[1]));
        assert!(col.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_region_offsets_by_tile() {
        // Seed 2 maps tiles 0 and 1 to lattice tiles 2 and 3.
        let a = HashNoise::for_region(0, 0, 16, 16, 2);
        let b = HashNoise::for_region(1, 0, 16, 16, 2);
        assert_eq!(a.sample(16, 3), b.sample(0, 3));
        assert_ne!(a.sample(0, 3), b.sample(0, 3));
    }
}
