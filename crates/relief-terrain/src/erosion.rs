//! Stochastic particle-based hydraulic erosion.
//!
//! Each particle (a water droplet) spawns at a random position with a small
//! random velocity, then repeatedly:
//!
//! 1. moves one cell along its velocity, eroding material from the cell it
//!    left and depositing material into the cell it entered,
//! 2. loses speed to friction,
//! 3. accelerates towards the steepest downhill neighbor of its cell.
//!
//! Particles that leave the field stop immediately. The result is clamped to
//! `[0, 1]`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::ScalarField;
use crate::seed::ParticleSeed;

/// Neighbor offsets in scan order: N, E, S, W, NW, NE, SE, SW.
///
/// The first entry is the initial steepest-descent candidate; later entries
/// replace it only when strictly steeper.
pub const NEIGHBOR_SCAN: [(i64, i64); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
];

/// Tunables for [`ErosionSimulator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Bound on each component of a particle's initial velocity. Default: 0.05.
    pub inertia: f32,
    /// Material removed from the cell a particle leaves, per unit speed. Default: 0.1.
    pub erosion_rate: f32,
    /// Material added to the cell a particle enters, per unit speed. Default: 0.09.
    pub deposit_rate: f32,
    /// Gain applied to the downhill height difference when accelerating. Default: 0.75.
    pub speed: f32,
    /// Velocity multiplier applied every step. Default: 0.8.
    pub friction: f32,
    /// Maximum number of steps per particle. Default: 20.
    pub lifetime: u32,
    /// Ramp the erosion/deposit weight from `1/lifetime` up to 1 over a
    /// particle's life instead of using a constant weight of 1. Default: false.
    pub capacity_ramp: bool,
    /// Box-blur the field before releasing particles. Default: false.
    pub pre_blur: bool,
    /// Box-blur the field after all particles finished. Default: false.
    pub post_blur: bool,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            inertia: 0.05,
            erosion_rate: 0.1,
            deposit_rate: 0.09,
            speed: 0.75,
            friction: 0.8,
            lifetime: 20,
            capacity_ramp: false,
            pre_blur: false,
            post_blur: false,
        }
    }
}

/// A droplet in flight. Lives for a single call to [`ErosionSimulator::run_particle`].
#[derive(Clone, Copy, Debug, PartialEq)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

/// Runs particle erosion over a heightfield.
#[derive(Clone, Debug, Default)]
pub struct ErosionSimulator {
    params: ErosionParams,
}

impl ErosionSimulator {
    /// Create a simulator with the given parameters.
    pub fn new(params: ErosionParams) -> Self {
        Self { params }
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &ErosionParams {
        &self.params
    }

    /// Erode a private copy of `heightfield` with `particles` droplets drawn from `rng`.
    ///
    /// With zero particles the result is the input, blurred if blurring is
    /// enabled, clamped to `[0, 1]`.
    pub fn erode<R: Rng>(
        &self,
        heightfield: &ScalarField,
        particles: u64,
        rng: &mut R,
    ) -> ScalarField {
        let mut field = heightfield.clone();

        if self.params.pre_blur {
            box_blur(&mut field);
        }

        let mut steps = 0_u64;
        for _ in 0..particles {
            steps += u64::from(self.run_particle(&mut field, rng));
        }

        if self.params.post_blur {
            box_blur(&mut field);
        }
        field.clamp_unit();

        debug!(
            particles,
            steps,
            width = field.width(),
            height = field.height(),
            "erosion pass finished"
        );
        field
    }

    /// [`erode`](Self::erode) with an RNG built from `seed`.
    pub fn erode_seeded(
        &self,
        heightfield: &ScalarField,
        particles: u64,
        seed: ParticleSeed,
    ) -> ScalarField {
        let mut rng = seed.rng();
        self.erode(heightfield, particles, &mut rng)
    }

    /// Simulate one droplet over `field`. Returns the number of steps taken.
    fn run_particle<R: Rng>(&self, field: &mut ScalarField, rng: &mut R) -> u32 {
        let p = &self.params;
        let (width, height) = field.dimensions();

        let mut particle = Particle {
            x: rng.random::<f32>() * width as f32,
            y: rng.random::<f32>() * height as f32,
            vx: p.inertia * rng.random_range(-1.0..1.0),
            vy: p.inertia * rng.random_range(-1.0..1.0),
        };

        for step in 0..p.lifetime {
            // Spawn and every surviving step leave the particle inside the field.
            let Some(cell) = cell_index(field, particle.x, particle.y) else {
                return step;
            };

            let weight = if p.capacity_ramp {
                (step + 1) as f32 / p.lifetime as f32
            } else {
                1.0
            };

            let s = particle.vx.hypot(particle.vy);
            if s > 0.0 {
                particle.x += particle.vx / s;
                particle.y += particle.vy / s;
                field.as_mut_slice()[cell] -= s * p.erosion_rate * weight;
                if let Some(next) = cell_index(field, particle.x, particle.y) {
                    field.as_mut_slice()[next] += s * p.deposit_rate * weight;
                }
            }
            particle.vx *= p.friction;
            particle.vy *= p.friction;

            let Some((cx, cy)) = cell_coords(field, particle.x, particle.y) else {
                return step + 1;
            };

            let ((dx, dy), drop) = steepest_descent(field, cx, cy);
            particle.vx += dx as f32 * drop * p.speed;
            particle.vy += dy as f32 * drop * p.speed;
        }
        p.lifetime
    }
}

/// Integer cell containing `(x, y)`, or `None` outside the field.
#[inline]
fn cell_coords(field: &ScalarField, x: f32, y: f32) -> Option<(usize, usize)> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let (cx, cy) = (x as usize, y as usize);
    (cx < field.width() && cy < field.height()).then_some((cx, cy))
}

#[inline]
fn cell_index(field: &ScalarField, x: f32, y: f32) -> Option<usize> {
    cell_coords(field, x, y).map(|(cx, cy)| field.index(cx, cy))
}

/// Direction and height drop towards the steepest neighbor of `(cx, cy)`.
///
/// Neighbors outside the field read as the center height. The north
/// neighbor is the initial candidate even when its drop is not positive.
pub fn steepest_descent(field: &ScalarField, cx: usize, cy: usize) -> ((i64, i64), f32) {
    let center = field.get(cx, cy);
    let (x, y) = (cx as i64, cy as i64);
    let drop = |(dx, dy): (i64, i64)| center - field.get_signed(x + dx, y + dy).unwrap_or(center);

    let mut best = NEIGHBOR_SCAN[0];
    let mut best_drop = drop(best);
    for &dir in &NEIGHBOR_SCAN[1..] {
        let d = drop(dir);
        if d > best_drop {
            best = dir;
            best_drop = d;
        }
    }
    (best, best_drop)
}

/// 2×2 forward box average: each cell becomes the mean of itself and its
/// right, lower and lower-right neighbors. The last row and column are left
/// unaveraged.
pub fn box_blur(field: &mut ScalarField) {
    let (width, height) = field.dimensions();
    if width < 2 || height < 2 {
        return;
    }
    let data = field.as_mut_slice();
    // Each cell only reads cells after it in row-major order, so updating in
    // place matches a separate output buffer.
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let i = y * width + x;
            data[i] = (data[i] + data[i + 1] + data[i + width] + data[i + width + 1]) * 0.25;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::FractalCloud;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_field() -> ScalarField {
        ScalarField::from_fn(48, 32, |x, y| {
            (x as f32 * 0.05 + y as f32 * 0.03).sin() * 0.6 + 0.4
        })
        .unwrap()
    }

    #[test]
    fn test_zero_particles_is_clamp() {
        let input = ScalarField::from_vec(3, 2, vec![-0.2, 0.1, 0.5, 0.9, 1.3, 2.0]).unwrap();
        let sim = ErosionSimulator::default();
        let out = sim.erode_seeded(&input, 0, ParticleSeed::Fixed(1));

        let mut expected = input.clone();
        expected.clamp_unit();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_zero_particles_with_blur_matches_blurred_clamp() {
        let input = sample_field();
        let sim = ErosionSimulator::new(ErosionParams {
            pre_blur: true,
            ..Default::default()
        });
        let out = sim.erode_seeded(&input, 0, ParticleSeed::Entropy);

        let mut expected = input.clone();
        box_blur(&mut expected);
        expected.clamp_unit();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_zero_particles_with_post_blur_matches_blurred_clamp() {
        let input = ScalarField::from_fn(6, 5, |x, y| (x as f32 - y as f32) * 0.3).unwrap();
        let sim = ErosionSimulator::new(ErosionParams {
            post_blur: true,
            ..Default::default()
        });
        let out = sim.erode_seeded(&input, 0, ParticleSeed::Fixed(1));

        let mut expected = input.clone();
        box_blur(&mut expected);
        expected.clamp_unit();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_post_blur_changes_eroded_field() {
        let input = sample_field();
        let plain = ErosionSimulator::default().erode_seeded(&input, 500, ParticleSeed::Fixed(7));
        let blurred = ErosionSimulator::new(ErosionParams {
            post_blur: true,
            ..Default::default()
        })
        .erode_seeded(&input, 500, ParticleSeed::Fixed(7));
        assert_ne!(plain, blurred);
    }

    #[test]
    fn test_capacity_ramp_changes_result() {
        let input = sample_field();
        let constant =
            ErosionSimulator::default().erode_seeded(&input, 500, ParticleSeed::Fixed(7));
        let ramped = ErosionSimulator::new(ErosionParams {
            capacity_ramp: true,
            ..Default::default()
        })
        .erode_seeded(&input, 500, ParticleSeed::Fixed(7));
        assert_ne!(constant, ramped);
    }

    #[test]
    fn test_capacity_ramp_scales_first_step() {
        // Zero friction and speed stop the droplet after its first move, so
        // only the first step touches the field.
        let base = ErosionParams {
            friction: 0.0,
            speed: 0.0,
            lifetime: 4,
            ..Default::default()
        };
        let input = ScalarField::filled(16, 16, 0.5).unwrap();
        let constant =
            ErosionSimulator::new(base.clone()).erode_seeded(&input, 1, ParticleSeed::Fixed(21));
        let ramped = ErosionSimulator::new(ErosionParams {
            capacity_ramp: true,
            ..base
        })
        .erode_seeded(&input, 1, ParticleSeed::Fixed(21));

        assert_ne!(constant, input, "the droplet must erode its spawn cell");
        for (&c, &r) in constant.as_slice().iter().zip(ramped.as_slice()) {
            let expected = (c - 0.5) / 4.0;
            assert!(
                ((r - 0.5) - expected).abs() < 1e-6,
                "ramped change {} vs constant change {}",
                r - 0.5,
                c - 0.5
            );
        }
    }

    #[test]
    fn test_output_clamped_and_same_shape() {
        let input = sample_field();
        let out = ErosionSimulator::default().erode_seeded(&input, 5_000, ParticleSeed::Fixed(9));
        assert_eq!(out.dimensions(), input.dimensions());
        let (lo, hi) = out.min_max();
        assert!(lo >= 0.0 && hi <= 1.0, "range [{lo}, {hi}]");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = sample_field();
        let snapshot = input.clone();
        let _ = ErosionSimulator::default().erode_seeded(&input, 1_000, ParticleSeed::Fixed(2));
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_fixed_seed_reproducible() {
        let input = FractalCloud::default().generate(0, 0, 40, 40, 4242).unwrap();
        let sim = ErosionSimulator::default();
        let a = sim.erode_seeded(&input, 2_000, ParticleSeed::Fixed(11));
        let b = sim.erode_seeded(&input, 2_000, ParticleSeed::Fixed(11));
        assert_eq!(a, b, "same particle seed must reproduce erosion exactly");
    }

    #[test]
    fn test_particles_move_material() {
        let input = FractalCloud::default().generate(0, 0, 40, 40, 99).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let out = ErosionSimulator::default().erode(&input, 2_000, &mut rng);
        assert_ne!(out, input, "two thousand droplets should change the field");
    }

    #[test]
    fn test_steepest_descent_scan_order() {
        // Flat field: every drop is zero, so north wins the tie.
        let flat = ScalarField::filled(3, 3, 0.5).unwrap();
        assert_eq!(steepest_descent(&flat, 1, 1), ((0, -1), 0.0));

        // Equal drops east and south: east comes first in scan order.
        let mut tie = ScalarField::filled(3, 3, 0.5).unwrap();
        tie.set(2, 1, 0.2);
        tie.set(1, 2, 0.2);
        let (dir, drop) = steepest_descent(&tie, 1, 1);
        assert_eq!(dir, (1, 0));
        assert!((drop - 0.3).abs() < 1e-6);

        // A strictly deeper diagonal beats the cardinals.
        tie.set(0, 2, 0.0);
        assert_eq!(steepest_descent(&tie, 1, 1).0, (-1, 1));
    }

    #[test]
    fn test_steepest_descent_edges_read_as_flat() {
        let mut field = ScalarField::filled(2, 2, 0.5).unwrap();
        field.set(0, 0, 0.9);
        // From the corner, out-of-field neighbors count as level with the center,
        // so the in-field neighbors (all lower) must win.
        let (dir, drop) = steepest_descent(&field, 0, 0);
        assert_eq!(dir, (1, 0));
        assert!((drop - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_box_blur_leaves_last_row_and_column() {
        let mut field = ScalarField::from_fn(3, 3, |x, y| (x + 3 * y) as f32).unwrap();
        box_blur(&mut field);
        assert_eq!(field.get(0, 0), (0.0 + 1.0 + 3.0 + 4.0) / 4.0);
        assert_eq!(field.get(1, 1), (4.0 + 5.0 + 7.0 + 8.0) / 4.0);
        assert_eq!(field.get(2, 0), 2.0);
        assert_eq!(field.get(0, 2), 6.0);
        assert_eq!(field.get(2, 2), 8.0);
    }

    #[test]
    fn test_single_cell_field() {
        let input = ScalarField::filled(1, 1, 0.5).unwrap();
        let out = ErosionSimulator::default().erode_seeded(&input, 100, ParticleSeed::Fixed(3));
        assert_eq!(out.dimensions(), (1, 1));
        assert!((0.0..=1.0).contains(&out.get(0, 0)));
    }
}
