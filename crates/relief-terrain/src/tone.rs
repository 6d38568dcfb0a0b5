//! Element-wise tone operators for combining and reshaping fields.
//!
//! Every operator mutates its target in place. Callers that still need the
//! source clone it first, which keeps allocation explicit at the call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::field::ScalarField;

/// Photographic blend used to composite a light field onto a base field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Multiply or screen depending on the light operand.
    #[default]
    HardLight,
    /// Gentle dodge/burn driven by the light operand.
    SoftLight,
    /// Multiply or screen depending on the base operand.
    Overlay,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 3] = [
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Overlay,
    ];

    /// Blend a single `base` value with a single `light` value.
    #[inline]
    pub fn apply(self, base: f32, light: f32) -> f32 {
        match self {
            BlendMode::HardLight => hard_light(base, light),
            BlendMode::SoftLight => soft_light(base, light),
            BlendMode::Overlay => overlay(base, light),
        }
    }

    /// Lower-case name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Overlay => "overlay",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown blend mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode: {0}")]
pub struct ParseBlendModeError(pub String);

impl FromStr for BlendMode {
    type Err = ParseBlendModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        BlendMode::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized || mode.name().replace('-', "") == normalized)
            .ok_or_else(|| ParseBlendModeError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Pointwise formulas
// ---------------------------------------------------------------------------

/// Contrast curve around 0.5.
///
/// The value is clamped to `[0, 1]`, mapped to `[-1, 1]`, pushed towards the
/// nearer end by `1 - (1 - |v|)^p` and mapped back. `p <= 0` returns the
/// input untouched; `p == 1` only clamps.
#[inline]
pub fn sigma_value(value: f32, exponent: f32) -> f32 {
    if exponent <= 0.0 {
        return value;
    }
    let v = value.clamp(0.0, 1.0) * 2.0 - 1.0;
    if v == 0.0 {
        return 0.5;
    }
    let curved = if v > 0.0 {
        1.0 - (1.0 - v).powf(exponent)
    } else {
        (1.0 + v).powf(exponent) - 1.0
    };
    (curved + 1.0) * 0.5
}

/// Hard light: thresholds on the light operand.
#[inline]
pub fn hard_light(base: f32, light: f32) -> f32 {
    if light < 0.5 {
        2.0 * light * base
    } else {
        1.0 - 2.0 * (1.0 - light) * (1.0 - base)
    }
}

/// Overlay: hard light with the operands' roles swapped.
#[inline]
pub fn overlay(base: f32, light: f32) -> f32 {
    hard_light(light, base)
}

/// Soft light (W3C compositing formula).
#[inline]
pub fn soft_light(base: f32, light: f32) -> f32 {
    if light <= 0.5 {
        base - (1.0 - 2.0 * light) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            base.max(0.0).sqrt()
        };
        base + (2.0 * light - 1.0) * (d - base)
    }
}

// ---------------------------------------------------------------------------
// Field operators
// ---------------------------------------------------------------------------

/// Apply [`sigma_value`] with a constant exponent to every sample.
pub fn sigma(field: &mut ScalarField, exponent: f32) {
    if exponent <= 0.0 {
        return;
    }
    for v in field.as_mut_slice() {
        *v = sigma_value(*v, exponent);
    }
}

/// Apply [`sigma_value`] with a per-sample exponent taken from `exponents`.
pub fn vector_sigma(field: &mut ScalarField, exponents: &ScalarField) -> Result<(), TerrainError> {
    field.ensure_same_shape(exponents)?;
    for (v, &p) in field.as_mut_slice().iter_mut().zip(exponents.as_slice()) {
        *v = sigma_value(*v, p);
    }
    Ok(())
}

/// Multiply every sample by `k`.
pub fn scale(field: &mut ScalarField, k: f32) {
    for v in field.as_mut_slice() {
        *v *= k;
    }
}

/// Blend `light` onto `base` and move each sample from its original value
/// towards the blended one by `amount` (clamped to `[0, 1]`).
pub fn blend(
    base: &mut ScalarField,
    light: &ScalarField,
    mode: BlendMode,
    amount: f32,
) -> Result<(), TerrainError> {
    base.ensure_same_shape(light)?;
    let t = amount.clamp(0.0, 1.0);
    for (b, &l) in base.as_mut_slice().iter_mut().zip(light.as_slice()) {
        let blended = mode.apply(*b, l);
        *b = *b * (1.0 - t) + blended * t;
    }
    Ok(())
}

/// [`blend`] with [`BlendMode::HardLight`].
pub fn hard_light_blend(
    base: &mut ScalarField,
    light: &ScalarField,
    amount: f32,
) -> Result<(), TerrainError> {
    blend(base, light, BlendMode::HardLight, amount)
}

/// [`blend`] with [`BlendMode::SoftLight`].
pub fn soft_light_blend(
    base: &mut ScalarField,
    light: &ScalarField,
    amount: f32,
) -> Result<(), TerrainError> {
    blend(base, light, BlendMode::SoftLight, amount)
}

/// [`blend`] with [`BlendMode::Overlay`].
pub fn overlay_blend(
    base: &mut ScalarField,
    light: &ScalarField,
    amount: f32,
) -> Result<(), TerrainError> {
    blend(base, light, BlendMode::Overlay, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn ramp() -> ScalarField {
        ScalarField::from_fn(11, 3, |x, y| (x as f32 / 10.0 + y as f32 * 0.013).min(1.0)).unwrap()
    }

    /// Mean distance from the midpoint.
    fn contrast(field: &ScalarField) -> f32 {
        field.as_slice().iter().map(|v| (v - 0.5).abs()).sum::<f32>() / field.len() as f32
    }

    #[test]
    fn test_sigma_zero_is_identity() {
        let original = ScalarField::from_vec(4, 1, vec![-0.3, 0.2, 0.9, 1.7]).unwrap();
        let mut field = original.clone();
        sigma(&mut field, 0.0);
        assert_eq!(field, original, "p = 0 must not even clamp");
        sigma(&mut field, -2.0);
        assert_eq!(field, original);
    }

    #[test]
    fn test_sigma_one_is_identity_on_unit_field() {
        let original = ramp();
        let mut field = original.clone();
        sigma(&mut field, 1.0);
        for (a, b) in field.as_slice().iter().zip(original.as_slice()) {
            assert!((a - b).abs() < EPSILON, "{a} vs {b}");
        }
    }

    #[test]
    fn test_repeated_sigma_compounds_contrast() {
        let mut field = ramp();
        let c0 = contrast(&field);
        sigma(&mut field, 2.0);
        let once = field.clone();
        let c1 = contrast(&field);
        sigma(&mut field, 2.0);
        let c2 = contrast(&field);
        assert!(c0 < c1 && c1 < c2, "contrast should grow: {c0} {c1} {c2}");
        assert_ne!(field, once, "sigma with p != 1 is not idempotent");
    }

    #[test]
    fn test_sigma_preserves_midpoint_and_ends() {
        assert_eq!(sigma_value(0.5, 3.0), 0.5);
        assert_eq!(sigma_value(0.0, 3.0), 0.0);
        assert_eq!(sigma_value(1.0, 3.0), 1.0);
        assert_eq!(sigma_value(1.5, 3.0), 1.0);
        assert_eq!(sigma_value(-0.5, 3.0), 0.0);
        // Symmetric around the midpoint.
        assert!((sigma_value(0.3, 2.5) + sigma_value(0.7, 2.5) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_vector_sigma_respects_per_sample_exponent() {
        let mut field = ScalarField::from_vec(3, 1, vec![0.75, 0.75, 0.75]).unwrap();
        let exponents = ScalarField::from_vec(3, 1, vec![0.0, 1.0, 2.0]).unwrap();
        vector_sigma(&mut field, &exponents).unwrap();
        assert_eq!(field.get(0, 0), 0.75);
        assert!((field.get(1, 0) - 0.75).abs() < EPSILON);
        assert!((field.get(2, 0) - 0.875).abs() < EPSILON);
    }

    #[test]
    fn test_vector_sigma_shape_mismatch() {
        let mut field = ScalarField::new(3, 1).unwrap();
        let exponents = ScalarField::new(1, 3).unwrap();
        assert_eq!(
            vector_sigma(&mut field, &exponents),
            Err(TerrainError::DimensionMismatch {
                expected: (3, 1),
                actual: (1, 3)
            })
        );
    }

    #[test]
    fn test_scale() {
        let mut field = ScalarField::from_vec(2, 1, vec![0.5, 2.0]).unwrap();
        scale(&mut field, 3.0);
        assert_eq!(field.as_slice(), &[1.5, 6.0]);
    }

    #[test]
    fn test_blend_formulas() {
        assert!((hard_light(0.5, 0.25) - 0.25).abs() < EPSILON);
        assert!((hard_light(0.5, 0.75) - 0.75).abs() < EPSILON);
        assert!((overlay(0.25, 0.5) - 0.25).abs() < EPSILON);
        assert!((overlay(0.75, 0.5) - 0.75).abs() < EPSILON);
        // Soft light with a neutral light leaves the base alone.
        assert!((soft_light(0.3, 0.5) - 0.3).abs() < EPSILON);
        assert!((soft_light(0.64, 1.0) - 0.8).abs() < EPSILON);
        assert!((soft_light(0.5, 0.0) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_blend_amount_zero_leaves_base() {
        for mode in BlendMode::ALL {
            let original = ramp();
            let mut base = original.clone();
            let light = ScalarField::filled(11, 3, 0.9).unwrap();
            blend(&mut base, &light, mode, 0.0).unwrap();
            assert_eq!(base, original, "{mode} at t = 0");
        }
    }

    #[test]
    fn test_blend_amount_one_is_full_blend() {
        let mut base = ScalarField::filled(2, 2, 0.4).unwrap();
        let light = ScalarField::filled(2, 2, 0.2).unwrap();
        hard_light_blend(&mut base, &light, 1.0).unwrap();
        assert!((base.get(1, 1) - hard_light(0.4, 0.2)).abs() < EPSILON);

        let mut half = ScalarField::filled(1, 1, 0.4).unwrap();
        let light = ScalarField::filled(1, 1, 1.0).unwrap();
        overlay_blend(&mut half, &light, 0.5).unwrap();
        let expected = 0.4 * 0.5 + overlay(0.4, 1.0) * 0.5;
        assert!((half.get(0, 0) - expected).abs() < EPSILON);
    }

    #[test]
    fn test_blend_stays_in_unit_range() {
        for mode in BlendMode::ALL {
            for b in 0..=20 {
                for l in 0..=20 {
                    let v = mode.apply(b as f32 / 20.0, l as f32 / 20.0);
                    assert!(
                        (-EPSILON..=1.0 + EPSILON).contains(&v),
                        "{mode}({b}, {l}) = {v}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_soft_light_blend_shape_mismatch() {
        let mut base = ScalarField::new(2, 2).unwrap();
        let light = ScalarField::new(2, 3).unwrap();
        assert!(soft_light_blend(&mut base, &light, 0.5).is_err());
    }

    #[test]
    fn test_blend_mode_parse_round_trip() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.to_string().parse::<BlendMode>(), Ok(mode));
        }
        assert_eq!("SOFT_LIGHT".parse::<BlendMode>(), Ok(BlendMode::SoftLight));
        assert_eq!("hardlight".parse::<BlendMode>(), Ok(BlendMode::HardLight));
        assert!("multiply".parse::<BlendMode>().is_err());
    }
}
