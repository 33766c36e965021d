//! Formations: complete positions+colors datasets.
//!
//! A formation is one arrangement of the whole particle field ("sphere",
//! "image X", ...). The real producers are external source generators; this
//! module defines the data contract they fill plus a couple of procedural
//! defaults used by the demo binary and tests.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Positions and colors for every particle in one arrangement.
///
/// Invariant: `positions.len() == colors.len()`, colors in linear RGB
/// `[0, 1]^3`.
#[derive(Clone, Debug)]
pub struct Formation {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

impl Formation {
    /// Build from parallel arrays, validating the data contract.
    pub fn new(positions: Vec<Vec3>, colors: Vec<Vec3>) -> Result<Self, String> {
        let formation = Self { positions, colors };
        formation.validate()?;
        Ok(formation)
    }

    /// Check the data contract. The fields are public so external producers
    /// can fill them directly; the viewer re-checks before building GPU
    /// resources.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.is_empty() {
            return Err("formation has no particles".into());
        }
        if self.positions.len() != self.colors.len() {
            return Err(format!(
                "positions/colors length mismatch: {} vs {}",
                self.positions.len(),
                self.colors.len()
            ));
        }
        if self.positions.iter().any(|p| !p.is_finite()) {
            return Err("formation contains non-finite positions".into());
        }
        Ok(())
    }

    /// Number of particles in this formation.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Uniformly-sampled sphere surface of the given radius.
    pub fn sphere(count: usize, radius: f32) -> Self {
        let mut rng = SmallRng::seed_from_u64(0x5f3e_1a2b);
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let theta: f32 = rng.gen_range(0.0..TAU);
            // cos(phi) uniform in [-1, 1] avoids pole clustering
            let cos_phi: f32 = rng.gen_range(-1.0..1.0f32);
            let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
            let p = Vec3::new(
                radius * sin_phi * theta.cos(),
                radius * cos_phi,
                radius * sin_phi * theta.sin(),
            );
            positions.push(p);
            colors.push(Vec3::new(
                0.4 + 0.6 * (p.y / radius * 0.5 + 0.5),
                0.5,
                0.9,
            ));
        }
        Self { positions, colors }
    }

    /// Points filling a solid cube of the given half-extent.
    pub fn cube(count: usize, half: f32) -> Self {
        let mut rng = SmallRng::seed_from_u64(0x0c0f_fee5);
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let p = Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            );
            positions.push(p);
            colors.push((p / half * 0.5 + Vec3::splat(0.5)).clamp(Vec3::ZERO, Vec3::ONE));
        }
        Self { positions, colors }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Formation::new(vec![Vec3::ZERO], vec![]);
        assert!(err.is_err());
    }

    #[test]
    fn new_rejects_nan_positions() {
        let err = Formation::new(vec![Vec3::splat(f32::NAN)], vec![Vec3::ONE]);
        assert!(err.is_err());
    }

    #[test]
    fn sphere_particles_lie_on_the_shell() {
        let radius = 40.0;
        let f = Formation::sphere(500, radius);
        assert_eq!(f.len(), 500);
        for p in &f.positions {
            assert!((p.length() - radius).abs() < 1e-3);
        }
    }

    #[test]
    fn validate_catches_field_level_corruption() {
        // The pub fields bypass `new`; validate must still catch the damage.
        let mut f = Formation::sphere(4, 10.0);
        f.colors.pop();
        assert!(f.validate().is_err());
        let mut f = Formation::sphere(4, 10.0);
        f.positions[2] = Vec3::splat(f32::INFINITY);
        assert!(f.validate().is_err());
    }
}
