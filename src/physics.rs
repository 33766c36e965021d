//! Particle physics: spring-back, hand forces, audio impulses.
//!
//! The authoritative per-frame simulation runs on the GPU (two compute passes
//! over ping-pong velocity/displacement arenas, see [`crate::gpu`]). This
//! module holds the same math in pure Rust: it drives the property tests, and
//! its instantaneous hand model is the degraded path used when the GPU
//! simulation cannot be created.
//!
//! The generated WGSL splices the constants below, so both sides integrate
//! identically.

use glam::{Vec3, Vec4};

use crate::input::Gesture;
use crate::noise::noise3;

/// Stiffness added per unit of the user attraction gain (`k = k0 + a * k1`).
pub const ATTRACTION_STIFFNESS: f32 = 2.0;
/// Spatial frequency of the push-direction noise, in inverse world units.
pub const NOISE_SCALE: f32 = 0.02;
/// How strongly noise bends the radial push direction before renormalizing.
pub const DIRECTION_JITTER: f32 = 0.6;
/// Constant upward bias added per unit falloff.
pub const UPWARD_BIAS: f32 = 0.35;
/// Bass energies below this add no radial impulse.
pub const BASS_THRESHOLD: f32 = 0.02;
/// Force multiplier for the peace-gesture burst.
pub const BURST_GAIN: f32 = 2.5;
/// Hard upper bound on an integration step, in seconds.
pub const MAX_STEP_DT: f32 = 0.05;

/// Tunable simulation parameters, mirrored into the uniform block each frame.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsParams {
    /// Base spring stiffness `k0`.
    pub spring_k: f32,
    /// User attraction gain; scales [`ATTRACTION_STIFFNESS`].
    pub attraction: f32,
    /// Multiplicative velocity damping per step, must be < 1.
    pub damping: f32,
    /// Hard cap on displacement magnitude.
    pub max_displacement: f32,
    /// Responsiveness multiplier on the position integration.
    pub integration_gain: f32,
    /// Hand interaction radius in world units.
    pub hand_radius: f32,
    /// User repulsion gain.
    pub repulsion: f32,
    /// Overall hand push strength.
    pub push_gain: f32,
    /// Gain on the bass-driven radial impulse.
    pub audio_gain: f32,
    /// When set, the discrete gesture shapes the hand force
    /// (open=repel, closed=attract, pinch=orbit, peace=burst, point/none=off).
    /// When clear, every tracked hand repels.
    pub gesture_forces: bool,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            spring_k: 2.0,
            attraction: 0.5,
            damping: 0.92,
            max_displacement: 30.0,
            integration_gain: 1.0,
            hand_radius: 25.0,
            repulsion: 1.0,
            push_gain: 30.0,
            audio_gain: 20.0,
            gesture_forces: false,
        }
    }
}

/// Normalize with an epsilon guard; degenerate vectors yield `fallback`.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len = v.length();
    if len < 1e-5 {
        fallback
    } else {
        v / len
    }
}

/// Cubic falloff: concentrated near the hand, vanishing at the radius.
#[inline]
pub fn hand_falloff(dist: f32, radius: f32) -> f32 {
    let t = 1.0 - dist / radius;
    t * t * t
}

/// Noise-perturbed push direction away from the hand.
fn push_direction(world: Vec3, hand_pos: Vec3, time: f32) -> Vec3 {
    let dir = safe_normalize(world - hand_pos, Vec3::Y);
    let t = time * 0.1;
    let jitter = Vec3::new(
        noise3(world * NOISE_SCALE + Vec3::new(0.0, 0.0, t)),
        noise3(world * NOISE_SCALE + Vec3::new(31.7, 0.0, t)),
        noise3(world * NOISE_SCALE + Vec3::new(0.0, 57.3, t)),
    );
    safe_normalize(dir + jitter * DIRECTION_JITTER, dir)
}

/// Force exerted by one encoded hand (xyz position, w gesture id; a near-zero
/// position vector is the "absent" sentinel).
pub fn hand_force(world: Vec3, hand: Vec4, time: f32, p: &PhysicsParams) -> Vec3 {
    let hand_pos = hand.truncate();
    if hand_pos.length_squared() < 1e-6 {
        return Vec3::ZERO;
    }
    let dist = world.distance(hand_pos);
    if dist >= p.hand_radius {
        return Vec3::ZERO;
    }
    let falloff = hand_falloff(dist, p.hand_radius);
    let dir = push_direction(world, hand_pos, time);
    let strength = falloff * p.repulsion * p.push_gain;
    let mut force = dir * strength + Vec3::Y * (UPWARD_BIAS * falloff);

    if p.gesture_forces {
        match Gesture::from_index(hand.w as u32) {
            Gesture::Open => {}
            Gesture::Closed => force = -force,
            Gesture::Pinch => {
                let tangent = safe_normalize(Vec3::Y.cross(world - hand_pos), dir);
                force = tangent * strength;
            }
            Gesture::Peace => force *= BURST_GAIN,
            Gesture::Point | Gesture::None => force = Vec3::ZERO,
        }
    }
    force
}

/// Bass-driven radial impulse along the current displacement direction.
pub fn audio_force(displacement: Vec3, bass: f32, gain: f32) -> Vec3 {
    if bass <= BASS_THRESHOLD {
        return Vec3::ZERO;
    }
    safe_normalize(displacement, Vec3::Y) * bass * gain
}

/// Instantaneous positional hand offset: the fallback interaction model.
///
/// Same falloff and noise shape as [`hand_force`], applied directly to
/// position with no persistent velocity/spring state.
pub fn instant_hand_offset(world: Vec3, hand: Vec4, time: f32, p: &PhysicsParams) -> Vec3 {
    let hand_pos = hand.truncate();
    if hand_pos.length_squared() < 1e-6 {
        return Vec3::ZERO;
    }
    let dist = world.distance(hand_pos);
    if dist >= p.hand_radius {
        return Vec3::ZERO;
    }
    let falloff = hand_falloff(dist, p.hand_radius);
    let dir = push_direction(world, hand_pos, time);
    let offset = dir * (falloff * p.repulsion * p.push_gain * 0.25);
    offset.clamp_length_max(p.max_displacement)
}

/// CPU ping-pong simulation: one velocity and one displacement record per
/// particle, stepped exactly like the GPU passes (velocity pass first, then
/// position pass reading the velocity written this step).
#[derive(Clone, Debug)]
pub struct CpuSim {
    pub velocity: Vec<Vec3>,
    pub displacement: Vec<Vec3>,
}

impl CpuSim {
    pub fn new(count: usize) -> Self {
        Self {
            velocity: vec![Vec3::ZERO; count],
            displacement: vec![Vec3::ZERO; count],
        }
    }

    /// Advance one frame.
    ///
    /// `hands` are the two encoded hand slots; `bass` the low-band audio
    /// energy in [0, 1].
    pub fn step(
        &mut self,
        originals: &[Vec3],
        hands: [Vec4; 2],
        bass: f32,
        time: f32,
        dt: f32,
        p: &PhysicsParams,
    ) {
        let dt = dt.min(MAX_STEP_DT);
        let k = p.spring_k + p.attraction * ATTRACTION_STIFFNESS;

        // Velocity pass
        for i in 0..originals.len() {
            let disp = self.displacement[i];
            let world = originals[i] + disp;
            let mut force = -disp * k;
            for hand in hands {
                force += hand_force(world, hand, time, p);
            }
            force += audio_force(disp, bass, p.audio_gain);
            let v = (self.velocity[i] + force * dt) * p.damping;
            self.velocity[i] = v;
        }

        // Position pass; the displacement bound is a hard invariant.
        for i in 0..originals.len() {
            let mut disp = self.displacement[i] + self.velocity[i] * dt * p.integration_gain;
            let len = disp.length();
            if len > p.max_displacement {
                disp *= p.max_displacement / len;
            }
            self.displacement[i] = disp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(pos: Vec3, gesture: Gesture) -> Vec4 {
        pos.extend(gesture.index() as f32)
    }

    #[test]
    fn falloff_matches_reference_scenario() {
        // Hand at origin, radius 50, particle at distance 10.
        assert!((hand_falloff(10.0, 50.0) - 0.512).abs() < 1e-6);
    }

    #[test]
    fn absent_hand_sentinel_exerts_no_force() {
        let p = PhysicsParams::default();
        let force = hand_force(Vec3::new(10.0, 0.0, 0.0), Vec4::ZERO, 0.0, &p);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn hand_force_points_away_before_jitter_dominates() {
        let p = PhysicsParams {
            hand_radius: 50.0,
            ..Default::default()
        };
        let force = hand_force(
            Vec3::new(10.0, 0.0, 0.0),
            encoded(Vec3::new(0.5, 0.0, 0.0), Gesture::Open),
            0.0,
            &p,
        );
        let expected = hand_falloff(9.5, 50.0) * p.repulsion * p.push_gain;
        // Jitter bends the direction but the magnitude stays unit-direction
        // times strength, up to the upward bias term.
        let radial = force.dot(Vec3::X);
        assert!(radial > 0.3 * expected, "radial {radial} vs {expected}");
        assert!(force.length() < expected * 1.5);
    }

    #[test]
    fn hand_outside_radius_is_ignored() {
        let p = PhysicsParams::default();
        let force = hand_force(
            Vec3::new(100.0, 0.0, 0.0),
            encoded(Vec3::new(1.0, 0.0, 0.0), Gesture::Open),
            0.0,
            &p,
        );
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn gesture_shaping_is_opt_in() {
        let world = Vec3::new(5.0, 0.0, 0.0);
        let hand = encoded(Vec3::new(1.0, 0.0, 0.0), Gesture::Point);
        let plain = PhysicsParams::default();
        let shaped = PhysicsParams {
            gesture_forces: true,
            ..plain
        };
        // Without gesture shaping a pointing hand still repels.
        assert!(hand_force(world, hand, 0.0, &plain).length() > 0.0);
        // With it, point exerts no force.
        assert_eq!(hand_force(world, hand, 0.0, &shaped), Vec3::ZERO);
    }

    #[test]
    fn closed_gesture_attracts() {
        let world = Vec3::new(5.0, 0.0, 0.0);
        let hand = encoded(Vec3::new(1.0, 0.0, 0.0), Gesture::Closed);
        let p = PhysicsParams {
            gesture_forces: true,
            ..Default::default()
        };
        let force = hand_force(world, hand, 0.0, &p);
        assert!(force.dot(world - Vec3::new(1.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn audio_force_respects_threshold() {
        assert_eq!(audio_force(Vec3::X, 0.01, 20.0), Vec3::ZERO);
        let f = audio_force(Vec3::X * 3.0, 0.5, 20.0);
        assert!((f - Vec3::X * 10.0).length() < 1e-4);
        // Zero displacement pulses upward.
        let f = audio_force(Vec3::ZERO, 0.5, 20.0);
        assert!(f.y > 0.0);
    }

    #[test]
    fn displacement_stays_bounded_under_extreme_forces() {
        let p = PhysicsParams {
            repulsion: 1000.0,
            push_gain: 100.0,
            hand_radius: 1000.0,
            ..Default::default()
        };
        let originals = [Vec3::new(3.0, 0.0, 0.0), Vec3::new(-4.0, 2.0, 1.0)];
        let mut sim = CpuSim::new(originals.len());
        let hand = encoded(Vec3::new(0.1, 0.0, 0.0), Gesture::Open);
        for frame in 0..10_000 {
            sim.step(
                &originals,
                [hand, Vec4::ZERO],
                1.0,
                frame as f32 / 60.0,
                1.0 / 60.0,
                &p,
            );
            for d in &sim.displacement {
                assert!(
                    d.length() <= p.max_displacement + 1e-3,
                    "bound broken at frame {frame}: {}",
                    d.length()
                );
            }
        }
    }

    #[test]
    fn converges_to_rest_without_input() {
        let p = PhysicsParams::default();
        let originals = [Vec3::ZERO];
        let mut sim = CpuSim::new(1);
        sim.displacement[0] = Vec3::new(20.0, 0.0, 0.0);
        let initial = sim.displacement[0].length();
        for frame in 0..600 {
            sim.step(
                &originals,
                [Vec4::ZERO, Vec4::ZERO],
                0.0,
                frame as f32 / 60.0,
                1.0 / 60.0,
                &p,
            );
        }
        let final_len = sim.displacement[0].length();
        assert!(
            final_len < initial * 0.01,
            "still displaced by {final_len} after 600 frames"
        );
    }

    #[test]
    fn safe_normalize_guards_degenerate_input() {
        assert_eq!(safe_normalize(Vec3::ZERO, Vec3::Y), Vec3::Y);
        let n = safe_normalize(Vec3::new(3.0, 0.0, 0.0), Vec3::Y);
        assert!((n - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn instant_offset_matches_falloff_shape() {
        let p = PhysicsParams {
            hand_radius: 50.0,
            ..Default::default()
        };
        let hand = encoded(Vec3::new(0.0, 0.0, 1.0), Gesture::Open);
        let near = instant_hand_offset(Vec3::new(5.0, 0.0, 1.0), hand, 0.0, &p);
        let far = instant_hand_offset(Vec3::new(40.0, 0.0, 1.0), hand, 0.0, &p);
        assert!(near.length() > far.length());
        assert!(near.length() <= p.max_displacement);
    }
}
