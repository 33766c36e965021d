//! Deformation effects.
//!
//! Each effect is a pure function of (current position, base position,
//! speed-scaled time, per-particle seed, intensity): no hidden state, so
//! variants are testable one by one on the CPU while the render shader runs
//! the same math through a generated `switch`.

use glam::{Mat3, Vec3};
use std::f32::consts::TAU;

use crate::physics::safe_normalize;

/// Inputs shared by every effect variant.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext {
    /// Elapsed time, already scaled by the global animation speed.
    pub time: f32,
    /// Per-particle random value in [0, 1).
    pub seed: f32,
    /// Effect intensity in [0, 1], post transition scaling.
    pub intensity: f32,
    /// Per-axis toggles (0 or 1) for the rotate effect.
    pub rotation_axes: Vec3,
    /// Angular speed for the rotate effect, radians per second at intensity 1.
    pub rotation_speed: f32,
    /// Vertical bob amplitude for the float effect, world units.
    pub float_amplitude: f32,
}

/// The closed set of deformation effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Effect {
    /// No deformation; the neutral handoff point between effect transitions.
    #[default]
    None,
    /// Sinusoidal vertical displacement driven by the two horizontal axes.
    Wave,
    /// Angular sweep around the base position's polar radius, phase-jittered
    /// per particle.
    Spiral,
    /// Radial push/pull oscillating with time.
    Explode,
    /// Three-axis noise-field offset.
    Noise,
    /// Angular sweep around the vertical axis, rate modulated by height.
    Vortex,
    /// Oscillating radial offset, phase jittered per particle.
    Pulse,
    /// Sinusoidal horizontal offsets driven by vertical position.
    Flow,
    /// Rigid rotation of the base formation about any axis combination.
    /// Rotates positions rather than blending them, so intensity never
    /// distorts the silhouette.
    Rotate,
    /// Shared vertical bob plus small per-particle horizontal sway.
    Float,
}

impl Effect {
    pub const ALL: [Effect; 10] = [
        Effect::None,
        Effect::Wave,
        Effect::Spiral,
        Effect::Explode,
        Effect::Noise,
        Effect::Vortex,
        Effect::Pulse,
        Effect::Flow,
        Effect::Rotate,
        Effect::Float,
    ];

    /// Stable id used in the uniform block and the WGSL switch.
    pub fn index(self) -> u32 {
        match self {
            Effect::None => 0,
            Effect::Wave => 1,
            Effect::Spiral => 2,
            Effect::Explode => 3,
            Effect::Noise => 4,
            Effect::Vortex => 5,
            Effect::Pulse => 6,
            Effect::Flow => 7,
            Effect::Rotate => 8,
            Effect::Float => 9,
        }
    }

    pub fn from_index(i: u32) -> Effect {
        Effect::ALL.get(i as usize).copied().unwrap_or(Effect::None)
    }

    /// Apply this effect to a particle position.
    ///
    /// `pos` is the particle's position so far (base lerp plus turbulence);
    /// `original` is the undeformed base position the shape-preserving
    /// effects anchor to.
    pub fn apply(self, pos: Vec3, original: Vec3, ctx: &EffectContext) -> Vec3 {
        let t = ctx.time;
        let i = ctx.intensity;
        match self {
            Effect::None => pos,
            Effect::Wave => {
                let dy = (pos.x * 0.3 + t * 2.0).sin() * 2.0 * i
                    + (pos.z * 0.3 + t * 1.7).sin() * 1.2 * i;
                pos + Vec3::new(0.0, dy, 0.0)
            }
            Effect::Spiral => {
                let r = Vec3::new(original.x, 0.0, original.z).length();
                let base = original.z.atan2(original.x);
                let a = base + (t * 1.5 + ctx.seed * 0.4) * i;
                let dx = r * a.cos() - original.x;
                let dz = r * a.sin() - original.z;
                pos + Vec3::new(dx, 0.0, dz)
            }
            Effect::Explode => {
                let dir = safe_normalize(original, Vec3::Y);
                pos + dir * (t * 2.0).sin() * i * 6.0
            }
            Effect::Noise => {
                let q = pos * 0.02;
                let drift = t * 0.3;
                let n = Vec3::new(
                    crate::noise::noise3(q + Vec3::new(0.0, 0.0, drift)),
                    crate::noise::noise3(q + Vec3::new(31.7, 0.0, drift)),
                    crate::noise::noise3(q + Vec3::new(0.0, 57.3, drift)),
                );
                pos + n * i * 4.0
            }
            Effect::Vortex => {
                let a = t * i * (1.0 + pos.y * 0.05);
                let (sin_a, cos_a) = a.sin_cos();
                Vec3::new(
                    pos.x * cos_a - pos.z * sin_a,
                    pos.y,
                    pos.x * sin_a + pos.z * cos_a,
                )
            }
            Effect::Pulse => {
                let dir = safe_normalize(original, Vec3::Y);
                pos + dir * (t * 3.0 + ctx.seed * TAU).sin() * i * 2.0
            }
            Effect::Flow => {
                pos + Vec3::new(
                    (pos.y * 0.25 + t).sin() * i * 2.0,
                    0.0,
                    (pos.y * 0.2 + t * 0.8).cos() * i * 2.0,
                )
            }
            Effect::Rotate => {
                let angle = ctx.rotation_speed * i * t;
                let m = Mat3::from_rotation_z(ctx.rotation_axes.z * angle)
                    * Mat3::from_rotation_y(ctx.rotation_axes.y * angle)
                    * Mat3::from_rotation_x(ctx.rotation_axes.x * angle);
                pos + (m * original - original)
            }
            Effect::Float => {
                let a = ctx.float_amplitude * i;
                pos + Vec3::new(
                    (t * 0.9 + ctx.seed * TAU).sin() * a * 0.15,
                    (t * 1.2).sin() * a,
                    (t * 1.1 + ctx.seed * TAU).cos() * a * 0.15,
                )
            }
        }
    }

    /// WGSL switch arm for this variant, mirroring [`Effect::apply`].
    ///
    /// The surrounding function provides `pos`, `original`, `seed`, plus
    /// locals `t` (speed-scaled time) and `ei` (effect intensity), and reads
    /// rotation/float parameters from the uniform block `u`.
    fn wgsl_arm(self) -> String {
        let body = match self {
            Effect::None => "return pos;".to_string(),
            Effect::Wave => r#"let dy = sin(pos.x * 0.3 + t * 2.0) * 2.0 * ei
                + sin(pos.z * 0.3 + t * 1.7) * 1.2 * ei;
            return pos + vec3<f32>(0.0, dy, 0.0);"#
                .to_string(),
            Effect::Spiral => r#"let r = length(vec3<f32>(original.x, 0.0, original.z));
            let base = atan2(original.z, original.x);
            let a = base + (t * 1.5 + seed * 0.4) * ei;
            return pos + vec3<f32>(r * cos(a) - original.x, 0.0, r * sin(a) - original.z);"#
                .to_string(),
            Effect::Explode => r#"let dir = safe_normalize(original, vec3<f32>(0.0, 1.0, 0.0));
            return pos + dir * sin(t * 2.0) * ei * 6.0;"#
                .to_string(),
            Effect::Noise => r#"let q = pos * 0.02;
            let drift = t * 0.3;
            let n = vec3<f32>(
                noise3(q + vec3<f32>(0.0, 0.0, drift)),
                noise3(q + vec3<f32>(31.7, 0.0, drift)),
                noise3(q + vec3<f32>(0.0, 57.3, drift)));
            return pos + n * ei * 4.0;"#
                .to_string(),
            Effect::Vortex => r#"let a = t * ei * (1.0 + pos.y * 0.05);
            let sa = sin(a);
            let ca = cos(a);
            return vec3<f32>(pos.x * ca - pos.z * sa, pos.y, pos.x * sa + pos.z * ca);"#
                .to_string(),
            Effect::Pulse => r#"let dir = safe_normalize(original, vec3<f32>(0.0, 1.0, 0.0));
            return pos + dir * sin(t * 3.0 + seed * 6.2831853) * ei * 2.0;"#
                .to_string(),
            Effect::Flow => r#"return pos + vec3<f32>(
                sin(pos.y * 0.25 + t) * ei * 2.0,
                0.0,
                cos(pos.y * 0.2 + t * 0.8) * ei * 2.0);"#
                .to_string(),
            Effect::Rotate => r#"let angle = u.rotation.w * ei * t;
            let rotated = rot_z(rot_y(rot_x(original, u.rotation.x * angle), u.rotation.y * angle), u.rotation.z * angle);
            return pos + (rotated - original);"#
                .to_string(),
            Effect::Float => r#"let a = u.float_amplitude * ei;
            return pos + vec3<f32>(
                sin(t * 0.9 + seed * 6.2831853) * a * 0.15,
                sin(t * 1.2) * a,
                cos(t * 1.1 + seed * 6.2831853) * a * 0.15);"#
                .to_string(),
        };
        format!("        case {}u: {{\n            {}\n        }}", self.index(), body)
    }
}

/// Full WGSL dispatch: axis rotation helpers plus `apply_effect`.
pub fn dispatch_wgsl() -> String {
    let arms: String = Effect::ALL
        .iter()
        .map(|e| e.wgsl_arm())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"
fn rot_x(p: vec3<f32>, a: f32) -> vec3<f32> {{
    let s = sin(a);
    let c = cos(a);
    return vec3<f32>(p.x, p.y * c - p.z * s, p.y * s + p.z * c);
}}

fn rot_y(p: vec3<f32>, a: f32) -> vec3<f32> {{
    let s = sin(a);
    let c = cos(a);
    return vec3<f32>(p.x * c + p.z * s, p.y, -p.x * s + p.z * c);
}}

fn rot_z(p: vec3<f32>, a: f32) -> vec3<f32> {{
    let s = sin(a);
    let c = cos(a);
    return vec3<f32>(p.x * c - p.y * s, p.x * s + p.y * c, p.z);
}}

fn apply_effect(pos: vec3<f32>, original: vec3<f32>, seed: f32) -> vec3<f32> {{
    let t = u.time * u.speed;
    let ei = u.effect_intensity;
    switch u.effect_id {{
{arms}
        default: {{
            return pos;
        }}
    }}
}}
"#
    )
}
