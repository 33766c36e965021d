//! The per-frame uniform block shared by the compute and render pipelines.
//!
//! One buffer, written once per frame, bound in every pass. The Rust struct
//! and [`UNIFORMS_WGSL`] must stay field-for-field identical; the layout test
//! below pins the total size so a drifting edit fails fast.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// CPU-side mirror of the WGSL `Uniforms` struct.
///
/// Field order groups vec4s first, then scalars in 16-byte rows, so the
/// std140-ish uniform rules introduce no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz hand position, w gesture id; all zero when untracked.
    pub hand_left: [f32; 4],
    pub hand_right: [f32; 4],
    /// Band energies: bass, mid, treble, overall.
    pub audio: [f32; 4],
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    /// xyz axis toggles for the rotate effect, w angular speed.
    pub rotation: [f32; 4],

    pub time: f32,
    pub delta_time: f32,
    pub shape_progress: f32,
    pub color_progress: f32,

    pub effect_id: u32,
    pub effect_intensity: f32,
    pub float_amplitude: f32,
    pub turbulence: f32,

    pub lighting_mode: u32,
    pub lighting_speed: f32,
    pub lighting_intensity: f32,
    pub lighting_radius: f32,

    pub color_mode_prev: u32,
    pub color_mode_cur: u32,
    pub particle_size: f32,
    pub opacity: f32,

    pub spring_k: f32,
    pub damping: f32,
    pub max_displacement: f32,
    pub integration_gain: f32,

    pub hand_radius: f32,
    pub repulsion: f32,
    pub attraction: f32,
    pub push_gain: f32,

    pub audio_gain: f32,
    pub glow_gain: f32,
    pub speed: f32,
    pub gesture_forces: u32,

    pub grid_side: u32,
    pub particle_count: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

impl FrameUniforms {
    pub fn set_view_proj(&mut self, view_proj: Mat4) {
        self.view_proj = view_proj.to_cols_array_2d();
    }
}

/// WGSL declaration of the uniform block, spliced into every shader.
pub const UNIFORMS_WGSL: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    hand_left: vec4<f32>,
    hand_right: vec4<f32>,
    audio: vec4<f32>,
    color_a: vec4<f32>,
    color_b: vec4<f32>,
    rotation: vec4<f32>,
    time: f32,
    delta_time: f32,
    shape_progress: f32,
    color_progress: f32,
    effect_id: u32,
    effect_intensity: f32,
    float_amplitude: f32,
    turbulence: f32,
    lighting_mode: u32,
    lighting_speed: f32,
    lighting_intensity: f32,
    lighting_radius: f32,
    color_mode_prev: u32,
    color_mode_cur: u32,
    particle_size: f32,
    opacity: f32,
    spring_k: f32,
    damping: f32,
    max_displacement: f32,
    integration_gain: f32,
    hand_radius: f32,
    repulsion: f32,
    attraction: f32,
    push_gain: f32,
    audio_gain: f32,
    glow_gain: f32,
    speed: f32,
    gesture_forces: u32,
    grid_side: u32,
    particle_count: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn layout_matches_the_wgsl_struct() {
        // One mat4x4, six vec4s, eight 16-byte scalar rows.
        assert_eq!(mem::size_of::<FrameUniforms>(), 64 + 6 * 16 + 8 * 16);
        assert_eq!(mem::size_of::<FrameUniforms>() % 16, 0);
    }

    #[test]
    fn wgsl_names_every_rust_field() {
        for name in [
            "view_proj",
            "hand_left",
            "hand_right",
            "audio",
            "color_a",
            "color_b",
            "rotation",
            "time",
            "delta_time",
            "shape_progress",
            "color_progress",
            "effect_id",
            "effect_intensity",
            "float_amplitude",
            "turbulence",
            "lighting_mode",
            "lighting_speed",
            "lighting_intensity",
            "lighting_radius",
            "color_mode_prev",
            "color_mode_cur",
            "particle_size",
            "opacity",
            "spring_k",
            "damping",
            "max_displacement",
            "integration_gain",
            "hand_radius",
            "repulsion",
            "attraction",
            "push_gain",
            "audio_gain",
            "glow_gain",
            "speed",
            "gesture_forces",
            "grid_side",
            "particle_count",
        ] {
            assert!(
                UNIFORMS_WGSL.contains(&format!("{name}:")),
                "missing {name}"
            );
        }
    }

    #[test]
    fn view_proj_round_trips() {
        let mut u = FrameUniforms::default();
        let m = Mat4::perspective_rh(1.0, 1.6, 0.1, 100.0);
        u.set_view_proj(m);
        assert_eq!(Mat4::from_cols_array_2d(&u.view_proj), m);
    }
}
