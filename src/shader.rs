//! WGSL generation for the compute and render pipelines.
//!
//! Shaders are assembled from the shared uniform block, the utility snippets,
//! and the per-variant dispatches generated by [`crate::effects`] and
//! [`crate::visuals`]. Physics constants are spliced from [`crate::physics`]
//! so the GPU integrates with exactly the numbers the CPU model tests.

use crate::effects;
use crate::physics;
use crate::shader_utils::{COMMON_WGSL, HSV_WGSL, NOISE_WGSL};
use crate::uniforms::UNIFORMS_WGSL;
use crate::visuals;

/// Square workgroup edge for both compute passes.
pub const WORKGROUP_SIZE: u32 = 8;

fn physics_consts_wgsl() -> String {
    format!(
        r#"
const ATTRACTION_STIFFNESS: f32 = {:?};
const NOISE_SCALE: f32 = {:?};
const DIRECTION_JITTER: f32 = {:?};
const UPWARD_BIAS: f32 = {:?};
const BASS_THRESHOLD: f32 = {:?};
const BURST_GAIN: f32 = {:?};
const MAX_STEP_DT: f32 = {:?};
"#,
        physics::ATTRACTION_STIFFNESS,
        physics::NOISE_SCALE,
        physics::DIRECTION_JITTER,
        physics::UPWARD_BIAS,
        physics::BASS_THRESHOLD,
        physics::BURST_GAIN,
        physics::MAX_STEP_DT,
    )
}

/// Shared force functions, mirroring `hand_force` and `audio_force` in
/// [`crate::physics`].
fn forces_wgsl() -> String {
    r#"
fn push_direction(world: vec3<f32>, hand_pos: vec3<f32>) -> vec3<f32> {
    let dir = safe_normalize(world - hand_pos, vec3<f32>(0.0, 1.0, 0.0));
    let t = u.time * 0.1;
    let q = world * NOISE_SCALE;
    let jitter = vec3<f32>(
        noise3(q + vec3<f32>(0.0, 0.0, t)),
        noise3(q + vec3<f32>(31.7, 0.0, t)),
        noise3(q + vec3<f32>(0.0, 57.3, t)));
    return safe_normalize(dir + jitter * DIRECTION_JITTER, dir);
}

fn hand_falloff(dist: f32) -> f32 {
    let t = 1.0 - dist / u.hand_radius;
    return t * t * t;
}

fn hand_force(world: vec3<f32>, hand: vec4<f32>) -> vec3<f32> {
    let hand_pos = hand.xyz;
    if dot(hand_pos, hand_pos) < 1e-6 {
        return vec3<f32>(0.0);
    }
    let dist = distance(world, hand_pos);
    if dist >= u.hand_radius {
        return vec3<f32>(0.0);
    }
    let falloff = hand_falloff(dist);
    let dir = push_direction(world, hand_pos);
    let strength = falloff * u.repulsion * u.push_gain;
    var force = dir * strength + vec3<f32>(0.0, 1.0, 0.0) * (UPWARD_BIAS * falloff);
    if u.gesture_forces != 0u {
        switch u32(hand.w) {
            case 1u: {}
            case 2u: {
                force = -force;
            }
            case 3u: {
                let tangent = safe_normalize(
                    cross(vec3<f32>(0.0, 1.0, 0.0), world - hand_pos), dir);
                force = tangent * strength;
            }
            case 5u: {
                force = force * BURST_GAIN;
            }
            default: {
                force = vec3<f32>(0.0);
            }
        }
    }
    return force;
}

fn audio_force(disp: vec3<f32>) -> vec3<f32> {
    if u.audio.x <= BASS_THRESHOLD {
        return vec3<f32>(0.0);
    }
    return safe_normalize(disp, vec3<f32>(0.0, 1.0, 0.0)) * u.audio.x * u.audio_gain;
}
"#
    .to_string()
}

/// The simulation module: velocity and position passes over the ping-pong
/// arenas. The position pass reads the velocity written this frame.
pub fn sim_wgsl() -> String {
    format!(
        r#"{uniforms}
{common}
{noise}
{consts}
@group(1) @binding(0) var<storage, read> originals: array<vec4<f32>>;
@group(1) @binding(1) var<storage, read> vel_in: array<vec4<f32>>;
@group(1) @binding(2) var<storage, read> disp_in: array<vec4<f32>>;
@group(1) @binding(3) var<storage, read_write> vel_out: array<vec4<f32>>;
@group(1) @binding(4) var<storage, read_write> disp_out: array<vec4<f32>>;
{forces}
@compute @workgroup_size({wg}, {wg})
fn velocity_main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let side = u.grid_side;
    if gid.x >= side || gid.y >= side {{
        return;
    }}
    let i = gid.y * side + gid.x;
    if i >= u.particle_count {{
        vel_out[i] = vec4<f32>(0.0);
        return;
    }}
    let disp = disp_in[i].xyz;
    let world = originals[i].xyz + disp;
    let k = u.spring_k + u.attraction * ATTRACTION_STIFFNESS;
    var force = -disp * k;
    force += hand_force(world, u.hand_left);
    force += hand_force(world, u.hand_right);
    force += audio_force(disp);
    let dt = min(u.delta_time, MAX_STEP_DT);
    let v = (vel_in[i].xyz + force * dt) * u.damping;
    vel_out[i] = vec4<f32>(v, 0.0);
}}

@compute @workgroup_size({wg}, {wg})
fn position_main(@builtin(global_invocation_id) gid: vec3<u32>) {{
    let side = u.grid_side;
    if gid.x >= side || gid.y >= side {{
        return;
    }}
    let i = gid.y * side + gid.x;
    if i >= u.particle_count {{
        disp_out[i] = vec4<f32>(0.0);
        return;
    }}
    let dt = min(u.delta_time, MAX_STEP_DT);
    var disp = disp_in[i].xyz + vel_out[i].xyz * dt * u.integration_gain;
    let len = length(disp);
    if len > u.max_displacement {{
        disp = disp * (u.max_displacement / len);
    }}
    disp_out[i] = vec4<f32>(disp, 0.0);
}}
"#,
        uniforms = UNIFORMS_WGSL,
        common = COMMON_WGSL,
        noise = NOISE_WGSL,
        consts = physics_consts_wgsl(),
        forces = forces_wgsl(),
        wg = WORKGROUP_SIZE,
    )
}

/// The render module: instanced billboard quads with shape morphing,
/// turbulence, effects, lighting and color modes.
///
/// With `gpu_physics` the vertex stage reads the displacement arena written
/// by the simulation; without it, the instantaneous hand model is evaluated
/// inline so hand interaction degrades instead of disappearing.
pub fn render_wgsl(gpu_physics: bool) -> String {
    let displacement_decl = if gpu_physics {
        "@group(1) @binding(0) var<storage, read> displacement: array<vec4<f32>>;"
    } else {
        ""
    };
    let displacement_expr = if gpu_physics {
        r#"let cell = vec2<u32>(in.grid_coord * f32(u.grid_side));
    let disp = displacement[cell.y * u.grid_side + cell.x].xyz;"#
    } else {
        r#"let disp = instant_hand_offset(pos, u.hand_left)
        + instant_hand_offset(pos, u.hand_right);"#
    };
    let fallback_fn = if gpu_physics {
        String::new()
    } else {
        // Positional mirror of the force model, same falloff and jitter.
        r#"
fn instant_hand_offset(world: vec3<f32>, hand: vec4<f32>) -> vec3<f32> {
    let hand_pos = hand.xyz;
    if dot(hand_pos, hand_pos) < 1e-6 {
        return vec3<f32>(0.0);
    }
    let dist = distance(world, hand_pos);
    if dist >= u.hand_radius {
        return vec3<f32>(0.0);
    }
    let falloff = hand_falloff(dist);
    let dir = push_direction(world, hand_pos);
    let offset = dir * (falloff * u.repulsion * u.push_gain * 0.25);
    let len = length(offset);
    if len > u.max_displacement {
        return offset * (u.max_displacement / len);
    }
    return offset;
}
"#
        .to_string()
    };

    format!(
        r#"{uniforms}
{common}
{noise}
{hsv}
{consts}
{forces}
{fallback_fn}
{displacement_decl}
{effect_dispatch}
{lighting_dispatch}
{color_dispatch}
struct VsIn {{
    @location(0) original_position: vec3<f32>,
    @location(1) seed: f32,
    @location(2) target_position: vec3<f32>,
    @location(3) grid_coord: vec2<f32>,
    @location(4) original_color: vec3<f32>,
    @location(5) target_color: vec3<f32>,
}};

struct VsOut {{
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) depth01: f32,
    @location(3) glow: f32,
}};

@vertex
fn vs_main(in: VsIn, @builtin(vertex_index) vi: u32) -> VsOut {{
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, -1.0), vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0));
    let corner = corners[vi];

    let sp = u.shape_progress * u.shape_progress * (3.0 - 2.0 * u.shape_progress);
    let base = mix(in.original_position, in.target_position, sp);

    let drift = u.time * 0.12;
    let wob = vec3<f32>(
        noise3(base * 0.05 + vec3<f32>(0.0, 0.0, drift)),
        noise3(base * 0.05 + vec3<f32>(13.1, 7.7, drift)),
        noise3(base * 0.05 + vec3<f32>(5.3, 19.2, drift)));
    var pos = base + wob * u.turbulence;

    pos = apply_effect(pos, base, in.seed);

    {displacement_expr}
    pos += disp;

    let glow = lighting_glow(pos);

    var clip = u.view_proj * vec4<f32>(pos, 1.0);
    let w = max(clip.w, 1e-3);
    let size = u.particle_size * (1.0 + glow * 0.5 + u.audio.x * 0.4 + u.audio.z * 0.2);
    let ndc = clamp(size / w, 0.0015, 0.25);
    clip.x += corner.x * ndc * clip.w;
    clip.y += corner.y * ndc * clip.w;

    var out: VsOut;
    out.position = clip;
    out.color = mix(in.original_color, in.target_color, sp);
    out.uv = corner;
    out.depth01 = clamp(clip.z / w, 0.0, 1.0);
    out.glow = glow;
    return out;
}}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {{
    let r = length(in.uv);
    let mask = smoothstep(1.0, 0.55, r);
    let core = exp(-4.0 * r);
    let glow = in.glow + core * 0.6 + u.audio.w * 0.3;
    let alpha = clamp(mask * u.opacity * (1.0 + glow * u.glow_gain), 0.0, 1.0);
    if alpha < 0.01 {{
        discard;
    }}
    let prev = mode_color(u.color_mode_prev, in.color, in.depth01);
    let cur = mode_color(u.color_mode_cur, in.color, in.depth01);
    var color = mix(prev, cur, u.color_progress);
    color = color * (1.0 + glow * u.glow_gain);
    return vec4<f32>(color, alpha);
}}
"#,
        uniforms = UNIFORMS_WGSL,
        common = COMMON_WGSL,
        noise = NOISE_WGSL,
        hsv = HSV_WGSL,
        consts = physics_consts_wgsl(),
        forces = forces_wgsl(),
        fallback_fn = fallback_fn,
        displacement_decl = displacement_decl,
        displacement_expr = displacement_expr,
        effect_dispatch = effects::dispatch_wgsl(),
        lighting_dispatch = visuals::lighting_dispatch_wgsl(),
        color_dispatch = visuals::color_dispatch_wgsl(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_module_declares_both_passes() {
        let wgsl = sim_wgsl();
        assert!(wgsl.contains("fn velocity_main"));
        assert!(wgsl.contains("fn position_main"));
        assert!(wgsl.contains("var<storage, read_write> vel_out"));
        assert!(wgsl.contains("var<storage, read_write> disp_out"));
    }

    #[test]
    fn physics_constants_are_spliced_as_floats() {
        let wgsl = sim_wgsl();
        assert!(wgsl.contains("const ATTRACTION_STIFFNESS: f32 = 2.0;"));
        assert!(wgsl.contains("const MAX_STEP_DT: f32 = 0.05;"));
    }

    #[test]
    fn render_variants_differ_only_in_displacement_source() {
        let gpu = render_wgsl(true);
        let fallback = render_wgsl(false);
        assert!(gpu.contains("var<storage, read> displacement"));
        assert!(!fallback.contains("var<storage, read> displacement"));
        assert!(fallback.contains("fn instant_hand_offset"));
        assert!(!gpu.contains("fn instant_hand_offset"));
        for wgsl in [&gpu, &fallback] {
            assert!(wgsl.contains("fn vs_main"));
            assert!(wgsl.contains("fn fs_main"));
            assert!(wgsl.contains("fn apply_effect"));
            assert!(wgsl.contains("fn lighting_glow"));
            assert!(wgsl.contains("fn mode_color"));
        }
    }

    #[test]
    fn effect_runs_before_physics_displacement() {
        for wgsl in [render_wgsl(true), render_wgsl(false)] {
            let effect = wgsl.find("pos = apply_effect(pos").unwrap();
            let displace = wgsl.find("pos += disp").unwrap();
            assert!(effect < displace, "displacement applied before the effect");
        }
    }

    #[test]
    fn fragment_alpha_carries_the_glow_term() {
        let wgsl = render_wgsl(true);
        assert!(wgsl.contains("exp(-4.0 * r)"));
        assert!(wgsl.contains("mask * u.opacity * (1.0 + glow * u.glow_gain)"));
    }
}
