//! Runtime configuration.
//!
//! One explicit, passed-in state struct; every field is hot-swappable. The
//! transition controller diffs this against its applied snapshot each frame
//! and stages the appropriate crossfade (effect, color mode, lighting) or
//! exponential approach (continuous parameters), so edits never pop.

use glam::Vec3;

use crate::effects::Effect;
use crate::physics::PhysicsParams;
use crate::visuals::{ColorMode, LightingMode};

/// All user-tunable parameters.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Particle count used when no explicit formation is supplied.
    pub particle_count: usize,
    /// Base point size, world units.
    pub particle_size: f32,
    /// Global opacity in [0, 1].
    pub opacity: f32,
    /// Global animation speed multiplier.
    pub speed: f32,
    /// Amplitude of the ambient noise turbulence, world units.
    pub turbulence: f32,
    /// Shape/color transition rate: progress per second.
    pub transition_speed: f32,

    pub effect: Effect,
    /// Effect intensity in [0, 1].
    pub effect_intensity: f32,
    /// Per-axis toggles for the rotate effect.
    pub rotate_x: bool,
    pub rotate_y: bool,
    pub rotate_z: bool,
    /// Angular speed for the rotate effect, radians per second.
    pub rotation_speed: f32,
    /// Bob amplitude for the float effect, world units.
    pub float_amplitude: f32,

    pub color_mode: ColorMode,
    pub color_a: Vec3,
    pub color_b: Vec3,
    /// Color-mode crossfade rate: progress per second.
    pub color_transition_speed: f32,

    pub lighting: LightingMode,
    pub lighting_speed: f32,
    pub lighting_intensity: f32,
    pub lighting_radius: f32,

    /// Master switch for hand interaction.
    pub hands_enabled: bool,
    /// Run the GPU ping-pong simulation; when off (or unavailable) the render
    /// shader applies the instantaneous hand model instead.
    pub physics_enabled: bool,
    pub physics: PhysicsParams,

    /// Gain on the audio-reactive fragment glow.
    pub glow_gain: f32,
    /// Rate for exponential parameter smoothing, per second.
    pub smoothing_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            particle_size: 1.2,
            opacity: 0.9,
            speed: 1.0,
            turbulence: 0.3,
            transition_speed: 0.6,

            effect: Effect::None,
            effect_intensity: 0.5,
            rotate_x: false,
            rotate_y: true,
            rotate_z: false,
            rotation_speed: 1.0,
            float_amplitude: 2.0,

            color_mode: ColorMode::Original,
            color_a: Vec3::new(0.2, 0.5, 1.0),
            color_b: Vec3::new(1.0, 0.3, 0.6),
            color_transition_speed: 1.5,

            lighting: LightingMode::None,
            lighting_speed: 1.0,
            lighting_intensity: 0.8,
            lighting_radius: 60.0,

            hands_enabled: true,
            physics_enabled: true,
            physics: PhysicsParams::default(),

            glow_gain: 1.5,
            smoothing_rate: 8.0,
        }
    }
}

impl EngineConfig {
    /// Axis toggles packed for the uniform block.
    pub fn rotation_axes(&self) -> Vec3 {
        Vec3::new(
            self.rotate_x as u32 as f32,
            self.rotate_y as u32 as f32,
            self.rotate_z as u32 as f32,
        )
    }
}
