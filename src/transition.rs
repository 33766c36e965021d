//! Transition machinery: everything that keeps parameter edits from popping.
//!
//! Three kinds of change are staged here. Shape changes morph by a progress
//! value the shader lerps with. Discrete mode switches (effect, color mode,
//! lighting) run small per-concern state machines that crossfade through a
//! neutral point. Continuous parameters approach their targets exponentially.
//! The machines are independent; a color-mode switch mid shape-morph is fine.

use glam::Vec3;

use crate::config::EngineConfig;
use crate::effects::Effect;
use crate::visuals::{ColorMode, LightingMode};

/// Hold time at the neutral effect between fade-out and fade-in, seconds.
pub const EFFECT_DWELL: f32 = 0.25;

/// Exponential step toward `target`. The factor is clamped so a long frame
/// hitch lands exactly on the target instead of overshooting.
pub fn approach(value: f32, target: f32, rate: f32, dt: f32) -> f32 {
    value + (target - value) * (rate * dt).min(1.0)
}

pub fn approach_vec3(value: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    value + (target - value) * (rate * dt).min(1.0)
}

/// Shape morph progress. One morph in flight at a time; the engine defers
/// further requests until the active morph commits.
#[derive(Clone, Copy, Debug)]
struct ShapeTransition {
    progress: f32,
    active: bool,
}

impl ShapeTransition {
    fn new() -> Self {
        Self {
            progress: 1.0,
            active: false,
        }
    }

    fn begin(&mut self) {
        self.progress = 0.0;
        self.active = true;
    }

    /// Advance and report whether the morph just completed this frame.
    fn advance(&mut self, dt: f32, speed: f32) -> bool {
        if !self.active {
            return false;
        }
        self.progress = (self.progress + dt * speed).min(1.0);
        if self.progress >= 1.0 {
            self.active = false;
            return true;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum EffectPhase {
    Steady,
    FadeOut,
    Dwell { elapsed: f32 },
    FadeIn,
}

/// Effect switches fade the running effect to zero intensity, hold the
/// neutral effect briefly, then fade the new one in. Requests arriving mid
/// transition are deferred; the latest request wins.
#[derive(Clone, Copy, Debug)]
struct EffectTransition {
    current: Effect,
    pending: Option<Effect>,
    phase: EffectPhase,
    /// Intensity scale in [0, 1] applied on top of the configured intensity.
    blend: f32,
}

impl EffectTransition {
    fn new(initial: Effect) -> Self {
        Self {
            current: initial,
            pending: None,
            phase: EffectPhase::Steady,
            blend: 1.0,
        }
    }

    fn request(&mut self, effect: Effect) {
        let landing = self.pending.unwrap_or(self.current);
        if effect == landing {
            return;
        }
        self.pending = Some(effect);
        if matches!(self.phase, EffectPhase::Steady | EffectPhase::FadeIn) {
            self.phase = EffectPhase::FadeOut;
        }
    }

    fn advance(&mut self, dt: f32, speed: f32) {
        match self.phase {
            EffectPhase::Steady => {}
            EffectPhase::FadeOut => {
                self.blend = (self.blend - dt * speed).max(0.0);
                if self.blend <= 0.0 {
                    self.current = Effect::None;
                    self.phase = EffectPhase::Dwell { elapsed: 0.0 };
                }
            }
            EffectPhase::Dwell { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= EFFECT_DWELL {
                    self.current = self.pending.take().unwrap_or(Effect::None);
                    self.phase = EffectPhase::FadeIn;
                } else {
                    self.phase = EffectPhase::Dwell { elapsed };
                }
            }
            EffectPhase::FadeIn => {
                self.blend = (self.blend + dt * speed).min(1.0);
                if self.blend >= 1.0 {
                    self.phase = EffectPhase::Steady;
                }
            }
        }
    }
}

/// Color-mode crossfade: previous and current mode with a blend progress the
/// fragment stage evaluates both sides of.
#[derive(Clone, Copy, Debug)]
struct ColorTransition {
    prev: ColorMode,
    cur: ColorMode,
    progress: f32,
}

impl ColorTransition {
    fn new(initial: ColorMode) -> Self {
        Self {
            prev: initial,
            cur: initial,
            progress: 1.0,
        }
    }

    fn request(&mut self, mode: ColorMode) {
        if mode == self.cur {
            return;
        }
        // A request mid-fade snaps the old blend; the new fade starts from
        // the current mode, which dominates visually by then.
        self.prev = self.cur;
        self.cur = mode;
        self.progress = 0.0;
    }

    fn advance(&mut self, dt: f32, speed: f32) {
        self.progress = (self.progress + dt * speed).min(1.0);
        if self.progress >= 1.0 {
            self.prev = self.cur;
        }
    }
}

/// Lighting edits ramp the overlay intensity from zero, so a new pattern (or
/// a re-parameterized one) fades in rather than appearing mid-sweep. Any
/// lighting parameter change restarts the ramp, not just a mode switch.
#[derive(Clone, Copy, Debug)]
struct LightingTransition {
    mode: LightingMode,
    speed: f32,
    intensity: f32,
    radius: f32,
    ramp: f32,
}

impl LightingTransition {
    fn new(config: &EngineConfig) -> Self {
        Self {
            mode: config.lighting,
            speed: config.lighting_speed,
            intensity: config.lighting_intensity,
            radius: config.lighting_radius,
            ramp: 1.0,
        }
    }

    fn request(&mut self, config: &EngineConfig) {
        let changed = config.lighting != self.mode
            || config.lighting_speed != self.speed
            || config.lighting_intensity != self.intensity
            || config.lighting_radius != self.radius;
        if changed {
            self.mode = config.lighting;
            self.speed = config.lighting_speed;
            self.intensity = config.lighting_intensity;
            self.radius = config.lighting_radius;
            self.ramp = 0.0;
        }
    }

    fn advance(&mut self, dt: f32, speed: f32) {
        self.ramp = (self.ramp + dt * speed).min(1.0);
    }
}

/// Smoothed copies of the continuous parameters. Initialized at their
/// targets so startup does not ramp from zero.
#[derive(Clone, Copy, Debug)]
pub struct SmoothedParams {
    pub particle_size: f32,
    pub opacity: f32,
    pub speed: f32,
    pub turbulence: f32,
    pub effect_intensity: f32,
    pub rotation_speed: f32,
    pub float_amplitude: f32,
    pub color_a: Vec3,
    pub color_b: Vec3,
    pub lighting_speed: f32,
    pub lighting_intensity: f32,
    pub lighting_radius: f32,
    pub glow_gain: f32,
    pub hand_radius: f32,
    pub repulsion: f32,
    pub attraction: f32,
    pub push_gain: f32,
}

impl SmoothedParams {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            particle_size: config.particle_size,
            opacity: config.opacity,
            speed: config.speed,
            turbulence: config.turbulence,
            effect_intensity: config.effect_intensity,
            rotation_speed: config.rotation_speed,
            float_amplitude: config.float_amplitude,
            color_a: config.color_a,
            color_b: config.color_b,
            lighting_speed: config.lighting_speed,
            lighting_intensity: config.lighting_intensity,
            lighting_radius: config.lighting_radius,
            glow_gain: config.glow_gain,
            hand_radius: config.physics.hand_radius,
            repulsion: config.physics.repulsion,
            attraction: config.physics.attraction,
            push_gain: config.physics.push_gain,
        }
    }

    fn advance(&mut self, config: &EngineConfig, dt: f32) {
        let r = config.smoothing_rate;
        self.particle_size = approach(self.particle_size, config.particle_size, r, dt);
        self.opacity = approach(self.opacity, config.opacity, r, dt);
        self.speed = approach(self.speed, config.speed, r, dt);
        self.turbulence = approach(self.turbulence, config.turbulence, r, dt);
        self.effect_intensity = approach(self.effect_intensity, config.effect_intensity, r, dt);
        self.rotation_speed = approach(self.rotation_speed, config.rotation_speed, r, dt);
        self.float_amplitude = approach(self.float_amplitude, config.float_amplitude, r, dt);
        self.color_a = approach_vec3(self.color_a, config.color_a, r, dt);
        self.color_b = approach_vec3(self.color_b, config.color_b, r, dt);
        self.lighting_speed = approach(self.lighting_speed, config.lighting_speed, r, dt);
        self.lighting_intensity =
            approach(self.lighting_intensity, config.lighting_intensity, r, dt);
        self.lighting_radius = approach(self.lighting_radius, config.lighting_radius, r, dt);
        self.glow_gain = approach(self.glow_gain, config.glow_gain, r, dt);
        let p = &config.physics;
        self.hand_radius = approach(self.hand_radius, p.hand_radius, r, dt);
        self.repulsion = approach(self.repulsion, p.repulsion, r, dt);
        self.attraction = approach(self.attraction, p.attraction, r, dt);
        self.push_gain = approach(self.push_gain, p.push_gain, r, dt);
    }
}

/// All transition state for one engine.
#[derive(Clone, Copy, Debug)]
pub struct TransitionController {
    shape: ShapeTransition,
    effect: EffectTransition,
    color: ColorTransition,
    lighting: LightingTransition,
    params: SmoothedParams,
}

impl TransitionController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            shape: ShapeTransition::new(),
            effect: EffectTransition::new(config.effect),
            color: ColorTransition::new(config.color_mode),
            lighting: LightingTransition::new(config),
            params: SmoothedParams::from_config(config),
        }
    }

    /// Start a shape morph toward freshly retargeted positions.
    pub fn begin_shape(&mut self) {
        self.shape.begin();
    }

    /// Advance every machine by one frame. Returns true when the shape morph
    /// completed this frame and the particle targets should be committed.
    pub fn update(&mut self, config: &EngineConfig, dt: f32) -> bool {
        self.effect.request(config.effect);
        self.color.request(config.color_mode);
        self.lighting.request(config);

        self.effect.advance(dt, config.transition_speed * 2.0);
        self.color.advance(dt, config.color_transition_speed);
        self.lighting.advance(dt, config.color_transition_speed);
        self.params.advance(config, dt);
        self.shape.advance(dt, config.transition_speed)
    }

    /// Progress of the in-flight shape morph, 1.0 when idle.
    pub fn shape_progress(&self) -> f32 {
        self.shape.progress
    }

    pub fn shape_in_flight(&self) -> bool {
        self.shape.active
    }

    /// The effect currently on screen. During a switch this passes through
    /// [`Effect::None`] while the old effect has faded out.
    pub fn active_effect(&self) -> Effect {
        self.effect.current
    }

    /// Effective intensity: the smoothed configured intensity scaled by the
    /// transition blend.
    pub fn effect_intensity(&self) -> f32 {
        self.params.effect_intensity * self.effect.blend
    }

    pub fn effect_in_transition(&self) -> bool {
        self.effect.phase != EffectPhase::Steady
    }

    pub fn color_modes(&self) -> (ColorMode, ColorMode, f32) {
        (self.color.prev, self.color.cur, self.color.progress)
    }

    pub fn lighting_mode(&self) -> LightingMode {
        self.lighting.mode
    }

    /// Lighting intensity scaled by the fade-in ramp.
    pub fn lighting_intensity(&self) -> f32 {
        self.params.lighting_intensity * self.lighting.ramp
    }

    pub fn params(&self) -> &SmoothedParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(controller: &mut TransitionController, config: &EngineConfig, frames: usize) -> bool {
        let mut committed = false;
        for _ in 0..frames {
            committed |= controller.update(config, 1.0 / 60.0);
        }
        committed
    }

    #[test]
    fn shape_morph_commits_exactly_once() {
        let config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        tc.begin_shape();
        assert!(tc.shape_in_flight());
        assert_eq!(tc.shape_progress(), 0.0);

        let mut commits = 0;
        let mut last = 0.0;
        for _ in 0..240 {
            if tc.update(&config, 1.0 / 60.0) {
                commits += 1;
            }
            assert!(tc.shape_progress() >= last, "progress went backwards");
            last = tc.shape_progress();
        }
        assert_eq!(commits, 1);
        assert_eq!(tc.shape_progress(), 1.0);
        assert!(!tc.shape_in_flight());
    }

    #[test]
    fn effect_switch_passes_through_neutral() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        config.effect = Effect::Wave;

        let mut saw_neutral_at_zero = false;
        for _ in 0..600 {
            tc.update(&config, 1.0 / 60.0);
            if tc.active_effect() == Effect::None && tc.effect_intensity() == 0.0 {
                saw_neutral_at_zero = true;
            }
            if !tc.effect_in_transition() {
                break;
            }
        }
        assert!(saw_neutral_at_zero, "never dwelled at the neutral effect");
        assert_eq!(tc.active_effect(), Effect::Wave);
        assert!(!tc.effect_in_transition());
        assert!(tc.effect_intensity() > 0.0);
    }

    #[test]
    fn latest_effect_request_wins() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        config.effect = Effect::Spiral;
        run(&mut tc, &config, 3);
        assert!(tc.effect_in_transition());
        config.effect = Effect::Vortex;
        run(&mut tc, &config, 600);
        assert_eq!(tc.active_effect(), Effect::Vortex);
        assert!(!tc.effect_in_transition());
    }

    #[test]
    fn rerequesting_current_effect_is_a_no_op() {
        let mut config = EngineConfig::default();
        config.effect = Effect::Pulse;
        let mut tc = TransitionController::new(&config);
        run(&mut tc, &config, 10);
        assert!(!tc.effect_in_transition());
        assert_eq!(tc.effect_intensity(), config.effect_intensity);
    }

    #[test]
    fn color_mode_crossfades_then_settles() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        config.color_mode = ColorMode::Rainbow;
        tc.update(&config, 1.0 / 60.0);
        let (prev, cur, progress) = tc.color_modes();
        assert_eq!(prev, ColorMode::Original);
        assert_eq!(cur, ColorMode::Rainbow);
        assert!(progress < 1.0);

        run(&mut tc, &config, 300);
        let (prev, cur, progress) = tc.color_modes();
        assert_eq!(prev, ColorMode::Rainbow);
        assert_eq!(cur, ColorMode::Rainbow);
        assert_eq!(progress, 1.0);
    }

    #[test]
    fn lighting_switch_ramps_from_dark() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        run(&mut tc, &config, 10);
        config.lighting = LightingMode::Expand;
        tc.update(&config, 1.0 / 60.0);
        assert_eq!(tc.lighting_mode(), LightingMode::Expand);
        assert!(tc.lighting_intensity() < config.lighting_intensity * 0.2);
        run(&mut tc, &config, 600);
        let settled = tc.lighting_intensity();
        assert!((settled - config.lighting_intensity).abs() < 1e-3);
    }

    #[test]
    fn continuous_params_approach_without_overshoot() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        config.particle_size = 5.0;
        let mut last = tc.params().particle_size;
        for _ in 0..300 {
            tc.update(&config, 1.0 / 60.0);
            let now = tc.params().particle_size;
            assert!(now >= last && now <= 5.0 + 1e-6);
            last = now;
        }
        assert!((last - 5.0).abs() < 1e-3);
    }

    #[test]
    fn hand_gains_smooth_instead_of_snapping() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        let start = config.physics.hand_radius;
        config.physics.hand_radius = 100.0;
        config.physics.push_gain = 300.0;
        tc.update(&config, 1.0 / 60.0);
        let p = tc.params();
        assert!(p.hand_radius > start && p.hand_radius < 100.0);
        assert!(p.push_gain < 300.0);
        run(&mut tc, &config, 600);
        assert!((tc.params().hand_radius - 100.0).abs() < 1e-2);
        assert!((tc.params().push_gain - 300.0).abs() < 1e-1);
    }

    #[test]
    fn lighting_parameter_edit_restarts_the_ramp() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        run(&mut tc, &config, 10);
        let settled = tc.lighting_intensity();
        assert!(settled > 0.0);

        // Same mode, different radius: the ramp still restarts.
        config.lighting_radius = 90.0;
        tc.update(&config, 1.0 / 60.0);
        assert!(tc.lighting_intensity() < settled * 0.2);
        assert_eq!(tc.lighting_mode(), config.lighting);
        run(&mut tc, &config, 600);
        assert!((tc.lighting_intensity() - config.lighting_intensity).abs() < 1e-3);
    }

    #[test]
    fn long_hitch_lands_on_target() {
        let mut config = EngineConfig::default();
        let mut tc = TransitionController::new(&config);
        config.opacity = 0.2;
        // One pathological frame; the clamped factor must not overshoot.
        tc.update(&config, 10.0);
        assert!((tc.params().opacity - 0.2).abs() < 1e-6);
    }
}
