//! The frame engine: owns the particle set, transition state and input
//! slots, and folds them into one [`FrameUniforms`] per frame.
//!
//! The engine is renderer-agnostic and fully deterministic given its inputs,
//! which is what the integration tests drive. The windowed viewer feeds it a
//! clock and uploads whatever it reports as dirty.

use glam::{Vec3, Vec4};

use crate::config::EngineConfig;
use crate::formation::Formation;
use crate::input::{AudioInput, HandTracker};
use crate::particles::ParticleSet;
use crate::transition::{approach_vec3, TransitionController};
use crate::uniforms::FrameUniforms;

pub struct Engine {
    pub config: EngineConfig,
    pub hands: HandTracker,
    pub audio: AudioInput,
    particles: ParticleSet,
    transitions: TransitionController,
    /// A formation requested while a morph was in flight, applied at commit.
    pending_formation: Option<Formation>,
    /// Smoothed hand positions; release snaps to the absent sentinel.
    smoothed_hands: [Option<Vec3>; 2],
    /// Particle count or arena side changed; GPU buffers must be rebuilt.
    layout_dirty: bool,
    /// Instance records changed under an unchanged layout.
    instances_dirty: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, formation: Formation) -> Self {
        Self {
            hands: HandTracker::default(),
            audio: AudioInput::default(),
            particles: ParticleSet::new(formation),
            transitions: TransitionController::new(&config),
            config,
            pending_formation: None,
            smoothed_hands: [None, None],
            layout_dirty: false,
            instances_dirty: false,
        }
    }

    /// Morph toward a new formation. Count changes animate: growth spawns
    /// newcomers at the origin, shrink collapses extras and drops them when
    /// the morph commits.
    ///
    /// One morph is in flight at a time. A request arriving mid-morph is
    /// deferred until the current one commits; the latest request wins.
    pub fn set_formation(&mut self, formation: Formation) {
        if self.transitions.shape_in_flight() {
            self.pending_formation = Some(formation);
            return;
        }
        self.start_formation(formation);
    }

    fn start_formation(&mut self, formation: Formation) {
        log::info!("formation change: {} particles", formation.len());
        let changed = self.particles.retarget(formation);
        self.layout_dirty |= changed;
        self.instances_dirty = true;
        self.transitions.begin_shape();
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn transitions(&self) -> &TransitionController {
        &self.transitions
    }

    /// Consume the rebuild flag.
    pub fn take_layout_dirty(&mut self) -> bool {
        std::mem::take(&mut self.layout_dirty)
    }

    /// Consume the re-upload flag.
    pub fn take_instances_dirty(&mut self) -> bool {
        std::mem::take(&mut self.instances_dirty)
    }

    /// Advance one frame and assemble the uniform block. `view_proj` is left
    /// for the renderer, which knows the surface aspect.
    pub fn update(&mut self, time: f32, dt: f32) -> FrameUniforms {
        if self.transitions.update(&self.config, dt) {
            let changed = self.particles.commit();
            self.layout_dirty |= changed;
            self.instances_dirty = true;
            if let Some(formation) = self.pending_formation.take() {
                self.start_formation(formation);
            }
        }

        let hands = self.smoothed_hand_slots(dt);
        let audio = self.audio.bands();
        let params = *self.transitions.params();
        let physics = &self.config.physics;
        let (color_prev, color_cur, color_progress) = self.transitions.color_modes();

        FrameUniforms {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            hand_left: hands[0].to_array(),
            hand_right: hands[1].to_array(),
            audio: audio.to_array(),
            color_a: params.color_a.extend(1.0).to_array(),
            color_b: params.color_b.extend(1.0).to_array(),
            rotation: self
                .config
                .rotation_axes()
                .extend(params.rotation_speed)
                .to_array(),

            time,
            delta_time: dt,
            shape_progress: self.transitions.shape_progress(),
            color_progress,

            effect_id: self.transitions.active_effect().index(),
            effect_intensity: self.transitions.effect_intensity(),
            float_amplitude: params.float_amplitude,
            turbulence: params.turbulence,

            lighting_mode: self.transitions.lighting_mode().index(),
            lighting_speed: params.lighting_speed,
            lighting_intensity: self.transitions.lighting_intensity(),
            lighting_radius: params.lighting_radius,

            color_mode_prev: color_prev.index(),
            color_mode_cur: color_cur.index(),
            particle_size: params.particle_size,
            opacity: params.opacity,

            spring_k: physics.spring_k,
            damping: physics.damping,
            max_displacement: physics.max_displacement,
            integration_gain: physics.integration_gain,

            hand_radius: params.hand_radius,
            repulsion: params.repulsion,
            attraction: params.attraction,
            push_gain: params.push_gain,

            audio_gain: physics.audio_gain,
            glow_gain: params.glow_gain,
            speed: params.speed,
            gesture_forces: physics.gesture_forces as u32,

            grid_side: self.particles.grid_side(),
            particle_count: self.particles.len() as u32,
            _pad0: 0,
            _pad1: 0,
        }
    }

    /// Encoded hand slots with the position component smoothed toward the
    /// producer's latest sample. A hand appearing snaps to its first sample;
    /// release (or disabling) snaps to the absent sentinel so no stale force
    /// lingers.
    fn smoothed_hand_slots(&mut self, dt: f32) -> [Vec4; 2] {
        let targets = if self.config.hands_enabled {
            self.hands.encoded()
        } else {
            [Vec4::ZERO, Vec4::ZERO]
        };
        let rate = self.config.smoothing_rate;
        let mut slots = [Vec4::ZERO, Vec4::ZERO];
        for (i, target) in targets.iter().enumerate() {
            if *target == Vec4::ZERO {
                self.smoothed_hands[i] = None;
                continue;
            }
            let goal = target.truncate();
            let pos = match self.smoothed_hands[i] {
                Some(prev) => approach_vec3(prev, goal, rate, dt),
                None => goal,
            };
            self.smoothed_hands[i] = Some(pos);
            slots[i] = pos.extend(target.w);
        }
        slots
    }
}
