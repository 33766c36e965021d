//! # glowfield
//!
//! A GPU particle field renderer: tens of thousands of glowing billboard
//! particles hold a target formation, spring back through a ping-pong physics
//! simulation when hands push through them, pulse with audio, and crossfade
//! between shapes, deformation effects, color modes and lighting overlays
//! without popping.
//!
//! The simulation runs as two compute passes over double-buffered
//! velocity/displacement arenas; all WGSL is generated from closed Rust enums
//! so every GPU branch has a testable CPU twin. When the device cannot host
//! the simulation, rendering degrades to an instantaneous per-vertex hand
//! interaction instead of failing.
//!
//! ```no_run
//! use glowfield::prelude::*;
//!
//! Visualizer::new()
//!     .with_formation(Formation::sphere(20_000, 30.0))
//!     .run()
//!     .unwrap();
//! ```

pub mod clock;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod formation;
pub mod gpu;
pub mod input;
pub mod noise;
pub mod particles;
pub mod physics;
pub mod shader;
pub mod shader_utils;
pub mod transition;
pub mod uniforms;
pub mod viewer;
pub mod visuals;

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::effects::Effect;
    pub use crate::engine::Engine;
    pub use crate::error::{GpuError, VisualizerError};
    pub use crate::formation::Formation;
    pub use crate::input::{AudioBands, Gesture};
    pub use crate::physics::PhysicsParams;
    pub use crate::viewer::{UpdateContext, Visualizer};
    pub use crate::visuals::{ColorMode, LightingMode};
}

pub use config::EngineConfig;
pub use error::{GpuError, VisualizerError};
pub use formation::Formation;
pub use viewer::Visualizer;
