//! Windowed viewer: builder API, winit application handler, frame loop.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::VisualizerError;
use crate::formation::Formation;
use crate::gpu::GpuState;

/// Per-frame context handed to the update callback. Drive the engine from
/// here: feed hand/audio slots, edit the config, request formations.
pub struct UpdateContext<'a> {
    pub engine: &'a mut Engine,
    time: f32,
    delta_time: f32,
    fps: f32,
}

impl UpdateContext<'_> {
    /// Elapsed time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Clamped time since the last frame, in seconds.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Most recent FPS estimate.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

type UpdateFn = Box<dyn FnMut(&mut UpdateContext)>;

/// Builder for the windowed visualizer.
///
/// ```no_run
/// use glowfield::prelude::*;
///
/// Visualizer::new()
///     .with_formation(Formation::sphere(20_000, 30.0))
///     .with_update(|ctx| {
///         let t = ctx.time();
///         ctx.engine.hands.set_right(
///             Some(glam::Vec3::new(t.cos() * 25.0, 0.0, t.sin() * 25.0)),
///             Gesture::Open,
///         );
///     })
///     .run()
///     .unwrap();
/// ```
pub struct Visualizer {
    config: EngineConfig,
    formation: Option<Formation>,
    title: String,
    update: Option<UpdateFn>,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            formation: None,
            title: "glowfield".to_string(),
            update: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial formation. Defaults to a sphere of `config.particle_count`.
    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = Some(formation);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Callback invoked once per frame before the engine update.
    pub fn with_update(mut self, f: impl FnMut(&mut UpdateContext) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Open the window and run until closed.
    pub fn run(self) -> Result<(), VisualizerError> {
        let formation = match self.formation {
            Some(f) => f,
            None => Formation::sphere(self.config.particle_count, 30.0),
        };
        formation
            .validate()
            .map_err(VisualizerError::InvalidFormation)?;
        let engine = Engine::new(self.config, formation);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let mut app = App::new(engine, self.title, self.update);
        event_loop.run_app(&mut app)?;
        app.result
    }
}

struct App {
    title: String,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    engine: Engine,
    clock: FrameClock,
    update: Option<UpdateFn>,
    /// Whether the GPU resources were built with the simulation requested.
    sim_requested: bool,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    result: Result<(), VisualizerError>,
}

impl App {
    fn new(engine: Engine, title: String, update: Option<UpdateFn>) -> Self {
        let sim_requested = engine.config.physics_enabled;
        Self {
            title,
            window: None,
            gpu: None,
            engine,
            clock: FrameClock::new(),
            update,
            sim_requested,
            mouse_pressed: false,
            last_mouse_pos: None,
            result: Ok(()),
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (time, delta) = self.clock.tick();

        if let Some(update) = &mut self.update {
            let mut ctx = UpdateContext {
                engine: &mut self.engine,
                time,
                delta_time: delta,
                fps: self.clock.fps(),
            };
            update(&mut ctx);
        }

        let mut uniforms = self.engine.update(time, delta);

        let Some(gpu) = &mut self.gpu else { return };

        let physics = self.engine.config.physics_enabled;
        if self.engine.take_layout_dirty() || physics != self.sim_requested {
            gpu.rebuild_particles(self.engine.particles(), physics);
            self.sim_requested = physics;
            self.engine.take_instances_dirty();
        } else if self.engine.take_instances_dirty() {
            gpu.update_particles(self.engine.particles());
        }

        uniforms.set_view_proj(gpu.view_proj());
        match gpu.render(&uniforms) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (gpu.config.width, gpu.config.height);
                gpu.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("dropped frame: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.result = Err(VisualizerError::Window(e));
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(
            window.clone(),
            self.engine.particles(),
            self.engine.config.physics_enabled,
        )) {
            Ok(gpu) => {
                self.sim_requested = self.engine.config.physics_enabled;
                if self.engine.config.physics_enabled && !gpu.sim_active() {
                    log::warn!("hand physics running in fallback mode");
                }
                self.gpu = Some(gpu);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                self.result = Err(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;
                        if let Some(gpu) = &mut self.gpu {
                            gpu.camera.yaw -= dx as f32 * 0.005;
                            gpu.camera.pitch =
                                (gpu.camera.pitch + dy as f32 * 0.005).clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu) = &mut self.gpu {
                    gpu.camera.distance = (gpu.camera.distance - scroll * 4.0).clamp(10.0, 400.0);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
