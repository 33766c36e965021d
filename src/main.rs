use glam::Vec3;
use std::process::ExitCode;

use glowfield::prelude::*;

/// Demo: a sphere that morphs to a cube and back, with a scripted hand
/// orbiting through the field and a synthetic beat on the bass band.
fn main() -> ExitCode {
    env_logger::init();

    let mut shape_phase = 0u32;
    let result = Visualizer::new()
        .with_title("glowfield")
        .with_formation(Formation::sphere(20_000, 30.0))
        .with_update(move |ctx| {
            let t = ctx.time();

            // Hand sweeping an orbit slightly inside the shell.
            ctx.engine.hands.set_right(
                Some(Vec3::new(
                    (t * 0.6).cos() * 24.0,
                    (t * 0.9).sin() * 10.0,
                    (t * 0.6).sin() * 24.0,
                )),
                Gesture::Open,
            );

            // Synthetic 110 BPM kick on the bass band.
            let beat = (t * std::f32::consts::TAU * 110.0 / 60.0).sin();
            ctx.engine.audio.set(AudioBands {
                bass: beat.max(0.0).powi(4),
                mid: 0.2,
                treble: 0.1,
                energy: 0.3 + beat.abs() * 0.2,
            });

            // Rotate through the effect list; the controller crossfades each
            // switch through the neutral effect.
            let effects = [
                Effect::None,
                Effect::Wave,
                Effect::Vortex,
                Effect::Float,
                Effect::Spiral,
                Effect::Pulse,
            ];
            ctx.engine.config.effect = effects[(t / 8.0) as usize % effects.len()];

            // Shape swap every 20 seconds.
            let phase = (t / 20.0) as u32;
            if phase != shape_phase {
                shape_phase = phase;
                let next = if phase % 2 == 1 {
                    Formation::cube(20_000, 22.0)
                } else {
                    Formation::sphere(20_000, 30.0)
                };
                ctx.engine.set_formation(next);
            }
        })
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
