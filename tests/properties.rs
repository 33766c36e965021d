//! End-to-end behavioral properties, driven through the public engine API
//! and the CPU twin of the simulation.

use glam::{Vec3, Vec4};
use glowfield::config::EngineConfig;
use glowfield::effects::Effect;
use glowfield::engine::Engine;
use glowfield::formation::Formation;
use glowfield::input::Gesture;
use glowfield::physics::{CpuSim, PhysicsParams, MAX_STEP_DT};

const DT: f32 = 1.0 / 60.0;

fn hand(pos: Vec3, gesture: Gesture) -> Vec4 {
    pos.extend(gesture.index() as f32)
}

#[test]
fn effect_switch_shows_at_most_one_effect() {
    let mut engine = Engine::new(EngineConfig::default(), Formation::sphere(100, 20.0));
    for f in 0..10 {
        engine.update(f as f32 * DT, DT);
    }
    engine.config.effect = Effect::Spiral;

    let mut prev_id = None;
    let mut prev_intensity = 0.0f32;
    for f in 10..800 {
        let u = engine.update(f as f32 * DT, DT);
        if let Some(prev) = prev_id {
            if prev != u.effect_id {
                // The active effect may only change while fully faded out.
                assert!(
                    prev_intensity < 1e-4 && u.effect_intensity < 1e-4,
                    "effect changed at visible intensity {prev_intensity}"
                );
            }
            // Intensity moves smoothly, never jumps.
            assert!(
                (u.effect_intensity - prev_intensity).abs() < 0.1,
                "intensity jumped from {prev_intensity} to {}",
                u.effect_intensity
            );
        }
        prev_id = Some(u.effect_id);
        prev_intensity = u.effect_intensity;
    }
    assert_eq!(prev_id, Some(Effect::Spiral.index()));
    assert!(prev_intensity > 0.0);
}

#[test]
fn field_recovers_after_hand_release() {
    let p = PhysicsParams::default();
    let originals: Vec<Vec3> = (0..50)
        .map(|i| Vec3::new((i % 10) as f32 * 2.0 - 9.0, 0.0, (i / 10) as f32 * 2.0 - 4.0))
        .collect();
    let mut sim = CpuSim::new(originals.len());

    let pushing = hand(Vec3::new(0.0, 2.0, 0.0), Gesture::Open);
    for f in 0..300 {
        sim.step(&originals, [pushing, Vec4::ZERO], 0.0, f as f32 * DT, DT, &p);
    }
    let peak: f32 = sim
        .displacement
        .iter()
        .map(|d| d.length())
        .fold(0.0, f32::max);
    assert!(peak > 0.5, "hand never displaced the field ({peak})");

    for f in 300..1200 {
        sim.step(
            &originals,
            [Vec4::ZERO, Vec4::ZERO],
            0.0,
            f as f32 * DT,
            DT,
            &p,
        );
    }
    let residual: f32 = sim
        .displacement
        .iter()
        .map(|d| d.length())
        .fold(0.0, f32::max);
    assert!(
        residual < peak * 0.02,
        "field still displaced by {residual} (peak was {peak})"
    );
}

#[test]
fn displacement_bounded_with_hand_and_audio_combined() {
    let p = PhysicsParams {
        push_gain: 300.0,
        audio_gain: 200.0,
        hand_radius: 100.0,
        ..Default::default()
    };
    let originals = [Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0)];
    let mut sim = CpuSim::new(originals.len());
    for f in 0..5000 {
        let t = f as f32 * DT;
        let h = hand(Vec3::new(t.sin() * 10.0, 0.0, t.cos() * 10.0), Gesture::Peace);
        sim.step(&originals, [h, h], 1.0, t, DT, &p);
        for d in &sim.displacement {
            assert!(d.length() <= p.max_displacement + 1e-3);
        }
    }
}

#[test]
fn oversized_step_is_clamped_to_the_cap() {
    let p = PhysicsParams::default();
    let originals = [Vec3::new(1.0, 2.0, 3.0)];
    let pushing = [hand(Vec3::new(1.5, 2.0, 3.0), Gesture::Open), Vec4::ZERO];

    let mut hitched = CpuSim::new(1);
    let mut capped = CpuSim::new(1);
    hitched.step(&originals, pushing, 0.3, 1.0, 10.0, &p);
    capped.step(&originals, pushing, 0.3, 1.0, MAX_STEP_DT, &p);
    assert_eq!(hitched.displacement[0], capped.displacement[0]);
    assert_eq!(hitched.velocity[0], capped.velocity[0]);
}

#[test]
fn shape_morph_round_trip_restores_the_formation() {
    let mut engine = Engine::new(EngineConfig::default(), Formation::sphere(120, 25.0));
    let home: Vec<Vec3> = engine.particles().original_positions().to_vec();

    engine.set_formation(Formation::cube(120, 15.0));
    for f in 0..300 {
        engine.update(f as f32 * DT, DT);
    }
    assert_eq!(
        engine.particles().original_positions(),
        engine.particles().target_positions()
    );

    engine.set_formation(Formation::sphere(120, 25.0));
    for f in 300..600 {
        engine.update(f as f32 * DT, DT);
    }
    assert_eq!(engine.particles().original_positions(), &home[..]);
}

#[test]
fn count_changes_keep_arena_addresses_unique() {
    let mut engine = Engine::new(EngineConfig::default(), Formation::sphere(90, 20.0));
    for &count in &[150usize, 40, 1, 500] {
        engine.set_formation(Formation::sphere(count, 20.0));
        for f in 0..300 {
            engine.update(f as f32 * DT, DT);
        }
        let set = engine.particles();
        assert_eq!(set.len(), count);
        let side = set.grid_side();
        let mut seen = std::collections::HashSet::new();
        for i in 0..set.len() {
            let g = set.grid_coord(i);
            let cell = ((g.x * side as f32) as u32, (g.y * side as f32) as u32);
            assert!(seen.insert(cell), "duplicate arena cell at count {count}");
        }
    }
}

#[test]
fn disabling_hands_lets_the_field_settle() {
    let mut engine = Engine::new(EngineConfig::default(), Formation::sphere(50, 20.0));
    engine
        .hands
        .set_left(Some(Vec3::new(10.0, 0.0, 0.0)), Gesture::Open);
    let u = engine.update(0.0, DT);
    assert_ne!(u.hand_left, [0.0; 4]);

    // The tracker zeroes synchronously; the very next frame carries no force.
    engine.hands.set_enabled(false);
    let u = engine.update(DT, DT);
    assert_eq!(u.hand_left, [0.0; 4]);
    assert_eq!(u.hand_right, [0.0; 4]);
}

#[test]
fn gesture_burst_outpushes_open_palm() {
    use glowfield::physics::hand_force;
    let p = PhysicsParams {
        gesture_forces: true,
        ..Default::default()
    };
    let world = Vec3::new(6.0, 0.0, 0.0);
    let open = hand_force(world, hand(Vec3::new(1.0, 0.0, 0.0), Gesture::Open), 2.0, &p);
    let burst = hand_force(world, hand(Vec3::new(1.0, 0.0, 0.0), Gesture::Peace), 2.0, &p);
    assert!(burst.length() > open.length() * 2.0);
}
