//! Per-particle static attributes and the live particle set.
//!
//! The particle set owns the parallel original/target arrays, per-particle
//! random seeds, and each particle's fixed address into the square physics
//! arena. Dynamic state (velocity, displacement) lives in the physics engine;
//! this module only describes the particles.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::formation::Formation;

/// One instance record as uploaded to the vertex buffer.
///
/// Tightly packed; offsets must stay in sync with [`ParticleInstance::ATTRIBUTES`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub original_position: [f32; 3],
    pub seed: f32,
    pub target_position: [f32; 3],
    pub grid_coord: [f32; 2],
    pub original_color: [f32; 3],
    pub target_color: [f32; 3],
}

impl ParticleInstance {
    pub const STRIDE: wgpu::BufferAddress = std::mem::size_of::<ParticleInstance>() as u64;

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 6] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3, // original position
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32, // seed
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x3, // target position
        },
        wgpu::VertexAttribute {
            offset: 28,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x2, // grid coordinate
        },
        wgpu::VertexAttribute {
            offset: 36,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32x3, // original color
        },
        wgpu::VertexAttribute {
            offset: 48,
            shader_location: 5,
            format: wgpu::VertexFormat::Float32x3, // target color
        },
    ];
}

/// The live particle set: static attributes for N particles.
///
/// Invariants: all five parallel arrays share the same length; each live
/// particle has a unique grid coordinate into the `side × side` physics arena
/// (`side = ceil(sqrt(N))`, trailing cells inert).
#[derive(Clone, Debug)]
pub struct ParticleSet {
    original_positions: Vec<Vec3>,
    target_positions: Vec<Vec3>,
    original_colors: Vec<Vec3>,
    target_colors: Vec<Vec3>,
    seeds: Vec<f32>,
    grid_side: u32,
    /// True particle count after the in-flight transition commits, when the
    /// incoming formation is smaller than the current one.
    pending_len: Option<usize>,
}

impl ParticleSet {
    /// Create a fresh set from a formation. Targets start equal to originals.
    pub fn new(formation: Formation) -> Self {
        let n = formation.len();
        let mut rng = SmallRng::seed_from_u64(0xfeed_beef ^ n as u64);
        let seeds = (0..n).map(|_| rng.gen_range(0.0..1.0f32)).collect();
        Self {
            target_positions: formation.positions.clone(),
            target_colors: formation.colors.clone(),
            original_positions: formation.positions,
            original_colors: formation.colors,
            seeds,
            grid_side: grid_side_for(n),
            pending_len: None,
        }
    }

    pub fn len(&self) -> usize {
        self.original_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original_positions.is_empty()
    }

    /// Side length of the square physics arena.
    pub fn grid_side(&self) -> u32 {
        self.grid_side
    }

    /// Fixed arena address for particle `i`: cell centers in [0, 1)².
    pub fn grid_coord(&self, i: usize) -> Vec2 {
        let s = self.grid_side as f32;
        Vec2::new(
            ((i as u32 % self.grid_side) as f32 + 0.5) / s,
            ((i as u32 / self.grid_side) as f32 + 0.5) / s,
        )
    }

    pub fn original_positions(&self) -> &[Vec3] {
        &self.original_positions
    }

    pub fn target_positions(&self) -> &[Vec3] {
        &self.target_positions
    }

    /// Stage a new target formation. Whichever side is smaller is padded with
    /// particles synthesized near the origin so the count change animates.
    ///
    /// Returns `true` when the arena layout changed (particle count or grid
    /// side), meaning GPU buffers must be rebuilt.
    pub fn retarget(&mut self, target: Formation) -> bool {
        let cur_n = self.len();
        let new_n = target.len();
        let mut rng = SmallRng::seed_from_u64(0x7a11_ca11 ^ new_n as u64);
        let mut jitter = move || {
            Vec3::new(
                rng.gen_range(-0.5..0.5f32),
                rng.gen_range(-0.5..0.5f32),
                rng.gen_range(-0.5..0.5f32),
            )
        };

        self.target_positions = target.positions;
        self.target_colors = target.colors;

        if new_n > cur_n {
            // Grow: synthesize current-side particles near the origin so the
            // newcomers expand outward.
            let mut seed_rng = SmallRng::seed_from_u64(0x5eed ^ new_n as u64);
            for i in cur_n..new_n {
                self.original_positions.push(jitter());
                self.original_colors.push(self.target_colors[i]);
                self.seeds.push(seed_rng.gen_range(0.0..1.0));
            }
            self.pending_len = None;
        } else if new_n < cur_n {
            // Shrink: extras collapse toward the origin, then drop at commit.
            for i in new_n..cur_n {
                self.target_positions.push(jitter());
                self.target_colors.push(self.original_colors[i]);
            }
            self.pending_len = Some(new_n);
        } else {
            self.pending_len = None;
        }

        let old_side = self.grid_side;
        self.grid_side = grid_side_for(self.len());
        self.len() != cur_n || self.grid_side != old_side
    }

    /// Finish the in-flight transition: the target becomes the new current.
    ///
    /// Returns `true` when the arena layout changed.
    pub fn commit(&mut self) -> bool {
        self.original_positions = self.target_positions.clone();
        self.original_colors = self.target_colors.clone();
        let mut changed = false;
        if let Some(n) = self.pending_len.take() {
            self.original_positions.truncate(n);
            self.original_colors.truncate(n);
            self.target_positions.truncate(n);
            self.target_colors.truncate(n);
            self.seeds.truncate(n);
            changed = true;
        }
        let old_side = self.grid_side;
        self.grid_side = grid_side_for(self.len());
        changed || self.grid_side != old_side
    }

    /// Flatten to instance records for the vertex buffer.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        (0..self.len())
            .map(|i| {
                let grid = self.grid_coord(i);
                ParticleInstance {
                    original_position: self.original_positions[i].to_array(),
                    seed: self.seeds[i],
                    target_position: self.target_positions[i].to_array(),
                    grid_coord: grid.to_array(),
                    original_color: self.original_colors[i].to_array(),
                    target_color: self.target_colors[i].to_array(),
                }
            })
            .collect()
    }

    /// Flatten the base-position field for the physics arena: one vec4 texel
    /// per cell (`side²` cells, w unused, inert cells zeroed).
    pub fn original_field(&self) -> Vec<[f32; 4]> {
        let cells = (self.grid_side * self.grid_side) as usize;
        let mut field = vec![[0.0; 4]; cells];
        for (i, p) in self.original_positions.iter().enumerate() {
            field[i] = [p.x, p.y, p.z, 0.0];
        }
        field
    }
}

fn grid_side_for(n: usize) -> u32 {
    (n as f64).sqrt().ceil().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_coords_are_unique() {
        let set = ParticleSet::new(Formation::sphere(300, 10.0));
        let side = set.grid_side();
        assert_eq!(side, 18); // ceil(sqrt(300))
        let mut seen = std::collections::HashSet::new();
        for i in 0..set.len() {
            let g = set.grid_coord(i);
            let cell = (
                (g.x * side as f32) as u32,
                (g.y * side as f32) as u32,
            );
            assert!(seen.insert(cell), "duplicate cell {:?}", cell);
        }
    }

    #[test]
    fn retarget_grows_with_origin_synthesis() {
        let mut set = ParticleSet::new(Formation::sphere(100, 10.0));
        let changed = set.retarget(Formation::cube(150, 10.0));
        assert!(changed);
        assert_eq!(set.len(), 150);
        for p in &set.original_positions()[100..] {
            assert!(p.length() < 1.0);
        }
        assert!(!set.commit());
        assert_eq!(set.len(), 150);
    }

    #[test]
    fn retarget_shrinks_at_commit() {
        let mut set = ParticleSet::new(Formation::sphere(150, 10.0));
        // Padding keeps the count until commit so extras animate out.
        assert!(!set.retarget(Formation::cube(100, 10.0)));
        assert_eq!(set.len(), 150);
        for p in &set.target_positions()[100..] {
            assert!(p.length() < 1.0);
        }
        assert!(set.commit());
        assert_eq!(set.len(), 100);
    }

    #[test]
    fn commit_makes_target_current() {
        let mut set = ParticleSet::new(Formation::sphere(64, 10.0));
        let cube = Formation::cube(64, 5.0);
        set.retarget(cube.clone());
        set.commit();
        assert_eq!(set.original_positions(), &cube.positions[..]);
    }

    #[test]
    fn original_field_zeroes_inert_cells() {
        let set = ParticleSet::new(Formation::sphere(10, 5.0));
        let field = set.original_field();
        assert_eq!(field.len(), 16); // 4x4 arena
        assert_eq!(field[12], [0.0; 4]);
    }
}
