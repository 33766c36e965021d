//! GPU resources for the ping-pong physics simulation.
//!
//! Velocity and displacement each live in a pair of `side * side` storage
//! buffers of vec4 records. Every frame encodes the velocity pass and then
//! the position pass with one orientation of the pair, then flips; the
//! position pass reads the velocity its own frame just wrote.

use wgpu::util::DeviceExt;

use crate::error::GpuError;
use crate::shader::{self, WORKGROUP_SIZE};

/// One vec4 per arena cell.
const CELL_BYTES: u64 = 16;

pub struct PhysicsGpu {
    velocity_pipeline: wgpu::ComputePipeline,
    position_pipeline: wgpu::ComputePipeline,
    /// Bind groups for the two ping-pong orientations.
    bind_groups: [wgpu::BindGroup; 2],
    originals: wgpu::Buffer,
    displacement: [wgpu::Buffer; 2],
    grid_side: u32,
    /// Which orientation the next encoded frame uses.
    flip: bool,
}

impl PhysicsGpu {
    /// Create the simulation resources, or report why the device cannot host
    /// them. Failure here is non-fatal; the caller renders with the
    /// instantaneous fallback instead.
    pub fn try_new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        original_field: &[[f32; 4]],
        grid_side: u32,
    ) -> Result<Self, GpuError> {
        let cells = grid_side as u64 * grid_side as u64;
        let buffer_size = cells * CELL_BYTES;
        let limits = device.limits();
        if buffer_size > limits.max_storage_buffer_binding_size as u64 {
            return Err(GpuError::SimulationUnsupported(format!(
                "arena needs {} bytes per buffer, device allows {}",
                buffer_size, limits.max_storage_buffer_binding_size
            )));
        }
        if limits.max_storage_buffers_per_shader_stage < 5 {
            return Err(GpuError::SimulationUnsupported(format!(
                "need 5 storage buffers per stage, device allows {}",
                limits.max_storage_buffers_per_shader_stage
            )));
        }

        let originals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Original Field Buffer"),
            contents: bytemuck::cast_slice(original_field),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let state_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: buffer_size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let velocity = [
            state_buffer("Velocity Buffer A"),
            state_buffer("Velocity Buffer B"),
        ];
        let displacement = [
            state_buffer("Displacement Buffer A"),
            state_buffer("Displacement Buffer B"),
        ];

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::sim_wgsl().into()),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let sim_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Bind Group Layout"),
            entries: &[
                storage_entry(0, true),  // originals
                storage_entry(1, true),  // velocity in
                storage_entry(2, true),  // displacement in
                storage_entry(3, false), // velocity out
                storage_entry(4, false), // displacement out
            ],
        });

        let orientation = |src: usize, dst: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Simulation Bind Group"),
                layout: &sim_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: originals.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: velocity[src].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: displacement[src].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: velocity[dst].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: displacement[dst].as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [orientation(0, 1), orientation(1, 0)];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[uniform_layout, &sim_layout],
            push_constant_ranges: &[],
        });
        let compute_pipeline = |label: &str, entry: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Ok(Self {
            velocity_pipeline: compute_pipeline("Velocity Pipeline", "velocity_main"),
            position_pipeline: compute_pipeline("Position Pipeline", "position_main"),
            bind_groups,
            originals,
            displacement,
            grid_side,
            flip: false,
        })
    }

    /// Encode both passes for one frame and flip the ping-pong orientation.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, uniforms: &wgpu::BindGroup) {
        let groups = self.grid_side.div_ceil(WORKGROUP_SIZE);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Simulation Pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, uniforms, &[]);
            pass.set_bind_group(1, &self.bind_groups[self.flip as usize], &[]);
            pass.set_pipeline(&self.velocity_pipeline);
            pass.dispatch_workgroups(groups, groups, 1);
            pass.set_pipeline(&self.position_pipeline);
            pass.dispatch_workgroups(groups, groups, 1);
        }
        self.flip = !self.flip;
    }

    /// Upload a new original field after a shape morph commits. The arena
    /// layout must be unchanged; count changes rebuild the whole simulation.
    pub fn write_field(&self, queue: &wgpu::Queue, original_field: &[[f32; 4]]) {
        queue.write_buffer(&self.originals, 0, bytemuck::cast_slice(original_field));
    }

    /// Index of the displacement buffer holding the most recent frame.
    pub fn latest(&self) -> usize {
        self.flip as usize
    }

    pub fn displacement_buffers(&self) -> &[wgpu::Buffer; 2] {
        &self.displacement
    }
}
