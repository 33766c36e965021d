//! Error types for glowfield.
//!
//! GPU setup, the ping-pong simulation, and the windowed viewer can all fail
//! independently; the simulation failing is non-fatal (the renderer falls back
//! to an instantaneous per-vertex interaction model), while surface/device
//! failures abort startup.

use std::fmt;

/// Errors that can occur while acquiring GPU resources.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The device cannot host the ping-pong simulation buffers.
    SimulationUnsupported(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::SimulationUnsupported(msg) => write!(f, "GPU simulation unavailable: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the windowed viewer.
#[derive(Debug)]
pub enum VisualizerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The provided formation is malformed (length mismatch, empty, NaN).
    InvalidFormation(String),
}

impl fmt::Display for VisualizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualizerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            VisualizerError::Window(e) => write!(f, "Failed to create window: {}", e),
            VisualizerError::Gpu(e) => write!(f, "GPU error: {}", e),
            VisualizerError::InvalidFormation(msg) => write!(f, "Invalid formation: {}", msg),
        }
    }
}

impl std::error::Error for VisualizerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VisualizerError::EventLoop(e) => Some(e),
            VisualizerError::Window(e) => Some(e),
            VisualizerError::Gpu(e) => Some(e),
            VisualizerError::InvalidFormation(_) => None,
        }
    }
}

impl From<winit::error::EventLoopError> for VisualizerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        VisualizerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for VisualizerError {
    fn from(e: winit::error::OsError) -> Self {
        VisualizerError::Window(e)
    }
}

impl From<GpuError> for VisualizerError {
    fn from(e: GpuError) -> Self {
        VisualizerError::Gpu(e)
    }
}
