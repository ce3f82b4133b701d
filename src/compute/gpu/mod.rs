//! GPU backend - ping-pong float render targets driven by fragment passes,
//! using WebGPU (wgpu).

mod context;
mod renderer;

pub use context::GpuContext;
pub use renderer::GpuRenderer;

/// Error type for GPU operations.
///
/// All variants are detected eagerly, at context creation or (re)allocation
/// boundaries; nothing can fail mid-sub-step. None are transient, so there
/// are no retries.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::schema::ConfigError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Adapter cannot render to {0:?} textures")]
    FloatTextureUnsupported(wgpu::TextureFormat),

    #[error("Requested {width}x{height} grid exceeds the device texture limit of {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
}
