//! GPU context acquisition and capability checks.

use log::info;

use super::GpuError;

/// Texture format of the simulation field: (u, v) in the RG channels.
pub(crate) const FIELD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// An acquired adapter/device/queue triple, validated for float-texture
/// rendering.
///
/// Hosts that own a window create their device themselves (so the adapter is
/// surface-compatible) and hand clones to [`super::GpuRenderer`]; this type
/// covers headless and offscreen use, and performs the one-time capability
/// check either way via [`GpuContext::check_capabilities`].
pub struct GpuContext {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire an adapter and device without a surface.
    ///
    /// Fails eagerly when no adapter exists or the adapter cannot render to
    /// float textures; the simulation must not start with quantized numerics.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        Self::check_capabilities(&adapter)?;

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Gray-Scott GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        info!("adapter: {}", adapter.get_info().name);

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }

    /// Verify the adapter can render to and sample the field format.
    pub fn check_capabilities(adapter: &wgpu::Adapter) -> Result<(), GpuError> {
        let required =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let features = adapter.get_texture_format_features(FIELD_FORMAT);
        if !features.allowed_usages.contains(required) {
            return Err(GpuError::FloatTextureUnsupported(FIELD_FORMAT));
        }
        Ok(())
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let result = pollster::block_on(GpuContext::new());

        // Skip test if no GPU available
        if let Err(GpuError::NoAdapter) = &result {
            eprintln!("Skipping GPU test: no adapter available");
            return;
        }

        let context = result.expect("Failed to create GPU context");
        GpuContext::check_capabilities(context.adapter()).unwrap();
    }
}
