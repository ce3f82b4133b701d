//! GPU renderer - the simulation/render pipeline.
//!
//! Two `Rgba32Float` render targets in ping-pong roles, advanced by repeated
//! fragment passes of the step program, then mapped to the visible target by
//! the display program. Passes within one frame are recorded into a single
//! command encoder; wgpu's implicit ordering between render passes
//! guarantees each sub-step observes the previous one's write.

use bytemuck::Zeroable;
use log::{debug, info};

use super::GpuError;
use super::context::{FIELD_FORMAT, GpuContext};
use crate::compute::brush::{BRUSH_SENTINEL, Brush};
use crate::compute::clock::FrameClock;
use crate::compute::field::Field;
use crate::schema::{ColorRamp, ConfigError, DisplayChannel, Seed, SimulationConfig};

// Embed shader sources at compile time
const FULLSCREEN_SHADER: &str = include_str!("shaders/fullscreen.wgsl");
const STEP_SHADER: &str = include_str!("shaders/step.wgsl");
const DISPLAY_SHADER: &str = include_str!("shaders/display.wgsl");

/// Uniform buffer struct for the step shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct StepUniforms {
    grid_size: [f32; 2],
    brush: [f32; 2],
    delta: f32,
    feed: f32,
    kill: f32,
    diffusion_u: f32,
    diffusion_v: f32,
    _pad: [f32; 3],
}

/// One color stop as the display shader sees it.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct RampStopRaw {
    color: [f32; 4],
    threshold: f32,
    _pad: [f32; 3],
}

/// Uniform buffer struct for the display shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DisplayUniforms {
    stops: [RampStopRaw; 5],
    stop_count: u32,
    channel: u32,
    _pad: [u32; 2],
}

impl DisplayUniforms {
    fn from_config(ramp: &ColorRamp, channel: DisplayChannel) -> Self {
        let mut stops = [RampStopRaw::zeroed(); 5];
        for (raw, stop) in stops.iter_mut().zip(ramp.stops.iter()) {
            raw.color = stop.color;
            raw.threshold = stop.threshold;
        }
        Self {
            stops,
            stop_count: ramp.stops.len() as u32,
            channel: match channel {
                DisplayChannel::U => 0,
                DisplayChannel::V => 1,
            },
            _pad: [0; 2],
        }
    }
}

/// The two float render targets holding the concentration field.
///
/// Created and dropped together; `swap` flips roles in O(1) without moving
/// any texels.
struct PingPong {
    textures: [wgpu::Texture; 2],
    views: [wgpu::TextureView; 2],
    toggled: bool,
}

impl PingPong {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        seed: &Seed,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let descriptor = wgpu::TextureDescriptor {
            label: Some("Field Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FIELD_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        };

        let textures = [
            device.create_texture(&descriptor),
            device.create_texture(&descriptor),
        ];
        let views = [
            textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        // Upload the fill pattern into the initial source target. The
        // destination is fully written by the first sub-step.
        let texels = Field::from_seed(seed, width as usize, height as usize).to_texels();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &textures[0],
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 16),
                rows_per_image: Some(height),
            },
            extent,
        );

        Self {
            textures,
            views,
            toggled: false,
        }
    }

    fn source_view(&self) -> &wgpu::TextureView {
        &self.views[self.toggled as usize]
    }

    fn destination_view(&self) -> &wgpu::TextureView {
        &self.views[!self.toggled as usize]
    }

    fn source_texture(&self) -> &wgpu::Texture {
        &self.textures[self.toggled as usize]
    }

    fn swap(&mut self) {
        self.toggled = !self.toggled;
    }
}

/// Offscreen display target for headless rendering.
struct Offscreen {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Offscreen {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Display Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Pointer tracking for brush input, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct PointerState {
    viewport: (f32, f32),
    down: bool,
}

/// GPU simulation session: frame driver, ping-pong field targets, step and
/// display pipelines.
///
/// The host owns the window/surface and calls `on_frame` with its target
/// view once per vertical sync; windowless hosts use [`GpuRenderer::headless`]
/// and read results back.
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: SimulationConfig,
    seed: Seed,

    step_pipeline: wgpu::RenderPipeline,
    display_pipeline: wgpu::RenderPipeline,
    step_bind_group_layout: wgpu::BindGroupLayout,
    display_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    targets: PingPong,
    offscreen: Option<Offscreen>,

    clock: FrameClock,
    brush: Brush,
    pointer: PointerState,
    frame: u64,
}

impl GpuRenderer {
    /// Create a renderer on a host-supplied device.
    ///
    /// `target_format` is the format of the view later passed to `on_frame`
    /// (the host's surface format). Fails eagerly when the configuration is
    /// invalid or the grid exceeds the device's texture limit.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        config: SimulationConfig,
        seed: Seed,
    ) -> Result<Self, GpuError> {
        config.validate()?;
        check_grid_limit(&device, config.width, config.height)?;

        let fullscreen_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fullscreen Shader"),
            source: wgpu::ShaderSource::Wgsl(FULLSCREEN_SHADER.into()),
        });
        let step_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Step Shader"),
            source: wgpu::ShaderSource::Wgsl(STEP_SHADER.into()),
        });
        let display_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Display Shader"),
            source: wgpu::ShaderSource::Wgsl(DISPLAY_SHADER.into()),
        });

        // The field texture is unfilterable float; both passes sample it
        // with a nearest, repeat-addressing sampler. Repeat addressing is
        // what makes the step stencil toroidal.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Field Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let step_bind_group_layout = create_pass_bind_group_layout(&device, "Step");
        let display_bind_group_layout = create_pass_bind_group_layout(&device, "Display");

        let step_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Step Pipeline Layout"),
            bind_group_layouts: &[&step_bind_group_layout],
            ..Default::default()
        });
        let display_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Display Pipeline Layout"),
                bind_group_layouts: &[&display_bind_group_layout],
                ..Default::default()
            });

        let step_pipeline = create_fullscreen_pipeline(
            &device,
            "Step Pipeline",
            &step_pipeline_layout,
            &fullscreen_shader,
            &step_shader,
            FIELD_FORMAT,
            None,
        );
        let display_pipeline = create_fullscreen_pipeline(
            &device,
            "Display Pipeline",
            &display_pipeline_layout,
            &fullscreen_shader,
            &display_shader,
            target_format,
            Some(wgpu::BlendState::REPLACE),
        );

        let targets = PingPong::new(
            &device,
            &queue,
            config.width as u32,
            config.height as u32,
            &seed,
        );

        info!(
            "GPU renderer ready: {}x{} field, {} sub-steps/frame",
            config.width, config.height, config.substeps
        );

        Ok(Self {
            device,
            queue,
            config,
            seed,
            step_pipeline,
            display_pipeline,
            step_bind_group_layout,
            display_bind_group_layout,
            sampler,
            targets,
            offscreen: None,
            clock: FrameClock::default(),
            brush: Brush::default(),
            pointer: PointerState {
                viewport: (1.0, 1.0),
                down: false,
            },
            frame: 0,
        })
    }

    /// Acquire a device without a surface and render to an internal
    /// grid-sized target instead of a host view.
    pub async fn headless(config: SimulationConfig, seed: Seed) -> Result<Self, GpuError> {
        let context = GpuContext::new().await?;
        let (width, height) = (config.width as u32, config.height as u32);
        let mut renderer = Self::new(
            context.device().clone(),
            context.queue().clone(),
            Offscreen::FORMAT,
            config,
            seed,
        )?;
        renderer.offscreen = Some(Offscreen::new(&renderer.device, width, height));
        Ok(renderer)
    }

    /// Run one displayed frame: N step passes over the ping-pong pair, then
    /// the display pass into `target`.
    ///
    /// The pending brush (if any) rides along on the first sub-step only.
    /// Dispatches return immediately; the GPU pipeline's ordering guarantees
    /// do the rest.
    pub fn on_frame(&mut self, timestamp_ms: f64, target: &wgpu::TextureView) {
        let delta = self.clock.delta(timestamp_ms);
        let frame_brush = self.brush.take();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        for substep in 0..self.config.substeps {
            let uniforms = StepUniforms {
                grid_size: [self.config.width as f32, self.config.height as f32],
                brush: if substep == 0 {
                    frame_brush
                } else {
                    BRUSH_SENTINEL
                },
                delta,
                feed: self.config.feed,
                kill: self.config.kill,
                diffusion_u: self.config.diffusion_u,
                diffusion_v: self.config.diffusion_v,
                _pad: [0.0; 3],
            };

            let params_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Step Params"),
                size: std::mem::size_of::<StepUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.queue
                .write_buffer(&params_buffer, 0, bytemuck::bytes_of(&uniforms));

            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Step Bind Group"),
                layout: &self.step_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(self.targets.source_view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Step Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: self.targets.destination_view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                pass.set_pipeline(&self.step_pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }

            self.targets.swap();
        }

        let display_uniforms =
            DisplayUniforms::from_config(&self.config.ramp, self.config.display);
        let display_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Display Params"),
            size: std::mem::size_of::<DisplayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&display_buffer, 0, bytemuck::bytes_of(&display_uniforms));

        let display_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Display Bind Group"),
            layout: &self.display_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: display_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.targets.source_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.display_pipeline);
            pass.set_bind_group(0, &display_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.frame += 1;
    }

    /// Run one frame against the internal offscreen target.
    ///
    /// Only available on renderers built with [`GpuRenderer::headless`].
    pub fn render_offscreen(&mut self, timestamp_ms: f64) {
        let offscreen = self
            .offscreen
            .take()
            .expect("no offscreen target; construct with GpuRenderer::headless");
        self.on_frame(timestamp_ms, &offscreen.view);
        self.offscreen = Some(offscreen);
    }

    /// Record the canvas size used to normalize pointer coordinates.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.pointer.viewport = (width.max(1.0), height.max(1.0));
    }

    /// Pointer pressed at canvas pixel (x, y).
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.pointer.down = true;
        self.issue_brush(x, y);
    }

    /// Pointer moved; paints only while the button is held.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.pointer.down {
            self.issue_brush(x, y);
        }
    }

    /// Pointer released.
    pub fn on_pointer_up(&mut self) {
        self.pointer.down = false;
    }

    fn issue_brush(&mut self, x: f32, y: f32) {
        let (vw, vh) = self.pointer.viewport;
        self.brush.set(x / vw, y / vh);
    }

    /// Update feed/kill rates; takes effect from the next frame.
    pub fn set_feed_kill(&mut self, feed: f32, kill: f32) {
        self.config.feed = feed;
        self.config.kill = kill;
    }

    /// Replace the display color ramp.
    pub fn set_color_ramp(&mut self, ramp: ColorRamp) -> Result<(), ConfigError> {
        ramp.validate()?;
        self.config.ramp = ramp;
        Ok(())
    }

    /// Apply a preset's (feed, kill) pair by index.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        match crate::schema::preset(index) {
            Some(p) => {
                debug!("preset {}: {}", index, p.name);
                self.set_feed_kill(p.feed, p.kill);
                true
            }
            None => false,
        }
    }

    /// Dispose and recreate both field targets as one transition, preserving
    /// the current feed/kill unless new values are supplied.
    ///
    /// Must be called between frames, never mid-batch; `on_frame` always
    /// runs to completion, so any call site outside it satisfies that.
    pub fn reset(&mut self, feed: Option<f32>, kill: Option<f32>) {
        if let Some(f) = feed {
            self.config.feed = f;
        }
        if let Some(k) = kill {
            self.config.kill = k;
        }
        self.targets = PingPong::new(
            &self.device,
            &self.queue,
            self.config.width as u32,
            self.config.height as u32,
            &self.seed,
        );
        self.clock.reset();
        self.brush.clear();
        debug!(
            "reset: feed={}, kill={}",
            self.config.feed, self.config.kill
        );
    }

    /// Change the grid resolution, disposing and recreating both targets.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), GpuError> {
        let mut config = self.config.clone();
        config.width = width;
        config.height = height;
        config.validate()?;
        check_grid_limit(&self.device, width, height)?;

        self.config = config;
        self.targets = PingPong::new(
            &self.device,
            &self.queue,
            width as u32,
            height as u32,
            &self.seed,
        );
        if self.offscreen.is_some() {
            self.offscreen = Some(Offscreen::new(&self.device, width as u32, height as u32));
        }
        self.clock.reset();
        self.brush.clear();
        debug!("resized to {}x{}", width, height);
        Ok(())
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Frames completed since creation.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The brush injector (pending coordinate, if any).
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Read the current field back as per-cell (u, v) pairs, row-major.
    ///
    /// Blocks until the GPU finishes; meant for tests and debugging, not the
    /// frame loop.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_field(&self) -> Result<Vec<[f32; 2]>, GpuError> {
        let (width, height) = (self.config.width as u32, self.config.height as u32);
        let data = self.read_texture(self.targets.source_texture(), width, height, 16)?;

        let padded_row = padded_bytes_per_row(width, 16) as usize;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as usize {
            let row = &data[y * padded_row..];
            for x in 0..width as usize {
                let offset = x * 16;
                cells.push([
                    f32::from_ne_bytes(row[offset..offset + 4].try_into().unwrap()),
                    f32::from_ne_bytes(row[offset + 4..offset + 8].try_into().unwrap()),
                ]);
            }
        }
        Ok(cells)
    }

    /// Read the offscreen display target back as RGBA8 pixels.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_display_rgba(&self) -> Result<Vec<u8>, GpuError> {
        let offscreen = self
            .offscreen
            .as_ref()
            .expect("no offscreen target; construct with GpuRenderer::headless");
        let (width, height) = (self.config.width as u32, self.config.height as u32);
        let data = self.read_texture(&offscreen.texture, width, height, 4)?;

        let padded_row = padded_bytes_per_row(width, 4) as usize;
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height as usize {
            let row = &data[y * padded_row..];
            pixels.extend_from_slice(&row[..width as usize * 4]);
        }
        Ok(pixels)
    }

    /// Synchronous texture readback through a padded staging buffer.
    #[cfg(not(target_arch = "wasm32"))]
    fn read_texture(
        &self,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
        bytes_per_texel: u32,
    ) -> Result<Vec<u8>, GpuError> {
        let padded_row = padded_bytes_per_row(width, bytes_per_texel);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (padded_row * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });

        self.device.poll(wgpu::PollType::wait_indefinitely()).ok();
        rx.recv().unwrap()?;

        let data = buffer_slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(data)
    }
}

fn padded_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let tight = width * bytes_per_texel;
    tight.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

fn check_grid_limit(device: &wgpu::Device, width: usize, height: usize) -> Result<(), GpuError> {
    let max = device.limits().max_texture_dimension_2d;
    if width as u64 > max as u64 || height as u64 > max as u64 {
        return Err(GpuError::TextureTooLarge {
            width: width as u32,
            height: height as u32,
            max,
        });
    }
    Ok(())
}

fn create_pass_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{label} Bind Group Layout")),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    vertex_shader: &wgpu::ShaderModule,
    fragment_shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{CpuSimulation, FieldStats};
    use crate::schema::Pattern;

    fn test_config() -> SimulationConfig {
        SimulationConfig {
            width: 64,
            height: 64,
            feed: 0.037,
            kill: 0.06,
            ..SimulationConfig::default()
        }
    }

    fn test_seed() -> Seed {
        Seed {
            pattern: Pattern::CenterSquare {
                half_extent: 6,
                noise: 0.0,
                rng_seed: 0,
            },
        }
    }

    fn headless_or_skip(config: SimulationConfig, seed: Seed) -> Option<GpuRenderer> {
        match pollster::block_on(GpuRenderer::headless(config, seed)) {
            Ok(renderer) => Some(renderer),
            Err(GpuError::NoAdapter) => {
                eprintln!("Skipping GPU test: no adapter available");
                None
            }
            Err(e) => panic!("Failed to create GPU renderer: {:?}", e),
        }
    }

    #[test]
    fn test_renderer_creation() {
        let Some(renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        assert_eq!(renderer.frame(), 0);
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let Some(renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        let max = renderer.device.limits().max_texture_dimension_2d as usize;
        let config = SimulationConfig {
            width: max + 1,
            height: 64,
            ..test_config()
        };
        let result = GpuRenderer::new(
            renderer.device.clone(),
            renderer.queue.clone(),
            Offscreen::FORMAT,
            config,
            test_seed(),
        );
        assert!(matches!(result, Err(GpuError::TextureTooLarge { .. })));
    }

    #[test]
    fn test_seed_upload_round_trips() {
        let Some(renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        let cells = renderer.read_field().unwrap();
        let expected = test_seed().generate(64, 64);
        assert_eq!(cells.len(), expected.len());
        for (cell, want) in cells.iter().zip(expected.iter()) {
            assert_eq!(cell, want);
        }
    }

    /// The GPU step program and the CPU reference must agree: run one frame
    /// of sub-steps on both and compare fields.
    #[test]
    fn test_gpu_matches_cpu_reference() {
        let Some(mut renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        let mut cpu = CpuSimulation::new(test_config(), test_seed()).unwrap();

        renderer.render_offscreen(0.0);
        cpu.advance(0.0);

        let gpu_cells = renderer.read_field().unwrap();
        let field = cpu.field();
        let mut max_diff = 0.0f32;
        for (i, cell) in gpu_cells.iter().enumerate() {
            max_diff = max_diff.max((cell[0] - field.u[i]).abs());
            max_diff = max_diff.max((cell[1] - field.v[i]).abs());
        }
        // Both paths evaluate the same expressions; the slack only covers
        // multiply-add contraction on the GPU.
        assert!(max_diff < 1e-3, "GPU/CPU mismatch: max diff {max_diff}");
    }

    #[test]
    fn test_offscreen_display_is_opaque() {
        let Some(mut renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        renderer.render_offscreen(0.0);

        let pixels = renderer.read_display_rgba().unwrap();
        assert_eq!(pixels.len(), 64 * 64 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
        // The seeded center region maps to a non-black color.
        assert!(
            pixels
                .chunks_exact(4)
                .any(|p| p[0] as u32 + p[1] as u32 + p[2] as u32 > 0)
        );
    }

    #[test]
    fn test_reset_restores_seed_pattern() {
        let Some(mut renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        renderer.render_offscreen(0.0);
        renderer.reset(Some(0.03), None);
        assert_eq!(renderer.config().feed, 0.03);
        assert_eq!(renderer.config().kill, 0.06);

        let cells = renderer.read_field().unwrap();
        let expected = test_seed().generate(64, 64);
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_resize_recreates_targets() {
        let Some(mut renderer) = headless_or_skip(test_config(), test_seed()) else {
            return;
        };
        renderer.resize(32, 32).unwrap();
        renderer.render_offscreen(0.0);
        let stats = field_stats_from_cells(&renderer.read_field().unwrap());
        assert_eq!(renderer.read_field().unwrap().len(), 32 * 32);
        assert!(stats.is_finite());
    }

    fn field_stats_from_cells(cells: &[[f32; 2]]) -> FieldStats {
        let mut field = crate::compute::Field::uniform(cells.len(), 1, 0.0, 0.0);
        for (i, cell) in cells.iter().enumerate() {
            field.u[i] = cell[0];
            field.v[i] = cell[1];
        }
        field.stats()
    }
}
