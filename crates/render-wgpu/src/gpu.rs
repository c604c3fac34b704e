use crate::blocks::{DrawBlock, LitMaterialBlock, SceneBlock, SkyMaterialBlock};
use crate::recorder::{FrameRecorder, Op};
use crate::shaders;
use gravefield_assets::{CubeMapData, MeshData, TextureData, Vertex};
use gravefield_ecs::{MaterialHandle, MeshHandle};
use gravefield_render::{
    DrawUniforms, FrameUniforms, Material, RenderDevice, RenderError, ResourceUploader,
    ShaderHandle, ShaderLayout, ShaderProgram, TextureHandle, UniformValue,
};
use std::collections::{BTreeMap, HashMap};
use wgpu::util::DeviceExt;

/// Color format of the off-screen target.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
    3 => Float32x4,
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureKind {
    Flat,
    Cube,
}

struct GpuTexture {
    view: wgpu::TextureView,
    kind: TextureKind,
}

struct GpuMaterial {
    layout: ShaderLayout,
    uniforms: BTreeMap<String, UniformValue>,
    bind_group: wgpu::BindGroup,
}

struct Offscreen {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

/// Scene and per-draw uniform buffers addressed with dynamic offsets.
struct UniformRing {
    scene: wgpu::Buffer,
    draw: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

struct Layouts {
    uniforms: wgpu::BindGroupLayout,
    lit_material: wgpu::BindGroupLayout,
    sky_material: wgpu::BindGroupLayout,
    blit: wgpu::BindGroupLayout,
}

/// wgpu implementation of [`RenderDevice`] and [`ResourceUploader`].
///
/// Scene draws are recorded during the frame and replayed into an off-screen
/// color + depth target on [`RenderDevice::end_offscreen`];
/// [`RenderDevice::present_offscreen`] blits that target onto the surface.
/// The host draws overlays onto [`WgpuDevice::frame_view`] and then calls
/// [`WgpuDevice::present`].
pub struct WgpuDevice {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layouts: Layouts,
    pipelines: HashMap<ShaderLayout, wgpu::RenderPipeline>,
    blit_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    fallback_flat: wgpu::TextureView,
    fallback_cube: wgpu::TextureView,
    materials: HashMap<MaterialHandle, GpuMaterial>,
    ring: UniformRing,
    offscreen: Offscreen,
    recorder: FrameRecorder,
    bound_layout: Option<ShaderLayout>,
    frame: Option<SurfaceFrame>,
}

impl WgpuDevice {
    /// Pick an adapter for `surface`, open a device and configure the surface.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Device("no adapter compatible with the window".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gravefield_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "gpu initialized"
        );
        Ok(Self::with_device(surface, device, queue, config))
    }

    fn with_device(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        let layouts = Layouts::new(&device);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut pipelines = HashMap::new();
        for layout in [ShaderLayout::Lit, ShaderLayout::Skybox] {
            pipelines.insert(layout, scene_pipeline(&device, &layouts, layout));
        }
        let blit_pipeline = blit_pipeline(&device, &layouts.blit, config.format);

        let fallback_flat = create_texture(&device, &queue, "fallback_white", 1, 1, TextureKind::Flat, &[255; 4]);
        let fallback_cube = create_texture(&device, &queue, "fallback_cube", 1, 1, TextureKind::Cube, &[255; 24]);

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let ring = UniformRing::new(&device, &layouts.uniforms, 4096, 64 * 1024);
        let offscreen = Offscreen::new(&device, &layouts.blit, &sampler, config.width, config.height);

        Self {
            surface,
            device,
            queue,
            config,
            layouts,
            pipelines,
            blit_pipeline,
            sampler,
            meshes: Vec::new(),
            textures: Vec::new(),
            fallback_flat,
            fallback_cube,
            materials: HashMap::new(),
            ring,
            offscreen,
            recorder: FrameRecorder::new(alignment),
            bound_layout: None,
            frame: None,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface and recreate the off-screen targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.offscreen = Offscreen::new(
            &self.device,
            &self.layouts.blit,
            &self.sampler,
            self.config.width,
            self.config.height,
        );
        tracing::debug!(width = self.config.width, height = self.config.height, "render targets resized");
    }

    /// The acquired swap-chain image, once the off-screen pass was blitted.
    pub fn frame_view(&self) -> Option<&wgpu::TextureView> {
        self.frame.as_ref().map(|f| &f.view)
    }

    /// Present the acquired swap-chain image, if any.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.present();
        }
    }

    fn flat_view(&self, value: Option<&UniformValue>) -> &wgpu::TextureView {
        self.texture_view(value, TextureKind::Flat)
            .unwrap_or(&self.fallback_flat)
    }

    fn cube_view(&self, value: Option<&UniformValue>) -> &wgpu::TextureView {
        self.texture_view(value, TextureKind::Cube)
            .unwrap_or(&self.fallback_cube)
    }

    fn texture_view(&self, value: Option<&UniformValue>, kind: TextureKind) -> Option<&wgpu::TextureView> {
        let handle = value.and_then(UniformValue::as_texture)?;
        self.textures
            .get(handle.0 as usize)
            .filter(|t| t.kind == kind)
            .map(|t| &t.view)
    }

    fn build_material(&self, layout: ShaderLayout, material: &Material) -> GpuMaterial {
        let bind_group = match layout {
            ShaderLayout::Lit => {
                let block = LitMaterialBlock::from(material);
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("lit_material"),
                    contents: bytemuck::bytes_of(&block),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("lit_material"),
                    layout: &self.layouts.lit_material,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(
                                self.flat_view(material.get("s_Diffuse")),
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(
                                self.flat_view(material.get("s_Specular")),
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: buffer.as_entire_binding(),
                        },
                    ],
                })
            }
            ShaderLayout::Skybox => {
                let block = SkyMaterialBlock::from(material);
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sky_material"),
                    contents: bytemuck::bytes_of(&block),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("sky_material"),
                    layout: &self.layouts.sky_material,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(
                                self.cube_view(material.get("s_Environment")),
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: buffer.as_entire_binding(),
                        },
                    ],
                })
            }
        };
        GpuMaterial {
            layout,
            uniforms: material.uniforms().clone(),
            bind_group,
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn begin_offscreen(&mut self, clear_color: [f32; 4]) {
        self.recorder.begin(clear_color);
        self.bound_layout = None;
    }

    fn bind_shader(&mut self, _handle: ShaderHandle, program: &ShaderProgram) {
        self.recorder.bind(program);
        self.bound_layout = Some(program.layout());
    }

    fn set_frame_uniforms(&mut self, frame: &FrameUniforms) {
        self.recorder.frame(frame);
    }

    fn apply_material(&mut self, handle: MaterialHandle, material: &Material) {
        let Some(layout) = self.bound_layout else {
            tracing::warn!(material = handle.0, "material applied with no shader bound");
            return;
        };
        let stale = self
            .materials
            .get(&handle)
            .is_none_or(|m| m.layout != layout || &m.uniforms != material.uniforms());
        if stale {
            let gpu = self.build_material(layout, material);
            self.materials.insert(handle, gpu);
            tracing::debug!(material = handle.0, layout = layout.name(), "material bind group built");
        }
        self.recorder.material(handle);
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, draw: &DrawUniforms) {
        if !self.recorder.draw(mesh, draw) {
            tracing::warn!(mesh = mesh.0, "draw skipped: no shader bound");
        }
    }

    fn end_offscreen(&mut self) {
        let _span = tracing::debug_span!("offscreen_pass", draws = self.recorder.draw_count()).entered();
        self.ring.ensure_capacity(
            &self.device,
            &self.layouts.uniforms,
            self.recorder.scene_bytes().len() as u64,
            self.recorder.draw_bytes().len() as u64,
        );
        if !self.recorder.scene_bytes().is_empty() {
            self.queue.write_buffer(&self.ring.scene, 0, self.recorder.scene_bytes());
        }
        if !self.recorder.draw_bytes().is_empty() {
            self.queue.write_buffer(&self.ring.draw, 0, self.recorder.draw_bytes());
        }

        let [r, g, b, a] = self.recorder.clear_color().map(f64::from);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("offscreen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.offscreen.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.offscreen.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let mut material_bound = false;
            for op in self.recorder.ops() {
                match *op {
                    Op::Pipeline(layout) => {
                        if let Some(pipeline) = self.pipelines.get(&layout) {
                            pass.set_pipeline(pipeline);
                        }
                        material_bound = false;
                    }
                    Op::Material(handle) => {
                        if let Some(material) = self.materials.get(&handle) {
                            pass.set_bind_group(1, &material.bind_group, &[]);
                            material_bound = true;
                        }
                    }
                    Op::Draw {
                        mesh,
                        scene_offset,
                        draw_offset,
                    } => {
                        let Some(gpu) = self.meshes.get(mesh.0 as usize) else {
                            tracing::warn!(mesh = mesh.0, "draw of unknown mesh skipped");
                            continue;
                        };
                        if !material_bound {
                            tracing::warn!(mesh = mesh.0, "draw skipped: no material bound");
                            continue;
                        }
                        if gpu.index_count == 0 {
                            tracing::debug!(mesh = mesh.0, "draw skipped: mesh has no indices");
                            continue;
                        }
                        pass.set_bind_group(0, &self.ring.bind_group, &[scene_offset, draw_offset]);
                        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                    }
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn present_offscreen(&mut self) {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                tracing::debug!("surface reconfigured; frame dropped");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to acquire surface texture");
                return;
            }
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blit_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.offscreen.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.frame = Some(SurfaceFrame { texture, view });
    }
}

impl ResourceUploader for WgpuDevice {
    fn upload_mesh(&mut self, name: &str, mesh: &MeshData) -> MeshHandle {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: non_empty(bytemuck::cast_slice(&mesh.vertices)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: non_empty(bytemuck::cast_slice(&mesh.indices)),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        });
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    fn upload_texture(&mut self, name: &str, texture: &TextureData) -> TextureHandle {
        let view = create_texture(
            &self.device,
            &self.queue,
            name,
            texture.width,
            texture.height,
            TextureKind::Flat,
            &texture.pixels,
        );
        self.textures.push(GpuTexture {
            view,
            kind: TextureKind::Flat,
        });
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn upload_cube_map(&mut self, name: &str, cube: &CubeMapData) -> TextureHandle {
        let pixels = cube.faces.concat();
        let view = create_texture(
            &self.device,
            &self.queue,
            name,
            cube.face_size,
            cube.face_size,
            TextureKind::Cube,
            &pixels,
        );
        self.textures.push(GpuTexture {
            view,
            kind: TextureKind::Cube,
        });
        TextureHandle(self.textures.len() as u32 - 1)
    }
}

fn non_empty(bytes: &[u8]) -> &[u8] {
    if bytes.is_empty() { &[0; 4] } else { bytes }
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    kind: TextureKind,
    pixels: &[u8],
) -> wgpu::TextureView {
    let (layers, dimension) = match kind {
        TextureKind::Flat => (1, wgpu::TextureViewDimension::D2),
        TextureKind::Cube => (6, wgpu::TextureViewDimension::Cube),
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        pixels,
    );
    texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(dimension),
        ..Default::default()
    })
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_uniforms"),
            entries: &[
                uniform_entry(0, true, std::mem::size_of::<SceneBlock>() as u64),
                uniform_entry(1, true, std::mem::size_of::<DrawBlock>() as u64),
            ],
        });
        let lit_material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit_material"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
                uniform_entry(3, false, std::mem::size_of::<LitMaterialBlock>() as u64),
            ],
        });
        let sky_material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky_material"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
                uniform_entry(2, false, std::mem::size_of::<SkyMaterialBlock>() as u64),
            ],
        });
        let blit = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit"),
            entries: &[texture_entry(0, wgpu::TextureViewDimension::D2), sampler_entry(1)],
        });
        Self {
            uniforms,
            lit_material,
            sky_material,
            blit,
        }
    }

    fn material(&self, layout: ShaderLayout) -> &wgpu::BindGroupLayout {
        match layout {
            ShaderLayout::Lit => &self.lit_material,
            ShaderLayout::Skybox => &self.sky_material,
        }
    }
}

fn uniform_entry(binding: u32, dynamic: bool, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn scene_pipeline(device: &wgpu::Device, layouts: &Layouts, layout: ShaderLayout) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(layout.name()),
        source: wgpu::ShaderSource::Wgsl(shaders::scene_shader_source(layout).into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(layout.name()),
        bind_group_layouts: &[&layouts.uniforms, layouts.material(layout)],
        push_constant_ranges: &[],
    });
    let (depth_write_enabled, depth_compare) = depth_state(layout);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(layout.name()),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: OFFSCREEN_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// Depth write and compare per layout. Coplanar lit surfaces drawn later win
/// ties; the skybox sits on the far plane behind everything already drawn.
fn depth_state(layout: ShaderLayout) -> (bool, wgpu::CompareFunction) {
    match layout {
        ShaderLayout::Lit => (true, wgpu::CompareFunction::LessEqual),
        ShaderLayout::Skybox => (false, wgpu::CompareFunction::LessEqual),
    }
}

fn blit_pipeline(
    device: &wgpu::Device,
    blit_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("passthrough"),
        source: wgpu::ShaderSource::Wgsl(shaders::PASSTHROUGH_SHADER.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("passthrough"),
        bind_group_layouts: &[blit_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("passthrough"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

impl Offscreen {
    fn new(
        device: &wgpu::Device,
        blit_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let target = |label, format, usage| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        let color = target(
            "offscreen_color",
            OFFSCREEN_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let depth = target(
            "offscreen_depth",
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit"),
            layout: blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        Self {
            color,
            depth,
            blit_bind_group,
        }
    }
}

impl UniformRing {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, scene_size: u64, draw_size: u64) -> Self {
        let buffer = |label, size| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let scene = buffer("scene_uniforms", scene_size);
        let draw = buffer("draw_uniforms", draw_size);
        fn binding(buffer: &wgpu::Buffer, size: usize) -> wgpu::BindingResource<'_> {
            wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(size as u64),
            })
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_uniforms"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: binding(&scene, std::mem::size_of::<SceneBlock>()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: binding(&draw, std::mem::size_of::<DrawBlock>()),
                },
            ],
        });
        Self {
            scene,
            draw,
            bind_group,
        }
    }

    /// Grow both buffers to hold at least the given byte counts.
    fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene_len: u64,
        draw_len: u64,
    ) {
        if scene_len <= self.scene.size() && draw_len <= self.draw.size() {
            return;
        }
        let scene_size = scene_len.max(self.scene.size()).next_power_of_two();
        let draw_size = draw_len.max(self.draw.size()).next_power_of_two();
        tracing::debug!(scene_size, draw_size, "uniform buffers grown");
        *self = Self::new(device, layout, scene_size, draw_size);
    }
}
