// Sierpinski gasket demo
// Generates the gasket vertex list on the CPU, uploads it once per depth
// change, and draws each configured vertex range as one instance.

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::{
    event::{Event as WinitEvent, WindowEvent, ElementState, KeyEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use gasket::engine::camera::Camera;
use gasket::engine::config::AppConfig;
use gasket::engine::controls::{ControlPanel, PanelStats};
use gasket::engine::input::{DepthSettings, InputState};
use gasket::engine::logging::{init_logging, LoggingConfig};
use gasket::engine::scene::{Scene, SceneKind};
use gasket::engine::{DrawInstance, GpuVertex};

// ============================================================================
// UNIFORM DATA (camera only)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

impl Uniforms {
    fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

// ============================================================================
// GPU SCENE BUFFERS
// ============================================================================

/// Vertex and instance buffers for one generation pass.
/// Replaced wholesale whenever the scene is rebuilt.
struct SceneBuffers {
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
}

impl SceneBuffers {
    fn upload(device: &wgpu::Device, scene: &Scene) -> Self {
        let vertices: Vec<GpuVertex> = scene.vertices.gpu_vertices();
        let instances: Vec<DrawInstance> = scene.instances();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gasket Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Draw Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self { vertex_buffer, instance_buffer }
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    app: AppConfig,
    camera: Camera,
    input: InputState,
    panel: ControlPanel,
    scene: Scene,
    buffers: SceneBuffers,
}

impl State {
    async fn new(window: Arc<Window>, app: AppConfig) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?} on {}",
            config.width,
            config.height,
            surface_format,
            adapter.get_info().name,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Gasket Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniforms = Uniforms::new();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), DrawInstance::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Generated faces keep whatever winding their corners had.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let scene = Scene::build(app.scene, &app.gasket, &app.depths)
            .context("failed to build initial scene")?;
        let buffers = SceneBuffers::upload(&device, &scene);

        let panel = ControlPanel::new(&window, &device, config.format, &app.depths);
        let mut input = InputState::new();
        input.window_size = (size.width, size.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            app,
            camera: Camera::new(),
            input,
            panel,
            scene,
            buffers,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Regenerate the scene for `kind` at `depths` and replace the GPU buffers.
    /// The app only adopts `kind` and `depths` if the build succeeds; on
    /// failure the previous scene stays on screen and the panel is reset to
    /// the depths it was built from.
    fn rebuild_scene(&mut self, kind: SceneKind, depths: DepthSettings) {
        match Scene::rebuild(&mut self.app, kind, depths) {
            Ok(scene) => {
                self.buffers = SceneBuffers::upload(&self.device, &scene);
                self.scene = scene;
                self.panel.sync_depths(&self.app.depths);
            }
            Err(e) => {
                log::error!("scene rebuild failed: {e}");
                self.panel.sync_depths(&self.app.depths);
                self.panel.show_error(e.to_string());
            }
        }
    }

    /// Apply this frame's keyboard shortcuts.
    fn update(&mut self) {
        if self.input.was_pressed(KeyCode::F1) {
            self.panel.toggle();
        }

        let mut kind = self.app.scene;
        let mut depths = self.app.depths;
        let mut rebuild = false;
        if self.input.was_pressed(KeyCode::Tab) {
            kind = kind.toggled();
            rebuild = true;
        }
        if kind == SceneKind::Gasket && self.input.apply_depth_keys(&mut depths) {
            rebuild = true;
        }
        if rebuild {
            self.rebuild_scene(kind, depths);
        }

        self.input.end_frame();
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_proj = if self.scene.kind.uses_camera() {
            let aspect = self.size.width as f32 / self.size.height as f32;
            self.camera.view_projection(aspect)
        } else {
            Mat4::IDENTITY
        };
        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.app.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.buffers.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.buffers.instance_buffer.slice(..));

            // One draw per range; instance i carries that range's translation and colour.
            for (i, draw) in self.scene.draws.iter().enumerate() {
                let i = i as u32;
                render_pass.draw(draw.vertices.clone(), i..i + 1);
            }
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        let stats = PanelStats {
            vertex_count: self.scene.vertices.vertex_count(),
            draw_count: self.scene.draws.len(),
            resolution: (self.size.width, self.size.height),
        };
        let mut depths = self.app.depths;
        let outcome = self.panel.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            &mut depths,
            self.app.scene,
            &stats,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if outcome.scene != self.app.scene || outcome.depths_changed {
            self.rebuild_scene(outcome.scene, depths);
        }

        Ok(())
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<()> {
    init_logging(&LoggingConfig::default());
    let app = AppConfig::from_env();

    let event_loop = EventLoop::new().context("failed to create event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title(app.window_title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(app.window_size.0, app.window_size.1));

    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    let mut state = pollster::block_on(State::new(window.clone(), app))?;

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let response = state.panel.handle_window_event(&window, event);
                if response.repaint {
                    window.request_redraw();
                }
                // Keys typed into a depth field are not shortcuts.
                if !response.consumed {
                    state.input.process_event(event);
                }

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size)
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("surface out of memory, exiting");
                                control_flow.exit();
                            }
                            Err(e) => log::warn!("dropped frame: {e:?}"),
                        }
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
