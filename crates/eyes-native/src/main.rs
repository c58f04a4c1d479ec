use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use wgpu::util::DeviceExt;
use winit::keyboard::{Key, NamedKey};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use eyes_core::constants::{MATRIX_HEIGHT, MATRIX_PIXELS, MATRIX_WIDTH, TILT_DIVISOR};
use eyes_core::{
    BatteryStatus, Clock, DisplaySink, EyesConfig, EyesRuntime, Frame,
    MonotonicClock, TimelineRecorder, ToyEvent,
};
use glam::Mat4;

static MATRIX_WGSL: &str = include_str!("../shaders/matrix.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    cell: [f32; 2],
    intensity: f32,
    _pad: f32,
}

/// Stands in for the device's glyph matrix: keeps the latest frame for the
/// window and optionally records the session.
struct PreviewSink {
    shared: Rc<RefCell<Frame>>,
    recorder: Option<(TimelineRecorder, PathBuf)>,
}

impl DisplaySink for PreviewSink {
    fn submit(&mut self, frame: &Frame) -> eyes_core::Result<()> {
        self.shared.replace(frame.clone());
        if let Some((recorder, _)) = self.recorder.as_mut() {
            recorder.submit(frame)?;
        }
        Ok(())
    }

    fn release(&mut self) -> eyes_core::Result<()> {
        let Some((mut recorder, path)) = self.recorder.take() else {
            return Ok(());
        };
        recorder.release()?;
        let timeline = recorder.into_timeline();
        timeline.save(&path)?;
        log::info!(
            "[record] wrote {} frames ({} ms) to {}",
            timeline.len(),
            timeline.total_duration_ms(),
            path.display()
        );
        Ok(())
    }
}

struct Args {
    seed: Option<u64>,
    record: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        seed: None,
        record: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                let v = it
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed needs a value"))?;
                args.seed = Some(v.parse()?);
            }
            "--record" => {
                let v = it
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--record needs a path"))?;
                args.record = Some(PathBuf::from(v));
            }
            other => anyhow::bail!("unknown argument '{other}' (expected --seed N, --record PATH)"),
        }
    }
    Ok(args)
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    quad_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    shared: Rc<RefCell<Frame>>,
}

impl<'w> GpuState<'w> {
    async fn new(
        window: &'w winit::window::Window,
        shared: Rc<RefCell<Frame>>,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("matrix"),
            source: wgpu::ShaderSource::Wgsl(MATRIX_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad vertices for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<InstanceData>() * MATRIX_PIXELS) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
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
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: one instance per matrix cell
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 1,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32,
                        offset: 8,
                        shader_location: 2,
                    },
                ],
            },
        ];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            quad_vb,
            instance_vb,
            bind_group,
            width: size.width.max(1),
            height: size.height.max(1),
            shared,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Orthographic projection of matrix space (x right, y down) centred in
    /// the window with a one-cell margin.
    fn view_proj(&self) -> [[f32; 4]; 4] {
        let aspect = self.width as f32 / self.height as f32;
        let half = MATRIX_WIDTH as f32 / 2.0 + 1.0;
        let (hx, hy) = if aspect >= 1.0 {
            (half * aspect, half)
        } else {
            (half, half / aspect)
        };
        let cx = MATRIX_WIDTH as f32 / 2.0;
        let cy = MATRIX_HEIGHT as f32 / 2.0;
        Mat4::orthographic_rh(cx - hx, cx + hx, cy + hy, cy - hy, -1.0, 1.0).to_cols_array_2d()
    }

    /// Window position mapped to a raw tilt sample; the window edges saturate
    /// the filter.
    fn cursor_tilt(&self, x: f64, y: f64) -> (f32, f32) {
        let nx = (x / self.width as f64) as f32 * 2.0 - 1.0;
        let ny = (y / self.height as f64) as f32 * 2.0 - 1.0;
        (nx * TILT_DIVISOR, ny * TILT_DIVISOR)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: self.view_proj(),
            }),
        );

        let instances: Vec<InstanceData> = {
            let matrix = self.shared.borrow();
            (0..MATRIX_PIXELS)
                .map(|i| {
                    let (x, y) = (i % MATRIX_WIDTH, i / MATRIX_WIDTH);
                    InstanceData {
                        cell: [x as f32, y as f32],
                        intensity: matrix.get(x, y) as f32 / 255.0,
                        _pad: 0.0,
                    }
                })
                .collect()
        };
        self.queue
            .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&instances));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
            rpass.draw(0..6, 0..MATRIX_PIXELS as u32);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn battery_preset(key: &str) -> Option<BatteryStatus> {
    let on_battery = |level| BatteryStatus {
        level,
        scale: 100,
        ..BatteryStatus::default()
    };
    match key {
        "1" => Some(on_battery(80)),
        "2" => Some(on_battery(25)),
        "3" => Some(on_battery(10)),
        "4" => Some(BatteryStatus {
            charging: true,
            plugged: true,
            ..on_battery(50)
        }),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = parse_args()?;
    let mut config = EyesConfig::default();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let shared = Rc::new(RefCell::new(Frame::new()));
    let recorder = args.record.map(|path| {
        log::info!("[record] recording to {}", path.display());
        (TimelineRecorder::new(config.frame_interval_ms as u32), path)
    });
    let sink = PreviewSink {
        shared: Rc::clone(&shared),
        recorder,
    };

    let clock = MonotonicClock::new();
    let mut runtime = EyesRuntime::new(config, sink, clock.now_ms())?;

    log::info!(
        "[keys] space: press (hold 0.7s to switch mode), c: change, a: always-on tick, \
         1-4: battery normal/low/critical/charging, esc: quit"
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Glyph Eyes (preview)")
        .with_inner_size(winit::dpi::LogicalSize::new(500.0, 500.0))
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window, Rc::clone(&shared)))?;
    runtime.start(clock.now_ms());

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            let (ax, ay) = state.cursor_tilt(position.x, position.y);
            runtime.on_tilt(ax, ay);
        }
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: key_state,
                            repeat,
                            ..
                        },
                    ..
                },
            ..
        } => {
            let now = clock.now_ms();
            let pressed = key_state == ElementState::Pressed;
            match logical_key.as_ref() {
                Key::Named(NamedKey::Escape) if pressed => elwt.exit(),
                Key::Named(NamedKey::Space) if !repeat => {
                    let event = if pressed {
                        ToyEvent::ActionDown
                    } else {
                        ToyEvent::ActionUp
                    };
                    runtime.handle_event(event, now);
                }
                Key::Character("c") if pressed => runtime.handle_event(ToyEvent::Change, now),
                Key::Character("a") if pressed => {
                    runtime.handle_event(ToyEvent::AlwaysOnTick, now)
                }
                Key::Character(k) if pressed => {
                    if let Some(status) = battery_preset(k) {
                        log::info!("[keys] battery {status:?}");
                        runtime.on_battery(status, now);
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            runtime.pump(clock.now_ms());
            match state.render() {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        Event::LoopExiting => runtime.shutdown(),
        _ => {}
    })?;
    Ok(())
}
