use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use morphscene_common::SceneConfig;
use morphscene_input::{Action, KeyBindings};
use morphscene_kernel::FrameContext;
use morphscene_render_wgpu::{OrbitCamera, SceneRenderer};
use morphscene_tools::{FrameInspector, FrameTimer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "morphscene-desktop", about = "Particle morph and animated character")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Application state.
struct AppState {
    scene: FrameContext,
    camera: OrbitCamera,
    bindings: KeyBindings,
    timer: FrameTimer,
    show_panel: bool,
    dragging: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: FrameContext) -> Self {
        let camera = OrbitCamera::with_target(Vec3::from_array(scene.config().camera_target));
        Self {
            scene,
            camera,
            bindings: KeyBindings::default(),
            timer: FrameTimer::new(120),
            show_panel: true,
            dragging: false,
            last_frame: Instant::now(),
        }
    }

    fn handle_text(&mut self, text: &str) {
        let action = self.bindings.resolve_text(text);
        if action != Action::Noop {
            tracing::debug!(?action, "key");
            morphscene_input::apply(&mut self.scene, action);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = FrameInspector::summary(&self.scene);
        let mut pressed = Vec::new();

        egui::SidePanel::left("controls")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Morph Scene");
                ui.separator();
                ui.horizontal(|ui| {
                    let walking = self.scene.is_walking();
                    if ui.button(Action::ToggleWalk.label(walking)).clicked() {
                        pressed.push(Action::ToggleWalk);
                    }
                    if ui.button(Action::Jump.label(walking)).clicked() {
                        pressed.push(Action::Jump);
                    }
                });
                ui.separator();
                ui.label(format!("State: {}", summary.state));
                ui.label(format!(
                    "Morph: {:.2} ({:?}, step {:.3})",
                    summary.mix_value,
                    summary.direction,
                    self.scene.morph().step_size()
                ));
                ui.label(format!("Walk offset: {:.2}", summary.walk_position));
                if let Some(frozen) = summary.frozen_for {
                    ui.label(format!("Jump cooldown: {frozen:.2}s"));
                }
                ui.label(format!("Frame: {}  t={:.1}s", summary.frame, summary.time));
                ui.label(format!("FPS: {:.0}", self.timer.fps()));
                ui.separator();
                ui.small("W: Walk | Space: Jump | LMB drag: Orbit | Wheel: Zoom | F1: Panel");
            });

        for action in pressed {
            morphscene_input::apply(&mut self.scene, action);
        }
    }
}

/// Window and GPU resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: SceneRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn create(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        scene: &FrameContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Morph Scene")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow::anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("morphscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = SceneRenderer::new(&device, surface_format, config.width, config.height);
        renderer.upload_particles(&device, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(scene: FrameContext) -> Self {
        Self {
            state: AppState::new(scene),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.state.last_frame;
        self.state.last_frame = now;
        self.state.timer.record(elapsed);
        // Uncapped: cooldowns and clip time follow elapsed real time.
        let dt = elapsed.as_secs_f32();
        self.state.scene.update(dt);
        for event in self.state.scene.drain_events() {
            tracing::trace!(?event, "frame event");
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.scene,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::create(event_loop, &self.egui_ctx, &self.state.scene) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.scene.teardown();
                if let Some(gpu) = &mut self.gpu {
                    gpu.renderer.release_particles();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if event.physical_key
                    == winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::F1)
                {
                    self.state.show_panel = !self.state.show_panel;
                } else if let Some(text) = event.text.as_deref() {
                    self.state.handle_text(text);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.dragging {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("morphscene-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let scene = FrameContext::build(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
