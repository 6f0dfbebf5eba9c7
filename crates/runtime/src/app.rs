use crate::clock::FrameClock;
use crate::options::RendererOptions;
use crate::overlay::{self, OverlayInfo};
use crate::stage::{Stage, sync_camera};
use egui::Context as EguiContext;
use stagecraft_common::Viewport;
use stagecraft_input::{PointerButton, PointerEvent};
use stagecraft_render_wgpu::{FrameStats, RenderSettings, WgpuRenderer};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixels of trackpad scrolling treated as one wheel notch.
const PIXELS_PER_LINE: f64 = 100.0;

/// Errors that stop the animation loop.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("cannot create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("cannot create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no GPU adapter compatible with the window surface")]
    NoAdapter,
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("cannot create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Open a window and drive `stage` until the window closes.
///
/// Each frame the stage is updated with the loop time, then drawn. Window
/// resizes resync the camera before the next draw.
pub fn run<S: Stage>(stage: S, options: RendererOptions) -> Result<(), RuntimeError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(stage, options);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Drawing buffer for a window of `physical` size, `None` while minimized.
pub fn buffer_size(
    physical: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: Option<f64>,
) -> Option<Viewport> {
    if physical.width == 0 || physical.height == 0 {
        return None;
    }
    let logical: LogicalSize<f64> = physical.to_logical(scale_factor);
    let buffer = Viewport::drawing_buffer(logical.width, logical.height, scale_factor, max_pixel_ratio);
    Some(Viewport::new(
        buffer.width.min(physical.width),
        buffer.height.min(physical.height),
    ))
}

/// Wheel event for a winit scroll delta. Scrolling up gives a negative delta.
pub fn wheel_event(delta: MouseScrollDelta) -> Option<PointerEvent> {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(p) => p.y / PIXELS_PER_LINE,
    };
    (y != 0.0).then(|| PointerEvent::Wheel { delta: -y as f32 })
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    buffer: Viewport,
}

struct App<S: Stage> {
    stage: S,
    options: RendererOptions,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    clock: FrameClock,
    stats: FrameStats,
    show_overlay: bool,
    error: Option<RuntimeError>,
}

impl<S: Stage> App<S> {
    fn new(stage: S, options: RendererOptions) -> Self {
        Self {
            stage,
            options,
            gpu: None,
            egui_ctx: EguiContext::default(),
            clock: FrameClock::new(),
            stats: FrameStats::default(),
            show_overlay: false,
            error: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu, RuntimeError> {
        let attrs = Window::default_attributes()
            .with_title(self.stage.title())
            .with_inner_size(LogicalSize::new(
                self.options.window_width,
                self.options.window_height,
            ));
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
        .ok_or(RuntimeError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("stagecraft_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(RuntimeError::NoSurfaceFormat)?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if self.options.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let buffer = buffer_size(size, window.scale_factor(), self.options.max_pixel_ratio)
            .unwrap_or(Viewport::new(config.width, config.height));
        sync_camera(self.stage.camera_mut(), buffer);
        self.stage.resized(buffer);

        let mut renderer = WgpuRenderer::new(
            &device,
            surface_format,
            buffer.width,
            buffer.height,
            RenderSettings {
                clear_color: self.options.clear_color,
                exposure: self.options.exposure,
                tone_mapping: self.options.tone_mapping,
                sample_count: self.options.sample_count(),
            },
        );
        renderer.resize_scaled(
            &device,
            (buffer.width, buffer.height),
            (config.width, config.height),
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            width = buffer.width,
            height = buffer.height,
            "GPU initialized"
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
            buffer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let Some(buffer) = buffer_size(size, gpu.window.scale_factor(), self.options.max_pixel_ratio)
        else {
            return;
        };
        gpu.config.width = size.width;
        gpu.config.height = size.height;
        gpu.surface.configure(&gpu.device, &gpu.config);

        sync_camera(self.stage.camera_mut(), buffer);
        gpu.renderer.resize_scaled(
            &gpu.device,
            (buffer.width, buffer.height),
            (size.width, size.height),
        );
        gpu.buffer = buffer;
        self.stage.resized(buffer);
        tracing::debug!(width = buffer.width, height = buffer.height, "resized");
    }

    fn pointer(&mut self, event: PointerEvent) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let size = gpu.window.inner_size();
        self.stage
            .pointer(event, Viewport::new(size.width, size.height));
    }

    fn redraw(&mut self) {
        let frame = self.clock.tick();
        self.stage.update(frame.time_ms);

        let Some(gpu) = &mut self.gpu else {
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

        self.stats = gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            self.stage.scene(),
            self.stage.camera(),
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let show_overlay = self.show_overlay;
        let info = OverlayInfo {
            fps: self.clock.fps(),
            viewport: (gpu.buffer.width, gpu.buffer.height),
            scene: self.stage.scene(),
            camera: self.stage.camera(),
            stats: self.stats,
        };
        let title = self.stage.title();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_overlay {
                overlay::draw(ctx, title, &info);
            }
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

impl<S: Stage> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(err) => {
                tracing::error!("startup failed: {err}");
                self.error = Some(err);
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
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::F1 => {
                    self.show_overlay = !self.show_overlay;
                    tracing::debug!(visible = self.show_overlay, "overlay toggled");
                }
                _ => {}
            },
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = pointer_button(button) {
                    self.pointer(match state {
                        ElementState::Pressed => PointerEvent::Down(button),
                        ElementState::Released => PointerEvent::Up(button),
                    });
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer(PointerEvent::Moved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::CursorLeft { .. } => self.pointer(PointerEvent::Left),
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(event) = wheel_event(delta) {
                    self.pointer(event);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn buffer_follows_device_ratio_without_cap() {
        let buffer = buffer_size(PhysicalSize::new(2560, 1440), 2.0, None).unwrap();
        assert_eq!(buffer, Viewport::new(2560, 1440));
    }

    #[test]
    fn buffer_respects_ratio_cap() {
        let buffer = buffer_size(PhysicalSize::new(3000, 1500), 3.0, Some(2.0)).unwrap();
        assert_eq!(buffer, Viewport::new(2000, 1000));

        let below_cap = buffer_size(PhysicalSize::new(1280, 720), 1.0, Some(2.0)).unwrap();
        assert_eq!(below_cap, Viewport::new(1280, 720));
    }

    #[test]
    fn minimized_window_has_no_buffer() {
        assert_eq!(buffer_size(PhysicalSize::new(0, 0), 1.0, None), None);
        assert_eq!(buffer_size(PhysicalSize::new(800, 0), 2.0, Some(2.0)), None);
    }

    #[test]
    fn wheel_up_maps_to_negative_delta() {
        assert_eq!(
            wheel_event(MouseScrollDelta::LineDelta(0.0, 1.0)),
            Some(PointerEvent::Wheel { delta: -1.0 })
        );
        assert_eq!(
            wheel_event(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -50.0))),
            Some(PointerEvent::Wheel { delta: 0.5 })
        );
        assert_eq!(wheel_event(MouseScrollDelta::LineDelta(3.0, 0.0)), None);
    }

    #[test]
    fn mouse_buttons_map_to_pointer_buttons() {
        assert_eq!(pointer_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(pointer_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(pointer_button(MouseButton::Middle), Some(PointerButton::Middle));
        assert_eq!(pointer_button(MouseButton::Back), None);
    }
}
