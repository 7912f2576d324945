//! Window presentation.
//!
//! [`run_display`] opens a fixed-size window, converts every decoded frame to
//! RGBA, uploads it into a GPU texture and presents it, replacing the previous
//! frame. One frame is decoded per event-loop iteration, so window events are
//! polled between frames: closing the window or pressing Escape ends the run
//! early, and the run ends by itself once the input is exhausted.
//!
//! With an overlay image configured, the video is drawn into the top-left
//! quadrant and the overlay into the bottom-right quadrant.
//!
//! Only one event loop may exist per process, so `run_display` can be called
//! at most once.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    configuration::{PipelineOptions, TargetFormat},
    error::FramepeekError,
    frame::FrameView,
    media::MediaFile,
    pipeline::{FramePipeline, RunSummary},
};

/// Default window width in pixels.
pub const DEFAULT_WINDOW_WIDTH: u32 = 640;
/// Default window height in pixels.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;

const DEFAULT_TITLE: &str = "framepeek";

/// Window settings for [`run_display`].
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    width: u32,
    height: u32,
    title: String,
    overlay: Option<PathBuf>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
            overlay: None,
        }
    }
}

impl DisplayOptions {
    /// A 640x480 window without overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window's inner size. Zero dimensions are clamped to 1.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Composite a static image, decoded once from `path`, next to the video.
    #[must_use]
    pub fn with_overlay(mut self, path: impl AsRef<Path>) -> Self {
        self.overlay = Some(path.as_ref().to_path_buf());
        self
    }

    /// Configured window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Configured overlay image path.
    pub fn overlay(&self) -> Option<&Path> {
        self.overlay.as_deref()
    }
}

/// Outcome of a [`run_display`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplaySummary {
    /// Number of frames presented to the window.
    pub frames_presented: u64,
    /// Whether the user closed the window before the input ended.
    pub closed_by_user: bool,
    /// Pipeline counters at the end of the run.
    pub run: RunSummary,
}

/// A rectangle of the window, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    /// Left edge, measured from the window's left border.
    pub(crate) x: f32,
    /// Top edge, measured from the window's top border.
    pub(crate) y: f32,
    /// Width, at least 1.
    pub(crate) width: f32,
    /// Height, at least 1.
    pub(crate) height: f32,
}

/// Where the video (and the overlay, if any) are drawn in a window.
pub(crate) fn layout(
    window_width: u32,
    window_height: u32,
    with_overlay: bool,
) -> (Viewport, Option<Viewport>) {
    let width = window_width.max(1) as f32;
    let height = window_height.max(1) as f32;

    if !with_overlay {
        let full = Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
        };
        return (full, None);
    }

    let half_width = (width / 2.0).floor().max(1.0);
    let half_height = (height / 2.0).floor().max(1.0);
    let video = Viewport {
        x: 0.0,
        y: 0.0,
        width: half_width,
        height: half_height,
    };
    let overlay = Viewport {
        x: half_width,
        y: half_height,
        width: (width - half_width).max(1.0),
        height: (height - half_height).max(1.0),
    };
    (video, Some(overlay))
}

/// Decode `media`'s video stream and present every frame in a window.
///
/// The pipeline always converts to [`TargetFormat::Rgba`]; the remaining
/// `options` apply unchanged. The overlay image, if configured, is decoded
/// before the window opens.
///
/// # Errors
///
/// - [`FramepeekError::ImageError`] if the overlay cannot be decoded.
/// - Any error from [`MediaFile::pipeline`] or from decoding.
/// - [`FramepeekError::DisplayError`] if the window, surface, or GPU device
///   cannot be created, or presenting fails.
pub fn run_display(
    media: &mut MediaFile,
    options: &PipelineOptions,
    display: &DisplayOptions,
) -> Result<DisplaySummary, FramepeekError> {
    let overlay = display.overlay().map(load_overlay).transpose()?;

    let options = options.clone().with_target_format(TargetFormat::Rgba);
    let pipeline = media.pipeline(&options)?;

    let event_loop = EventLoop::new()
        .map_err(|error| FramepeekError::DisplayError(format!("event loop: {error}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut presenter = Presenter {
        pipeline,
        display: display.clone(),
        overlay,
        window: None,
        renderer: None,
        playback: Playback::default(),
        closed_by_user: false,
        error: None,
    };

    event_loop
        .run_app(&mut presenter)
        .map_err(|error| FramepeekError::DisplayError(format!("event loop: {error}")))?;

    if let Some(error) = presenter.error {
        return Err(error);
    }

    let summary = DisplaySummary {
        frames_presented: presenter.playback.frames_presented,
        closed_by_user: presenter.closed_by_user,
        run: presenter.pipeline.summary(),
    };
    log::info!(
        "Presented {} frame(s){}",
        summary.frames_presented,
        if summary.closed_by_user {
            " (closed by user)"
        } else {
            ""
        }
    );
    Ok(summary)
}

fn load_overlay(path: &Path) -> Result<RgbaImage, FramepeekError> {
    let image = image::open(path)?.to_rgba8();
    log::debug!(
        "Loaded overlay {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Something a decoded frame can be shown on.
trait FrameTarget {
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), FramepeekError>;
}

/// Frame-by-frame progress of a display run, independent of the window.
#[derive(Debug, Default)]
struct Playback {
    frames_presented: u64,
    finished: bool,
}

impl Playback {
    /// Pull the next frame from `pipeline` and hand it to `target`.
    ///
    /// Returns `Ok(false)` once the input is exhausted or the run was
    /// already finished. A frame counts as presented only if `target`
    /// accepted it.
    fn advance(
        &mut self,
        pipeline: &mut FramePipeline<'_>,
        target: &mut dyn FrameTarget,
    ) -> Result<bool, FramepeekError> {
        if self.finished {
            return Ok(false);
        }
        match pipeline.next_frame()? {
            Some(frame) => {
                target.present(&frame)?;
                self.frames_presented += 1;
                Ok(true)
            }
            None => {
                self.finished = true;
                Ok(false)
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

struct Presenter<'a> {
    pipeline: FramePipeline<'a>,
    display: DisplayOptions,
    overlay: Option<RgbaImage>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    playback: Playback,
    closed_by_user: bool,
    error: Option<FramepeekError>,
}

impl Presenter<'_> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: FramepeekError) {
        log::error!("Stopping display: {error}");
        self.error = Some(error);
        self.playback.finish();
        event_loop.exit();
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.closed_by_user = true;
        self.playback.finish();
        event_loop.exit();
    }

    /// Decode and present one frame.
    fn step(&mut self, event_loop: &ActiveEventLoop) {
        if self.playback.finished {
            return;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match self.playback.advance(&mut self.pipeline, renderer) {
            Ok(true) => (),
            Ok(false) => {
                log::debug!("Input exhausted, closing window");
                event_loop.exit();
            }
            Err(error) => self.fail(event_loop, error),
        }
    }
}

impl ApplicationHandler for Presenter<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.display.window_size();
        let attributes = Window::default_attributes()
            .with_title(self.display.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                self.fail(
                    event_loop,
                    FramepeekError::DisplayError(format!("window: {error}")),
                );
                return;
            }
        };

        match Renderer::new(window.clone(), self.overlay.as_ref()) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.close(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.step(event_loop);
    }
}

/// A sampled RGBA texture with its bind group.
struct UploadedTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl UploadedTexture {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
            ],
        });

        Self {
            texture,
            bind_group,
            width,
            height,
        }
    }

    /// Copy `height` rows of `bytes_per_row` bytes into the texture.
    fn write(&self, queue: &wgpu::Queue, data: &[u8], bytes_per_row: u32) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    texture_format: wgpu::TextureFormat,
    video: Option<UploadedTexture>,
    overlay: Option<UploadedTexture>,
}

impl Renderer {
    fn new(window: Arc<Window>, overlay: Option<&RgbaImage>) -> Result<Self, FramepeekError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .map_err(|error| FramepeekError::DisplayError(format!("surface: {error}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|error| FramepeekError::DisplayError(format!("adapter: {error}")))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("framepeek_device"),
            ..Default::default()
        }))
        .map_err(|error| FramepeekError::DisplayError(format!("device: {error}")))?;

        let capabilities = surface.get_capabilities(&adapter);
        let surface_format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| {
                FramepeekError::DisplayError("surface reports no formats".to_string())
            })?;

        // Decoded pixels are sRGB-encoded; sample them as such when the
        // surface re-encodes on write.
        let texture_format = if surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("frame_shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(FRAME_SHADER)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("frame_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("frame_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            cache: None,
            multiview_mask: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let overlay = overlay.map(|image| {
            let texture = UploadedTexture::new(
                &device,
                &bind_group_layout,
                &sampler,
                texture_format,
                image.width().max(1),
                image.height().max(1),
                "overlay_texture",
            );
            texture.write(&queue, image.as_raw(), image.width() * 4);
            texture
        });

        log::debug!(
            "Renderer ready: surface {surface_format:?} {}x{}, texture {texture_format:?}",
            config.width,
            config.height,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            texture_format,
            video: None,
            overlay,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    fn acquire(&mut self) -> Result<wgpu::SurfaceTexture, FramepeekError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture().map_err(|error| {
                    FramepeekError::DisplayError(format!("swapchain acquire failed: {error}"))
                })
            }
            Err(error) => Err(FramepeekError::DisplayError(format!(
                "swapchain acquire failed: {error}"
            ))),
        }
    }
}

impl FrameTarget for Renderer {
    /// Upload `frame` and present it, replacing whatever was shown before.
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), FramepeekError> {
        if frame.format() != TargetFormat::Rgba {
            return Err(FramepeekError::DisplayError(format!(
                "cannot upload {:?} frames",
                frame.format()
            )));
        }

        let output = self.acquire()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (width, height) = (frame.width().max(1), frame.height().max(1));
        let needs_texture = self
            .video
            .as_ref()
            .is_none_or(|texture| texture.width != width || texture.height != height);
        if needs_texture {
            self.video = Some(UploadedTexture::new(
                &self.device,
                &self.bind_group_layout,
                &self.sampler,
                self.texture_format,
                width,
                height,
                "video_texture",
            ));
        }
        let Some(video) = self.video.as_ref() else {
            return Ok(());
        };

        // The frame view guarantees `stride * (height - 1) + row_len` bytes.
        video.write(&self.queue, frame.data(), frame.stride() as u32);

        let (video_viewport, overlay_viewport) =
            layout(self.config.width, self.config.height, self.overlay.is_some());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline);
            draw_into(&mut render_pass, &video.bind_group, video_viewport);

            if let (Some(overlay), Some(viewport)) = (self.overlay.as_ref(), overlay_viewport) {
                draw_into(&mut render_pass, &overlay.bind_group, viewport);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

fn draw_into(render_pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup, viewport: Viewport) {
    render_pass.set_viewport(
        viewport.x,
        viewport.y,
        viewport.width,
        viewport.height,
        0.0,
        1.0,
    );
    render_pass.set_bind_group(0, bind_group, &[]);
    // One triangle covering the viewport.
    render_pass.draw(0..3, 0..1);
}

const FRAME_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    out.position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

@group(0) @binding(0) var frame_sampler: sampler;
@group(0) @binding(1) var frame_texture: texture_2d<f32>;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_texture, frame_sampler, in.uv);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_VIDEO: &str = "tests/fixtures/short_video.mp4";

    /// Records the size of every frame it is shown.
    #[derive(Default)]
    struct RecordingTarget {
        shown: Vec<(u32, u32)>,
    }

    impl FrameTarget for RecordingTarget {
        fn present(&mut self, frame: &FrameView<'_>) -> Result<(), FramepeekError> {
            self.shown.push((frame.width(), frame.height()));
            Ok(())
        }
    }

    struct RejectingTarget;

    impl FrameTarget for RejectingTarget {
        fn present(&mut self, _frame: &FrameView<'_>) -> Result<(), FramepeekError> {
            Err(FramepeekError::DisplayError("rejected".to_string()))
        }
    }

    fn rgba_options() -> PipelineOptions {
        PipelineOptions::new().with_target_format(TargetFormat::Rgba)
    }

    #[test]
    fn playback_presents_every_decoded_frame() {
        if !Path::new(SHORT_VIDEO).exists() {
            return;
        }
        let mut media = MediaFile::open(SHORT_VIDEO).expect("Failed to open short video");
        let mut pipeline = media.pipeline(&rgba_options()).expect("Failed to build pipeline");
        let mut target = RecordingTarget::default();
        let mut playback = Playback::default();

        while playback
            .advance(&mut pipeline, &mut target)
            .expect("Playback failed")
        {}

        assert!(playback.finished);
        assert_eq!(playback.frames_presented, 3);
        assert_eq!(playback.frames_presented, pipeline.summary().frames_decoded);
        assert_eq!(target.shown, vec![(160, 120); 3]);

        // A finished run does not touch the pipeline again.
        let again = playback
            .advance(&mut pipeline, &mut target)
            .expect("Advance after finish failed");
        assert!(!again);
        assert_eq!(target.shown.len(), 3);
    }

    #[test]
    fn rejected_frame_is_not_counted() {
        if !Path::new(SHORT_VIDEO).exists() {
            return;
        }
        let mut media = MediaFile::open(SHORT_VIDEO).expect("Failed to open short video");
        let mut pipeline = media.pipeline(&rgba_options()).expect("Failed to build pipeline");
        let mut playback = Playback::default();

        let result = playback.advance(&mut pipeline, &mut RejectingTarget);
        assert!(matches!(result, Err(FramepeekError::DisplayError(_))));
        assert_eq!(playback.frames_presented, 0);
        assert!(!playback.finished);
        assert_eq!(pipeline.summary().frames_decoded, 1);
    }

    #[test]
    fn finished_playback_stays_finished() {
        let mut playback = Playback::default();
        playback.finish();
        assert!(playback.finished);
        assert_eq!(playback.frames_presented, 0);
    }

    #[test]
    fn video_fills_window_without_overlay() {
        let (video, overlay) = layout(640, 480, false);
        assert_eq!(
            video,
            Viewport {
                x: 0.0,
                y: 0.0,
                width: 640.0,
                height: 480.0
            }
        );
        assert!(overlay.is_none());
    }

    #[test]
    fn overlay_takes_opposite_quadrant() {
        let (video, overlay) = layout(641, 481, true);
        let overlay = overlay.expect("overlay viewport");

        assert_eq!((video.x, video.y), (0.0, 0.0));
        assert_eq!((video.width, video.height), (320.0, 240.0));
        assert_eq!((overlay.x, overlay.y), (320.0, 240.0));
        assert_eq!(overlay.x + overlay.width, 641.0);
        assert_eq!(overlay.y + overlay.height, 481.0);
    }

    #[test]
    fn degenerate_window_keeps_nonzero_viewports() {
        let (video, overlay) = layout(0, 1, true);
        let overlay = overlay.expect("overlay viewport");
        assert!(video.width >= 1.0 && video.height >= 1.0);
        assert!(overlay.width >= 1.0 && overlay.height >= 1.0);
    }

    #[test]
    fn display_options_defaults_and_builder() {
        let options = DisplayOptions::new();
        assert_eq!(options.window_size(), (640, 480));
        assert!(options.overlay().is_none());

        let options = options
            .with_window_size(0, 200)
            .with_title("clip")
            .with_overlay("logo.png");
        assert_eq!(options.window_size(), (1, 200));
        assert_eq!(options.title, "clip");
        assert_eq!(options.overlay(), Some(Path::new("logo.png")));
    }

    #[test]
    fn missing_overlay_is_an_image_error() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let result = load_overlay(&directory.path().join("missing.png"));
        assert!(matches!(result, Err(FramepeekError::ImageError(_))));
    }

    #[test]
    fn overlay_decodes_to_rgba() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let path = directory.path().join("overlay.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .expect("write overlay");

        let overlay = load_overlay(&path).expect("load overlay");
        assert_eq!(overlay.dimensions(), (4, 2));
        assert_eq!(overlay.get_pixel(3, 1).0, [10, 20, 30, 255]);
    }
}
