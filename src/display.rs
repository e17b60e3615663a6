use std::sync::Arc;

use anyhow::Result;
use winit::window::Window;

use crate::camera::CameraMode;
use crate::controller::RenderMode;
use crate::descriptor::Viewport;
use crate::input::CameraEvent;
use crate::session::ViewerSession;

/// Presents the session's frame buffer on a winit window.
///
/// The buffer's [0,1] float samples are rescaled to bytes and uploaded to
/// an `Rgba8Unorm` texture, drawn as a fullscreen quad, with the egui
/// control overlay composited on top.
pub struct DisplaySurface {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    size: winit::dpi::PhysicalSize<u32>,
    viewport: Viewport,
    frame_texture: wgpu::Texture,
    render_pipeline: wgpu::RenderPipeline,
    render_bind_group: wgpu::BindGroup,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    upload: Vec<u8>,
    padded_bytes_per_row: u32,
}

impl DisplaySurface {
    pub async fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| anyhow::anyhow!("failed to find appropriate adapter"))?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);

        let frame_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Buffer Texture"),
            size: wgpu::Extent3d {
                width: viewport.width,
                height: viewport.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let frame_view = frame_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (render_pipeline, render_bind_group) =
            Self::create_render_pipeline(&device, &frame_view, surface_config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        // Texture uploads require rows padded to the wgpu alignment
        let unpadded = viewport.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded.div_ceil(align) * align;
        let upload = vec![0u8; (padded_bytes_per_row * viewport.height) as usize];

        Ok(Self {
            device,
            queue,
            surface,
            size,
            viewport,
            frame_texture,
            render_pipeline,
            render_bind_group,
            egui_renderer,
            egui_state,
            egui_ctx,
            upload,
            padded_bytes_per_row,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        frame_view: &wgpu::TextureView,
        surface_format: wgpu::TextureFormat,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Display Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("display.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("display_bind_group_layout"),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(frame_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("display_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Display Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Display Pipeline"),
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
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
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

        (pipeline, bind_group)
    }

    /// Give egui first crack at a window event; returns true if consumed.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Rescale the frame buffer to bytes and push it to the GPU texture.
    fn upload_frame(&mut self, session: &ViewerSession) {
        let data = session.controller().buffer().data();
        let width = self.viewport.width as usize;

        for y in 0..self.viewport.height as usize {
            let row_start = y * self.padded_bytes_per_row as usize;
            for x in 0..width {
                let src = (y * width + x) * 3;
                let dst = row_start + x * 4;
                self.upload[dst] = (data[src].clamp(0.0, 1.0) * 255.0) as u8;
                self.upload[dst + 1] = (data[src + 1].clamp(0.0, 1.0) * 255.0) as u8;
                self.upload[dst + 2] = (data[src + 2].clamp(0.0, 1.0) * 255.0) as u8;
                self.upload[dst + 3] = 255;
            }
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.upload,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.padded_bytes_per_row),
                rows_per_image: Some(self.viewport.height),
            },
            wgpu::Extent3d {
                width: self.viewport.width,
                height: self.viewport.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Present the current frame buffer plus the control overlay.
    pub fn present(
        &mut self,
        window: &Window,
        session: &mut ViewerSession,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.upload_frame(session);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Display Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.render_bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }

        // Overlay state is edited on copies inside the closure and applied
        // to the session afterwards
        let mut fovy = session.camera().fovy_deg() as f32;
        let fovy_before = fovy;
        let mut render_mode = session.controller().mode();
        let mut camera_mode = session.mode();
        let mut background = session.controller().background();
        let background_before = background;
        let mut dynamic_resolution = session.controller().dynamic_resolution;
        let point_count = session.scene().map_or(0, |s| s.len());
        let model_loaded = session.controller().model_loaded();
        let debug = session.controller().debug;
        let pose = session.camera().pose_for(camera_mode);
        let resolution = (self.viewport.width, self.viewport.height);

        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Control")
                .title_bar(true)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .default_width(260.0)
                .show(ctx, |ui| {
                    ui.heading(
                        egui::RichText::new(format!("{:.0} FPS", fps))
                            .size(28.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.monospace(format!("Resolution: {}x{}", resolution.0, resolution.1));
                    ui.monospace(format!("Points: {}", point_count));
                    if !model_loaded {
                        ui.label(
                            egui::RichText::new("no model loaded")
                                .color(egui::Color32::from_rgb(200, 150, 100)),
                        );
                    }

                    ui.add_space(5.0);
                    ui.separator();
                    ui.add_space(5.0);

                    ui.add(
                        egui::Slider::new(&mut fovy, 1.0..=120.0)
                            .suffix(" deg")
                            .text("FoV (vertical)"),
                    );

                    egui::ComboBox::from_label("mode")
                        .selected_text(render_mode.label())
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut render_mode, RenderMode::Image, "image");
                            ui.selectable_value(&mut render_mode, RenderMode::Depth, "depth");
                        });

                    egui::ComboBox::from_label("camera")
                        .selected_text(format!("{camera_mode:?}"))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut camera_mode, CameraMode::Free, "Free");
                            ui.selectable_value(&mut camera_mode, CameraMode::Orbit, "Orbit");
                        });

                    ui.horizontal(|ui| {
                        ui.color_edit_button_rgb(&mut background);
                        ui.label("Background Color");
                    });

                    ui.checkbox(&mut dynamic_resolution, "dynamic resolution");

                    if debug {
                        ui.add_space(5.0);
                        ui.separator();
                        ui.label(
                            egui::RichText::new("Camera Pose")
                                .size(14.0)
                                .color(egui::Color32::from_rgb(100, 200, 100)),
                        );
                        for row in 0..4 {
                            ui.monospace(format!(
                                "{:7.3} {:7.3} {:7.3} {:7.3}",
                                pose.col(0)[row],
                                pose.col(1)[row],
                                pose.col(2)[row],
                                pose.col(3)[row]
                            ));
                        }
                    }
                });
        });

        // FOV changes travel through the input queue like any other
        // camera mutation, so they apply at the top of the next frame
        if fovy != fovy_before {
            session
                .input_mut()
                .push(CameraEvent::SetFov { deg: fovy as f64 });
        }
        session.controller_mut().set_mode(render_mode);
        session.set_mode(camera_mode);
        if background != background_before {
            session.controller_mut().set_background(background);
        }
        session.controller_mut().dynamic_resolution = dynamic_resolution;

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
