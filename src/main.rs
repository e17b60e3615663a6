use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use splat_viewer::cli::Cli;
use splat_viewer::display::DisplaySurface;
use splat_viewer::frame::FrameClock;
use splat_viewer::{PointRenderer, ViewerSession};

type Result<T> = anyhow::Result<T>;

struct App {
    session: ViewerSession,
    renderer: PointRenderer,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    display: Option<DisplaySurface>,
    window_size: (u32, u32),
}

impl App {
    fn new(session: ViewerSession, window_size: (u32, u32)) -> Self {
        Self {
            session,
            renderer: PointRenderer::new(),
            clock: FrameClock::new(),
            window: None,
            display: None,
            window_size,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("Splat Viewer")
                    .with_resizable(false)
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.window_size.0,
                        self.window_size.1,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    eprintln!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let viewport = self.session.camera().viewport();
            let display = match pollster::block_on(DisplaySurface::new(window.clone(), viewport)) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Failed to initialize display: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            self.window = Some(window);
            self.display = Some(display);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(display), Some(window)) = (&mut self.display, &self.window) {
            if display.handle_event(window, &event) {
                return;
            }
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
            } => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let _frame = self.clock.tick();

                if let Err(e) = self.session.advance(&mut self.renderer) {
                    eprintln!("Render error: {}", e);
                    event_loop.exit();
                    return;
                }

                if let (Some(display), Some(window)) = (&mut self.display, &self.window) {
                    if let Err(e) = display.present(window, &mut self.session, self.clock.fps()) {
                        eprintln!("Present error: {}", e);
                    }
                }
            }
            event => self.session.input_mut().process_window_event(&event),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the frame loop without a window, for timing and smoke testing.
fn run_headless(mut session: ViewerSession, frames: u64) -> Result<()> {
    let mut renderer = PointRenderer::new();
    let mut clock = FrameClock::new();

    for _ in 0..frames {
        let frame = clock.tick();
        session.advance(&mut renderer)?;
        if frame.number % 100 == 0 {
            println!("frame {} ({:.1} fps)", frame.number, clock.fps());
        }
    }

    println!("rendered {} frames headless", frames);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let mut session = ViewerSession::new(&config);

    if let Some(path) = &cli.ply {
        println!("loading model file...");
        session.load_scene(path)?;
        println!("loading model file done.");
    }

    if let Some(frames) = cli.headless {
        return run_headless(session, frames);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(session, (config.width, config.height));

    println!("Splat Viewer - left-drag orbit, middle-drag pan, wheel zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
