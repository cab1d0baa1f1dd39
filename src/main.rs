//! Sonosphere - an icosphere that breathes with the music
//!
//! A subdivided sphere is displaced by layered noise whose strength follows
//! the loudness of the track being played, in front of a cube and a
//! screen-space backdrop.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use sonosphere::audio::{AudioSystem, Silence};
use sonosphere::camera::Camera;
use sonosphere::cli::Args;
use sonosphere::driver::FrameDriver;
use sonosphere::input::{command_for_key, wheel_zoom, MouseState};
use sonosphere::params::{
    AnalyserConfig, CameraConfig, Command, Controls, Effect, PlaybackConfig, RenderConfig,
};
use sonosphere::rendering::WgpuBackend;
use sonosphere::stats::FrameStats;
use sonosphere::Result;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    driver: Option<FrameDriver<WgpuBackend>>,

    // Audio; `None` when no device could be opened
    audio: Option<AudioSystem>,

    // Configuration
    render_config: RenderConfig,
    camera_config: CameraConfig,
    playback: PlaybackConfig,
    initial_controls: Controls,

    mouse: MouseState,
    stats: FrameStats,
    start_time: Instant,

    /// Set when startup failed after the event loop began
    failed: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let initial_controls = args.controls()?;
        let render_config = args.render_config()?;
        let camera_config = args.camera_config()?;
        let playback = args.playback_config(&initial_controls);

        Ok(Self {
            window: None,
            driver: None,
            audio: None,
            stats: FrameStats::new(render_config.stats_interval_s),
            render_config,
            camera_config,
            playback,
            initial_controls,
            mouse: MouseState::default(),
            start_time: Instant::now(),
            failed: false,
        })
    }

    /// Create the window, GPU context and programs
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Sonosphere")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attributes).map_err(|e| {
            sonosphere::Error::ContextUnavailable(format!("failed to create window: {}", e))
        })?);

        let backend = pollster::block_on(WgpuBackend::new(Arc::clone(&window)))?;
        let (width, height) = backend.size();

        let camera = Camera::new(
            self.camera_config.eye,
            self.camera_config.target,
            &self.camera_config,
        );
        let mut driver = FrameDriver::new(
            backend,
            camera,
            self.initial_controls.clone(),
            self.render_config.clone(),
        )?;
        driver.resize(width, height);
        driver.start();

        self.audio = match AudioSystem::new(&self.playback, AnalyserConfig::default()) {
            Ok(audio) => Some(audio),
            Err(e) => {
                log::warn!("{}; continuing without audio", e);
                None
            }
        };

        log::info!("Sonosphere is running! Press ESC to quit");

        window.request_redraw();
        self.window = Some(window);
        self.driver = Some(driver);
        Ok(())
    }

    fn handle_command(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        log::debug!("Command: {:?}", command);
        match driver.controls_mut().apply(command) {
            Effect::None => {}
            Effect::ReloadScene => driver.load_scene(),
            Effect::SyncAudio => {
                if let Some(audio) = &self.audio {
                    audio.set_volume(driver.controls().volume);
                    audio.set_paused(driver.controls().pause);
                }
            }
            Effect::ResumeAudio => {
                if let Some(audio) = &self.audio {
                    audio.set_volume(driver.controls().volume);
                    audio.set_paused(false);
                }
            }
            Effect::Quit => {
                driver.stop();
                event_loop.exit();
            }
        }
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };
        if !driver.is_running() {
            return;
        }

        let timestamp_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        match self.audio.as_mut() {
            Some(audio) => driver.frame(timestamp_ms, audio),
            None => driver.frame(timestamp_ms, &mut Silence),
        };
        self.stats.record(timestamp_ms);

        if driver.is_running() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            self.failed = true;
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(driver) = self.driver.as_mut() {
                    driver.stop();
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(command) = command_for_key(code) {
                    self.handle_command(event_loop, command);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(driver) = self.driver.as_mut() {
                    driver.backend_mut().resize(size.width, size.height);
                    driver.resize(size.width, size.height);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(driver) = self.driver.as_mut() {
                    let distance = driver.camera().distance();
                    if let Some(motion) =
                        self.mouse
                            .moved(position.x, position.y, &self.camera_config, distance)
                    {
                        motion.apply(driver.camera_mut());
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(driver) = self.driver.as_mut() {
                    wheel_zoom(delta, &self.camera_config).apply(driver.camera_mut());
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    log::info!("Sonosphere - audio-reactive icosphere");

    let mut app = match App::new(&args) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
    if app.failed {
        std::process::exit(1);
    }
}
