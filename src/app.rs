use crate::config::AppConfig;
use crate::renderer::{FrameView, PhaseRenderer};
use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use reflex_core::{Phase, Summary};
use reflex_experiment::{InputOutcome, ReactionStateMachine};
use reflex_timing::{Clock, DeadlineScheduler, SystemClock};
use std::sync::Arc;
use std::time::Instant;
use tiny_skia::Pixmap;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

type Machine = ReactionStateMachine<SystemClock, DeadlineScheduler<SystemClock>, ThreadRng>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    machine: Machine,
    renderer: Option<PhaseRenderer>,
    canvas: Option<Pixmap>,
    config: AppConfig,
    should_exit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let clock = SystemClock::detect();
        tracing::info!(source = ?clock.source(), "clock selected");
        let scheduler = DeadlineScheduler::new(clock.clone());
        let machine =
            ReactionStateMachine::new(config.reaction.clone(), clock, scheduler, rand::rng())?;

        Ok(Self {
            window: None,
            pixels: None,
            machine,
            renderer: None,
            canvas: None,
            config,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        tracing::info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            max_attempts = self.machine.config().max_attempts,
            "reaction time test starting; click or press SPACE, R resets, ESC exits"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Reaction Time Test")
            .with_inner_size(LogicalSize::new(960.0, 720.0))
            .with_min_inner_size(LogicalSize::new(320.0, 240.0));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();

        tracing::info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = window.scale_factor(),
            "window created"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.canvas = Pixmap::new(physical_size.width, physical_size.height);
        self.renderer = Some(PhaseRenderer::new(
            physical_size.width,
            physical_size.height,
        ));

        window.request_redraw();
        self.window = Some(window);
        self.refresh_title();
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer), Some(canvas)) =
            (&mut self.pixels, &self.renderer, &mut self.canvas)
        else {
            return Ok(());
        };

        let trend = self.machine.trend();
        let view = FrameView {
            phase: self.machine.phase(),
            trend: &trend,
            max_attempts: self.machine.config().max_attempts,
            complete: self.machine.is_complete(),
        };
        renderer.render_frame(canvas, &view)?;

        let frame = pixels.frame_mut();
        if frame.len() != canvas.data().len() {
            anyhow::bail!(
                "frame buffer is {} bytes, canvas is {}",
                frame.len(),
                canvas.data().len()
            );
        }
        frame.copy_from_slice(canvas.data());
        pixels.render()?;
        Ok(())
    }

    /// Pointer-down, tap or Space
    fn handle_press(&mut self) {
        // Input is suppressed here too once the session is full
        if self.machine.is_complete() {
            return;
        }
        match self.machine.on_user_input() {
            InputOutcome::Ignored => return,
            InputOutcome::TooEarly => tracing::info!("too soon"),
            InputOutcome::Recorded { elapsed_ms } => {
                tracing::info!(elapsed_ms, attempt = self.machine.attempts(), "result")
            }
            InputOutcome::Armed { .. } => {}
        }
        self.phase_changed();
    }

    fn handle_reset(&mut self) {
        self.machine.reset();
        self.phase_changed();
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        if let PhysicalKey::Code(code) = key {
            match code {
                KeyCode::Space => self.handle_press(),
                KeyCode::KeyR => self.handle_reset(),
                KeyCode::Escape => self.cleanup_and_exit(event_loop),
                _ => {}
            }
        }
    }

    fn phase_changed(&mut self) {
        self.refresh_title();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn refresh_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let title = window_title(
            self.machine.phase(),
            self.machine.last_elapsed_ms(),
            self.machine.summary(),
            self.machine.is_complete(),
        );
        window.set_title(&title);
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                tracing::error!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                tracing::error!("failed to resize buffer: {e}");
            }
        }
        self.canvas = Pixmap::new(new_size.width, new_size.height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
        tracing::debug!(width = new_size.width, height = new_size.height, "resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        let report = self.machine.report();
        if let Some(summary) = report.summary {
            tracing::info!(
                count = summary.count,
                mean_ms = summary.mean_ms,
                min_ms = summary.min_ms,
                max_ms = summary.max_ms,
                "final summary"
            );
        }
        match self.config.export_report(&report) {
            Ok(Some(path)) => tracing::info!(path = %path.display(), "report saved"),
            Ok(None) => {}
            Err(e) => tracing::error!("failed to export report: {e:#}"),
        }

        self.should_exit = true;
        event_loop.exit();
    }
}

/// Prompt plus running statistics, shown as soon as one trial exists
fn window_title(
    phase: Phase,
    last_elapsed_ms: Option<u64>,
    summary: Option<Summary>,
    complete: bool,
) -> String {
    let head = match (phase, last_elapsed_ms) {
        _ if complete => "Summary complete | R to reset".to_string(),
        (Phase::Settled, Some(ms)) => format!("{ms} ms | {}", phase.label()),
        _ => format!("Reaction Time Test | {}", phase.label()),
    };
    match summary {
        Some(s) => format!(
            "{head} | avg {} ms, best {} ms, worst {} ms, attempts {}",
            s.mean_ms, s.min_ms, s.max_ms, s.count
        ),
        None => head,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                tracing::error!("failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    tracing::error!("render error: {e:#}");
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_press(),
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => self.handle_press(),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        if self.machine.poll_timers() {
            self.phase_changed();
        }
        match self.machine.scheduler().time_until_next() {
            Some(wait) => event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + wait)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(count: usize, mean_ms: u64, min_ms: u64, max_ms: u64) -> Option<Summary> {
        Some(Summary {
            count,
            mean_ms,
            min_ms,
            max_ms,
        })
    }

    #[test]
    fn idle_title_has_no_stats() {
        assert_eq!(
            window_title(Phase::Idle, None, None, false),
            "Reaction Time Test | Click anywhere to start"
        );
    }

    #[test]
    fn stats_appear_after_first_trial() {
        assert_eq!(
            window_title(Phase::Settled, Some(213), summary(1, 213, 213, 213), false),
            "213 ms | Click to keep going | avg 213 ms, best 213 ms, worst 213 ms, attempts 1"
        );
    }

    #[test]
    fn stats_stay_visible_while_armed() {
        assert_eq!(
            window_title(Phase::Armed, None, summary(2, 150, 120, 180), false),
            "Reaction Time Test | Wait for green... | avg 150 ms, best 120 ms, worst 180 ms, attempts 2"
        );
    }

    #[test]
    fn complete_title_offers_reset() {
        assert_eq!(
            window_title(Phase::Settled, Some(90), summary(5, 133, 80, 200), true),
            "Summary complete | R to reset | avg 133 ms, best 80 ms, worst 200 ms, attempts 5"
        );
    }
}
