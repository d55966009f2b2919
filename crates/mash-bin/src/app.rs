use anyhow::{Result, anyhow};
use log::{error, info};
use mash_input::{GamepadSource, SystemClock};
use mash_play::Theme;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::keys;
use crate::session::{Flow, Session};

const WINDOW_WIDTH: f64 = 960.0;
const WINDOW_HEIGHT: f64 = 240.0;

fn window_theme(theme: Theme) -> winit::window::Theme {
    match theme {
        Theme::Dark => winit::window::Theme::Dark,
        Theme::Light => winit::window::Theme::Light,
    }
}

struct App<P> {
    session: Session<P, SystemClock>,
    window: Option<Window>,
    applied_theme: Option<Theme>,
}

impl<P: GamepadSource> App<P> {
    fn refresh(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.session.take_dirty() {
            window.set_title(&self.session.title());
        }
        let theme = self.session.theme();
        if self.applied_theme != Some(theme) {
            window.set_theme(Some(window_theme(theme)));
            self.applied_theme = Some(theme);
        }
    }
}

impl<P: GamepadSource> ApplicationHandler for App<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let theme = self.session.theme();
        let attrs = Window::default_attributes()
            .with_title(self.session.title())
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_theme(Some(window_theme(theme)));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                self.window = Some(window);
                self.applied_theme = Some(theme);
            }
            Err(e) => {
                error!("failed to create window: {e}");
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
        match event {
            WindowEvent::CloseRequested => {
                self.session.save();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Some(input) = keys::classify(&event.logical_key) {
                    if self.session.key_down(input, event.repeat) == Flow::Quit {
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
        self.refresh();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.session.pump();
        self.refresh();
        let flow = match self.session.next_wakeup_ms() {
            Some(ms) => ControlFlow::WaitUntil(self.session.clock().instant_at(ms)),
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);
    }
}

/// Run the session in a window until it is closed.
pub fn run<P: GamepadSource>(session: Session<P, SystemClock>) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;
    let mut app = App {
        session,
        window: None,
        applied_theme: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop error: {e}"))?;
    info!("Window closed");
    Ok(())
}
