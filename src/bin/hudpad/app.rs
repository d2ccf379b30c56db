//! HudPad - application state and event loop.
//!
//! One key per catalog effect, a toggle for the repulsor loop, and arrow
//! keys sweeping the intensity that drives its modulation. The engine spawns
//! its realtime transport lazily, so nothing touches the audio device until
//! the first initializing action.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use hud_sfx::engine::{HumState, SoundEngine};
use hud_sfx::transport::RealtimeTransport;

use crate::ui;

pub struct HudPad {
    engine: SoundEngine<RealtimeTransport>,
    intensity: f32,
    intensity_step: f32,
    status: String,
    should_quit: bool,
}

impl HudPad {
    pub fn new() -> Self {
        Self {
            engine: SoundEngine::new(RealtimeTransport::open),
            intensity: 0.5,
            intensity_step: 0.05,
            status: "press [s] to power up".into(),
            should_quit: false,
        }
    }

    /// Set how far one arrow-key press moves the repulsor intensity.
    pub fn intensity_step(mut self, step: f32) -> Self {
        self.intensity_step = step;
        self
    }

    /// Run the application (takes over the terminal).
    pub fn run(mut self) -> EyreResult<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let view = ui::View {
                initialized: self.engine.is_initialized(),
                muted: self.engine.is_muted(),
                hum: self.engine.repulsor_state(),
                intensity: self.intensity,
                status: &self.status,
            };
            terminal.draw(|frame| ui::render(frame, &view))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('s') => match self.engine.play_startup() {
                Ok(()) => self.status = "startup sweep".into(),
                Err(err) => self.status = format!("audio unavailable: {err}"),
            },
            KeyCode::Char('i') => match self.engine.init() {
                Ok(()) => self.status = "engine ready".into(),
                Err(err) => self.status = format!("audio unavailable: {err}"),
            },
            KeyCode::Char('m') => {
                let muted = self.engine.toggle_mute();
                self.status = if muted { "muted" } else { "unmuted" }.into();
            }
            KeyCode::Char('h') => {
                self.engine.play_hover();
                self.status = "hover".into();
            }
            KeyCode::Char('c') => {
                self.engine.play_click();
                self.status = "click".into();
            }
            KeyCode::Char('u') => {
                self.engine.play_power_up();
                self.status = "power up".into();
            }
            KeyCode::Char('d') => {
                self.engine.play_power_down();
                self.status = "power down".into();
            }
            KeyCode::Char('r') => match self.engine.repulsor_state() {
                HumState::Running => {
                    self.engine.stop_repulsor_hum();
                    self.status = "repulsor off".into();
                }
                // Idle starts; a finished fade settles and restarts too
                HumState::Idle | HumState::StoppingFadeOut => {
                    self.engine.start_repulsor_hum();
                    if self.engine.repulsor_state() == HumState::Running {
                        self.engine.modulate_repulsor(self.intensity);
                        self.status = "repulsor on".into();
                    }
                }
            },
            KeyCode::Up => self.nudge_intensity(self.intensity_step),
            KeyCode::Down => self.nudge_intensity(-self.intensity_step),
            _ => {}
        }
    }

    fn nudge_intensity(&mut self, delta: f32) {
        self.intensity = (self.intensity + delta).clamp(0.0, 1.0);
        self.engine.modulate_repulsor(self.intensity);
    }
}
