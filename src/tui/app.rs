//! Main TUI application.

use std::io::{self, Write};
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{debug, info};

use crate::config::Config;
use crate::sampler::SampleStream;
use crate::sink::JsonFileSink;

use super::event::{ANIMATION_TICK, Event, EventHandler};
use super::input::{KeyAction, handle_key, handle_mouse};
use super::render::render;
use super::state::AppState;

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Undoes a partial `setup_terminal` so the shell stays usable. Errors are
/// ignored; the setup error is the one worth reporting.
fn abandon_setup<W: Write>(out: &mut W) {
    let _ = execute!(out, LeaveAlternateScreen, DisableMouseCapture);
    let _ = disable_raw_mode();
}

/// Main TUI application.
pub struct App {
    stream: SampleStream,
    sink: Option<JsonFileSink>,
    state: AppState,
    should_quit: bool,
}

impl App {
    /// Creates a new App consuming samples from `stream`.
    pub fn new(config: &Config, stream: SampleStream) -> Self {
        Self {
            stream,
            sink: config.json_file.clone().map(JsonFileSink::new),
            state: AppState::new(config),
            should_quit: false,
        }
    }

    /// Runs the TUI application until the user quits.
    ///
    /// The terminal is restored even when the loop fails.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut terminal = match setup_terminal() {
            Ok(t) => t,
            Err(e) => {
                abandon_setup(&mut io::stdout());
                self.stream.token().cancel();
                return Err(e);
            }
        };

        let result = self.main_loop(&mut terminal);

        self.stream.token().cancel();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        if let Some(sink) = &self.sink {
            info!(path = %sink.path().display(), lines = sink.written(), "export finished");
        }
        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let events = EventHandler::new(ANIMATION_TICK);

        while !self.should_quit {
            self.poll_sample();
            terminal.draw(|frame| render(frame, &mut self.state))?;

            match events.next(ANIMATION_TICK) {
                Ok(Event::Tick) => self.state.tick = self.state.tick.wrapping_add(1),
                Ok(Event::Key(key)) => match handle_key(&mut self.state, key) {
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::MouseToggled => {
                        if self.state.mouse_enabled {
                            execute!(io::stdout(), EnableMouseCapture)?;
                        } else {
                            execute!(io::stdout(), DisableMouseCapture)?;
                        }
                    }
                    KeyAction::None => {}
                },
                Ok(Event::Mouse(mouse)) => handle_mouse(&mut self.state, mouse),
                // the next draw picks up the new size
                Ok(Event::Resize(..)) => {}
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input channel closed");
                    self.should_quit = true;
                }
            }
        }
        Ok(())
    }

    /// Takes the newest sample if one is waiting. Frozen sampling leaves it
    /// in the channel so the sampler drops ticks instead of queueing them.
    fn poll_sample(&mut self) {
        if self.state.paused {
            return;
        }
        match self.stream.try_recv() {
            Ok(sample) => {
                if self.state.export_enabled
                    && let Some(sink) = self.sink.as_mut()
                {
                    sink.write_or_skip(&sample);
                }
                self.state.apply_sample(sample);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                debug!("sampler stopped");
                self.should_quit = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandoned_setup_leaves_alternate_screen_and_mouse_mode() {
        let mut out = Vec::new();
        abandon_setup(&mut out);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("\x1b[?1049l"));
        assert!(text.contains("\x1b[?1000l"));
    }
}
