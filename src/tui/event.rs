//! Event handling for the dashboard.
//!
//! A separate thread polls the terminal and emits animation ticks, so the
//! main loop only ever blocks on one channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};

/// Redraw cadence, independent of the sampling interval.
pub const ANIMATION_TICK: Duration = Duration::from_millis(200);

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Animation tick.
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
}

/// Polls terminal events on a background thread.
///
/// The thread exits on its own once the handler (and with it the receiver)
/// is dropped.
pub struct EventHandler {
    rx: Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("sysmoni-input".to_string())
            .spawn(move || {
                let mut last_tick = Instant::now();
                loop {
                    let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                    if event::poll(timeout).unwrap_or(false) {
                        let event = match event::read() {
                            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                                Event::Key(key)
                            }
                            Ok(CrosstermEvent::Mouse(m)) => Event::Mouse(m),
                            Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                            Ok(_) => continue,
                            Err(e) => {
                                tracing::debug!(error = %e, "terminal read failed");
                                continue;
                            }
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    if last_tick.elapsed() >= tick_rate {
                        last_tick = Instant::now();
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to spawn input thread");
        }

        Self { rx }
    }

    /// Receives the next event, waiting at most `timeout`.
    pub fn next(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}
