use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use tracing::warn;

use crate::error::{Result, TutorError};

pub enum Event {
    Key(KeyEvent),
    Tick,
}

/// Polls the terminal on a helper thread; everything else stays on the
/// main loop, which receives key presses and ticks in arrival order.
/// Counts back-to-back failures so a broken terminal logs a warning on the
/// first failure and then once every `WARN_EVERY`, not on every pass.
#[derive(Debug, Default)]
struct FailureStreak {
    count: u64,
}

const WARN_EVERY: u64 = 100;

impl FailureStreak {
    /// Returns true when this failure should be logged.
    fn record(&mut self) -> bool {
        self.count += 1;
        self.count % WARN_EVERY == 1
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn count(&self) -> u64 {
        self.count
    }
}

pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut poll_failures = FailureStreak::default();
            loop {
                let ready = match event::poll(tick_rate) {
                    Ok(ready) => {
                        poll_failures.reset();
                        ready
                    }
                    Err(err) => {
                        if poll_failures.record() {
                            warn!(%err, failures = poll_failures.count(), "terminal poll failed");
                        }
                        // a failed poll returns without waiting
                        thread::sleep(tick_rate);
                        false
                    }
                };
                let sent = if ready {
                    match event::read() {
                        Ok(crossterm::event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            tx.send(Event::Key(key))
                        }
                        Ok(_) => Ok(()),
                        Err(err) => {
                            warn!(%err, "terminal read failed");
                            Ok(())
                        }
                    }
                } else {
                    tx.send(Event::Tick)
                };
                if sent.is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event> {
        self.rx.recv().map_err(|e| {
            TutorError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_failures_warn_sparingly() {
        let mut streak = FailureStreak::default();
        let warned = (0..250).filter(|_| streak.record()).count();
        assert_eq!(warned, 3);
        assert_eq!(streak.count(), 250);
    }

    #[test]
    fn recovery_starts_a_new_streak() {
        let mut streak = FailureStreak::default();
        assert!(streak.record());
        assert!(!streak.record());
        streak.reset();
        assert!(streak.record());
    }
}
