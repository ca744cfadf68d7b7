use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::controller::Controller;
use crate::surface::Canvas;

pub struct App {
    pub should_quit: bool,
    controller: Controller<Canvas>,
    last_tick: Instant,
}

impl App {
    pub fn new(controller: Controller<Canvas>, now: Instant) -> Self {
        Self {
            should_quit: false,
            controller,
            last_tick: now,
        }
    }

    pub fn controller(&self) -> &Controller<Canvas> {
        &self.controller
    }

    pub fn start(&mut self, now: Instant) {
        self.last_tick = now;
        self.controller.run();
    }

    pub fn on_tick(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.controller.tick(elapsed);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C and Esc always quit
        let quit = match key.code {
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            KeyCode::Esc => true,
            KeyCode::Char('q') | KeyCode::Char('Q') => self.controller.is_solved(),
            _ => false,
        };
        if quit {
            self.controller.cancel_pending();
            self.should_quit = true;
            return;
        }

        self.controller.handle_key(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Stage, STAGE_DELAY};
    use crate::task::Task;
    use crate::view::View;
    use ratatui::layout::Size;

    fn test_app(now: Instant) -> App {
        let task = Task::new(3, 4);
        let view = View::init(&task, Canvas::new(), Size::new(80, 20));
        App::new(Controller::new(view, task, STAGE_DELAY), now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ticks_feed_elapsed_time() {
        let t0 = Instant::now();
        let mut app = test_app(t0);
        app.start(t0);
        app.on_tick(t0 + STAGE_DELAY / 2);
        assert_eq!(app.controller().stage(), None);
        app.on_tick(t0 + STAGE_DELAY);
        assert_eq!(app.controller().stage(), Some(Stage::First));
    }

    #[test]
    fn q_only_quits_once_solved() {
        let t0 = Instant::now();
        let mut app = test_app(t0);
        app.start(t0);
        app.on_tick(t0 + STAGE_DELAY);
        app.on_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        app.on_key(key(KeyCode::Char('3')));
        app.on_tick(t0 + STAGE_DELAY * 2);
        app.on_key(key(KeyCode::Char('4')));
        app.on_tick(t0 + STAGE_DELAY * 3);
        app.on_key(key(KeyCode::Char('7')));
        assert!(app.controller().is_solved());

        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let t0 = Instant::now();
        let mut app = test_app(t0);
        app.on_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let mut app = test_app(t0);
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
