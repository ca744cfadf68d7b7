use std::time::Duration;

use crossterm::event::KeyEvent;
use tracing::{debug, info};

use crate::input::{digits_only, InputColor, InputField};
use crate::scheduler::{Scheduler, TimerId};
use crate::surface::Surface;
use crate::task::Task;
use crate::view::{DrawOptions, Operand, View};

/// Pause before the first stage and between the operand stages.
pub const STAGE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Typing the first operand over its arrow.
    First,
    /// Typing the second operand over its arrow.
    Second,
    /// Typing the sum in the equation.
    Sum,
    /// Terminal: the equation is shown solved.
    Solved,
}

impl Stage {
    pub fn number(self) -> u8 {
        match self {
            Stage::First => 1,
            Stage::Second => 2,
            Stage::Sum => 3,
            Stage::Solved => 4,
        }
    }
}

/// What the active input is checked against and where a match leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StageCheck {
    expected: i32,
    mark: Option<Operand>,
    next: Stage,
    delay: Duration,
}

pub struct Controller<S: Surface> {
    task: Task,
    view: View<S>,
    stage_delay: Duration,
    stage: Option<Stage>,
    check: Option<StageCheck>,
    input: Option<InputField>,
    scheduler: Scheduler<Stage>,
    pending: Option<TimerId>,
}

impl<S: Surface> Controller<S> {
    pub fn new(view: View<S>, task: Task, stage_delay: Duration) -> Self {
        Self {
            task,
            view,
            stage_delay,
            stage: None,
            check: None,
            input: None,
            scheduler: Scheduler::new(),
            pending: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn view(&self) -> &View<S> {
        &self.view
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn input(&self) -> Option<&InputField> {
        self.input.as_ref()
    }

    pub fn is_solved(&self) -> bool {
        self.stage == Some(Stage::Solved)
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some_and(|id| self.scheduler.is_pending(id))
    }

    /// Shows the bare equation and schedules the first stage.
    pub fn run(&mut self) {
        self.view.draw_task(DrawOptions::default());
        info!(a = self.task.a, b = self.task.b, "exercise started");
        self.schedule(Stage::First, self.stage_delay);
    }

    /// Drops a scheduled transition. Returns false if none was pending.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        }
    }

    /// Advances the clock, entering any stage whose delay has run out.
    pub fn tick(&mut self, elapsed: Duration) {
        for (id, stage) in self.scheduler.advance(elapsed) {
            if self.pending == Some(id) {
                self.pending = None;
            }
            self.enter(stage);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let changed = match self.input.as_mut() {
            Some(input) => input.handle_key(key),
            None => false,
        };
        if changed {
            self.on_input();
        }
    }

    fn schedule(&mut self, stage: Stage, delay: Duration) {
        debug!(stage = stage.number(), ?delay, "transition scheduled");
        self.pending = Some(self.scheduler.schedule(delay, stage));
    }

    fn on_input(&mut self) {
        let (Some(check), Some(input)) = (self.check, self.input.as_mut()) else {
            return;
        };
        let value = input.value();

        if value.parse::<i32>().ok() == Some(check.expected) {
            self.input = None;
            self.check = None;
            self.view.draw_task(DrawOptions::default());
            info!(expected = check.expected, "correct answer");
            if check.delay.is_zero() {
                self.enter(check.next);
            } else {
                self.schedule(check.next, check.delay);
            }
        } else if value.is_empty() {
            input.set_color(InputColor::Default);
            self.view.draw_task(DrawOptions::default());
        } else {
            debug!(value, expected = check.expected, "mismatch");
            input.set_color(InputColor::Error);
            self.view.draw_task(DrawOptions::marked(check.mark));
        }
    }

    fn enter(&mut self, stage: Stage) {
        info!(stage = stage.number(), "entering stage");
        self.stage = Some(stage);
        match stage {
            Stage::First => {
                self.view.draw_arrow(Operand::First);
                let input = self.view.draw_input(Operand::First);
                self.activate(input, self.check_for(stage));
            }
            Stage::Second => {
                self.view.draw_arrow(Operand::Second);
                let input = self.view.draw_input(Operand::Second);
                self.activate(input, self.check_for(stage));
            }
            Stage::Sum => {
                let input = self.view.draw_result_input();
                self.activate(input, self.check_for(stage));
            }
            Stage::Solved => {
                self.view.draw_task(DrawOptions::solved());
                self.check = None;
                self.input = None;
            }
        }
    }

    fn check_for(&self, stage: Stage) -> StageCheck {
        match stage {
            Stage::First => StageCheck {
                expected: self.task.a,
                mark: Some(Operand::First),
                next: Stage::Second,
                delay: self.stage_delay,
            },
            Stage::Second => StageCheck {
                expected: self.task.b,
                mark: Some(Operand::Second),
                next: Stage::Sum,
                delay: self.stage_delay,
            },
            Stage::Sum | Stage::Solved => StageCheck {
                expected: self.task.result,
                mark: None,
                next: Stage::Solved,
                delay: Duration::ZERO,
            },
        }
    }

    fn activate(&mut self, mut input: InputField, check: StageCheck) {
        input.on_keypress(digits_only);
        input.focus();
        self.input = Some(input);
        self.check = Some(check);
    }
}
