use rand::Rng;

use crate::error::{Result, TutorError};
use crate::surface::RULER;

/// The addition being practised. `result` always equals `a + b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Task {
    pub a: i32,
    pub b: i32,
    pub result: i32,
}

impl Task {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b, result: a + b }
    }

    pub fn random(rng: &mut impl Rng, range: &TaskRange) -> Self {
        let a = rng.gen_range(range.min_first..=range.max_first);
        let result = rng.gen_range(range.min_sum..=range.max_sum);
        Self::new(a, result - a)
    }
}

/// Bounds for generated tasks: the first operand and the sum are drawn,
/// the second operand is whatever closes the gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskRange {
    pub min_first: i32,
    pub max_first: i32,
    pub min_sum: i32,
    pub max_sum: i32,
}

impl Default for TaskRange {
    fn default() -> Self {
        Self {
            min_first: 6,
            max_first: 9,
            min_sum: 11,
            max_sum: 14,
        }
    }
}

impl TaskRange {
    pub fn validate(&self) -> Result<()> {
        if self.min_first < 1 || self.min_first > self.max_first {
            return Err(TutorError::invalid(format!(
                "first operand range {}..={} is empty",
                self.min_first, self.max_first
            )));
        }
        if self.min_sum > self.max_sum {
            return Err(TutorError::invalid(format!(
                "sum range {}..={} is empty",
                self.min_sum, self.max_sum
            )));
        }
        // b = sum - a must stay a positive single digit
        if self.min_sum - self.max_first < 1 {
            return Err(TutorError::invalid("second operand could be zero or negative"));
        }
        if self.max_first > 9 || self.max_sum - self.min_first > 9 {
            return Err(TutorError::invalid("operands must be single digits"));
        }
        if self.max_sum > 99 || self.max_sum > RULER.last_mark {
            return Err(TutorError::invalid(format!(
                "sum {} does not fit on the ruler (0..={})",
                self.max_sum, RULER.last_mark
            )));
        }
        Ok(())
    }
}

/// Builds a task from operands given on the command line. The operands are
/// range-checked before they are added.
pub fn fixed_task(a: i32, b: i32) -> Result<Task> {
    let result = a
        .checked_add(b)
        .ok_or_else(|| TutorError::invalid(format!("operands {a} and {b} are out of range")))?;
    let task = Task { a, b, result };
    validate_fixed(&task)?;
    Ok(task)
}

/// Checks a fixed task against the same limits the generator respects.
pub fn validate_fixed(task: &Task) -> Result<()> {
    if !(1..=9).contains(&task.a) || !(1..=9).contains(&task.b) {
        return Err(TutorError::invalid(format!(
            "operands {} and {} must be single digits from 1",
            task.a, task.b
        )));
    }
    if task.result > RULER.last_mark {
        return Err(TutorError::invalid(format!(
            "sum {} does not fit on the ruler (0..={})",
            task.result, RULER.last_mark
        )));
    }
    Ok(())
}
