use std::collections::VecDeque;

use log::info;

use crate::datastructures::{Assignment, Result, SolveOutcome, SolverOptions};
use crate::model::Model;

/// Contract of the external solving engine.
///
/// The core never solves anything itself; it builds a [`Model`] and hands
/// it to an implementation of this trait together with an opaque option
/// set (time budget, solution limit, worker hint).
pub trait SolverAdapter {
    /// Engine name, for logging.
    fn name(&self) -> &str;

    /// Solves `model` within the given budget.
    fn solve(
        &mut self,
        model: &Model,
        options: &SolverOptions,
    ) -> Result<SolveOutcome>;
}

/// A canned-assignment solver for tests and dry runs.
///
/// Pops one pre-baked assignment per `solve` call and evaluates it against
/// the model; it performs no search. An exhausted queue yields an
/// infeasible outcome.
#[derive(Debug, Default)]
pub struct StubSolver {
    queue: VecDeque<Assignment>,
}

impl StubSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignments(
        assignments: impl IntoIterator<Item = Assignment>,
    ) -> Self {
        Self {
            queue: assignments.into_iter().collect(),
        }
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.queue.push_back(assignment);
    }
}

impl SolverAdapter for StubSolver {
    fn name(&self) -> &str {
        "stub"
    }

    fn solve(
        &mut self,
        model: &Model,
        _options: &SolverOptions,
    ) -> Result<SolveOutcome> {
        info!("stub solve of {}", model.name);
        let outcome = match self.queue.pop_front() {
            Some(assignment) if model.is_feasible(&assignment) => {
                SolveOutcome {
                    feasible: true,
                    objective: model.objective_value(&assignment),
                    assignment,
                    solve_time_secs: 0.0,
                }
            }
            _ => SolveOutcome {
                feasible: false,
                assignment: Assignment::new(),
                objective: 0.0,
                solve_time_secs: 0.0,
            },
        };
        Ok(outcome)
    }
}
