//! The solving engine seam.
//!
//! Model construction never looks inside a solver: it hands over a finished [`Problem`] and
//! gets back one of four statuses plus, when solvable, a total assignment of every variable.

mod varisat_engine;

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::instance::{Literal, Variable};
use crate::problem_builder::Problem;

pub use crate::engine::varisat_engine::VarisatEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SolveStatus {
    /// A solution was found and proven to minimise the objective.
    Optimal,
    /// A solution was found, but the search stopped before proving optimality.
    Feasible,
    /// No assignment satisfies the hard clauses.
    Infeasible,
    /// The engine gave up without a definitive answer.
    Unknown,
}

impl SolveStatus {
    pub fn is_solution_found(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A total 0/1 assignment, indexed by variable.
#[derive(Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn new(values: Vec<bool>) -> Assignment {
        Assignment { values }
    }

    /// Builds an assignment over `variable_count` variables from the literals a solver reported
    /// as true. Variables the solver never mentioned default to false.
    pub fn from_true_literals(
        variable_count: usize,
        literals: impl IntoIterator<Item = Literal>,
    ) -> Assignment {
        let mut values = vec![false; variable_count];
        for lit in literals {
            if let Some(slot) = values.get_mut(lit.var().index()) {
                *slot = lit.polarity();
            }
        }
        Assignment { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, var: Variable) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    pub fn literal_value(&self, lit: Literal) -> bool {
        self.value(lit.var()) == lit.polarity()
    }

    /// Variables assigned true, in index order.
    pub fn true_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(ix, _)| Variable(ix))
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assignment {{ {} of {} true }}", self.true_variables().count(), self.len())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub sat_calls: usize,
    pub improving_solutions: usize,
    pub elapsed: Duration,
}

/// What an engine reports back. `assignment` is present exactly when the status says a
/// solution was found.
#[derive(Clone, Debug)]
pub struct EngineOutcome {
    pub status: SolveStatus,
    pub assignment: Option<Assignment>,
    pub objective_value: Option<usize>,
    pub stats: EngineStats,
}

impl EngineOutcome {
    pub fn without_solution(status: SolveStatus, stats: EngineStats) -> EngineOutcome {
        debug_assert!(!status.is_solution_found());
        EngineOutcome {
            status,
            assignment: None,
            objective_value: None,
            stats,
        }
    }

    pub fn with_solution(
        status: SolveStatus,
        assignment: Assignment,
        objective_value: usize,
        stats: EngineStats,
    ) -> EngineOutcome {
        debug_assert!(status.is_solution_found());
        EngineOutcome {
            status,
            assignment: Some(assignment),
            objective_value: Some(objective_value),
            stats,
        }
    }

    /// The assignment, if the status allows reading one.
    pub fn solution(&self) -> Option<&Assignment> {
        if self.status.is_solution_found() {
            self.assignment.as_ref()
        } else {
            None
        }
    }
}

/// Limits for the optimisation descent. Checked between solver calls; a single call always
/// runs to completion.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Stop improving the objective once this much time has passed.
    pub time_budget: Option<Duration>,
    /// Return the first feasible solution without optimising.
    pub stop_after_first: bool,
}

/// Anything that can decide a [`Problem`] and minimise its objective.
pub trait SolvingEngine {
    fn solve(&mut self, problem: &Problem) -> EngineOutcome;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_assignment_from_literals() {
        let lits = vec![
            Literal::positive(Variable(0)),
            Literal::negative(Variable(1)),
            Literal::positive(Variable(3)),
            Literal::positive(Variable(9)),
        ];
        let assignment = Assignment::from_true_literals(4, lits);
        assert!(assignment.value(Variable(0)));
        assert!(!assignment.value(Variable(1)));
        assert!(!assignment.value(Variable(2)));
        assert!(assignment.literal_value(Literal::positive(Variable(3))));
        assert!(!assignment.value(Variable(9)));
        assert_eq!(
            assignment.true_variables().collect::<Vec<_>>(),
            vec![Variable(0), Variable(3)]
        );
    }

    #[test]
    fn test_unsolved_outcome_hides_assignment() {
        let outcome = EngineOutcome {
            status: SolveStatus::Unknown,
            assignment: Some(Assignment::new(vec![true])),
            objective_value: None,
            stats: EngineStats::default(),
        };
        assert!(outcome.solution().is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Infeasible.to_string(), "INFEASIBLE");
        assert!(SolveStatus::Feasible.is_solution_found());
        assert!(!SolveStatus::Unknown.is_solution_found());
    }
}
