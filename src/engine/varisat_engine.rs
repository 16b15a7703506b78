use std::time::Instant;

use log::{debug, info, warn};
use varisat::{ExtendFormula, Lit, Solver};

use crate::encoding::{self, ClauseSink};
use crate::instance::{Literal, Variable};
use crate::problem_builder::Problem;

use super::{Assignment, EngineConfig, EngineOutcome, EngineStats, SolveStatus, SolvingEngine};

/// Solving engine backed by the `varisat` CDCL solver.
///
/// Minimises the objective by linear SAT-UNSAT search: after each solution of cost `c`, the
/// bound `at most c - 1 objective literals` is added and the solver is re-run incrementally.
/// The first UNSAT proves the incumbent optimal.
#[derive(Debug, Clone, Default)]
pub struct VarisatEngine {
    config: EngineConfig,
}

impl VarisatEngine {
    pub fn new(config: EngineConfig) -> VarisatEngine {
        VarisatEngine { config }
    }
}

struct VarisatSink {
    solver: Solver<'static>,
    next_var: usize,
}

impl VarisatSink {
    fn assignment(&self, variable_count: usize) -> Option<Assignment> {
        let model = self.solver.model()?;
        let literals = model
            .into_iter()
            .map(|lit| Literal::new(Variable(lit.var().index()), lit.is_positive()));
        Some(Assignment::from_true_literals(variable_count, literals))
    }
}

impl ClauseSink for VarisatSink {
    fn fresh_variable(&mut self) -> Variable {
        let var = Variable(self.next_var);
        self.next_var += 1;
        var
    }

    fn add_clause(&mut self, literals: &[Literal]) {
        let lits: Vec<Lit> = literals
            .iter()
            .map(|l| Lit::from_index(l.var().index(), l.polarity()))
            .collect();
        self.solver.add_clause(&lits);
    }
}

impl SolvingEngine for VarisatEngine {
    fn solve(&mut self, problem: &Problem) -> EngineOutcome {
        let started = Instant::now();
        let mut stats = EngineStats::default();
        let mut sink = VarisatSink {
            solver: Solver::new(),
            next_var: problem.variable_count(),
        };
        for clause in problem.clauses() {
            sink.add_clause(clause.literals());
        }
        debug!("loaded {:?} into varisat", problem);

        let mut best: Option<(Assignment, usize)> = None;
        loop {
            stats.sat_calls += 1;
            let result = sink.solver.solve();
            stats.elapsed = started.elapsed();

            let satisfiable = match result {
                Ok(satisfiable) => satisfiable,
                Err(err) => {
                    warn!("varisat stopped without an answer: {:?}", err);
                    return match best {
                        Some((assignment, cost)) => EngineOutcome::with_solution(
                            SolveStatus::Feasible,
                            assignment,
                            cost,
                            stats,
                        ),
                        None => EngineOutcome::without_solution(SolveStatus::Unknown, stats),
                    };
                }
            };

            if !satisfiable {
                return match best {
                    Some((assignment, cost)) => {
                        info!("objective {} proven optimal after {} calls", cost, stats.sat_calls);
                        EngineOutcome::with_solution(SolveStatus::Optimal, assignment, cost, stats)
                    }
                    None => {
                        info!("problem is unsatisfiable");
                        EngineOutcome::without_solution(SolveStatus::Infeasible, stats)
                    }
                };
            }

            let assignment = match sink.assignment(problem.variable_count()) {
                Some(assignment) => assignment,
                None => {
                    warn!("varisat reported SAT without a model");
                    return EngineOutcome::without_solution(SolveStatus::Unknown, stats);
                }
            };
            let cost = problem.objective_value(|lit| assignment.literal_value(lit));
            stats.improving_solutions += 1;
            info!(
                "objective {} after {} ms",
                cost,
                started.elapsed().as_millis()
            );

            if cost == 0 {
                return EngineOutcome::with_solution(SolveStatus::Optimal, assignment, cost, stats);
            }
            if self.config.stop_after_first {
                return EngineOutcome::with_solution(SolveStatus::Feasible, assignment, cost, stats);
            }
            if let Some(budget) = self.config.time_budget {
                if started.elapsed() >= budget {
                    info!("time budget of {:?} spent, keeping objective {}", budget, cost);
                    return EngineOutcome::with_solution(
                        SolveStatus::Feasible,
                        assignment,
                        cost,
                        stats,
                    );
                }
            }

            best = Some((assignment, cost));
            encoding::at_most(&mut sink, problem.objective(), cost - 1);
        }
    }
}
