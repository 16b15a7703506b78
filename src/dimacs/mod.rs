//! DIMACS interchange, so any external SAT solver can stand in as the solving engine.
//!
//! [`write`] emits the hard clauses in `p cnf` format, with the objective and the names of
//! the original variables recorded as comments. [`parse_solution`] reads a competition-style
//! solver transcript (`s` status line, `v` value lines) back into an [`Assignment`].

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    num,
    path::Path,
};

use itertools::Itertools;
use thiserror::Error;

use crate::engine::{Assignment, EngineOutcome, EngineStats, SolveStatus};
use crate::instance::Literal;
use crate::problem_builder::Problem;

#[derive(Error, Debug)]
pub enum DimacsError {
    #[error("transcript has no status line")]
    MissingStatus,
    #[error("unknown solver status: {0}")]
    UnknownStatus(String),
    #[error("invalid line: {0}")]
    InvalidLine(String),
    #[error("line must start with s, v, o or c: {0}")]
    UnknownLineType(usize),
    #[error("io error")]
    IO(#[from] io::Error),
    #[error("not a valid value")]
    ParseError(#[from] num::ParseIntError),
}

type Result<T> = std::result::Result<T, DimacsError>;

pub fn write<W: Write>(problem: &Problem, mut out: W) -> Result<()> {
    writeln!(out, "c timetabler model")?;
    if !problem.objective().is_empty() {
        let terms = problem
            .objective()
            .iter()
            .map(|lit| lit.to_dimacs())
            .join(" ");
        writeln!(out, "c minimise {}", terms)?;
    }
    for var in problem.original_variables() {
        if let Some(name) = problem.variable_name(var) {
            writeln!(out, "c var {} {}", var.index() + 1, name)?;
        }
    }
    writeln!(
        out,
        "p cnf {} {}",
        problem.variable_count(),
        problem.clauses().len()
    )?;
    for clause in problem.clauses() {
        let lits = clause.literals().iter().map(|lit| lit.to_dimacs()).join(" ");
        writeln!(out, "{} 0", lits)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_file<P: AsRef<Path>>(problem: &Problem, path: P) -> Result<()> {
    let file = File::create(path)?;
    write(problem, BufWriter::new(file))
}

/// What an external solver printed.
#[derive(Debug, Clone)]
pub struct SolverTranscript {
    pub status: SolveStatus,
    pub assignment: Option<Assignment>,
}

impl SolverTranscript {
    /// Converts the transcript into an engine outcome, scoring the objective locally.
    pub fn into_outcome(self, problem: &Problem) -> EngineOutcome {
        match self.assignment {
            Some(assignment) if self.status.is_solution_found() => {
                let cost = problem.objective_value(|lit| assignment.literal_value(lit));
                EngineOutcome::with_solution(self.status, assignment, cost, EngineStats::default())
            }
            _ => {
                let status = if self.status.is_solution_found() {
                    SolveStatus::Unknown
                } else {
                    self.status
                };
                EngineOutcome::without_solution(status, EngineStats::default())
            }
        }
    }
}

pub fn parse_solution<R: BufRead>(reader: R, variable_count: usize) -> Result<SolverTranscript> {
    let mut status = None;
    let mut true_literals = vec![];
    let mut saw_values = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let mut words = line.split_ascii_whitespace();
        match words.next() {
            None | Some("c") | Some("o") => {}
            Some("s") => {
                let rest = words.join(" ");
                status = Some(match rest.as_str() {
                    "OPTIMUM FOUND" => SolveStatus::Optimal,
                    "SATISFIABLE" => SolveStatus::Feasible,
                    "UNSATISFIABLE" => SolveStatus::Infeasible,
                    "UNKNOWN" => SolveStatus::Unknown,
                    _ => return Err(DimacsError::UnknownStatus(rest)),
                });
            }
            Some("v") => {
                saw_values = true;
                for word in words {
                    match Literal::from_dimacs(word.parse::<i64>()?) {
                        Some(lit) if lit.polarity() => true_literals.push(lit),
                        Some(_) | None => {}
                    }
                }
            }
            Some(w) if w.starts_with(|c: char| c == '-' || c.is_ascii_digit()) => {
                return Err(DimacsError::InvalidLine(line.to_string()));
            }
            Some(_) => return Err(DimacsError::UnknownLineType(line_no + 1)),
        }
    }

    let status = status.ok_or(DimacsError::MissingStatus)?;
    let assignment = if saw_values && status.is_solution_found() {
        Some(Assignment::from_true_literals(variable_count, true_literals))
    } else {
        None
    };
    Ok(SolverTranscript { status, assignment })
}

pub fn parse_solution_file<P: AsRef<Path>>(
    path: P,
    variable_count: usize,
) -> Result<SolverTranscript> {
    let file = File::open(path)?;
    parse_solution(BufReader::new(file), variable_count)
}
