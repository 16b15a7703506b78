pub mod dimacs;
pub mod encoding;
pub mod engine;
pub mod instance;
pub mod problem_builder;
pub mod timetable;
pub(crate) mod variable_registry;

pub use engine::{EngineConfig, EngineOutcome, SolveStatus, SolvingEngine, VarisatEngine};
pub use problem_builder::{Problem, ProblemBuilder};
pub use timetable::{
    schedule, Timetable, TimetableConfig, TimetableError, TimetableInput, TimetableModel,
};
