//! Weekly timetables for student groups as a boolean model.
//!
//! [`TimetableModel::build`] turns a [`TimetableInput`] and [`TimetableConfig`] into a
//! [`Problem`](crate::problem_builder::Problem). Any
//! [`SolvingEngine`](crate::engine::SolvingEngine) solves it, and the outcome is read back
//! into a [`Timetable`].

pub mod allocator;
pub mod config;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod model;
pub mod objective;
pub mod schedule;
pub mod verify;

pub use allocator::SlotVariables;
pub use config::TimetableConfig;
pub use constraints::ConstraintFamily;
pub use domain::{Group, TimeSlot, TimetableInput};
pub use error::{ConfigurationError, TimetableError};
pub use model::{schedule, TimetableModel};
pub use schedule::{GroupTimetable, ScheduledClass, Timetable};
pub use verify::{verify, Violation};
