use log::debug;

use crate::instance::Literal;
use crate::problem_builder::ProblemBuilder;

use super::allocator::SlotVariables;

/// Minimise the total number of scheduled lessons across all groups, subjects and slots.
///
/// Once every minimum is met, any further lesson only costs, so optima are the most compact
/// timetables. Shared slot and occupancy variables are not counted.
pub fn minimize_scheduled_lessons(pb: &mut ProblemBuilder, vars: &SlotVariables) {
    let terms: Vec<Literal> = vars.lessons().iter().map(|&v| Literal::positive(v)).collect();
    debug!("objective over {} lesson variables", terms.len());
    pb.minimize(terms);
}
