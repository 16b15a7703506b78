//! Reading a solved assignment back into per-group timetables.

use std::fmt;

use serde::Serialize;

use crate::engine::{EngineOutcome, SolveStatus};

use super::allocator::SlotVariables;
use super::config::TimetableConfig;
use super::domain::{Catalog, TimeSlot};

/// One class in a group's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledClass {
    pub slot: TimeSlot,
    pub subject: String,
    pub teacher: Option<String>,
}

impl ScheduledClass {
    /// Start of the class as `HH:00`, counting from `start_hour`.
    pub fn wall_clock(&self, start_hour: u32) -> String {
        format!("{:02}:00", start_hour as usize + self.slot.hour)
    }
}

impl fmt::Display for ScheduledClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} hour {}: {}", self.slot.day, self.slot.hour, self.subject)?;
        if let Some(teacher) = &self.teacher {
            write!(f, " ({})", teacher)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GroupTimetable {
    /// Classes ordered by day, then hour.
    Scheduled(Vec<ScheduledClass>),
    /// No timetable, because the run ended with this status.
    Unavailable(SolveStatus),
}

impl GroupTimetable {
    pub fn classes(&self) -> Option<&[ScheduledClass]> {
        match self {
            GroupTimetable::Scheduled(classes) => Some(classes),
            GroupTimetable::Unavailable(_) => None,
        }
    }
}

/// The materialised result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timetable {
    pub status: SolveStatus,
    pub objective_value: Option<usize>,
    groups: Vec<(String, GroupTimetable)>,
}

impl Timetable {
    /// Builds per-group timetables from an engine outcome. A run that did not end in
    /// OPTIMAL or FEASIBLE yields [`GroupTimetable::Unavailable`] for every group; partial
    /// results are never read.
    pub fn materialize(
        catalog: &Catalog,
        vars: &SlotVariables,
        config: &TimetableConfig,
        outcome: &EngineOutcome,
    ) -> Timetable {
        let solution = outcome.solution();
        let groups = catalog
            .groups()
            .map(|(group_id, group)| {
                let timetable = match solution {
                    None => GroupTimetable::Unavailable(outcome.status),
                    Some(assignment) => {
                        let mut classes = vec![];
                        for slot in config.slots() {
                            for &(subject_id, _) in &group.requirements {
                                let scheduled = vars
                                    .lesson(group_id, subject_id, slot)
                                    .map_or(false, |v| assignment.value(v));
                                if scheduled {
                                    let subject = catalog.subject(subject_id);
                                    classes.push(ScheduledClass {
                                        slot,
                                        subject: subject.name.clone(),
                                        teacher: subject
                                            .teacher
                                            .map(|t| catalog.teacher(t).to_string()),
                                    });
                                }
                            }
                        }
                        GroupTimetable::Scheduled(classes)
                    }
                };
                (group.name.clone(), timetable)
            })
            .collect();

        Timetable {
            status: outcome.status,
            objective_value: outcome.solution().and(outcome.objective_value),
            groups,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status.is_solution_found()
    }

    pub fn group(&self, name: &str) -> Option<&GroupTimetable> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn classes(&self, name: &str) -> Option<&[ScheduledClass]> {
        self.group(name)?.classes()
    }

    /// Groups in input order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupTimetable)> + '_ {
        self.groups.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn total_classes(&self) -> usize {
        self.groups
            .iter()
            .filter_map(|(_, t)| t.classes())
            .map(|c| c.len())
            .sum()
    }
}
