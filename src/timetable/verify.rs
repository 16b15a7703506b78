//! Independent checks of a materialised timetable against the scheduling rules.
//!
//! Works only on the input, the configuration and the printed classes, never on the model,
//! so it catches encoding mistakes rather than repeating them.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use thiserror::Error;

use super::config::TimetableConfig;
use super::domain::{teacher_conflicts_requested, TimeSlot, TimetableInput};
use super::schedule::{GroupTimetable, ScheduledClass, Timetable};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{group} has no timetable although the run was solved")]
    MissingGroup { group: String },
    #[error("{group} attends {subject}, which it does not study")]
    UnknownSubject { group: String, subject: String },
    #[error("{group} is double-booked at {slot}")]
    DoubleBooked { group: String, slot: TimeSlot },
    #[error("{group} gets {scheduled} of the {required} hours of {subject}")]
    MinimumHours {
        group: String,
        subject: String,
        required: u32,
        scheduled: usize,
    },
    #[error("{group} has {scheduled} classes on day {day}")]
    DailyCap {
        group: String,
        day: usize,
        scheduled: usize,
    },
    #[error("{group} has {subject} at consecutive hours from {slot}")]
    AdjacentRepeat {
        group: String,
        subject: String,
        slot: TimeSlot,
    },
    #[error("{group} has {subject} {scheduled} times on day {day}")]
    SameSubjectCap {
        group: String,
        subject: String,
        day: usize,
        scheduled: usize,
    },
    #[error("{group} has {subject} after an empty hour {slot} with nothing before it")]
    Gap {
        group: String,
        subject: String,
        slot: TimeSlot,
    },
    #[error("common subject {subject} is not at {slot} for every group")]
    CommonMismatch { subject: String, slot: TimeSlot },
    #[error("{teacher} teaches {classes} classes at {slot}")]
    TeacherClash {
        teacher: String,
        slot: TimeSlot,
        classes: usize,
    },
}

/// Returns every rule the timetable breaks. An unsolved timetable has nothing to check.
pub fn verify(
    input: &TimetableInput,
    config: &TimetableConfig,
    timetable: &Timetable,
) -> Vec<Violation> {
    let mut violations = vec![];
    if !timetable.is_solved() {
        return violations;
    }

    // group -> (subject, slot) pairs
    let mut scheduled: BTreeMap<&str, BTreeSet<(&str, TimeSlot)>> = BTreeMap::new();
    for group in &input.groups {
        match timetable.group(&group.name) {
            Some(GroupTimetable::Scheduled(classes)) => {
                check_group(group.name.as_str(), &group.subjects, classes, config, &mut violations);
                scheduled.insert(
                    group.name.as_str(),
                    classes.iter().map(|c| (c.subject.as_str(), c.slot)).collect(),
                );
            }
            _ => violations.push(Violation::MissingGroup {
                group: group.name.clone(),
            }),
        }
    }

    check_common_subjects(input, config, &scheduled, &mut violations);
    if teacher_conflicts_requested(input, config) {
        check_teachers(input, config, &scheduled, &mut violations);
    }
    violations
}

fn check_group(
    group: &str,
    subjects: &BTreeMap<String, u32>,
    classes: &[ScheduledClass],
    config: &TimetableConfig,
    violations: &mut Vec<Violation>,
) {
    for class in classes {
        if !subjects.contains_key(&class.subject) {
            violations.push(Violation::UnknownSubject {
                group: group.to_string(),
                subject: class.subject.clone(),
            });
        }
    }

    for (slot, count) in classes.iter().counts_by(|c| c.slot).into_iter().sorted() {
        if count > 1 {
            violations.push(Violation::DoubleBooked {
                group: group.to_string(),
                slot,
            });
        }
    }

    for day in 0..config.days {
        let count = classes.iter().filter(|c| c.slot.day == day).count();
        if count > config.max_subjects_per_day {
            violations.push(Violation::DailyCap {
                group: group.to_string(),
                day,
                scheduled: count,
            });
        }
    }

    for (subject, &required) in subjects {
        let hours: BTreeSet<TimeSlot> = classes
            .iter()
            .filter(|c| &c.subject == subject)
            .map(|c| c.slot)
            .collect();
        if hours.len() < required as usize {
            violations.push(Violation::MinimumHours {
                group: group.to_string(),
                subject: subject.clone(),
                required,
                scheduled: hours.len(),
            });
        }

        for day in 0..config.days {
            let at = |hour: usize| hours.contains(&TimeSlot::new(day, hour));
            let per_day = (0..config.hours_per_day).filter(|&h| at(h)).count();
            if per_day > config.max_same_subject_per_day {
                violations.push(Violation::SameSubjectCap {
                    group: group.to_string(),
                    subject: subject.clone(),
                    day,
                    scheduled: per_day,
                });
            }
            for hour in 0..config.hours_per_day.saturating_sub(1) {
                if at(hour) && at(hour + 1) {
                    violations.push(Violation::AdjacentRepeat {
                        group: group.to_string(),
                        subject: subject.clone(),
                        slot: TimeSlot::new(day, hour),
                    });
                }
            }
            for hour in 1..config.hours_per_day.saturating_sub(1) {
                if !at(hour - 1) && at(hour + 1) && !at(hour) {
                    violations.push(Violation::Gap {
                        group: group.to_string(),
                        subject: subject.clone(),
                        slot: TimeSlot::new(day, hour),
                    });
                }
            }
        }
    }
}

fn check_common_subjects(
    input: &TimetableInput,
    config: &TimetableConfig,
    scheduled: &BTreeMap<&str, BTreeSet<(&str, TimeSlot)>>,
    violations: &mut Vec<Violation>,
) {
    for subject in &config.common_subjects {
        let attending = input
            .groups
            .iter()
            .filter(|g| g.subjects.contains_key(subject))
            .filter_map(|g| scheduled.get(g.name.as_str()))
            .collect_vec();
        for slot in config.slots() {
            let present = attending
                .iter()
                .filter(|classes| classes.contains(&(subject.as_str(), slot)))
                .count();
            if present != 0 && present != attending.len() {
                violations.push(Violation::CommonMismatch {
                    subject: subject.clone(),
                    slot,
                });
            }
        }
    }
}

fn check_teachers(
    input: &TimetableInput,
    config: &TimetableConfig,
    scheduled: &BTreeMap<&str, BTreeSet<(&str, TimeSlot)>>,
    violations: &mut Vec<Violation>,
) {
    let by_teacher = input
        .teachers
        .iter()
        .map(|(subject, teacher)| (teacher.as_str(), subject.as_str()))
        .into_group_map();

    for (teacher, subjects) in by_teacher.into_iter().sorted() {
        for slot in config.slots() {
            // A joint lecture is one engagement however many groups attend it
            let mut engagements: BTreeSet<(&str, Option<&str>)> = BTreeSet::new();
            for (group, classes) in scheduled {
                for &subject in &subjects {
                    if classes.contains(&(subject, slot)) {
                        let who = if config.is_common(subject) { None } else { Some(*group) };
                        engagements.insert((subject, who));
                    }
                }
            }
            if engagements.len() > 1 {
                violations.push(Violation::TeacherClash {
                    teacher: teacher.to_string(),
                    slot,
                    classes: engagements.len(),
                });
            }
        }
    }
}
