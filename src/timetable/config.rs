use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::TimeSlot;

/// Fixed parameters of one scheduling run. Built once and passed by reference to every stage,
/// so independent runs (one per semester, say) never share state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Working days in the planning horizon.
    pub days: usize,
    pub hours_per_day: usize,
    /// Wall-clock hour of the first slot of each day; only used for presentation.
    pub start_hour: u32,
    /// Ceiling on a group's scheduled classes per day, across all subjects.
    pub max_subjects_per_day: usize,
    /// Ceiling on occurrences of one subject for one group per day.
    pub max_same_subject_per_day: usize,
    /// Subjects attended jointly, at the same slot, by every group that studies them.
    pub common_subjects: BTreeSet<String>,
    /// Forbid a teacher from being in two places at once. Only takes effect when a
    /// subject-to-teacher mapping is supplied.
    pub enforce_teacher_conflicts: bool,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        TimetableConfig {
            days: 10,
            hours_per_day: 7,
            start_hour: 9,
            max_subjects_per_day: 6,
            max_same_subject_per_day: 1,
            common_subjects: BTreeSet::new(),
            enforce_teacher_conflicts: true,
        }
    }
}

impl TimetableConfig {
    pub fn with_horizon(days: usize, hours_per_day: usize) -> Self {
        TimetableConfig {
            days,
            hours_per_day,
            ..TimetableConfig::default()
        }
    }

    pub fn with_max_subjects_per_day(mut self, max: usize) -> Self {
        self.max_subjects_per_day = max;
        self
    }

    pub fn with_max_same_subject_per_day(mut self, max: usize) -> Self {
        self.max_same_subject_per_day = max;
        self
    }

    pub fn with_common_subject(mut self, subject: impl Into<String>) -> Self {
        self.common_subjects.insert(subject.into());
        self
    }

    pub fn with_teacher_conflicts(mut self, enforce: bool) -> Self {
        self.enforce_teacher_conflicts = enforce;
        self
    }

    pub fn slot_count(&self) -> usize {
        self.days * self.hours_per_day
    }

    pub fn is_common(&self, subject: &str) -> bool {
        self.common_subjects.contains(subject)
    }

    /// Every slot of the horizon, day-major.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..self.days)
            .flat_map(move |day| (0..self.hours_per_day).map(move |hour| TimeSlot { day, hour }))
    }

    pub fn slot_index(&self, slot: TimeSlot) -> usize {
        slot.day * self.hours_per_day + slot.hour
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = TimetableConfig::default();
        assert_eq!(config.slot_count(), 70);
        assert_eq!(config.start_hour, 9);
        assert_eq!(config.max_subjects_per_day, 6);
        assert_eq!(config.max_same_subject_per_day, 1);
        assert!(config.enforce_teacher_conflicts);
    }

    #[test]
    fn test_slots_are_day_major() {
        let config = TimetableConfig::with_horizon(2, 3);
        let slots: Vec<TimeSlot> = config.slots().collect();
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[3], TimeSlot { day: 1, hour: 0 });
        for (ix, slot) in slots.iter().enumerate() {
            assert_eq!(config.slot_index(*slot), ix);
        }
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: TimetableConfig =
            serde_json::from_str(r#"{"days": 5, "common_subjects": ["English"]}"#).unwrap();
        assert_eq!(config.days, 5);
        assert_eq!(config.hours_per_day, 7);
        assert!(config.is_common("English"));
        assert!(!config.is_common("Economics"));
    }
}
