use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

use super::config::TimetableConfig;
use super::error::ConfigurationError;

/// A student group and the minimum contact hours it needs per subject over the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub subjects: BTreeMap<String, u32>,
}

impl Group {
    pub fn new<S: Into<String>>(name: S, subjects: impl IntoIterator<Item = (S, u32)>) -> Group {
        Group {
            name: name.into(),
            subjects: subjects.into_iter().map(|(s, h)| (s.into(), h)).collect(),
        }
    }
}

/// Everything the data-loading side supplies: groups in a fixed order, and the global
/// subject-to-teacher mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableInput {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub teachers: BTreeMap<String, String>,
}

impl TimetableInput {
    pub fn new() -> TimetableInput {
        TimetableInput::default()
    }

    pub fn with_group(mut self, group: Group) -> TimetableInput {
        self.groups.push(group);
        self
    }

    pub fn with_teacher(
        mut self,
        subject: impl Into<String>,
        teacher: impl Into<String>,
    ) -> TimetableInput {
        self.teachers.insert(subject.into(), teacher.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: usize,
    pub hour: usize,
}

impl TimeSlot {
    pub fn new(day: usize, hour: usize) -> TimeSlot {
        TimeSlot { day, hour }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}h{}", self.day, self.hour)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeacherId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectInfo {
    pub name: String,
    pub common: bool,
    pub teacher: Option<TeacherId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub name: String,
    /// Sorted by subject name.
    pub requirements: Vec<(SubjectId, u32)>,
}

/// The validated, interned form of a [`TimetableInput`].
///
/// Subjects and teachers are numbered in name order and only include what some group
/// actually studies, so two catalogs built from equal inputs are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    groups: Vec<GroupInfo>,
    subjects: Vec<SubjectInfo>,
    teachers: Vec<String>,
}

impl Catalog {
    pub fn new(
        input: &TimetableInput,
        config: &TimetableConfig,
    ) -> Result<Catalog, ConfigurationError> {
        if config.slot_count() == 0 {
            return Err(ConfigurationError::EmptyHorizon {
                days: config.days,
                hours_per_day: config.hours_per_day,
            });
        }
        if input.groups.is_empty() {
            return Err(ConfigurationError::NoGroups);
        }

        let mut seen = FnvHashSet::default();
        for group in &input.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigurationError::DuplicateGroup(group.name.clone()));
            }
            if group.subjects.is_empty() {
                return Err(ConfigurationError::NoSubjects(group.name.clone()));
            }
            if let Some((subject, _)) = group.subjects.iter().find(|&(_, &hours)| hours == 0) {
                return Err(ConfigurationError::InvalidMinimumHours {
                    group: group.name.clone(),
                    subject: subject.clone(),
                });
            }
        }

        let studied: BTreeSet<&str> = input
            .groups
            .iter()
            .flat_map(|g| g.subjects.keys().map(|s| s.as_str()))
            .collect();

        if teacher_conflicts_requested(input, config) {
            if let Some(subject) = studied.iter().find(|s| !input.teachers.contains_key(**s)) {
                return Err(ConfigurationError::MissingTeacher(subject.to_string()));
            }
        }

        let teachers: Vec<String> = studied
            .iter()
            .filter_map(|s| input.teachers.get(*s))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let subjects: Vec<SubjectInfo> = studied
            .iter()
            .map(|&name| SubjectInfo {
                name: name.to_string(),
                common: config.is_common(name),
                teacher: input
                    .teachers
                    .get(name)
                    .and_then(|t| teachers.iter().position(|known| known == t))
                    .map(TeacherId),
            })
            .collect();

        let groups = input
            .groups
            .iter()
            .map(|g| GroupInfo {
                name: g.name.clone(),
                requirements: g
                    .subjects
                    .iter()
                    .filter_map(|(name, &hours)| {
                        let ix = studied.iter().position(|s| *s == name.as_str())?;
                        Some((SubjectId(ix), hours))
                    })
                    .collect(),
            })
            .collect();

        Ok(Catalog {
            groups,
            subjects,
            teachers,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &GroupInfo)> + '_ {
        self.groups.iter().enumerate().map(|(ix, g)| (GroupId(ix), g))
    }

    pub fn subjects(&self) -> impl Iterator<Item = (SubjectId, &SubjectInfo)> + '_ {
        self.subjects.iter().enumerate().map(|(ix, s)| (SubjectId(ix), s))
    }

    pub fn teachers(&self) -> impl Iterator<Item = (TeacherId, &str)> + '_ {
        self.teachers.iter().enumerate().map(|(ix, t)| (TeacherId(ix), t.as_str()))
    }

    pub fn group(&self, id: GroupId) -> &GroupInfo {
        &self.groups[id.0]
    }

    pub fn subject(&self, id: SubjectId) -> &SubjectInfo {
        &self.subjects[id.0]
    }

    pub fn teacher(&self, id: TeacherId) -> &str {
        &self.teachers[id.0]
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups that study `subject`, in group order.
    pub fn groups_studying(&self, subject: SubjectId) -> impl Iterator<Item = GroupId> + '_ {
        self.groups()
            .filter(move |(_, g)| g.requirements.iter().any(|(s, _)| *s == subject))
            .map(|(id, _)| id)
    }

    pub fn subjects_taught_by(&self, teacher: TeacherId) -> impl Iterator<Item = SubjectId> + '_ {
        self.subjects()
            .filter(move |(_, s)| s.teacher == Some(teacher))
            .map(|(id, _)| id)
    }
}

/// The teacher family runs only when enabled and a mapping was actually supplied.
pub fn teacher_conflicts_requested(input: &TimetableInput, config: &TimetableConfig) -> bool {
    config.enforce_teacher_conflicts && !input.teachers.is_empty()
}

#[cfg(test)]
mod test {
    use super::*;

    fn input() -> TimetableInput {
        TimetableInput::new()
            .with_group(Group::new("g2", [("Economics", 2), ("English", 3)]))
            .with_group(Group::new("g1", [("English", 3), ("Algebra", 1)]))
    }

    #[test]
    fn test_interning_is_name_ordered() {
        let config = TimetableConfig::with_horizon(2, 3).with_common_subject("English");
        let catalog = Catalog::new(&input(), &config).unwrap();

        let names: Vec<&str> = catalog.subjects().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["Algebra", "Economics", "English"]);
        assert!(catalog.subject(SubjectId(2)).common);
        // group order is preserved from the input
        assert_eq!(catalog.group(GroupId(0)).name, "g2");
        assert_eq!(
            catalog.groups_studying(SubjectId(2)).collect::<Vec<_>>(),
            vec![GroupId(0), GroupId(1)]
        );
        assert_eq!(
            catalog.group(GroupId(1)).requirements,
            vec![(SubjectId(0), 1), (SubjectId(2), 3)]
        );
    }

    #[test]
    fn test_teachers_interned_for_studied_subjects() {
        let input = input()
            .with_teacher("English", "Smith")
            .with_teacher("Economics", "Jones")
            .with_teacher("Algebra", "Smith")
            .with_teacher("Latin", "Brown");
        let catalog = Catalog::new(&input, &TimetableConfig::with_horizon(1, 1)).unwrap();

        assert_eq!(catalog.teachers().map(|(_, t)| t).collect::<Vec<_>>(), vec!["Jones", "Smith"]);
        assert_eq!(
            catalog.subjects_taught_by(TeacherId(1)).collect::<Vec<_>>(),
            vec![SubjectId(0), SubjectId(2)]
        );
    }

    #[test]
    fn test_configuration_errors() {
        let config = TimetableConfig::with_horizon(2, 3);
        assert_eq!(
            Catalog::new(&input(), &TimetableConfig::with_horizon(0, 3)),
            Err(ConfigurationError::EmptyHorizon { days: 0, hours_per_day: 3 })
        );
        assert_eq!(
            Catalog::new(&TimetableInput::new(), &config),
            Err(ConfigurationError::NoGroups)
        );
        let empty = TimetableInput::new().with_group(Group::new("g", Vec::<(&str, u32)>::new()));
        assert_eq!(
            Catalog::new(&empty, &config),
            Err(ConfigurationError::NoSubjects("g".to_string()))
        );
        let dup = input().with_group(Group::new("g1", [("Algebra", 1)]));
        assert_eq!(
            Catalog::new(&dup, &config),
            Err(ConfigurationError::DuplicateGroup("g1".to_string()))
        );
        let zero = TimetableInput::new().with_group(Group::new("g", [("Algebra", 0)]));
        assert!(matches!(
            Catalog::new(&zero, &config),
            Err(ConfigurationError::InvalidMinimumHours { .. })
        ));
    }

    #[test]
    fn test_missing_teacher_only_when_enforced() {
        let partial = input().with_teacher("English", "Smith");
        let config = TimetableConfig::with_horizon(2, 3);
        assert_eq!(
            Catalog::new(&partial, &config),
            Err(ConfigurationError::MissingTeacher("Algebra".to_string()))
        );
        assert!(Catalog::new(&partial, &config.clone().with_teacher_conflicts(false)).is_ok());
        assert!(Catalog::new(&input(), &config).is_ok());
    }
}
