use thiserror::Error;

/// Problems with the supplied data or configuration, detected before any constraint is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("the planning horizon has no slots ({days} days x {hours_per_day} hours)")]
    EmptyHorizon { days: usize, hours_per_day: usize },
    #[error("no groups to schedule")]
    NoGroups,
    #[error("group {0} is listed more than once")]
    DuplicateGroup(String),
    #[error("group {0} has no subjects")]
    NoSubjects(String),
    #[error("group {group} requires {subject} for zero hours")]
    InvalidMinimumHours { group: String, subject: String },
    #[error("subject {0} has no teacher, but teacher conflicts are enforced")]
    MissingTeacher(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimetableError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A group studies a common subject but its slots were never tied to the shared ones.
    #[error("common subject {subject} is not linked for group {group}")]
    InconsistentAliasing { group: String, subject: String },
}
