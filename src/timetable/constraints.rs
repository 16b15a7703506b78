//! The eight constraint families.
//!
//! Each family reads the catalog and the variable arena and only appends clauses to the
//! builder, so families can run in any order. The one exception: teacher conflicts count a
//! common subject through its shared slot variable, which must already be tied to the groups'
//! lesson variables by [`link_common_subjects`].

use fnv::FnvHashSet;
use log::{debug, trace};

use crate::instance::Literal;
use crate::problem_builder::ProblemBuilder;

use super::allocator::SlotVariables;
use super::config::TimetableConfig;
use super::domain::{Catalog, GroupId, SubjectId};
use super::error::TimetableError;

/// Everything a family needs to read.
#[derive(Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub catalog: &'a Catalog,
    pub vars: &'a SlotVariables,
    pub config: &'a TimetableConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    CommonSubjectLinkage,
    MinimumHours,
    SingleClassPerSlot,
    MaxSubjectsPerDay,
    NoGaps,
    NonAdjacentRepeat,
    MaxOccurrencesPerDay,
    TeacherConflict,
}

impl ConstraintFamily {
    /// Every family, in emission order.
    pub const ALL: [ConstraintFamily; 8] = [
        ConstraintFamily::CommonSubjectLinkage,
        ConstraintFamily::MinimumHours,
        ConstraintFamily::SingleClassPerSlot,
        ConstraintFamily::MaxSubjectsPerDay,
        ConstraintFamily::NoGaps,
        ConstraintFamily::NonAdjacentRepeat,
        ConstraintFamily::MaxOccurrencesPerDay,
        ConstraintFamily::TeacherConflict,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintFamily::CommonSubjectLinkage => "common-subject linkage",
            ConstraintFamily::MinimumHours => "minimum hours",
            ConstraintFamily::SingleClassPerSlot => "single class per slot",
            ConstraintFamily::MaxSubjectsPerDay => "max subjects per day",
            ConstraintFamily::NoGaps => "no gaps",
            ConstraintFamily::NonAdjacentRepeat => "non-adjacent repeat",
            ConstraintFamily::MaxOccurrencesPerDay => "max occurrences per day",
            ConstraintFamily::TeacherConflict => "teacher conflict",
        }
    }
}

/// Which (group, common subject) pairs had their lesson slots tied to the shared slots.
#[derive(Debug, Default, Clone)]
pub struct CommonLinks {
    linked: FnvHashSet<(GroupId, SubjectId)>,
}

impl CommonLinks {
    pub fn contains(&self, group: GroupId, subject: SubjectId) -> bool {
        self.linked.contains(&(group, subject))
    }

    /// Every group that lists a common subject must have been linked.
    pub fn check(&self, catalog: &Catalog) -> Result<(), TimetableError> {
        for (group_id, group) in catalog.groups() {
            for &(subject_id, _) in &group.requirements {
                let subject = catalog.subject(subject_id);
                if subject.common && !self.contains(group_id, subject_id) {
                    return Err(TimetableError::InconsistentAliasing {
                        group: group.name.clone(),
                        subject: subject.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Emits one family, except [`ConstraintFamily::CommonSubjectLinkage`], whose link record is
/// needed afterwards; use [`link_common_subjects`] for that one.
pub fn emit(family: ConstraintFamily, pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    let before = pb.clause_count();
    match family {
        ConstraintFamily::CommonSubjectLinkage => {
            link_common_subjects(pb, ctx);
        }
        ConstraintFamily::MinimumHours => minimum_hours(pb, ctx),
        ConstraintFamily::SingleClassPerSlot => single_class_per_slot(pb, ctx),
        ConstraintFamily::MaxSubjectsPerDay => max_subjects_per_day(pb, ctx),
        ConstraintFamily::NoGaps => no_gaps(pb, ctx),
        ConstraintFamily::NonAdjacentRepeat => non_adjacent_repeat(pb, ctx),
        ConstraintFamily::MaxOccurrencesPerDay => max_occurrences_per_day(pb, ctx),
        ConstraintFamily::TeacherConflict => teacher_conflict(pb, ctx),
    }
    debug!("{}: {} clauses", family.name(), pb.clause_count() - before);
}

fn positive(vars: &[crate::instance::Variable]) -> Vec<Literal> {
    vars.iter().map(|&v| Literal::positive(v)).collect()
}

/// 1. A common subject's lesson variable equals the shared slot variable, for every group
/// that studies it.
pub fn link_common_subjects(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) -> CommonLinks {
    let mut links = CommonLinks::default();
    for (subject_id, subject) in ctx.catalog.subjects().filter(|(_, s)| s.common) {
        for group_id in ctx.catalog.groups_studying(subject_id) {
            let mut complete = true;
            for slot in ctx.config.slots() {
                match (
                    ctx.vars.lesson(group_id, subject_id, slot),
                    ctx.vars.common_slot(subject_id, slot),
                ) {
                    (Some(lesson), Some(shared)) => {
                        pb.require_equal(Literal::positive(lesson), Literal::positive(shared))
                    }
                    _ => complete = false,
                }
            }
            if complete {
                links.linked.insert((group_id, subject_id));
            } else {
                trace!("missing slot variables linking {}", subject.name);
            }
        }
    }
    links
}

/// 2. Each (group, subject) gets at least its required hours over the horizon.
pub fn minimum_hours(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    for (group_id, group) in ctx.catalog.groups() {
        for &(subject_id, hours) in &group.requirements {
            if let Some(block) = ctx.vars.lesson_block(group_id, subject_id) {
                pb.at_least(&positive(block), hours as usize);
            }
        }
    }
}

/// 3. A group attends at most one class per slot.
pub fn single_class_per_slot(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    for (group_id, _) in ctx.catalog.groups() {
        for slot in ctx.config.slots() {
            let ix = ctx.config.slot_index(slot);
            let lits: Vec<Literal> = ctx
                .vars
                .group_blocks(group_id)
                .map(|(_, block)| Literal::positive(block[ix]))
                .collect();
            pb.at_most(&lits, 1);
        }
    }
}

/// 4. A group attends at most `max_subjects_per_day` classes per day.
pub fn max_subjects_per_day(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    let hours = ctx.config.hours_per_day;
    for (group_id, _) in ctx.catalog.groups() {
        for day in 0..ctx.config.days {
            let lits: Vec<Literal> = ctx
                .vars
                .group_blocks(group_id)
                .flat_map(|(_, block)| block[day * hours..(day + 1) * hours].iter())
                .map(|&v| Literal::positive(v))
                .collect();
            pb.at_most(&lits, ctx.config.max_subjects_per_day);
        }
    }
}

/// 5. For each interior hour `h`: `x[h-1] | !x[h+1] | x[h]`.
///
/// Only interior hours are covered; the first and last hour of a day are never the middle
/// of the pattern.
pub fn no_gaps(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    for_each_subject_day(ctx, |day| {
        for h in 1..day.len().saturating_sub(1) {
            pb.require_clause(&[
                Literal::positive(day[h - 1]),
                Literal::negative(day[h + 1]),
                Literal::positive(day[h]),
            ]);
        }
    });
}

/// 6. A subject never occupies two consecutive hours.
pub fn non_adjacent_repeat(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    for_each_subject_day(ctx, |day| {
        for pair in day.windows(2) {
            pb.require_implies(Literal::positive(pair[0]), Literal::negative(pair[1]));
        }
    });
}

/// 7. A subject occurs at most `max_same_subject_per_day` times per day for a group.
pub fn max_occurrences_per_day(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    let cap = ctx.config.max_same_subject_per_day;
    for_each_subject_day(ctx, |day| pb.at_most(&positive(day), cap));
}

/// 8. A teacher is in at most one place per slot.
///
/// A common subject contributes its single shared slot variable, however many groups attend;
/// a group-specific subject contributes one lesson variable per group. The teacher's
/// occupancy variable is tied to the disjunction of everything counted.
pub fn teacher_conflict(pb: &mut ProblemBuilder, ctx: ConstraintContext<'_>) {
    if !ctx.vars.has_teacher_variables() {
        debug!("no teacher variables allocated, skipping teacher conflicts");
        return;
    }
    for (teacher_id, teacher) in ctx.catalog.teachers() {
        let subjects: Vec<SubjectId> = ctx.catalog.subjects_taught_by(teacher_id).collect();
        for slot in ctx.config.slots() {
            let mut engaged = vec![];
            for &subject_id in &subjects {
                if ctx.catalog.subject(subject_id).common {
                    engaged.extend(ctx.vars.common_slot(subject_id, slot).map(Literal::positive));
                } else {
                    engaged.extend(
                        ctx.catalog
                            .groups_studying(subject_id)
                            .filter_map(|g| ctx.vars.lesson(g, subject_id, slot))
                            .map(Literal::positive),
                    );
                }
            }
            let occupancy = match ctx.vars.teacher_slot(teacher_id, slot) {
                Some(var) => Literal::positive(var),
                None => continue,
            };
            trace!("{} at {}: {} candidate classes", teacher, slot, engaged.len());

            pb.define_or(occupancy, &engaged);
            pb.at_most(&engaged, 1);
        }
    }
}

fn for_each_subject_day(
    ctx: ConstraintContext<'_>,
    mut f: impl FnMut(&[crate::instance::Variable]),
) {
    for (group_id, group) in ctx.catalog.groups() {
        for &(subject_id, _) in &group.requirements {
            for day in 0..ctx.config.days {
                if let Some(vars) = ctx.vars.lesson_day(group_id, subject_id, day) {
                    f(vars);
                }
            }
        }
    }
}
