//! Decision variable arena.
//!
//! Lesson variables live in one dense vector: each (group, subject) pair owns a contiguous
//! block of `slot_count` variables, indexed day-major. A lookup table maps the pair to its
//! block offset, so a lesson variable is one hash lookup plus an add.

use fnv::FnvHashMap;
use log::{debug, info};

use crate::instance::Variable;
use crate::problem_builder::ProblemBuilder;

use super::config::TimetableConfig;
use super::domain::{Catalog, GroupId, SubjectId, TeacherId, TimeSlot};

#[derive(Debug, Clone)]
pub struct SlotVariables {
    hours_per_day: usize,
    slot_count: usize,
    lessons: Vec<Variable>,
    lesson_blocks: FnvHashMap<(GroupId, SubjectId), usize>,
    /// Per group, its subjects in requirement order with their block offsets.
    group_blocks: Vec<Vec<(SubjectId, usize)>>,
    common: Vec<Variable>,
    common_blocks: FnvHashMap<SubjectId, usize>,
    teachers: Vec<Variable>,
    teacher_blocks: FnvHashMap<TeacherId, usize>,
}

impl SlotVariables {
    /// Allocates one lesson variable per (group, subject, slot) the group studies, one shared
    /// variable per (common subject, slot), and, if `with_teachers`, one occupancy variable
    /// per (teacher, slot). Allocation order depends only on the catalog and the horizon.
    pub fn allocate(
        pb: &mut ProblemBuilder,
        catalog: &Catalog,
        config: &TimetableConfig,
        with_teachers: bool,
    ) -> SlotVariables {
        let slot_count = config.slot_count();
        let mut vars = SlotVariables {
            hours_per_day: config.hours_per_day,
            slot_count,
            lessons: vec![],
            lesson_blocks: FnvHashMap::default(),
            group_blocks: Vec::with_capacity(catalog.group_count()),
            common: vec![],
            common_blocks: FnvHashMap::default(),
            teachers: vec![],
            teacher_blocks: FnvHashMap::default(),
        };

        for (group_id, group) in catalog.groups() {
            let mut blocks = Vec::with_capacity(group.requirements.len());
            for &(subject_id, _) in &group.requirements {
                let offset = vars.lessons.len();
                let subject = &catalog.subject(subject_id).name;
                for slot in config.slots() {
                    let name = format!("lesson[{}/{}@{}]", group.name, subject, slot);
                    vars.lessons.push(pb.var(&name));
                }
                vars.lesson_blocks.insert((group_id, subject_id), offset);
                blocks.push((subject_id, offset));
            }
            vars.group_blocks.push(blocks);
        }

        for (subject_id, subject) in catalog.subjects().filter(|(_, s)| s.common) {
            let offset = vars.common.len();
            for slot in config.slots() {
                let name = format!("common[{}@{}]", subject.name, slot);
                vars.common.push(pb.var(&name));
            }
            vars.common_blocks.insert(subject_id, offset);
        }

        if with_teachers {
            for (teacher_id, teacher) in catalog.teachers() {
                let offset = vars.teachers.len();
                for slot in config.slots() {
                    let name = format!("teacher[{}@{}]", teacher, slot);
                    vars.teachers.push(pb.var(&name));
                }
                vars.teacher_blocks.insert(teacher_id, offset);
            }
        }

        info!(
            "allocated {} lesson, {} common and {} teacher variables",
            vars.lessons.len(),
            vars.common.len(),
            vars.teachers.len()
        );
        debug!("{} slots per block", slot_count);
        vars
    }

    fn slot_index(&self, slot: TimeSlot) -> Option<usize> {
        if slot.hour >= self.hours_per_day {
            return None;
        }
        let ix = slot.day * self.hours_per_day + slot.hour;
        (ix < self.slot_count).then_some(ix)
    }

    pub fn lesson(&self, group: GroupId, subject: SubjectId, slot: TimeSlot) -> Option<Variable> {
        let offset = *self.lesson_blocks.get(&(group, subject))?;
        Some(self.lessons[offset + self.slot_index(slot)?])
    }

    /// All of a (group, subject) pair's lesson variables, day-major.
    pub fn lesson_block(&self, group: GroupId, subject: SubjectId) -> Option<&[Variable]> {
        let offset = *self.lesson_blocks.get(&(group, subject))?;
        Some(&self.lessons[offset..offset + self.slot_count])
    }

    /// The lesson variables of one day, indexed by hour.
    pub fn lesson_day(
        &self,
        group: GroupId,
        subject: SubjectId,
        day: usize,
    ) -> Option<&[Variable]> {
        let block = self.lesson_block(group, subject)?;
        let start = day * self.hours_per_day;
        block.get(start..start + self.hours_per_day)
    }

    /// A group's lesson blocks in requirement order.
    pub fn group_blocks(
        &self,
        group: GroupId,
    ) -> impl Iterator<Item = (SubjectId, &[Variable])> + '_ {
        self.group_blocks[group.0].iter().map(move |&(subject, offset)| {
            (subject, &self.lessons[offset..offset + self.slot_count])
        })
    }

    /// Every lesson variable, in allocation order.
    pub fn lessons(&self) -> &[Variable] {
        &self.lessons
    }

    pub fn common_slot(&self, subject: SubjectId, slot: TimeSlot) -> Option<Variable> {
        let offset = *self.common_blocks.get(&subject)?;
        Some(self.common[offset + self.slot_index(slot)?])
    }

    pub fn teacher_slot(&self, teacher: TeacherId, slot: TimeSlot) -> Option<Variable> {
        let offset = *self.teacher_blocks.get(&teacher)?;
        Some(self.teachers[offset + self.slot_index(slot)?])
    }

    pub fn has_teacher_variables(&self) -> bool {
        !self.teachers.is_empty()
    }
}
