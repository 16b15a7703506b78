//! Assembling the whole boolean model for one timetable run.

use log::info;

use crate::engine::{EngineOutcome, SolvingEngine};
use crate::problem_builder::{Problem, ProblemBuilder};

use super::allocator::SlotVariables;
use super::config::TimetableConfig;
use super::constraints::{self, ConstraintContext, ConstraintFamily};
use super::domain::{teacher_conflicts_requested, Catalog, TimetableInput};
use super::error::TimetableError;
use super::objective;
use super::schedule::Timetable;

/// A finished model: nothing in it changes after [`TimetableModel::build`] returns.
#[derive(Debug, Clone)]
pub struct TimetableModel {
    config: TimetableConfig,
    catalog: Catalog,
    variables: SlotVariables,
    problem: Problem,
}

impl TimetableModel {
    /// Validates the input, allocates the decision variables, emits every constraint family
    /// and the objective. Configuration errors abort before anything reaches a solver.
    pub fn build(
        input: &TimetableInput,
        config: &TimetableConfig,
    ) -> Result<TimetableModel, TimetableError> {
        let catalog = Catalog::new(input, config)?;
        let mut pb = ProblemBuilder::new();
        let with_teachers = teacher_conflicts_requested(input, config);
        let variables = SlotVariables::allocate(&mut pb, &catalog, config, with_teachers);

        let ctx = ConstraintContext {
            catalog: &catalog,
            vars: &variables,
            config,
        };
        // Linkage first: the teacher family counts common subjects through the shared slots.
        let links = constraints::link_common_subjects(&mut pb, ctx);
        links.check(&catalog)?;
        for family in ConstraintFamily::ALL
            .into_iter()
            .filter(|f| *f != ConstraintFamily::CommonSubjectLinkage)
        {
            constraints::emit(family, &mut pb, ctx);
        }
        objective::minimize_scheduled_lessons(&mut pb, &variables);

        let problem = pb.build();
        info!(
            "model for {} groups over {} slots: {} variables, {} clauses",
            catalog.group_count(),
            config.slot_count(),
            problem.variable_count(),
            problem.clauses().len()
        );

        Ok(TimetableModel {
            config: config.clone(),
            catalog,
            variables,
            problem,
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn variables(&self) -> &SlotVariables {
        &self.variables
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    /// Runs the engine once and reads the result back.
    pub fn solve<E: SolvingEngine + ?Sized>(&self, engine: &mut E) -> Timetable {
        let outcome = engine.solve(&self.problem);
        info!(
            "engine finished: {} after {} SAT calls in {:?}",
            outcome.status, outcome.stats.sat_calls, outcome.stats.elapsed
        );
        self.materialize(&outcome)
    }

    /// Reads an outcome produced elsewhere, e.g. from an external solver's transcript.
    pub fn materialize(&self, outcome: &EngineOutcome) -> Timetable {
        Timetable::materialize(&self.catalog, &self.variables, &self.config, outcome)
    }
}

/// Builds and solves in one go.
pub fn schedule<E: SolvingEngine + ?Sized>(
    input: &TimetableInput,
    config: &TimetableConfig,
    engine: &mut E,
) -> Result<Timetable, TimetableError> {
    Ok(TimetableModel::build(input, config)?.solve(engine))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{EngineConfig, SolveStatus, VarisatEngine};
    use crate::timetable::domain::{Group, TimeSlot};
    use crate::timetable::error::ConfigurationError;
    use crate::timetable::schedule::GroupTimetable;
    use crate::timetable::verify::verify;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn seed() -> (TimetableInput, TimetableConfig) {
        let input = TimetableInput::new().with_group(Group::new("G1", [("A", 2), ("B", 1)]));
        let config = TimetableConfig::with_horizon(2, 3).with_max_subjects_per_day(2);
        (input, config)
    }

    #[test]
    fn test_seed_scenario_is_optimal() {
        init_logging();
        let (input, config) = seed();
        let timetable = schedule(&input, &config, &mut VarisatEngine::default()).unwrap();

        assert_eq!(timetable.status, SolveStatus::Optimal);
        assert_eq!(timetable.objective_value, Some(3));
        assert_eq!(timetable.total_classes(), 3);
        assert_eq!(verify(&input, &config, &timetable), vec![]);

        let classes = timetable.classes("G1").unwrap();
        assert_eq!(classes.iter().filter(|c| c.subject == "A").count(), 2);
        assert_eq!(classes.iter().filter(|c| c.subject == "B").count(), 1);
    }

    #[test]
    fn test_impossible_minimum_is_infeasible() {
        let input = TimetableInput::new()
            .with_group(Group::new("G1", [("A", 7)]))
            .with_group(Group::new("G2", [("B", 1)]));
        let config = TimetableConfig::with_horizon(2, 3);
        let timetable = schedule(&input, &config, &mut VarisatEngine::default()).unwrap();

        assert_eq!(timetable.status, SolveStatus::Infeasible);
        assert_eq!(timetable.objective_value, None);
        for (_, group) in timetable.groups() {
            assert_eq!(group, &GroupTimetable::Unavailable(SolveStatus::Infeasible));
        }
    }

    #[test]
    fn test_summed_minimum_beyond_horizon_is_infeasible() {
        // Every subject fits on its own, but 7 required hours cannot share 6 slots
        let input =
            TimetableInput::new().with_group(Group::new("G1", [("A", 3), ("B", 3), ("C", 1)]));
        let config = TimetableConfig::with_horizon(2, 3)
            .with_max_same_subject_per_day(3)
            .with_max_subjects_per_day(3);
        let timetable = schedule(&input, &config, &mut VarisatEngine::default()).unwrap();

        assert_eq!(timetable.status, SolveStatus::Infeasible);
        assert_eq!(
            timetable.group("G1"),
            Some(&GroupTimetable::Unavailable(SolveStatus::Infeasible))
        );
    }

    fn faculty() -> (TimetableInput, TimetableConfig) {
        let input = TimetableInput::new()
            .with_group(Group::new("G1", [("Lecture", 2), ("Lab", 1)]))
            .with_group(Group::new("G2", [("Lecture", 2), ("Lab", 1), ("Essay", 1)]))
            .with_group(Group::new("G3", [("Lab", 2), ("Essay", 1)]))
            .with_teacher("Lecture", "Ann")
            .with_teacher("Lab", "Ann")
            .with_teacher("Essay", "Bob");
        let config = TimetableConfig::with_horizon(3, 4).with_common_subject("Lecture");
        (input, config)
    }

    #[test]
    fn test_common_subject_and_teachers() {
        init_logging();
        let (input, config) = faculty();
        let timetable = schedule(&input, &config, &mut VarisatEngine::default()).unwrap();

        assert_eq!(timetable.status, SolveStatus::Optimal);
        assert_eq!(verify(&input, &config, &timetable), vec![]);

        let lecture_slots = |group: &str| -> Vec<TimeSlot> {
            timetable
                .classes(group)
                .unwrap()
                .iter()
                .filter(|c| c.subject == "Lecture")
                .map(|c| c.slot)
                .collect()
        };
        assert_eq!(lecture_slots("G1"), lecture_slots("G2"));
        assert_eq!(lecture_slots("G1").len(), 2);

        let lab = timetable.classes("G3").unwrap().iter().find(|c| c.subject == "Lab").unwrap();
        assert_eq!(lab.teacher.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_disabled_teacher_conflicts_allocate_no_occupancy() {
        let input = TimetableInput::new()
            .with_group(Group::new("G1", [("A", 1)]))
            .with_group(Group::new("G2", [("A", 1)]))
            .with_teacher("A", "Ann");
        let enforced = TimetableModel::build(&input, &TimetableConfig::with_horizon(1, 2)).unwrap();
        assert!(enforced.variables().has_teacher_variables());

        let relaxed_config = TimetableConfig::with_horizon(1, 1).with_teacher_conflicts(false);
        let relaxed = TimetableModel::build(&input, &relaxed_config).unwrap();
        assert!(!relaxed.variables().has_teacher_variables());
        // both groups share the only slot, which is fine without the teacher rule
        let timetable = relaxed.solve(&mut VarisatEngine::default());
        assert_eq!(timetable.status, SolveStatus::Optimal);
        assert_eq!(timetable.total_classes(), 2);

        let strict = TimetableModel::build(&input, &TimetableConfig::with_horizon(1, 1)).unwrap();
        let timetable = strict.solve(&mut VarisatEngine::default());
        assert_eq!(timetable.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_build_is_deterministic() {
        let input = TimetableInput::new()
            .with_group(Group::new("G2", [("Economics", 2), ("English", 1)]))
            .with_group(Group::new("G1", [("English", 2), ("Algebra", 1)]))
            .with_teacher("Economics", "Kim")
            .with_teacher("English", "Lee")
            .with_teacher("Algebra", "Kim");
        let config = TimetableConfig::with_horizon(2, 4).with_common_subject("English");

        let first = TimetableModel::build(&input, &config).unwrap();
        let second = TimetableModel::build(&input, &config).unwrap();
        assert_eq!(first.problem().variable_count(), second.problem().variable_count());
        assert_eq!(first.problem().clauses(), second.problem().clauses());
        assert_eq!(first.problem().objective(), second.problem().objective());
        for var in first.problem().original_variables() {
            assert_eq!(
                first.problem().variable_name(var),
                second.problem().variable_name(var)
            );
        }
    }

    #[test]
    fn test_resolve_stays_valid() {
        for (input, config) in [seed(), faculty()] {
            for _ in 0..2 {
                let model = TimetableModel::build(&input, &config).unwrap();
                let timetable = model.solve(&mut VarisatEngine::default());
                assert!(timetable.is_solved());
                assert_eq!(verify(&input, &config, &timetable), vec![]);
            }
        }
    }

    #[test]
    fn test_first_solution_is_valid() {
        let (input, config) = seed();
        let mut engine = VarisatEngine::new(EngineConfig {
            time_budget: None,
            stop_after_first: true,
        });
        let timetable = schedule(&input, &config, &mut engine).unwrap();
        assert!(timetable.is_solved());
        assert!(timetable.objective_value.unwrap() >= 3);
        assert_eq!(verify(&input, &config, &timetable), vec![]);
    }

    #[test]
    fn test_wall_clock() {
        let (input, mut config) = seed();
        config.start_hour = 8;
        let timetable = schedule(&input, &config, &mut VarisatEngine::default()).unwrap();
        for class in timetable.classes("G1").unwrap() {
            let expected = format!("{:02}:00", 8 + class.slot.hour);
            assert_eq!(class.wall_clock(config.start_hour), expected);
        }
    }

    #[test]
    fn test_configuration_errors_abort_build() {
        let (input, _) = seed();
        let err = TimetableModel::build(&input, &TimetableConfig::with_horizon(0, 3)).unwrap_err();
        assert_eq!(
            err,
            TimetableError::Configuration(ConfigurationError::EmptyHorizon {
                days: 0,
                hours_per_day: 3
            })
        );

        let with_partial_teachers = input.with_teacher("A", "Ann");
        let config = TimetableConfig::with_horizon(2, 3);
        let err = TimetableModel::build(&with_partial_teachers, &config).unwrap_err();
        assert_eq!(
            err,
            TimetableError::Configuration(ConfigurationError::MissingTeacher("B".to_string()))
        );
    }
}
