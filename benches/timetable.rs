use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use timetabler::timetable::{Group, TimetableConfig, TimetableInput, TimetableModel};
use timetabler::VarisatEngine;

fn faculty(groups: usize) -> (TimetableInput, TimetableConfig) {
    let mut input = TimetableInput::new();
    for ix in 0..groups {
        let name = format!("G{}", ix);
        let own = format!("Seminar{}", ix);
        input = input.with_group(Group::new(
            name,
            [
                ("Lecture".to_string(), 2),
                ("Lab".to_string(), 1),
                (own.clone(), 2),
            ],
        ));
        input = input.with_teacher(own, format!("Tutor{}", ix % 3));
    }
    input = input.with_teacher("Lecture", "Ann").with_teacher("Lab", "Bob");
    let config = TimetableConfig::with_horizon(5, 6).with_common_subject("Lecture");
    (input, config)
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [2, 4, 8] {
        let (input, config) = faculty(size);
        group.bench_function(BenchmarkId::new("groups", size), |b| {
            b.iter(|| TimetableModel::build(black_box(&input), black_box(&config)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    for size in [2, 4] {
        let (input, config) = faculty(size);
        let model = TimetableModel::build(&input, &config).unwrap();
        group.bench_function(BenchmarkId::new("groups", size), |b| {
            b.iter(|| {
                let timetable = model.solve(&mut VarisatEngine::default());
                assert!(timetable.is_solved());
                timetable
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_solve);
criterion_main!(benches);
