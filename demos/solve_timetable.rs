extern crate timetabler;

use std::{env, fs, process};

use thiserror::Error;
use timetabler::dimacs;
use timetabler::timetable::{
    verify, GroupTimetable, TimetableConfig, TimetableError, TimetableInput, TimetableModel,
};
use timetabler::VarisatEngine;

#[derive(Error, Debug)]
enum Error {
    #[error("failed to read {0}")]
    Read(String, #[source] std::io::Error),
    #[error("failed to parse {0}")]
    Json(String, #[source] serde_json::Error),
    #[error("invalid timetable")]
    Timetable(#[from] TimetableError),
    #[error("dimacs")]
    Dimacs(#[from] dimacs::DimacsError),
}

struct Args {
    problem: String,
    config: Option<String>,
    dimacs_out: Option<String>,
    transcript: Option<String>,
}

fn usage() -> ! {
    eprintln!(
        "solve_timetable [problem.json] [config.json] [--dimacs out.cnf] [--transcript solver.out]"
    );
    process::exit(-1);
}

fn parse_args() -> Args {
    let mut positional = vec![];
    let mut dimacs_out = None;
    let mut transcript = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dimacs" => dimacs_out = Some(args.next().unwrap_or_else(|| usage())),
            "--transcript" => transcript = Some(args.next().unwrap_or_else(|| usage())),
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let problem = positional.next().unwrap_or_else(|| usage());
    let config = positional.next();
    if positional.next().is_some() {
        usage();
    }
    Args {
        problem,
        config,
        dimacs_out,
        transcript,
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();
    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        if let Some(source) = std::error::Error::source(&err) {
            eprintln!("caused by: {}", source);
        }
        eprintln!("execution failed");
        process::exit(-1);
    }
}

fn load<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read(path.to_string(), e))?;
    serde_json::from_str(&text).map_err(|e| Error::Json(path.to_string(), e))
}

fn run(args: &Args) -> Result<(), Error> {
    let input: TimetableInput = load(&args.problem)?;
    let config: TimetableConfig = match &args.config {
        Some(path) => load(path)?,
        None => TimetableConfig::default(),
    };

    let model = TimetableModel::build(&input, &config)?;
    eprintln!("{:?}", model.problem());
    if let Some(path) = &args.dimacs_out {
        dimacs::write_file(model.problem(), path)?;
        eprintln!("wrote {}", path);
    }

    let timetable = match &args.transcript {
        Some(path) => {
            let transcript = dimacs::parse_solution_file(path, model.problem().variable_count())?;
            model.materialize(&transcript.into_outcome(model.problem()))
        }
        None => model.solve(&mut VarisatEngine::default()),
    };

    println!("s {}", timetable.status);
    if let Some(cost) = timetable.objective_value {
        println!("o {}", cost);
    }
    for (group, grid) in timetable.groups() {
        match grid {
            GroupTimetable::Unavailable(_) => println!("no schedule for group {}", group),
            GroupTimetable::Scheduled(classes) => {
                println!("{}:", group);
                for class in classes {
                    let teacher = class.teacher.as_deref().unwrap_or("-");
                    println!(
                        "  day {:>2} {} {} ({})",
                        class.slot.day + 1,
                        class.wall_clock(config.start_hour),
                        class.subject,
                        teacher
                    );
                }
            }
        }
    }

    for violation in verify(&input, &config, &timetable) {
        eprintln!("violation: {}", violation);
    }
    Ok(())
}
