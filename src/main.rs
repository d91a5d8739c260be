use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use lrcalc::{repl, runner, Options};
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("lrcalc")
        .about("A line-oriented calculator with single-character variables")
        .arg(
            Arg::new("file")
                .help("Script to run, one expression line at a time")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Trace tokens and every reduction pass")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let options = Options::new(matches.get_flag("verbose"));
    init_logging(options.verbose);

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, options),
        _ => repl::start(options),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run_file(path: &str, options: Options) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            match runner::run(&source, Some(&filename), options) {
                Ok(env) => println!("{}", env),
                Err(_) => process::exit(1),
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
