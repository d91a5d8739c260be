use crate::evaluator::Evaluator;
use crate::options::Options;
use log::warn;
use std::io::{self, Write};

/// Interactive loop. The environment persists between lines; a failing line
/// is reported and leaves the environment as it was.
pub fn start(options: Options) {
    println!("lrcalc v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::new().verbose(options.verbose);

    loop {
        print!("> ");
        if let Err(error) = io::stdout().flush() {
            warn!("could not flush prompt: {}", error);
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim_end_matches(&['\n', '\r'][..]);
                if line.trim().is_empty() {
                    continue;
                }
                if line.trim() == "exit" || line.trim() == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut evaluator);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, evaluator: &mut Evaluator) {
    match evaluator.run_line(source) {
        Ok(value) => {
            if !value.is_nil() {
                println!("{}", value);
            }
            println!("{}", evaluator.environment());
        }
        Err(error) => {
            if let Err(io_error) = error.report(source, None) {
                eprintln!("{}", error);
                warn!("could not render report: {}", io_error);
            }
        }
    }
}
