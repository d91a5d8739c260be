use crate::error::CalcError;
use crate::evaluator::{Environment, Evaluator};
use crate::options::Options;
use log::info;

/// Runs a script: every non-blank line is one input line, and all lines share
/// one environment. Stops at the first failing line, after reporting it.
pub fn run(
    source: &str,
    filename: Option<&str>,
    options: Options,
) -> Result<Environment, CalcError> {
    let mut evaluator = Evaluator::new().verbose(options.verbose);
    let mut offset = 0;

    for (number, chunk) in source.split_inclusive('\n').enumerate() {
        let line = chunk.trim_end_matches(&['\n', '\r'][..]);
        let line_start = offset;
        offset += chunk.len();

        if line.trim().is_empty() {
            continue;
        }

        if let Err(error) = evaluator.run_line(line) {
            info!("line {} failed: {}", number + 1, error);
            // Spans are relative to the line; point them into the whole file.
            let shifted = error.clone().shifted(line_start);
            if let Err(io_error) = shifted.report(source, filename) {
                eprintln!("{}", error);
                eprintln!("(could not render report: {})", io_error);
            }
            return Err(error);
        }
    }

    Ok(evaluator.into_environment())
}
