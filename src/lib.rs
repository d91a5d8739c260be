// lrcalc: a line-oriented calculator with single-character variables.
//
// Each line goes through three stages: the lexer turns text into tokens, the
// parser resolves parentheses and operator precedence by local reduction, and
// the evaluator walks the tree against an environment that persists between
// lines.

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{BinaryOp, Node, Operator};
pub use error::{CalcError, ErrorKind, Span};
pub use evaluator::{evaluate, Environment, Evaluator};
pub use lexer::{tokenize, Lexer, Token, TokenType};
pub use options::Options;
pub use parser::{parse, Parser};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;

/// Lexes, parses and evaluates one line against `env`.
///
/// `env` is consumed; use [`Evaluator`] to keep the previous state when a
/// line fails.
pub fn interpret(
    source: &str,
    env: Environment,
    verbose: bool,
) -> Result<(Value, Environment), CalcError> {
    let tokens = tokenize(source, verbose);
    let tree = parse(tokens, verbose)?;
    evaluate(&tree, env)
}
