/// Settings taken from the command line and passed to the REPL and runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Trace tokens and reduction passes of every line.
    pub verbose: bool,
}

impl Options {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}
