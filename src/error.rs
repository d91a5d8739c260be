use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

/// Byte range of a token or node within one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An operator node was built without one of its required operands.
    Construction,
    /// The target of `=` is not a variable.
    Syntax,
    /// A variable was read before it was assigned.
    Lookup,
    /// Division or modulo by zero, or arithmetic on a missing value.
    Arithmetic,
    /// Reduction could not converge to a single root.
    Structure,
}

impl ErrorKind {
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::Construction => "Construction Error",
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::Lookup => "Lookup Error",
            ErrorKind::Arithmetic => "Arithmetic Error",
            ErrorKind::Structure => "Structural Parse Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorKind::Construction | ErrorKind::Structure => Color::Yellow,
            ErrorKind::Syntax => Color::Red,
            ErrorKind::Lookup | ErrorKind::Arithmetic => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalcError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl CalcError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn construction_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::Construction, span, message, help)
    }

    pub fn syntax_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::Syntax, span, message, help)
    }

    pub fn lookup(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Lookup, span, message)
    }

    pub fn arithmetic(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Arithmetic, span, message)
    }

    pub fn structure(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Structure, span, message)
    }

    pub fn structure_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::Structure, span, message, help)
    }

    /// Moves the span by `offset` bytes, for errors raised on a single line of
    /// a larger source.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = Span::new(self.span.start + offset, self.span.end + offset);
        self
    }

    pub fn report(&self, source: &str, filename: Option<&str>) -> std::io::Result<()> {
        let filename = filename.unwrap_or("<repl>");
        let color = self.kind.color();

        // Spans past the end (the Eof position) are clamped so the label
        // still lands on the last character.
        let end = self.span.end.min(source.len().max(1));
        let start = self.span.start.min(end.saturating_sub(1));

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", self.kind.title().fg(color), self.message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(source)))
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.message)
    }
}

impl std::error::Error for CalcError {}
