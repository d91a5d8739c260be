use crate::ast::{BinaryOp, Node};
use crate::error::{CalcError, Span};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::value::Value;
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// Variable bindings, kept in the order they were first assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: IndexMap<char, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: char) -> Option<&Value> {
        self.values.get(&name)
    }

    /// Binds `name`, overwriting any earlier value. Bindings are never removed.
    pub fn assign(&mut self, name: char, value: Value) {
        self.values.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Value)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Step still to be taken while walking a tree.
enum Task<'a> {
    Eval(&'a Node),
    /// Drop the value of the left side of a `;`.
    Discard,
    /// Bind the value on top of the stack, leaving it there as the result.
    Bind(char),
    Apply(BinaryOp, Span),
}

/// Evaluates `node` against `env`.
///
/// The environment is threaded left to right through every binary node and
/// handed back with the result. The tree itself is only read, so the same
/// tree can be evaluated again.
///
/// The walk keeps its own stack of pending steps, so a line as long as
/// `1+1+...+1` with thousands of terms does not exhaust the call stack.
pub fn evaluate(node: &Node, mut env: Environment) -> Result<(Value, Environment), CalcError> {
    let mut tasks = vec![Task::Eval(node)];
    let mut values: Vec<Value> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Eval(node) => match node {
                Node::Atom { value, .. } => values.push(value.clone()),
                Node::Empty { .. } => values.push(Value::Nil),
                Node::Var { name, span } => values.push(lookup(&env, *name, *span)?),
                Node::Expression { inner, .. } => tasks.push(Task::Eval(inner)),
                Node::Forward { left, right, .. } => {
                    tasks.extend([Task::Eval(right), Task::Discard, Task::Eval(left)]);
                }
                Node::Assign { target, value, .. } => {
                    let Node::Var { name, .. } = target.as_ref() else {
                        return Err(CalcError::syntax_with_help(
                            *target.span(),
                            format!("Cannot assign to {} '{}'", target.kind_name(), target),
                            "Only a single-character variable can be assigned, e.g. x = 5."
                                .to_string(),
                        ));
                    };
                    tasks.extend([Task::Bind(*name), Task::Eval(value)]);
                }
                Node::Binary {
                    left,
                    operator,
                    right,
                    span,
                } => {
                    tasks.extend([
                        Task::Apply(*operator, *span),
                        Task::Eval(right),
                        Task::Eval(left),
                    ]);
                }
            },
            Task::Discard => {
                values.pop();
            }
            Task::Bind(name) => {
                let value = values.last().cloned().unwrap_or(Value::Nil);
                env.assign(name, value);
            }
            Task::Apply(operator, span) => {
                let right = values.pop().unwrap_or(Value::Nil);
                let left = values.pop().unwrap_or(Value::Nil);
                values.push(evaluate_binary_op(operator, &left, &right, span)?);
            }
        }
    }

    Ok((values.pop().unwrap_or(Value::Nil), env))
}

fn lookup(env: &Environment, name: char, span: Span) -> Result<Value, CalcError> {
    env.get(name)
        .cloned()
        .ok_or_else(|| CalcError::lookup(span, format!("Undefined variable '{}'", name)))
}

fn evaluate_binary_op(
    operator: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> Result<Value, CalcError> {
    let (l, r) = match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(CalcError::arithmetic(
                span,
                format!(
                    "Cannot apply '{}' to {} and {}",
                    operator.symbol(),
                    left.type_name(),
                    right.type_name()
                ),
            ))
        }
    };

    let result = match operator {
        BinaryOp::Add => l + r,
        BinaryOp::Subtract => l - r,
        BinaryOp::Multiply => l * r,
        BinaryOp::Divide => {
            if r == 0.0 {
                return Err(CalcError::arithmetic(span, "Division by zero".to_string()));
            }
            l / r
        }
        BinaryOp::Modulo => {
            if r == 0.0 {
                return Err(CalcError::arithmetic(span, "Modulo by zero".to_string()));
            }
            floored_rem(l, r)
        }
    };

    Ok(Value::Double(result))
}

/// Remainder that takes the sign of the divisor: `(1 - 8) % 3` is `2`.
fn floored_rem(l: f64, r: f64) -> f64 {
    let rem = l % r;
    if rem != 0.0 && (rem < 0.0) != (r < 0.0) {
        rem + r
    } else {
        rem
    }
}

/// Keeps the environment between lines.
///
/// A line's bindings are committed only if the whole line evaluates; a
/// failing line leaves the environment as it was before the line.
#[derive(Debug, Default)]
pub struct Evaluator {
    environment: Environment,
    verbose: bool,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trace tokens and reduction passes of every line at debug level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn into_environment(self) -> Environment {
        self.environment
    }

    /// Evaluates an already parsed tree and commits its bindings on success.
    pub fn evaluate_node(&mut self, node: &Node) -> Result<Value, CalcError> {
        let (value, env) = evaluate(node, self.environment.clone())?;
        self.environment = env;
        Ok(value)
    }

    /// Lexes, parses and evaluates one line.
    pub fn run_line(&mut self, source: &str) -> Result<Value, CalcError> {
        let tokens = tokenize(source, self.verbose);
        let tree = parse(tokens, self.verbose)?;
        if self.verbose {
            debug!("tree: {}", tree);
        }
        self.evaluate_node(&tree)
    }
}
