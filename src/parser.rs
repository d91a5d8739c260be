use crate::ast::{Node, Operator};
use crate::error::{CalcError, Span};
use crate::lexer::{Token, TokenType};
use log::debug;
use std::fmt;

/// Power of a sequence boundary: weaker than every operator, so an operator at
/// the edge of a sequence can never grab an operand that is not there.
const BOUNDARY_POWER: f64 = -1.0;

/// Element of the flat working sequence at one nesting level.
#[derive(Debug, Clone)]
enum Item {
    Operand(Node),
    Operator(Operator, Span),
}

impl Item {
    fn left_binding_power(&self) -> Option<f64> {
        match self {
            Item::Operator(op, _) => Some(op.left_binding_power()),
            Item::Operand(_) => None,
        }
    }

    fn right_binding_power(&self) -> Option<f64> {
        match self {
            Item::Operator(op, _) => Some(op.right_binding_power()),
            Item::Operand(_) => None,
        }
    }

    fn span(&self) -> Span {
        match self {
            Item::Operator(_, span) => *span,
            Item::Operand(node) => *node.span(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Item::Operand(node) => write!(f, "{}", node),
            Item::Operator(op, _) => write!(f, "{}", op.symbol()),
        }
    }
}

/// Builds one expression tree from a line's tokens.
///
/// Parentheses are resolved with an explicit stack of open groups. Inside each
/// group the flat sequence
/// is reduced in passes: every operator whose neighbors both lean towards it
/// is combined with them, all such operators in the same pass, until a single
/// node is left.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    verbose: bool,
    record_passes: bool,
    passes: Vec<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            verbose: false,
            record_passes: false,
            passes: Vec::new(),
        }
    }

    /// Log every reduction pass at debug level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Keep the sequence left after every reduction pass, see [`Parser::passes`].
    pub fn record_passes(mut self, record: bool) -> Self {
        self.record_passes = record;
        self
    }

    /// Sequences left after each pass, in order, across all groups of the line.
    pub fn passes(&self) -> &[String] {
        &self.passes
    }

    pub fn parse(&mut self) -> Result<Node, CalcError> {
        let items = self.group()?;

        if let Some(token) = self.peek() {
            if token.token_type == TokenType::RightParen {
                return Err(CalcError::structure_with_help(
                    token.span,
                    "Unmatched ')'".to_string(),
                    "Every ')' needs an earlier '(' to close.".to_string(),
                ));
            }
        }

        if items.is_empty() {
            return Ok(Node::Empty {
                span: self.end_span(),
            });
        }

        self.reduce(items)
    }

    /// Collects the top level into a flat sequence, stopping in front of an
    /// unmatched `)` or at the end of input. Every group is reduced to a single
    /// operand as soon as its `)` is seen.
    fn group(&mut self) -> Result<Vec<Item>, CalcError> {
        let mut items = Vec::new();
        // Enclosing sequences waiting for their `)`, innermost last.
        let mut open: Vec<(Span, Vec<Item>)> = Vec::new();

        while let Some(token) = self.peek().cloned() {
            match token.token_type {
                TokenType::Eof => break,
                TokenType::RightParen => {
                    let Some((open_span, outer)) = open.pop() else {
                        break;
                    };
                    self.advance();

                    let span = open_span.to(token.span);
                    let inner = std::mem::replace(&mut items, outer);
                    if inner.is_empty() {
                        return Err(CalcError::structure_with_help(
                            span,
                            "Empty parentheses are not allowed".to_string(),
                            "Parentheses must contain an expression, e.g. (1 + 2).".to_string(),
                        ));
                    }

                    let sub = self.reduce(inner)?;
                    items.push(Item::Operand(Node::Expression {
                        inner: Box::new(sub),
                        span,
                    }));
                }
                TokenType::LeftParen => {
                    self.advance();
                    open.push((token.span, std::mem::take(&mut items)));
                }
                TokenType::Operator(op) => {
                    self.advance();
                    items.push(Item::Operator(op, token.span));
                }
                TokenType::Operand(node) => {
                    self.advance();
                    items.push(Item::Operand(node));
                }
            }
        }

        if let Some((open_span, _)) = open.last() {
            return Err(CalcError::structure_with_help(
                *open_span,
                "Unclosed '('".to_string(),
                "Add a matching ')' before the end of the line.".to_string(),
            ));
        }

        Ok(items)
    }

    fn reduce(&mut self, mut items: Vec<Item>) -> Result<Node, CalcError> {
        let mut pass = 0;

        while items.len() > 1 {
            pass += 1;
            let flags = binding_flags(&items);

            if self.verbose {
                debug!("pass {}: {}", pass, render_sequence(&items));
                debug!("pass {}: {}", pass, render_flags(&flags));
            }

            items = reduce_pass(items, &flags)?;

            if self.record_passes {
                self.passes.push(render_sequence(&items));
            }
        }

        match items.pop() {
            Some(Item::Operand(node)) => Ok(node),
            Some(Item::Operator(op, span)) => Err(dangling_operator(op, span)),
            None => Err(CalcError::structure(
                self.end_span(),
                "Expression reduced to nothing".to_string(),
            )),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map(|token| token.span)
            .unwrap_or(Span::new(0, 0))
    }
}

/// Parses a token sequence, logging every reduction pass when `verbose` is set.
pub fn parse(tokens: Vec<Token>, verbose: bool) -> Result<Node, CalcError> {
    Parser::new(tokens).verbose(verbose).parse()
}

/// For every position, whether it leans towards its left neighbor
/// (`Some(true)`), its right neighbor (`Some(false)`), or neither neighbor is
/// an operator (`None`).
///
/// The left neighbor offers its right binding power and the right neighbor
/// its left binding power. Ties lean left, which makes equal operators
/// associate to the left.
fn binding_flags(items: &[Item]) -> Vec<Option<bool>> {
    (0..items.len())
        .map(|i| {
            let left = i
                .checked_sub(1)
                .and_then(|j| items[j].right_binding_power());
            let right = items.get(i + 1).and_then(Item::left_binding_power);

            if left.is_none() && right.is_none() {
                return None;
            }

            let left = left.unwrap_or(BOUNDARY_POWER);
            let right = right.unwrap_or(BOUNDARY_POWER);
            Some(left == left.max(right))
        })
        .collect()
}

/// One pass over the sequence. Unflagged operators whose left neighbor leans
/// right and whose right neighbor leans left are reduced; everything else is
/// carried over to the next pass.
fn reduce_pass(items: Vec<Item>, flags: &[Option<bool>]) -> Result<Vec<Item>, CalcError> {
    let len = items.len();
    let mut slots: Vec<Option<Item>> = items.into_iter().map(Some).collect();
    let mut next = Vec::with_capacity(len);
    let mut reduced = false;

    for i in 0..len {
        // Flagged positions are claimed by the operator they lean towards.
        if flags[i].is_some() {
            continue;
        }

        let claims_left = i.checked_sub(1).and_then(|j| flags[j]) == Some(false);
        let claims_right = flags.get(i + 1).copied().flatten() == Some(true);

        let Some(item) = slots[i].take() else {
            continue;
        };

        match item {
            Item::Operator(op, span) if claims_left && claims_right => {
                let left = take_operand(&mut slots, i - 1, op, span)?;
                let right = take_operand(&mut slots, i + 1, op, span)?;
                let node = op.build(left, right, span);
                next.push(Item::Operand(Node::expression(node)));
                reduced = true;
            }
            Item::Operator(..) => {
                if claims_left {
                    next.extend(slots[i - 1].take());
                }
                next.push(item);
                if claims_right {
                    next.extend(slots[i + 1].take());
                }
            }
            Item::Operand(node) => {
                // No operator on either side while others remain: two
                // operands are sitting next to each other.
                if !matches!(node, Node::Empty { .. }) {
                    return Err(CalcError::construction_with_help(
                        *node.span(),
                        format!("{} '{}' has no operator to bind to", node.kind_name(), node),
                        "Separate values with an operator, e.g. 1 + 2, or with ';'.".to_string(),
                    ));
                }
                next.push(Item::Operand(node));
            }
        }
    }

    if let Some(lost) = slots.into_iter().flatten().next() {
        return Err(match lost {
            Item::Operator(op, span) => dangling_operator(op, span),
            Item::Operand(node) => CalcError::structure(
                *node.span(),
                format!("No operator could take {} '{}' as operand", node.kind_name(), node),
            ),
        });
    }

    if !reduced {
        let stuck = next
            .iter()
            .find(|item| matches!(item, Item::Operator(..)))
            .or(next.first());
        return Err(match stuck {
            Some(Item::Operator(op, span)) => dangling_operator(*op, *span),
            Some(item) => {
                CalcError::structure(item.span(), "Expression does not reduce".to_string())
            }
            None => {
                CalcError::structure(Span::new(0, 0), "Expression reduced to nothing".to_string())
            }
        });
    }

    Ok(next)
}

/// Removes the operand that `op` at `span` claimed from its slot.
fn take_operand(
    slots: &mut [Option<Item>],
    index: usize,
    op: Operator,
    span: Span,
) -> Result<Node, CalcError> {
    match slots[index].take() {
        Some(Item::Operand(node)) => Ok(node),
        Some(Item::Operator(other, other_span)) => Err(dangling_operator(other, other_span)),
        // Guard: a claimed neighbor leans towards `op` and no other operator
        // takes it, so the slot is still filled.
        None => Err(CalcError::construction_with_help(
            span,
            format!("Operator '{}' is missing an operand", op.symbol()),
            "Every operator needs a value on its left and on its right.".to_string(),
        )),
    }
}

fn dangling_operator(op: Operator, span: Span) -> CalcError {
    CalcError::structure_with_help(
        span,
        format!("Operator '{}' has no operand to combine with", op.symbol()),
        "Every operator needs a value on its left and on its right.".to_string(),
    )
}

fn render_sequence(items: &[Item]) -> String {
    let parts: Vec<String> = items.iter().map(Item::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn render_flags(flags: &[Option<bool>]) -> String {
    let parts: Vec<&str> = flags
        .iter()
        .map(|flag| match flag {
            Some(true) => "<",
            Some(false) => ">",
            None => ".",
        })
        .collect();
    format!("[{}]", parts.join(", "))
}
