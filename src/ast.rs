use crate::error::Span;
use crate::value::Value;
use std::fmt;

/// Expression tree shared by the parser and the evaluator.
///
/// Every kind that needs operands owns them, so a node that exists is always
/// complete. The only place where an operand can be missing is while the
/// parser combines a bare [`Operator`] with its neighbors.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leaf holding a resolved value.
    Atom {
        value: Value,
        span: Span,
    },
    /// Single-character variable reference.
    Var {
        name: char,
        span: Span,
    },
    /// Wrapper around one evaluable child (literals, groups, reductions).
    Expression {
        inner: Box<Node>,
        span: Span,
    },
    /// `left ; right`: evaluate left, drop its value, then evaluate right.
    Forward {
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    Binary {
        left: Box<Node>,
        operator: BinaryOp,
        right: Box<Node>,
        span: Span,
    },
    /// Placeholder with no value, e.g. the right side of a trailing `;`.
    Empty {
        span: Span,
    },
}

impl Node {
    pub fn atom(value: Value, span: Span) -> Self {
        Node::Atom { value, span }
    }

    pub fn expression(inner: Node) -> Self {
        let span = *inner.span();
        Node::Expression {
            inner: Box::new(inner),
            span,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Node::Atom { span, .. } => span,
            Node::Var { span, .. } => span,
            Node::Expression { span, .. } => span,
            Node::Forward { span, .. } => span,
            Node::Assign { span, .. } => span,
            Node::Binary { span, .. } => span,
            Node::Empty { span } => span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Atom { .. } => "atom",
            Node::Var { .. } => "variable",
            Node::Expression { .. } => "expression",
            Node::Forward { .. } => "sequence",
            Node::Assign { .. } => "assignment",
            Node::Binary { .. } => "arithmetic expression",
            Node::Empty { .. } => "empty placeholder",
        }
    }
}

/// Piece of output still to be written while printing a tree.
enum Piece<'a> {
    Node(&'a Node),
    Open(char),
    Text(&'static str),
}

// Printed with an explicit stack: a long line such as `1+1+...+1` nests
// deeper than the call stack allows.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];

        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Open(symbol) => write!(f, "({} ", symbol)?,
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(node) => match node {
                    Node::Atom { value, .. } => write!(f, "{}", value)?,
                    Node::Var { name, .. } => write!(f, "{}", name)?,
                    Node::Empty { .. } => f.write_str("_")?,
                    Node::Expression { inner, .. } => pending.push(Piece::Node(inner)),
                    Node::Forward { left, right, .. } => {
                        pending.extend([
                            Piece::Text(")"),
                            Piece::Node(right),
                            Piece::Text(" "),
                            Piece::Node(left),
                            Piece::Open(';'),
                        ]);
                    }
                    Node::Assign { target, value, .. } => {
                        pending.extend([
                            Piece::Text(")"),
                            Piece::Node(value),
                            Piece::Text(" "),
                            Piece::Node(target),
                            Piece::Open('='),
                        ]);
                    }
                    Node::Binary {
                        left,
                        operator,
                        right,
                        ..
                    } => {
                        pending.extend([
                            Piece::Text(")"),
                            Piece::Node(right),
                            Piece::Text(" "),
                            Piece::Node(left),
                            Piece::Open(operator.symbol()),
                        ]);
                    }
                },
            }
        }

        Ok(())
    }
}

// The default drop glue recurses once per level; unlink children onto a heap
// stack instead so deep trees are freed in a loop.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);

        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

impl Node {
    fn detach_children(&mut self, out: &mut Vec<Node>) {
        let mut detach = |child: &mut Box<Node>| {
            let span = *child.span();
            out.push(std::mem::replace(child.as_mut(), Node::Empty { span }));
        };

        match self {
            Node::Expression { inner, .. } => detach(inner),
            Node::Forward { left, right, .. } | Node::Binary { left, right, .. } => {
                detach(left);
                detach(right);
            }
            Node::Assign { target, value, .. } => {
                detach(target);
                detach(value);
            }
            Node::Atom { .. } | Node::Var { .. } | Node::Empty { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
            BinaryOp::Modulo => '%',
        }
    }
}

/// Operator as produced by the lexer: no operand slots until the parser
/// commits a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Forward,
    Assign,
    Arithmetic(BinaryOp),
}

impl Operator {
    /// Power consulted when this operator is the right neighbor of a token.
    pub fn left_binding_power(&self) -> f64 {
        match self {
            Operator::Forward => 0.1,
            Operator::Assign => 1.1,
            Operator::Arithmetic(BinaryOp::Modulo) => 2.0,
            Operator::Arithmetic(BinaryOp::Add | BinaryOp::Subtract) => 3.0,
            Operator::Arithmetic(BinaryOp::Multiply | BinaryOp::Divide) => 4.0,
        }
    }

    /// Power consulted when this operator is the left neighbor of a token.
    pub fn right_binding_power(&self) -> f64 {
        match self {
            Operator::Forward => 0.0,
            Operator::Assign => 1.0,
            Operator::Arithmetic(BinaryOp::Modulo) => 2.1,
            Operator::Arithmetic(BinaryOp::Add | BinaryOp::Subtract) => 3.1,
            Operator::Arithmetic(BinaryOp::Multiply | BinaryOp::Divide) => 4.1,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Forward => ';',
            Operator::Assign => '=',
            Operator::Arithmetic(op) => op.symbol(),
        }
    }

    /// Combines the operator with both of its operands into a node.
    pub fn build(self, left: Node, right: Node, span: Span) -> Node {
        let span = left.span().to(span).to(*right.span());
        let (left, right) = (Box::new(left), Box::new(right));

        match self {
            Operator::Forward => Node::Forward { left, right, span },
            Operator::Assign => Node::Assign {
                target: left,
                value: right,
                span,
            },
            Operator::Arithmetic(operator) => Node::Binary {
                left,
                operator,
                right,
                span,
            },
        }
    }
}
