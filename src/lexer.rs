use crate::ast::{BinaryOp, Node, Operator};
use crate::error::Span;
use crate::value::Value;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    LeftParen,
    RightParen,

    /// Bare operator, operands are attached by the parser.
    Operator(Operator),

    /// Integer literal (`Expression(Atom)`), variable, or the empty
    /// placeholder after a trailing `;`.
    Operand(Node),

    // Special
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, span: Span) -> Self {
        Self { token_type, span }
    }

    pub fn is_forward(&self) -> bool {
        self.token_type == TokenType::Operator(Operator::Forward)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.token_type {
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::Operator(op) => write!(f, "{}", op.symbol()),
            TokenType::Operand(node) => write!(f, "{}", node),
            TokenType::Eof => write!(f, "<eof>"),
        }
    }
}

/// Splits one input line into tokens. Never fails: any character that is not
/// whitespace, a digit, a parenthesis or an operator names a variable.
pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    verbose: bool,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            verbose: false,
        }
    }

    /// Log the produced tokens at debug level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        // A trailing `;` still needs a right-hand side.
        if self.tokens.last().is_some_and(Token::is_forward) {
            self.tokens.push(Token::new(
                TokenType::Operand(Node::Empty {
                    span: Span::new(self.current, self.current),
                }),
                Span::new(self.current, self.current),
            ));
        }

        self.tokens
            .push(Token::new(TokenType::Eof, Span::new(self.current, self.current)));

        if self.verbose {
            let listing: Vec<String> = self.tokens.iter().map(Token::to_string).collect();
            debug!("tokens: [{}]", listing.join(", "));
        }

        std::mem::take(&mut self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            ' ' | '\t' | '\n' => {
                // Ignore whitespace
            }
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '=' => self.add_operator(Operator::Assign),
            ';' => {
                // Separators collapse, and one with nothing before it is dropped.
                if self.tokens.last().is_some_and(|token| !token.is_forward()) {
                    self.add_operator(Operator::Forward);
                }
            }
            '+' => self.add_operator(Operator::Arithmetic(BinaryOp::Add)),
            '-' => self.add_operator(Operator::Arithmetic(BinaryOp::Subtract)),
            '*' => self.add_operator(Operator::Arithmetic(BinaryOp::Multiply)),
            '/' => self.add_operator(Operator::Arithmetic(BinaryOp::Divide)),
            '%' => self.add_operator(Operator::Arithmetic(BinaryOp::Modulo)),
            c if c.is_ascii_digit() => self.number(),
            name => {
                let span = self.span();
                self.add_token(TokenType::Operand(Node::Var { name, span }));
            }
        }
    }

    fn advance(&mut self) -> char {
        match self.source[self.current..].chars().next() {
            Some(c) => {
                self.current += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn span(&self) -> Span {
        Span::new(self.start, self.current)
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let digits = &self.source[self.start..self.current];
        let value = match digits.parse::<i64>() {
            Ok(n) => Value::Int(n),
            // Literals beyond i64 keep their magnitude as a double.
            Err(_) => Value::Double(digits.parse::<f64>().unwrap_or(f64::INFINITY)),
        };

        let span = self.span();
        self.add_token(TokenType::Operand(Node::expression(Node::atom(value, span))));
    }

    fn add_operator(&mut self, operator: Operator) {
        self.add_token(TokenType::Operator(operator));
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.tokens.push(Token::new(token_type, self.span()));
    }
}

/// Tokenizes `source`, logging the result when `verbose` is set.
pub fn tokenize(source: &str, verbose: bool) -> Vec<Token> {
    Lexer::new(source.to_string()).verbose(verbose).scan_tokens()
}
