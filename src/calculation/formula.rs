//! Restricted arithmetic formulas for derived salary components.
//!
//! A formula may contain numeric literals, component codes, the four
//! arithmetic operators, unary minus and parentheses; nothing else. Formulas
//! are parsed by a small recursive-descent parser into an [`Expr`] tree and
//! evaluated against a map of already-resolved component values, so no
//! general-purpose evaluator is ever involved.
//!
//! # Grammar
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | IDENT | '(' expr ')'
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Nesting beyond this depth is rejected rather than risking the stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A numeric literal.
    Number(Decimal),
    /// A reference to another component's value.
    Reference(String),
    /// Unary minus.
    Negate(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

impl Expr {
    fn collect_references(&self, into: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Reference(code) => {
                into.insert(code.clone());
            }
            Expr::Negate(inner) => inner.collect_references(into),
            Expr::Binary { left, right, .. } => {
                left.collect_references(into);
                right.collect_references(into);
            }
        }
    }
}

/// A parsed formula together with its source text.
///
/// # Example
///
/// ```
/// use tax_engine::calculation::Formula;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let formula = Formula::parse("BASIC * 0.4").unwrap();
/// let values = BTreeMap::from([("BASIC".to_string(), Decimal::from(50000))]);
///
/// assert_eq!(formula.evaluate(&values).unwrap(), Decimal::from(20000));
/// assert!(formula.references().contains("BASIC"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parses a formula, failing with `InvalidExpression` on malformed syntax.
    pub fn parse(source: &str) -> EngineResult<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            position: 0,
            depth: 0,
        };
        let expr = parser.parse_expr()?;
        if let Some((token, offset)) = parser.peek() {
            return Err(parser.error(format!(
                "unexpected {} at position {}",
                token.describe(),
                offset
            )));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The formula text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Component codes the formula refers to.
    pub fn references(&self) -> BTreeSet<String> {
        let mut references = BTreeSet::new();
        self.expr.collect_references(&mut references);
        references
    }

    /// Evaluates the formula against resolved component values.
    ///
    /// Fails with `UnknownReference` when a code has no value and with
    /// `DivisionByZero` when a denominator evaluates to zero.
    pub fn evaluate(&self, values: &BTreeMap<String, Decimal>) -> EngineResult<Decimal> {
        self.eval(&self.expr, values)
    }

    fn eval(&self, expr: &Expr, values: &BTreeMap<String, Decimal>) -> EngineResult<Decimal> {
        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Reference(code) => {
                values
                    .get(code)
                    .copied()
                    .ok_or_else(|| EngineError::UnknownReference {
                        reference: code.clone(),
                        expression: self.source.clone(),
                    })
            }
            Expr::Negate(inner) => Ok(-self.eval(inner, values)?),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, values)?;
                let right = self.eval(right, values)?;
                let result = match op {
                    BinaryOp::Add => left.checked_add(right),
                    BinaryOp::Subtract => left.checked_sub(right),
                    BinaryOp::Multiply => left.checked_mul(right),
                    BinaryOp::Divide => {
                        if right.is_zero() {
                            return Err(EngineError::DivisionByZero {
                                expression: self.source.clone(),
                            });
                        }
                        left.checked_div(right)
                    }
                };
                result.ok_or_else(|| EngineError::CalculationError {
                    message: format!("arithmetic overflow evaluating '{}'", self.source),
                })
            }
        }
    }
}

/// Parses and evaluates a formula in one step.
pub fn evaluate_formula(
    expression: &str,
    values: &BTreeMap<String, Decimal>,
) -> EngineResult<Decimal> {
    Formula::parse(expression)?.evaluate(values)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(value) => format!("number {}", value),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(source: &str) -> EngineResult<Vec<(Token, usize)>> {
    let invalid = |message: String| EngineError::InvalidExpression {
        expression: source.to_string(),
        message,
    };

    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, ch) = chars[i];
        match ch {
            c if c.is_whitespace() => {
                i += 1;
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                let token = match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                };
                tokens.push((token, offset));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                    if chars[i].1 == '.' {
                        if seen_dot {
                            return Err(invalid(format!(
                                "malformed number at position {}",
                                offset
                            )));
                        }
                        seen_dot = true;
                    }
                    i += 1;
                }
                let end = chars.get(i).map_or(source.len(), |(o, _)| *o);
                let literal = &source[offset..end];
                if literal == "." {
                    return Err(invalid(format!("malformed number at position {}", offset)));
                }
                let value = Decimal::from_str(literal).map_err(|e| {
                    invalid(format!("invalid number '{}' at position {}: {}", literal, offset, e))
                })?;
                tokens.push((Token::Number(value), offset));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '_') {
                    i += 1;
                }
                let end = chars.get(i).map_or(source.len(), |(o, _)| *o);
                tokens.push((Token::Ident(source[offset..end].to_string()), offset));
            }
            other => {
                return Err(invalid(format!(
                    "unexpected character '{}' at position {}",
                    other, offset
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, usize)>,
    position: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn error(&self, message: String) -> EngineError {
        EngineError::InvalidExpression {
            expression: self.source.to_string(),
            message,
        }
    }

    fn parse_expr(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some((Token::Plus, _)) => BinaryOp::Add,
                Some((Token::Minus, _)) => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_term(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some((Token::Star, _)) => BinaryOp::Multiply,
                Some((Token::Slash, _)) => BinaryOp::Divide,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> EngineResult<Expr> {
        match self.peek() {
            Some((Token::Minus, _)) => {
                self.advance();
                let inner = self.nested(Self::parse_unary)?;
                Ok(Expr::Negate(Box::new(inner)))
            }
            Some((Token::Plus, _)) => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> EngineResult<Expr> {
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(Expr::Number(value)),
            Some((Token::Ident(name), _)) => Ok(Expr::Reference(name)),
            Some((Token::LParen, offset)) => {
                let inner = self.nested(Self::parse_expr)?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    _ => Err(self.error(format!(
                        "unclosed '(' opened at position {}",
                        offset
                    ))),
                }
            }
            Some((token, offset)) => Err(self.error(format!(
                "unexpected {} at position {}",
                token.describe(),
                offset
            ))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> EngineResult<Expr>) -> EngineResult<Expr> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "nesting deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }
}
