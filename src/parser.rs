//! CQL grammar engine.
//!
//! A recursive-descent parser with one function per precedence level,
//! lowest first:
//!
//! ```text
//! OR < AND < NOT < predicate operators < + - < * /
//! ```
//!
//! All binary operators are left-associative. `NOT` binds tighter than
//! `AND` and `OR`, so `NOT a = 1 AND b = 2` reads as `(NOT a = 1) AND b = 2`.
//!
//! Brackets are shared by conditions and expressions: `(a = 1)` groups a
//! condition, `(a + 1) * 2` groups an expression. The content of a group is
//! parsed once as an [`Operand`] and whatever follows the group decides
//! whether a condition or an expression was valid there.

use std::mem;

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{
        ArithmeticOp, ComparisonOp, Condition, Expr, Literal, SpatialRelation, TemporalRelation,
        TimePeriod, Token, TokenKind, Units,
    },
    lexer::{LexError, Lexer, Position},
    value::{Duration, Time},
};

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings for a parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// CRS recorded on `BBOX(...)` predicates that do not name one
    pub default_crs: Option<String>,
    /// Maximum nesting of groups and `NOT`s
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            default_crs: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Errors that end a parse. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("syntax error at {position}: unexpected {found} '{lexeme}', expected {expected}")]
    UnexpectedToken {
        found: &'static str,
        lexeme: String,
        expected: &'static str,
        position: Position,
    },

    #[error("unexpected end of input at {position}, expected {expected}")]
    UnexpectedEof {
        expected: &'static str,
        position: Position,
    },

    #[error("expected an expression at {position}, found a condition")]
    UnexpectedCondition { position: Position },

    #[error("nesting deeper than {limit} levels at {position}")]
    NestingTooDeep { limit: usize, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::UnexpectedCondition { position }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }

    /// The offending line of `source` with a caret under the error column.
    ///
    /// ```text
    /// a = 1 AND
    ///          ^
    /// ```
    pub fn snippet(&self, source: &str) -> String {
        let position = self.position();
        let line = source
            .split('\n')
            .nth(position.line.saturating_sub(1))
            .unwrap_or_default()
            .trim_end_matches('\r');
        format!("{}\n{}^", line, " ".repeat(position.column.saturating_sub(1)))
    }
}

/// Either side of a bracket: a grouped condition or a grouped expression.
#[derive(Debug)]
enum Operand {
    Condition(Condition),
    Expr(Expr),
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    options: ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Result<Self, ParseError> {
        Self::with_options(lexer, ParseOptions::default())
    }

    pub fn with_options(mut lexer: Lexer<'a>, options: ParseOptions) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            options,
            depth: 0,
        })
    }

    /// Reuse this parser for a new input.
    pub fn restart(&mut self, input: &'a str) -> Result<(), ParseError> {
        self.lexer.reset(input);
        self.depth = 0;
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    /// Parse the whole input. Blank input yields `Ok(None)`.
    pub fn parse(&mut self) -> Result<Option<Condition>, ParseError> {
        trace!(len = self.lexer.input().len(), "parsing CQL");

        if self.check(&TokenKind::Eof) {
            return Ok(None);
        }

        let operand = self.parse_or()?;
        let condition = self.require_condition(operand)?;
        self.expect(TokenKind::Eof, "end of input")?;

        trace!("parsed CQL");
        Ok(Some(condition))
    }

    /// Move to the next token, returning the one just consumed.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current_token, next))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if !self.check(&kind) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    /// Syntax error at the current token.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = &self.current_token;
        debug!(
            token = token.kind.name(),
            lexeme = %token.lexeme,
            line = token.position.line,
            column = token.position.column,
            expected,
            "syntax error"
        );

        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof {
                expected,
                position: token.position,
            },
            _ => ParseError::UnexpectedToken {
                found: token.kind.name(),
                lexeme: token.lexeme.clone(),
                expected,
                position: token.position,
            },
        }
    }

    fn enter(&mut self, position: Position) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            debug!(limit = self.options.max_depth, line = position.line, "nesting too deep");
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                position,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// A bare expression where a condition is needed means a predicate
    /// operator is missing at the current token.
    fn require_condition(&self, operand: Operand) -> Result<Condition, ParseError> {
        match operand {
            Operand::Condition(condition) => Ok(condition),
            Operand::Expr(_) => Err(self.unexpected("comparison or predicate operator")),
        }
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    fn parse_or(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            let lhs = self.require_condition(left)?;
            self.advance()?;
            let right = self.parse_and()?;
            let rhs = self.require_condition(right)?;

            left = Operand::Condition(Condition::or(lhs, rhs));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) {
            let lhs = self.require_condition(left)?;
            self.advance()?;
            let right = self.parse_not()?;
            let rhs = self.require_condition(right)?;

            left = Operand::Condition(Condition::and(lhs, rhs));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Operand, ParseError> {
        if !self.check(&TokenKind::Not) {
            return self.parse_predicate();
        }

        let not = self.advance()?;
        self.enter(not.position)?;
        let inner = self.parse_not()?;
        let inner = self.require_condition(inner)?;
        self.leave();

        Ok(Operand::Condition(Condition::not(inner)))
    }

    fn parse_predicate(&mut self) -> Result<Operand, ParseError> {
        match self.current_token.kind {
            TokenKind::Intersects
            | TokenKind::Disjoint
            | TokenKind::Contains
            | TokenKind::Within
            | TokenKind::Touches
            | TokenKind::Crosses
            | TokenKind::Overlaps
            | TokenKind::Equals
            | TokenKind::Relate
            | TokenKind::DWithin
            | TokenKind::Beyond => return self.parse_spatial().map(Operand::Condition),
            TokenKind::BBox => return self.parse_bbox().map(Operand::Condition),
            _ => {}
        }

        let lhs = match self.parse_additive()? {
            Operand::Expr(expr) => expr,
            // a grouped condition stands on its own
            condition => return Ok(condition),
        };

        if let Some(op) = comparison_op(&self.current_token.kind) {
            self.advance()?;
            let rhs = self.parse_expression()?;
            return Ok(Operand::Condition(Condition::Comparison { op, lhs, rhs }));
        }

        let condition = match self.current_token.kind {
            TokenKind::Not => {
                self.advance()?;
                match self.current_token.kind {
                    TokenKind::Between => self.parse_between(lhs, true)?,
                    TokenKind::Like => self.parse_like(lhs, true, true)?,
                    TokenKind::ILike => self.parse_like(lhs, false, true)?,
                    TokenKind::In => self.parse_in(lhs, true)?,
                    _ => return Err(self.unexpected("BETWEEN, LIKE, ILIKE or IN")),
                }
            }
            TokenKind::Between => self.parse_between(lhs, false)?,
            TokenKind::Like => self.parse_like(lhs, true, false)?,
            TokenKind::ILike => self.parse_like(lhs, false, false)?,
            TokenKind::In => self.parse_in(lhs, false)?,
            TokenKind::Is => self.parse_null(lhs)?,
            TokenKind::Before | TokenKind::After | TokenKind::During => self.parse_temporal(lhs)?,
            // only valid inside a group; the caller decides
            _ => return Ok(Operand::Expr(lhs)),
        };
        Ok(Operand::Condition(condition))
    }

    /// `value [NOT] BETWEEN low AND high`, with `NOT` already consumed.
    fn parse_between(&mut self, value: Expr, negated: bool) -> Result<Condition, ParseError> {
        self.expect(TokenKind::Between, "BETWEEN")?;
        let low = self.parse_expression()?;
        self.expect(TokenKind::And, "AND")?;
        let high = self.parse_expression()?;

        Ok(Condition::Between {
            value,
            low,
            high,
            negated,
        })
    }

    fn parse_like(
        &mut self,
        value: Expr,
        case_sensitive: bool,
        negated: bool,
    ) -> Result<Condition, ParseError> {
        self.advance()?; // LIKE or ILIKE
        let pattern = self.take_quoted("quoted pattern")?;

        Ok(Condition::Like {
            value,
            pattern,
            case_sensitive,
            negated,
        })
    }

    fn parse_in(&mut self, value: Expr, negated: bool) -> Result<Condition, ParseError> {
        self.expect(TokenKind::In, "IN")?;
        self.expect(TokenKind::LParen, "'('")?;
        let candidates = self.parse_expression_list()?;
        self.expect(TokenKind::RParen, "')'")?;

        Ok(Condition::In {
            value,
            candidates,
            negated,
        })
    }

    /// `value IS [NOT] NULL`
    fn parse_null(&mut self, value: Expr) -> Result<Condition, ParseError> {
        self.expect(TokenKind::Is, "IS")?;
        let negated = self.check(&TokenKind::Not);
        if negated {
            self.advance()?;
        }
        self.expect(TokenKind::Null, "NULL")?;

        Ok(Condition::Null { value, negated })
    }

    fn parse_temporal(&mut self, lhs: Expr) -> Result<Condition, ParseError> {
        let op = self.advance()?;
        let relation = match op.kind {
            TokenKind::Before if self.check(&TokenKind::Or) => {
                self.advance()?;
                self.expect(TokenKind::During, "DURING")?;
                TemporalRelation::BeforeOrDuring(self.parse_time_period()?)
            }
            TokenKind::Before => TemporalRelation::Before(self.take_time()?),
            TokenKind::After => TemporalRelation::After(self.take_time()?),
            TokenKind::During if self.check(&TokenKind::Or) => {
                self.advance()?;
                self.expect(TokenKind::After, "AFTER")?;
                TemporalRelation::DuringOrAfter(self.parse_time_period()?)
            }
            TokenKind::During => TemporalRelation::During(self.parse_time_period()?),
            _ => unreachable!(),
        };

        Ok(Condition::Temporal { lhs, relation })
    }

    /// `TIME / TIME`, `TIME / DURATION` or `DURATION / TIME`
    fn parse_time_period(&mut self) -> Result<TimePeriod, ParseError> {
        match self.current_token.kind {
            TokenKind::Time(_) => {
                let start = self.take_time()?;
                self.expect(TokenKind::Divide, "'/'")?;
                match self.current_token.kind {
                    TokenKind::Duration(_) => {
                        Ok(TimePeriod::StartDuration(start, self.take_duration()?))
                    }
                    _ => Ok(TimePeriod::Bounded(start, self.take_time()?)),
                }
            }
            TokenKind::Duration(_) => {
                let duration = self.take_duration()?;
                self.expect(TokenKind::Divide, "'/'")?;
                Ok(TimePeriod::DurationEnd(duration, self.take_time()?))
            }
            _ => Err(self.unexpected("time period")),
        }
    }

    fn parse_spatial(&mut self) -> Result<Condition, ParseError> {
        let op = self.advance()?;
        self.expect(TokenKind::LParen, "'('")?;
        let lhs = self.parse_expression()?;
        self.expect(TokenKind::Comma, "','")?;
        let rhs = self.parse_expression()?;

        let relation = match op.kind {
            TokenKind::Intersects => SpatialRelation::Intersects,
            TokenKind::Disjoint => SpatialRelation::Disjoint,
            TokenKind::Contains => SpatialRelation::Contains,
            TokenKind::Within => SpatialRelation::Within,
            TokenKind::Touches => SpatialRelation::Touches,
            TokenKind::Crosses => SpatialRelation::Crosses,
            TokenKind::Overlaps => SpatialRelation::Overlaps,
            TokenKind::Equals => SpatialRelation::Equals,
            TokenKind::Relate => {
                self.expect(TokenKind::Comma, "','")?;
                let pattern = self.take_quoted("quoted intersection pattern")?;
                SpatialRelation::Relate { pattern }
            }
            TokenKind::DWithin => {
                let (distance, units) = self.parse_distance()?;
                SpatialRelation::DWithin { distance, units }
            }
            TokenKind::Beyond => {
                let (distance, units) = self.parse_distance()?;
                SpatialRelation::Beyond { distance, units }
            }
            _ => unreachable!(),
        };
        self.expect(TokenKind::RParen, "')'")?;

        Ok(Condition::Spatial { lhs, rhs, relation })
    }

    /// `, distance, units` of `DWITHIN` and `BEYOND`
    fn parse_distance(&mut self) -> Result<(f64, Units), ParseError> {
        self.expect(TokenKind::Comma, "','")?;
        let distance = self.take_number()?;
        self.expect(TokenKind::Comma, "','")?;
        let units = self.take_units()?;
        Ok((distance, units))
    }

    /// `BBOX(value, min_x, min_y, max_x, max_y [, 'crs'])`
    fn parse_bbox(&mut self) -> Result<Condition, ParseError> {
        self.expect(TokenKind::BBox, "BBOX")?;
        self.expect(TokenKind::LParen, "'('")?;
        let value = self.parse_expression()?;

        self.expect(TokenKind::Comma, "','")?;
        let min_x = self.take_number()?;
        self.expect(TokenKind::Comma, "','")?;
        let min_y = self.take_number()?;
        self.expect(TokenKind::Comma, "','")?;
        let max_x = self.take_number()?;
        self.expect(TokenKind::Comma, "','")?;
        let max_y = self.take_number()?;

        let crs = if self.check(&TokenKind::Comma) {
            self.advance()?;
            Some(self.take_quoted("quoted CRS")?)
        } else {
            self.options.default_crs.clone()
        };
        self.expect(TokenKind::RParen, "')'")?;

        Ok(Condition::BBox {
            value,
            min_x,
            min_y,
            max_x,
            max_y,
            crs,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut expressions = vec![self.parse_expression()?];

        while self.check(&TokenKind::Comma) {
            self.advance()?;
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }

    /// Parse an expression, rejecting a grouped condition.
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_token.position;
        match self.parse_additive()? {
            Operand::Expr(expr) => Ok(expr),
            Operand::Condition(_) => Err(unexpected_condition(position)),
        }
    }

    fn parse_additive(&mut self) -> Result<Operand, ParseError> {
        let mut left = match self.parse_multiplicative()? {
            Operand::Expr(expr) => expr,
            condition => return Ok(condition),
        };

        loop {
            let op = match self.current_token.kind {
                TokenKind::Plus => ArithmeticOp::Add,
                TokenKind::Minus => ArithmeticOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let position = self.current_token.position;
            let right = match self.parse_multiplicative()? {
                Operand::Expr(expr) => expr,
                Operand::Condition(_) => return Err(unexpected_condition(position)),
            };

            left = Expr::arithmetic(op, left, right);
        }
        Ok(Operand::Expr(left))
    }

    fn parse_multiplicative(&mut self) -> Result<Operand, ParseError> {
        let mut left = match self.parse_primary()? {
            Operand::Expr(expr) => expr,
            condition => return Ok(condition),
        };

        loop {
            let op = match self.current_token.kind {
                TokenKind::Times => ArithmeticOp::Multiply,
                TokenKind::Divide => ArithmeticOp::Divide,
                _ => break,
            };

            self.advance()?;
            let position = self.current_token.position;
            let right = match self.parse_primary()? {
                Operand::Expr(expr) => expr,
                Operand::Condition(_) => return Err(unexpected_condition(position)),
            };

            left = Expr::arithmetic(op, left, right);
        }
        Ok(Operand::Expr(left))
    }

    /// Literals, attributes and groups.
    fn parse_primary(&mut self) -> Result<Operand, ParseError> {
        match self.current_token.kind {
            TokenKind::LParen | TokenKind::LBracket => self.parse_group(),
            TokenKind::Attribute(_)
            | TokenKind::Quoted(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Geometry(_)
            | TokenKind::Envelope(_)
            | TokenKind::Time(_)
            | TokenKind::Duration(_) => {
                let expr = match self.advance()?.kind {
                    TokenKind::Attribute(name) => Expr::Attribute(name),
                    TokenKind::Quoted(s) => Expr::Literal(Literal::String(s)),
                    TokenKind::Integer(n) => Expr::Literal(Literal::Integer(n)),
                    TokenKind::Float(n) => Expr::Literal(Literal::Float(n)),
                    TokenKind::Geometry(g) => Expr::Literal(Literal::Geometry(g)),
                    TokenKind::Envelope(e) => Expr::Literal(Literal::Envelope(e)),
                    TokenKind::Time(t) => Expr::Literal(Literal::Time(t)),
                    TokenKind::Duration(d) => Expr::Literal(Literal::Duration(d)),
                    _ => unreachable!(),
                };
                Ok(Operand::Expr(expr))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `( ... )` or `[ ... ]`, transparent in the resulting tree.
    fn parse_group(&mut self) -> Result<Operand, ParseError> {
        let open = self.advance()?;
        let (close, expected) = match open.kind {
            TokenKind::LBracket => (TokenKind::RBracket, "']'"),
            _ => (TokenKind::RParen, "')'"),
        };

        self.enter(open.position)?;
        let inner = self.parse_or()?;
        if matches!(inner, Operand::Expr(_)) && !self.check(&close) {
            return Err(self.unexpected("comparison or predicate operator"));
        }
        self.expect(close, expected)?;
        self.leave();

        Ok(inner)
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    fn take_quoted(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.current_token.kind {
            TokenKind::Quoted(_) => match self.advance()?.kind {
                TokenKind::Quoted(s) => Ok(s),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected(expected)),
        }
    }

    fn take_time(&mut self) -> Result<Time, ParseError> {
        match self.current_token.kind {
            TokenKind::Time(_) => match self.advance()?.kind {
                TokenKind::Time(time) => Ok(time),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected("timestamp")),
        }
    }

    fn take_duration(&mut self) -> Result<Duration, ParseError> {
        match self.current_token.kind {
            TokenKind::Duration(_) => match self.advance()?.kind {
                TokenKind::Duration(duration) => Ok(duration),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected("duration")),
        }
    }

    fn take_number(&mut self) -> Result<f64, ParseError> {
        let number = match self.current_token.kind {
            TokenKind::Integer(n) => n as f64,
            TokenKind::Float(n) => n,
            _ => return Err(self.unexpected("number")),
        };
        self.advance()?;
        Ok(number)
    }

    fn take_units(&mut self) -> Result<Units, ParseError> {
        let TokenKind::Units(units) = self.current_token.kind else {
            return Err(self.unexpected("distance units"));
        };
        self.advance()?;
        Ok(units)
    }
}

fn comparison_op(kind: &TokenKind) -> Option<ComparisonOp> {
    let op = match kind {
        TokenKind::Eq => ComparisonOp::Equal,
        TokenKind::Ne => ComparisonOp::NotEqual,
        TokenKind::Lt => ComparisonOp::LessThan,
        TokenKind::Le => ComparisonOp::LessEqual,
        TokenKind::Gt => ComparisonOp::GreaterThan,
        TokenKind::Ge => ComparisonOp::GreaterEqual,
        _ => return None,
    };
    Some(op)
}

fn unexpected_condition(position: Position) -> ParseError {
    debug!(line = position.line, column = position.column, "condition used as expression");
    ParseError::UnexpectedCondition { position }
}
