use std::fmt;

use crate::{
    ast::ArithmeticOp,
    lexer::is_plain_attribute,
    value::{Duration, Envelope, Geometry, Time},
};

/// Expression node: the operands of predicates.
///
/// Expressions never contain conditions. A comparison such as `a = 1` is a
/// [`Condition`](crate::ast::Condition), not an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Binary arithmetic
    ///
    /// # Example
    /// ```text
    /// population * 2
    /// ```
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Reference to a field of the filtered object
    ///
    /// Not checked against any schema.
    ///
    /// # Examples
    /// ```text
    /// name
    /// ns:attr
    /// "attribute with spaces"
    /// ```
    Attribute(String),

    /// Literal value
    Literal(Literal),
}

/// Literal payload of an [`Expr::Literal`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted string (`'text'`)
    String(String),
    Integer(i64),
    Float(f64),
    /// WKT geometry, built by the geometry factory
    Geometry(Geometry),
    /// `ENVELOPE(...)`, built by the envelope factory
    Envelope(Envelope),
    /// ISO-8601 timestamp, built by the time factory
    Time(Time),
    /// ISO-8601 duration, built by the duration factory
    Duration(Duration),
}

impl Expr {
    pub fn attribute(name: impl Into<String>) -> Self {
        Expr::Attribute(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Expr::Literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::Literal(Literal::Float(value))
    }

    pub fn arithmetic(op: ArithmeticOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Arithmetic {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Arithmetic { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Attribute(name) if is_plain_attribute(name) => f.write_str(name),
            Expr::Attribute(name) => write!(f, "\"{}\"", name.replace('"', "\"\"")),
            Expr::Literal(literal) => literal.fmt(f),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            Literal::Integer(n) => write!(f, "{}", n),
            // Debug keeps the fraction so the text lexes back as a float
            Literal::Float(n) => write!(f, "{:?}", n),
            Literal::Geometry(g) => g.fmt(f),
            Literal::Envelope(e) => e.fmt(f),
            Literal::Time(t) => t.fmt(f),
            Literal::Duration(d) => d.fmt(f),
        }
    }
}

/// Write `s` as a single-quoted CQL string, doubling embedded quotes.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'{}'", s.replace('\'', "''"))
}
