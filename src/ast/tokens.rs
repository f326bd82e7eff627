use std::fmt;

use crate::{
    ast::Units,
    lexer::Position,
    value::{Duration, Envelope, Geometry, Time},
};

/// A classified token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Where the token starts
    pub position: Position,
    /// The source text the token was read from
    pub lexeme: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Comparison
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`, also the separator of time periods
    Divide,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    // Keywords
    And,
    Or,
    Not,
    Between,
    Like,
    ILike,
    In,
    Is,
    Null,

    // Temporal keywords
    Before,
    After,
    During,

    // Spatial keywords
    Intersects,
    Disjoint,
    Contains,
    Within,
    Touches,
    Crosses,
    Overlaps,
    Equals,
    Relate,
    DWithin,
    Beyond,
    BBox,

    // Literals
    /// ISO-8601 timestamp
    ///
    /// # Examples
    /// ```text
    /// 2000-01-01T00:00:00Z
    /// 2012-05-04T12:30+02:00
    /// ```
    Time(Time),

    /// ISO-8601 duration
    ///
    /// # Examples
    /// ```text
    /// P1Y2M
    /// PT36H
    /// ```
    Duration(Duration),

    /// Distance units
    ///
    /// # Examples
    /// ```text
    /// meters
    /// nautical miles
    /// ```
    Units(Units),

    /// Attribute name, bare or double-quoted
    Attribute(String),

    /// Single-quoted string, without the quotes
    Quoted(String),

    /// WKT geometry
    ///
    /// # Examples
    /// ```text
    /// POINT(1 2)
    /// SRID=4326;POLYGON((0 0, 1 0, 1 1, 0 0))
    /// ```
    Geometry(Geometry),

    /// `ENVELOPE(x1 x2 y1 y2)`
    Envelope(Envelope),

    Integer(i64),
    Float(f64),

    /// End of input
    Eof,
}

impl TokenKind {
    /// Token kind tag, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Le => "LE",
            TokenKind::Gt => "GT",
            TokenKind::Ge => "GE",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Between => "BETWEEN",
            TokenKind::Like => "LIKE",
            TokenKind::ILike => "ILIKE",
            TokenKind::In => "IN",
            TokenKind::Is => "IS",
            TokenKind::Null => "NULL",
            TokenKind::Before => "BEFORE",
            TokenKind::After => "AFTER",
            TokenKind::During => "DURING",
            TokenKind::Intersects => "INTERSECTS",
            TokenKind::Disjoint => "DISJOINT",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Within => "WITHIN",
            TokenKind::Touches => "TOUCHES",
            TokenKind::Crosses => "CROSSES",
            TokenKind::Overlaps => "OVERLAPS",
            TokenKind::Equals => "EQUALS",
            TokenKind::Relate => "RELATE",
            TokenKind::DWithin => "DWITHIN",
            TokenKind::Beyond => "BEYOND",
            TokenKind::BBox => "BBOX",
            TokenKind::Time(_) => "TIME",
            TokenKind::Duration(_) => "DURATION",
            TokenKind::Units(_) => "UNITS",
            TokenKind::Attribute(_) => "ATTRIBUTE",
            TokenKind::Quoted(_) => "QUOTED",
            TokenKind::Geometry(_) => "GEOMETRY",
            TokenKind::Envelope(_) => "ENVELOPE",
            TokenKind::Integer(_) => "INTEGER",
            TokenKind::Float(_) => "FLOAT",
            TokenKind::Eof => "EOF",
        }
    }

    /// Whether a `-` right after this token is a binary minus.
    ///
    /// True for tokens that can end an operand.
    pub(crate) fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Attribute(_)
                | TokenKind::Quoted(_)
                | TokenKind::Geometry(_)
                | TokenKind::Envelope(_)
                | TokenKind::Time(_)
                | TokenKind::Duration(_)
                | TokenKind::Integer(_)
                | TokenKind::Float(_)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
