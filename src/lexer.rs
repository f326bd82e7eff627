//! Tokenizer for CQL text.
//!
//! The lexer is pulled by the parser one token at a time. Keywords are
//! case-insensitive. Geometry, envelope, timestamp and duration literals are
//! handed to a [`LiteralFactory`] as soon as they are recognised, so the
//! tokens already carry the built values.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{Token, TokenKind, Units},
    value::{DefaultFactory, LiteralFactory},
};

static DEFAULT_FACTORY: DefaultFactory = DefaultFactory;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[Tt]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:[Zz]|[+-]\d{2}:?\d{2})?)?",
    )
    .expect("valid timestamp pattern")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)P(?:\d+Y)?(?:\d+M)?(?:\d+W)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?")
        .expect("valid duration pattern")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

static SRID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)SRID=\d+;").expect("valid SRID pattern"));

const GEOMETRY_KEYWORDS: &[&str] = &[
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Byte offset from the start of the input
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while tokenizing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("unbalanced parentheses in geometry starting at {position}")]
    UnbalancedGeometry { position: Position },

    #[error("invalid {kind} literal '{text}' at {position}: {reason}")]
    InvalidLiteral {
        kind: &'static str,
        text: String,
        reason: String,
        position: Position,
    },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. }
            | LexError::UnbalancedGeometry { position }
            | LexError::InvalidLiteral { position, .. } => *position,
        }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    line_start: usize,
    factory: &'a dyn LiteralFactory,
    /// Whether the last token can end an operand; decides how `-` lexes
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer using the [`DefaultFactory`] for literal values.
    pub fn new(input: &'a str) -> Self {
        Self::with_factory(input, &DEFAULT_FACTORY)
    }

    pub fn with_factory(input: &'a str, factory: &'a dyn LiteralFactory) -> Self {
        Lexer {
            input,
            offset: 0,
            line: 1,
            line_start: 0,
            factory,
            after_operand: false,
        }
    }

    /// Start over on a new input, keeping the factory.
    pub fn reset(&mut self, input: &'a str) {
        self.input = input;
        self.offset = 0;
        self.line = 1;
        self.line_start = 0;
        self.after_operand = false;
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.line_start = self.offset + 1;
            }
            self.offset += ch.len_utf8();
        }
    }

    fn advance_bytes(&mut self, len: usize) {
        let end = self.offset + len;
        while self.offset < end {
            self.advance();
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.input[self.line_start..self.offset].chars().count() + 1,
            offset: self.offset,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> &'a str {
        let start = self.offset;
        while let Some(ch) = self.current_char() {
            if is_word_char(ch) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.offset]
    }

    /// Read text enclosed in `quote`, where a doubled quote stands for one.
    fn read_quoted(&mut self, quote: char, position: Position) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                if self.current_char() == Some(quote) {
                    result.push(quote);
                    self.advance();
                } else {
                    return Ok(result);
                }
            } else {
                result.push(ch);
            }
        }

        Err(LexError::UnterminatedString { position })
    }

    fn read_number(&mut self, position: Position) -> Result<TokenKind, LexError> {
        let text = NUMBER_RE
            .find(self.rest())
            .map(|m| m.as_str())
            .ok_or_else(|| LexError::InvalidNumber {
                text: self.rest().chars().take(1).collect(),
                position,
            })?;
        self.advance_bytes(text.len());

        let invalid = || LexError::InvalidNumber {
            text: text.to_string(),
            position,
        };
        if text.contains(['.', 'e', 'E']) {
            match text.parse::<f64>() {
                // overflow to infinity has no CQL spelling
                Ok(n) if n.is_finite() => Ok(TokenKind::Float(n)),
                _ => Err(invalid()),
            }
        } else {
            text.parse::<i64>().map(TokenKind::Integer).map_err(|_| invalid())
        }
    }

    /// Match `re` at the cursor, only if the match is not followed by more
    /// word characters.
    fn match_whole(&self, re: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        let m = re.find(rest)?;
        let followed_by_word = rest[m.end()..].chars().next().is_some_and(is_word_char);
        (!followed_by_word).then(|| m.as_str())
    }

    fn read_time(&mut self, position: Position) -> Option<Result<TokenKind, LexError>> {
        let text = self.match_whole(&TIME_RE)?;
        self.advance_bytes(text.len());
        Some(
            self.factory
                .time(text)
                .map(TokenKind::Time)
                .map_err(|reason| invalid_literal("timestamp", text, reason, position)),
        )
    }

    fn read_duration(&mut self, position: Position) -> Option<Result<TokenKind, LexError>> {
        let text = self.match_whole(&DURATION_RE)?;
        // `P` and `PT` alone are words, not durations
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        self.advance_bytes(text.len());
        Some(
            self.factory
                .duration(text)
                .map(TokenKind::Duration)
                .map_err(|reason| invalid_literal("duration", text, reason, position)),
        )
    }

    /// Number of whitespace bytes before the next character, if that
    /// character satisfies `expected`.
    fn lookahead_after_whitespace(&self, expected: impl Fn(char) -> bool) -> Option<usize> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        trimmed
            .chars()
            .next()
            .filter(|c| expected(*c))
            .map(|_| rest.len() - trimmed.len())
    }

    /// Read the body of a WKT geometry after its type keyword: an optional
    /// dimension tag, then a balanced parenthesised list or `EMPTY`.
    /// Returns false without consuming anything when no body follows.
    fn read_geometry_body(&mut self, position: Position) -> Result<bool, LexError> {
        let checkpoint = self.clone();
        self.skip_whitespace();

        let mut word = self.read_word().to_ascii_uppercase();
        if matches!(word.as_str(), "Z" | "M" | "ZM") {
            self.skip_whitespace();
            word = self.read_word().to_ascii_uppercase();
        }
        if word == "EMPTY" {
            return Ok(true);
        }
        if !word.is_empty() || self.current_char() != Some('(') {
            *self = checkpoint;
            return Ok(false);
        }

        let mut depth = 0usize;
        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(true);
                    }
                }
                _ => {}
            }
        }
        Err(LexError::UnbalancedGeometry { position })
    }

    fn read_geometry(&mut self, start: usize, position: Position) -> Result<TokenKind, LexError> {
        let text = &self.input[start..self.offset];
        self.factory
            .geometry(text)
            .map(TokenKind::Geometry)
            .map_err(|reason| invalid_literal("geometry", text, reason, position))
    }

    fn read_envelope(&mut self, start: usize, position: Position) -> Result<TokenKind, LexError> {
        let Some(skip) = self.lookahead_after_whitespace(|c| c == '(') else {
            return Ok(TokenKind::Attribute(self.input[start..self.offset].to_string()));
        };
        self.advance_bytes(skip + 1);

        let body_start = self.offset;
        while let Some(ch) = self.current_char() {
            if ch == ')' {
                break;
            }
            self.advance();
        }
        if self.current_char() != Some(')') {
            return Err(LexError::UnbalancedGeometry { position });
        }
        let body = &self.input[body_start..self.offset];
        self.advance();

        let text = &self.input[start..self.offset];
        let numbers: Vec<f64> = body
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .map_err(|e| invalid_literal("envelope", text, e.to_string(), position))?;
        let bounds: [f64; 4] = numbers.try_into().map_err(|_| {
            invalid_literal("envelope", text, "expected four numbers".to_string(), position)
        })?;

        self.factory
            .envelope(bounds)
            .map(TokenKind::Envelope)
            .map_err(|reason| invalid_literal("envelope", text, reason, position))
    }

    /// `STATUTE MILES` and `NAUTICAL MILES` span two words.
    fn read_miles(&mut self) -> bool {
        let checkpoint = self.clone();
        self.skip_whitespace();
        if self.read_word().eq_ignore_ascii_case("MILES") {
            true
        } else {
            *self = checkpoint;
            false
        }
    }

    fn read_word_token(&mut self, position: Position) -> Result<TokenKind, LexError> {
        let start = self.offset;

        if let Some(prefix) = self.match_srid_prefix() {
            self.advance_bytes(prefix);
            let keyword = self.read_word().to_ascii_uppercase();
            if GEOMETRY_KEYWORDS.contains(&keyword.as_str()) && self.read_geometry_body(position)?
            {
                return self.read_geometry(start, position);
            }
            return Err(invalid_literal(
                "geometry",
                &self.input[start..self.offset],
                "expected WKT geometry after SRID".to_string(),
                position,
            ));
        }

        if let Some(duration) = self.read_duration(position) {
            return duration;
        }

        let word = self.read_word();
        let upper = word.to_ascii_uppercase();
        if let Some(kind) = keyword(&upper) {
            return Ok(kind);
        }

        let kind = match upper.as_str() {
            "FEET" => TokenKind::Units(Units::Feet),
            "METERS" => TokenKind::Units(Units::Meters),
            "KILOMETERS" => TokenKind::Units(Units::Kilometers),
            "STATUTE" if self.read_miles() => TokenKind::Units(Units::StatuteMiles),
            "NAUTICAL" if self.read_miles() => TokenKind::Units(Units::NauticalMiles),
            "ENVELOPE" => return self.read_envelope(start, position),
            g if GEOMETRY_KEYWORDS.contains(&g) => {
                if self.read_geometry_body(position)? {
                    return self.read_geometry(start, position);
                }
                TokenKind::Attribute(word.to_string())
            }
            _ => TokenKind::Attribute(word.to_string()),
        };
        Ok(kind)
    }

    fn match_srid_prefix(&self) -> Option<usize> {
        SRID_RE.find(self.rest()).map(|m| m.end())
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind, LexError> {
        self.advance();
        Ok(kind)
    }

    fn pair(&mut self, second: char, double: TokenKind, single: TokenKind) -> Result<TokenKind, LexError> {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            Ok(double)
        } else {
            Ok(single)
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let position = self.position();
        let start = self.offset;

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('(') => self.single(TokenKind::LParen)?,
            Some(')') => self.single(TokenKind::RParen)?,
            Some('[') => self.single(TokenKind::LBracket)?,
            Some(']') => self.single(TokenKind::RBracket)?,
            Some(',') => self.single(TokenKind::Comma)?,
            Some('+') => self.single(TokenKind::Plus)?,
            Some('*') => self.single(TokenKind::Times)?,
            Some('/') => self.single(TokenKind::Divide)?,
            Some('=') => self.single(TokenKind::Eq)?,
            Some('>') => self.pair('=', TokenKind::Ge, TokenKind::Gt)?,
            Some('<') => match self.peek_char(1) {
                Some('>') => {
                    self.advance();
                    self.single(TokenKind::Ne)?
                }
                _ => self.pair('=', TokenKind::Le, TokenKind::Lt)?,
            },
            Some('-')
                if !self.after_operand
                    && self.peek_char(1).is_some_and(|c| c.is_ascii_digit() || c == '.') =>
            {
                self.read_number(position)?
            }
            Some('-') => self.single(TokenKind::Minus)?,
            Some('\'') => TokenKind::Quoted(self.read_quoted('\'', position)?),
            Some('"') => TokenKind::Attribute(self.read_quoted('"', position)?),
            Some(ch) if ch.is_ascii_digit() => match self.read_time(position) {
                Some(time) => time?,
                None => self.read_number(position)?,
            },
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(position)?
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.read_word_token(position)?,
            Some(ch) => return Err(LexError::UnexpectedChar { ch, position }),
        };

        self.after_operand = kind.ends_operand();
        Ok(Token {
            kind,
            position,
            lexeme: self.input[start..self.offset].to_string(),
        })
    }
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("offset", &self.offset)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | ':')
}

fn invalid_literal(kind: &'static str, text: &str, reason: String, position: Position) -> LexError {
    LexError::InvalidLiteral {
        kind,
        text: text.to_string(),
        reason,
        position,
    }
}

fn keyword(upper: &str) -> Option<TokenKind> {
    let kind = match upper {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "BETWEEN" => TokenKind::Between,
        "LIKE" => TokenKind::Like,
        "ILIKE" => TokenKind::ILike,
        "IN" => TokenKind::In,
        "IS" => TokenKind::Is,
        "NULL" => TokenKind::Null,
        "BEFORE" => TokenKind::Before,
        "AFTER" => TokenKind::After,
        "DURING" => TokenKind::During,
        "INTERSECTS" => TokenKind::Intersects,
        "DISJOINT" => TokenKind::Disjoint,
        "CONTAINS" => TokenKind::Contains,
        "WITHIN" => TokenKind::Within,
        "TOUCHES" => TokenKind::Touches,
        "CROSSES" => TokenKind::Crosses,
        "OVERLAPS" => TokenKind::Overlaps,
        "EQUALS" => TokenKind::Equals,
        "RELATE" => TokenKind::Relate,
        "DWITHIN" => TokenKind::DWithin,
        "BEYOND" => TokenKind::Beyond,
        "BBOX" => TokenKind::BBox,
        _ => return None,
    };
    Some(kind)
}

/// Whether `name` reads back as the very same attribute when written
/// without double quotes.
pub(crate) fn is_plain_attribute(name: &str) -> bool {
    let mut lexer = Lexer::new(name);
    let same_name = matches!(
        lexer.next_token(),
        Ok(Token { kind: TokenKind::Attribute(ref n), .. }) if n == name
    );
    same_name
        && matches!(
            lexer.next_token(),
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            })
        )
}
