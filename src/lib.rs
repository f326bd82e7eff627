//! Parser for the OGC Common Query Language (CQL).
//!
//! Turns CQL filter text into a backend-agnostic [`Condition`] tree that a
//! caller can translate into SQL, an ORM filter or an in-memory predicate.
//!
//! ```
//! use cql_filter::{parse, ast::{ComparisonOp, Condition}};
//!
//! let tree = parse("population + 1 = 10").unwrap().unwrap();
//! assert!(matches!(tree, Condition::Comparison { op: ComparisonOp::Equal, .. }));
//!
//! // blank input has no tree and is not an error
//! assert!(parse("   ").unwrap().is_none());
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{Condition, Expr, Literal, Token, TokenKind};
pub use lexer::{LexError, Lexer, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, ParseOptions, Parser};
pub use value::{DefaultFactory, LiteralFactory};

/// Parse CQL text with the [`DefaultFactory`] and default options.
///
/// Returns `Ok(None)` for empty or whitespace-only input.
pub fn parse(text: &str) -> Result<Option<Condition>, ParseError> {
    parse_with_options(text, &DefaultFactory, &ParseOptions::default())
}

/// Parse CQL text, building geometry, envelope, timestamp and duration
/// literals with `factory`.
pub fn parse_with(text: &str, factory: &dyn LiteralFactory) -> Result<Option<Condition>, ParseError> {
    parse_with_options(text, factory, &ParseOptions::default())
}

pub fn parse_with_options(
    text: &str,
    factory: &dyn LiteralFactory,
    options: &ParseOptions,
) -> Result<Option<Condition>, ParseError> {
    let lexer = Lexer::with_factory(text, factory);
    let mut parser = Parser::with_options(lexer, options.clone())?;
    parser.parse()
}
