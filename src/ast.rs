//! # CQL Abstract Syntax Tree
//!
//! This module defines the tree produced by the [parser](crate::parser) for
//! OGC Common Query Language filters. The tree is backend-agnostic: it says
//! what the filter means, not how a database should run it.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Classified tokens produced by the lexer
//! - **[conditions]** - Condition nodes (boolean combinations and predicates)
//! - **[expressions]** - Expression nodes (attributes, literals, arithmetic)
//! - **[relations]** - Operands of temporal and spatial predicates
//! - **[operators]** - Closed operator enums
//!
//! ## Quick Start
//!
//! ```text
//! name LIKE 'A%' AND INTERSECTS(geometry, POINT(1 2))
//! ```
//!
//! parses to
//!
//! ```text
//! Combination(And)
//! ├── Like { value: Attribute(name), pattern: "A%" }
//! └── Spatial { lhs: Attribute(geometry), rhs: Literal(POINT(1 2)), relation: Intersects }
//! ```
//!
//! ## Ownership
//!
//! Every node owns its children. Nodes are built once, bottom-up, and never
//! mutated afterwards; dropping the root drops the whole tree.
//!
//! ## Negation
//!
//! `a NOT BETWEEN 1 AND 2`, `a NOT LIKE 'x'` and `a NOT IN (1)` set the
//! predicate's `negated` flag. `NOT (a BETWEEN 1 AND 2)` wraps the predicate
//! in [`Condition::Not`] instead. Both mean the same thing but are distinct
//! trees.
pub mod conditions;
pub mod expressions;
pub mod operators;
pub mod relations;
pub mod tokens;

pub use conditions::Condition;
pub use expressions::{Expr, Literal};
pub use operators::{ArithmeticOp, CombinationOp, ComparisonOp, SpatialOp, TemporalOp, Units};
pub use relations::{SpatialRelation, TemporalBound, TemporalRelation, TimePeriod};
pub use tokens::{Token, TokenKind};
