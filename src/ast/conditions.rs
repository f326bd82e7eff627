use std::fmt;

use crate::ast::{
    CombinationOp, ComparisonOp, Expr, SpatialRelation, TemporalRelation,
    expressions::write_quoted,
};

/// Condition node: anything that evaluates to true or false.
///
/// The root of every parsed filter is a `Condition`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `AND` / `OR` of two conditions
    ///
    /// # Example
    /// ```text
    /// a = 1 AND b = 2
    /// ```
    Combination {
        op: CombinationOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },

    /// `NOT condition`
    Not(Box<Condition>),

    /// Comparison of two expressions
    ///
    /// # Example
    /// ```text
    /// population + 1 >= 1000
    /// ```
    Comparison {
        op: ComparisonOp,
        lhs: Expr,
        rhs: Expr,
    },

    /// `value [NOT] BETWEEN low AND high`
    ///
    /// `low <= high` is not checked.
    Between {
        value: Expr,
        low: Expr,
        high: Expr,
        negated: bool,
    },

    /// `value [NOT] LIKE|ILIKE 'pattern'`
    ///
    /// `ILIKE` sets `case_sensitive` to false.
    Like {
        value: Expr,
        pattern: String,
        case_sensitive: bool,
        negated: bool,
    },

    /// `value [NOT] IN (a, b, ...)`, candidates in source order
    In {
        value: Expr,
        candidates: Vec<Expr>,
        negated: bool,
    },

    /// `value IS [NOT] NULL`
    Null { value: Expr, negated: bool },

    /// Temporal predicate
    ///
    /// # Examples
    /// ```text
    /// updated BEFORE 2000-01-01T00:00:00Z
    /// updated DURING OR AFTER 2000-01-01T00:00:00Z / P1D
    /// ```
    Temporal {
        lhs: Expr,
        relation: TemporalRelation,
    },

    /// Spatial predicate
    ///
    /// # Examples
    /// ```text
    /// INTERSECTS(geometry, POINT(1 2))
    /// DWITHIN(geometry, POINT(1 2), 10, meters)
    /// ```
    Spatial {
        lhs: Expr,
        rhs: Expr,
        relation: SpatialRelation,
    },

    /// `BBOX(value, min_x, min_y, max_x, max_y [, 'crs'])`
    BBox {
        value: Expr,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        crs: Option<String>,
    },
}

impl Condition {
    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::Combination {
            op: CombinationOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Combination {
            op: CombinationOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    pub fn comparison(op: ComparisonOp, lhs: Expr, rhs: Expr) -> Self {
        Condition::Comparison { op, lhs, rhs }
    }
}

fn not_prefix(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

/// Prints the condition as fully parenthesised CQL.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Combination { op, left, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Condition::Not(inner) => write!(f, "NOT ({})", inner),
            Condition::Comparison { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Condition::Between {
                value,
                low,
                high,
                negated,
            } => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                value,
                not_prefix(*negated),
                low,
                high
            ),
            Condition::Like {
                value,
                pattern,
                case_sensitive,
                negated,
            } => {
                let op = if *case_sensitive { "LIKE" } else { "ILIKE" };
                write!(f, "{} {}{} ", value, not_prefix(*negated), op)?;
                write_quoted(f, pattern)
            }
            Condition::In {
                value,
                candidates,
                negated,
            } => {
                write!(f, "{} {}IN (", value, not_prefix(*negated))?;
                for (i, candidate) in candidates.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", candidate)?;
                }
                f.write_str(")")
            }
            Condition::Null { value, negated } => {
                write!(f, "{} IS {}NULL", value, not_prefix(*negated))
            }
            Condition::Temporal { lhs, relation } => write!(f, "{} {}", lhs, relation),
            Condition::Spatial { lhs, rhs, relation } => {
                write!(f, "{}({}, {}", relation.op(), lhs, rhs)?;
                relation.fmt_extra_args(f)?;
                f.write_str(")")
            }
            Condition::BBox {
                value,
                min_x,
                min_y,
                max_x,
                max_y,
                crs,
            } => {
                write!(
                    f,
                    "BBOX({}, {:?}, {:?}, {:?}, {:?}",
                    value, min_x, min_y, max_x, max_y
                )?;
                if let Some(crs) = crs {
                    f.write_str(", ")?;
                    write_quoted(f, crs)?;
                }
                f.write_str(")")
            }
        }
    }
}
