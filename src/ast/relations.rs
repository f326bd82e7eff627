//! Right-hand sides of temporal and spatial predicates.
//!
//! Each relation variant carries exactly the arguments its operator takes,
//! so an instant operator can never hold a period and only `RELATE` has a
//! pattern.

use std::fmt;

use crate::{
    ast::{SpatialOp, TemporalOp, Units, expressions::write_quoted},
    value::{Duration, Time},
};

/// Temporal operator together with its right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalRelation {
    Before(Time),
    After(Time),
    During(TimePeriod),
    BeforeOrDuring(TimePeriod),
    DuringOrAfter(TimePeriod),
}

impl TemporalRelation {
    pub fn op(&self) -> TemporalOp {
        match self {
            TemporalRelation::Before(_) => TemporalOp::Before,
            TemporalRelation::After(_) => TemporalOp::After,
            TemporalRelation::During(_) => TemporalOp::During,
            TemporalRelation::BeforeOrDuring(_) => TemporalOp::BeforeOrDuring,
            TemporalRelation::DuringOrAfter(_) => TemporalOp::DuringOrAfter,
        }
    }

    /// The instant operand of `BEFORE`/`AFTER`.
    pub fn instant(&self) -> Option<&Time> {
        match self {
            TemporalRelation::Before(t) | TemporalRelation::After(t) => Some(t),
            _ => None,
        }
    }

    /// The period operand of the `DURING` family.
    pub fn period(&self) -> Option<&TimePeriod> {
        match self {
            TemporalRelation::During(p)
            | TemporalRelation::BeforeOrDuring(p)
            | TemporalRelation::DuringOrAfter(p) => Some(p),
            _ => None,
        }
    }
}

/// A `start/end` time period.
///
/// At most one side is a duration; `P1D/P2D` has no representation.
#[derive(Debug, Clone, PartialEq)]
pub enum TimePeriod {
    /// `TIME / TIME`
    Bounded(Time, Time),
    /// `TIME / DURATION`
    StartDuration(Time, Duration),
    /// `DURATION / TIME`
    DurationEnd(Duration, Time),
}

/// One side of a [`TimePeriod`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemporalBound<'a> {
    Instant(&'a Time),
    Duration(&'a Duration),
}

impl TimePeriod {
    pub fn start(&self) -> TemporalBound<'_> {
        match self {
            TimePeriod::Bounded(t, _) | TimePeriod::StartDuration(t, _) => {
                TemporalBound::Instant(t)
            }
            TimePeriod::DurationEnd(d, _) => TemporalBound::Duration(d),
        }
    }

    pub fn end(&self) -> TemporalBound<'_> {
        match self {
            TimePeriod::Bounded(_, t) | TimePeriod::DurationEnd(_, t) => {
                TemporalBound::Instant(t)
            }
            TimePeriod::StartDuration(_, d) => TemporalBound::Duration(d),
        }
    }
}

/// Spatial operator together with its extra arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialRelation {
    Intersects,
    Disjoint,
    Contains,
    Within,
    Touches,
    Crosses,
    Overlaps,
    Equals,
    /// DE-9IM intersection pattern, e.g. `T*F**FFF*`
    Relate { pattern: String },
    DWithin { distance: f64, units: Units },
    Beyond { distance: f64, units: Units },
}

impl SpatialRelation {
    pub fn op(&self) -> SpatialOp {
        match self {
            SpatialRelation::Intersects => SpatialOp::Intersects,
            SpatialRelation::Disjoint => SpatialOp::Disjoint,
            SpatialRelation::Contains => SpatialOp::Contains,
            SpatialRelation::Within => SpatialOp::Within,
            SpatialRelation::Touches => SpatialOp::Touches,
            SpatialRelation::Crosses => SpatialOp::Crosses,
            SpatialRelation::Overlaps => SpatialOp::Overlaps,
            SpatialRelation::Equals => SpatialOp::Equals,
            SpatialRelation::Relate { .. } => SpatialOp::Relate,
            SpatialRelation::DWithin { .. } => SpatialOp::DWithin,
            SpatialRelation::Beyond { .. } => SpatialOp::Beyond,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        match self {
            SpatialRelation::Relate { pattern } => Some(pattern),
            _ => None,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            SpatialRelation::DWithin { distance, .. } | SpatialRelation::Beyond { distance, .. } => {
                Some(*distance)
            }
            _ => None,
        }
    }

    pub fn units(&self) -> Option<Units> {
        match self {
            SpatialRelation::DWithin { units, .. } | SpatialRelation::Beyond { units, .. } => {
                Some(*units)
            }
            _ => None,
        }
    }

    /// Write the arguments that follow the two operands, including the
    /// leading comma.
    pub(crate) fn fmt_extra_args(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialRelation::Relate { pattern } => {
                f.write_str(", ")?;
                write_quoted(f, pattern)
            }
            SpatialRelation::DWithin { distance, units }
            | SpatialRelation::Beyond { distance, units } => {
                write!(f, ", {:?}, {}", distance, units)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TemporalBound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalBound::Instant(t) => t.fmt(f),
            TemporalBound::Duration(d) => d.fmt(f),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.start(), self.end())
    }
}

impl fmt::Display for TemporalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalRelation::Before(t) | TemporalRelation::After(t) => {
                write!(f, "{} {}", self.op(), t)
            }
            TemporalRelation::During(p)
            | TemporalRelation::BeforeOrDuring(p)
            | TemporalRelation::DuringOrAfter(p) => write!(f, "{} {}", self.op(), p),
        }
    }
}
