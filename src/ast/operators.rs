use std::fmt;

/// Boolean combination operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
}

/// Temporal operators, including the multi-word ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
    Before,
    After,
    During,
    BeforeOrDuring,
    DuringOrAfter,
}

/// Spatial operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialOp {
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
}

/// Distance units accepted by `DWITHIN` and `BEYOND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Feet,
    Meters,
    StatuteMiles,
    NauticalMiles,
    Kilometers,
}

impl CombinationOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationOp::And => "AND",
            CombinationOp::Or => "OR",
        }
    }
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

impl TemporalOp {
    /// The operator as written in CQL, e.g. `"DURING OR AFTER"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalOp::Before => "BEFORE",
            TemporalOp::After => "AFTER",
            TemporalOp::During => "DURING",
            TemporalOp::BeforeOrDuring => "BEFORE OR DURING",
            TemporalOp::DuringOrAfter => "DURING OR AFTER",
        }
    }

    /// Whether the right-hand side is a time period rather than an instant.
    pub fn takes_period(&self) -> bool {
        !matches!(self, TemporalOp::Before | TemporalOp::After)
    }
}

impl SpatialOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialOp::Intersects => "INTERSECTS",
            SpatialOp::Disjoint => "DISJOINT",
            SpatialOp::Contains => "CONTAINS",
            SpatialOp::Within => "WITHIN",
            SpatialOp::Touches => "TOUCHES",
            SpatialOp::Crosses => "CROSSES",
            SpatialOp::Overlaps => "OVERLAPS",
            SpatialOp::Equals => "EQUALS",
            SpatialOp::Relate => "RELATE",
            SpatialOp::DWithin => "DWITHIN",
            SpatialOp::Beyond => "BEYOND",
        }
    }
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Feet => "feet",
            Units::Meters => "meters",
            Units::StatuteMiles => "statute miles",
            Units::NauticalMiles => "nautical miles",
            Units::Kilometers => "kilometers",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(CombinationOp, ComparisonOp, ArithmeticOp, TemporalOp, SpatialOp, Units);
