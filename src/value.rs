//! Literal values produced while tokenizing.
//!
//! Geometry, envelope, timestamp and duration literals are built by a
//! [`LiteralFactory`] the moment the lexer recognises them. The parser
//! never looks inside these values: it only moves them into
//! [`Literal`](crate::ast::Literal) nodes and temporal relations.
//!
//! # Examples
//!
//! ```
//! use cql_filter::value::{DefaultFactory, LiteralFactory};
//!
//! let factory = DefaultFactory;
//! let point = factory.geometry("SRID=4326;POINT(1 2)").unwrap();
//! assert_eq!(point.srid, Some(4326));
//! assert_eq!(point.wkt, "POINT(1 2)");
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A geometry literal in Well-Known Text form.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Spatial reference id taken from an EWKT `SRID=<n>;` prefix
    pub srid: Option<u32>,
    /// The WKT text without the SRID prefix
    pub wkt: String,
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.srid {
            Some(srid) => write!(f, "SRID={};{}", srid, self.wkt),
            None => f.write_str(&self.wkt),
        }
    }
}

/// An `ENVELOPE(...)` literal.
///
/// The four numbers are read in ECQL order: west, east, north, south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_y: f64,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ENVELOPE({} {} {} {})",
            self.min_x, self.max_x, self.max_y, self.min_y
        )
    }
}

/// An ISO-8601 timestamp literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    pub text: String,
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// An ISO-8601 duration literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duration {
    pub text: String,
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds the opaque literal values the lexer attaches to tokens.
///
/// Returning `Err` rejects the literal; the message ends up in
/// [`LexError::InvalidLiteral`](crate::lexer::LexError::InvalidLiteral).
pub trait LiteralFactory {
    /// Build a geometry from WKT (optionally EWKT with an SRID prefix).
    fn geometry(&self, wkt: &str) -> Result<Geometry, String>;

    /// Build an envelope from the four numbers of `ENVELOPE(...)`, in
    /// source order.
    fn envelope(&self, bounds: [f64; 4]) -> Result<Envelope, String>;

    /// Build a timestamp from ISO-8601 text.
    fn time(&self, text: &str) -> Result<Time, String>;

    /// Build a duration from ISO-8601 text.
    fn duration(&self, text: &str) -> Result<Duration, String>;
}

/// Factory keeping the literal text with light validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl LiteralFactory for DefaultFactory {
    fn geometry(&self, wkt: &str) -> Result<Geometry, String> {
        let wkt = wkt.trim();
        let Some(rest) = strip_prefix_ignore_case(wkt, "SRID=") else {
            return Ok(Geometry {
                srid: None,
                wkt: wkt.to_string(),
            });
        };

        let (srid, body) = rest
            .split_once(';')
            .ok_or_else(|| "missing ';' after SRID".to_string())?;
        let srid = srid
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid SRID '{}'", srid.trim()))?;

        Ok(Geometry {
            srid: Some(srid),
            wkt: body.trim().to_string(),
        })
    }

    fn envelope(&self, bounds: [f64; 4]) -> Result<Envelope, String> {
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err("envelope bounds must be finite".to_string());
        }
        let [min_x, max_x, max_y, min_y] = bounds;
        Ok(Envelope {
            min_x,
            max_x,
            max_y,
            min_y,
        })
    }

    fn time(&self, text: &str) -> Result<Time, String> {
        let text = text.to_ascii_uppercase();
        let invalid = |e: chrono::ParseError| format!("invalid timestamp '{}': {}", text, e);

        match text.split_once('T') {
            None => {
                NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(invalid)?;
            }
            Some((date, clock)) => {
                let (clock, offset) = split_offset(clock);
                // seconds are optional in CQL but not in RFC 3339
                let clock = if clock.len() == 5 {
                    format!("{}:00", clock)
                } else {
                    clock.to_string()
                };
                match offset {
                    Some(offset) => {
                        DateTime::parse_from_rfc3339(&format!("{}T{}{}", date, clock, offset))
                            .map_err(invalid)?;
                    }
                    None => {
                        NaiveDateTime::parse_from_str(
                            &format!("{}T{}", date, clock),
                            "%Y-%m-%dT%H:%M:%S%.f",
                        )
                        .map_err(invalid)?;
                    }
                }
            }
        }

        Ok(Time { text })
    }

    fn duration(&self, text: &str) -> Result<Duration, String> {
        let text = text.to_ascii_uppercase();
        let has_component = text
            .trim_start_matches('P')
            .chars()
            .any(|c| c.is_ascii_digit());
        if !text.starts_with('P') || !has_component || text.ends_with('T') {
            return Err(format!("invalid duration '{}'", text));
        }
        Ok(Duration { text })
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Split a time of day from its UTC offset, normalising `+hhmm` to `+hh:mm`.
fn split_offset(clock: &str) -> (&str, Option<String>) {
    if let Some(clock) = clock.strip_suffix('Z') {
        return (clock, Some("Z".to_string()));
    }
    match clock.find(['+', '-']) {
        Some(i) => {
            let (clock, offset) = clock.split_at(i);
            let offset = match offset.len() {
                5 => format!("{}:{}", &offset[..3], &offset[3..]),
                _ => offset.to_string(),
            };
            (clock, Some(offset))
        }
        None => (clock, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_without_srid() {
        let g = DefaultFactory.geometry("  POINT(1 2) ").unwrap();
        assert_eq!(g.srid, None);
        assert_eq!(g.wkt, "POINT(1 2)");
    }

    #[test]
    fn test_geometry_bad_srid() {
        assert!(DefaultFactory.geometry("SRID=abc;POINT(1 2)").is_err());
        assert!(DefaultFactory.geometry("SRID=4326 POINT(1 2)").is_err());
    }

    #[test]
    fn test_envelope_order() {
        let e = DefaultFactory.envelope([0.0, 10.0, 20.0, 5.0]).unwrap();
        assert_eq!(e.min_x, 0.0);
        assert_eq!(e.max_x, 10.0);
        assert_eq!(e.max_y, 20.0);
        assert_eq!(e.min_y, 5.0);
    }

    #[test]
    fn test_time_validation() {
        assert!(DefaultFactory.time("2000-01-01T00:00:00Z").is_ok());
        assert!(DefaultFactory.time("2000-01-01T23:59:59.5+01:00").is_ok());
        assert!(DefaultFactory.time("2000-01-01T10:30-0500").is_ok());
        assert!(DefaultFactory.time("2000-02-29").is_ok());
        assert!(DefaultFactory.time("2000-01-01").is_ok());
        assert!(DefaultFactory.time("2000-13-01T00:00:00Z").is_err());
        assert!(DefaultFactory.time("2000-01-01T24:00Z").is_err());
    }

    #[test]
    fn test_time_rejects_impossible_dates() {
        assert!(DefaultFactory.time("2001-02-31T00:00:00Z").is_err());
        assert!(DefaultFactory.time("2001-02-29").is_err());
        assert!(DefaultFactory.time("2000-04-31").is_err());
        assert!(DefaultFactory.time("2001-02-28T12:00").is_ok());
    }

    #[test]
    fn test_time_is_normalised() {
        let t = DefaultFactory.time("2000-01-01t10:00:00z").unwrap();
        assert_eq!(t.text, "2000-01-01T10:00:00Z");
    }

    #[test]
    fn test_duration_validation() {
        assert_eq!(DefaultFactory.duration("p1dt2h").unwrap().text, "P1DT2H");
        assert!(DefaultFactory.duration("P").is_err());
        assert!(DefaultFactory.duration("P1DT").is_err());
    }
}
