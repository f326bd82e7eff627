//! JSON rendering of CQL trees.
//!
//! Every node becomes an object tagged by `"type"`; operators use their CQL
//! spelling. The shape is meant for inspection and for handing the tree to
//! tools written in other languages.
//!
//! # Examples
//!
//! ```
//! use cql_filter::{parse, output::to_json};
//!
//! let tree = parse("a = 1").unwrap().unwrap();
//! assert_eq!(
//!     to_json(&tree),
//!     r#"{"lhs":{"name":"a","type":"attribute"},"op":"=","rhs":{"type":"literal","value":1},"type":"comparison"}"#
//! );
//! ```

use serde_json::{Map, Value, json};

use crate::ast::{Condition, Expr, Literal, TemporalBound, TemporalRelation};

/// Compact JSON for `condition`.
pub fn to_json(condition: &Condition) -> String {
    condition_to_json(condition).to_string()
}

/// JSON for `condition` with 2-space indentation.
///
/// ```
/// use cql_filter::{parse, to_json_pretty};
///
/// let tree = parse("a IS NULL").unwrap().unwrap();
/// let expected = r#"{
///   "negated": false,
///   "type": "null",
///   "value": {
///     "name": "a",
///     "type": "attribute"
///   }
/// }"#;
/// assert_eq!(to_json_pretty(&tree), expected);
/// ```
pub fn to_json_pretty(condition: &Condition) -> String {
    let value = condition_to_json(condition);
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

pub fn condition_to_json(condition: &Condition) -> Value {
    match condition {
        Condition::Combination { op, left, right } => json!({
            "type": "combination",
            "op": op.as_str(),
            "left": condition_to_json(left),
            "right": condition_to_json(right),
        }),
        Condition::Not(inner) => json!({
            "type": "not",
            "condition": condition_to_json(inner),
        }),
        Condition::Comparison { op, lhs, rhs } => json!({
            "type": "comparison",
            "op": op.as_str(),
            "lhs": expr_to_json(lhs),
            "rhs": expr_to_json(rhs),
        }),
        Condition::Between {
            value,
            low,
            high,
            negated,
        } => json!({
            "type": "between",
            "value": expr_to_json(value),
            "low": expr_to_json(low),
            "high": expr_to_json(high),
            "negated": negated,
        }),
        Condition::Like {
            value,
            pattern,
            case_sensitive,
            negated,
        } => json!({
            "type": "like",
            "value": expr_to_json(value),
            "pattern": pattern,
            "case_sensitive": case_sensitive,
            "negated": negated,
        }),
        Condition::In {
            value,
            candidates,
            negated,
        } => json!({
            "type": "in",
            "value": expr_to_json(value),
            "candidates": candidates.iter().map(expr_to_json).collect::<Vec<_>>(),
            "negated": negated,
        }),
        Condition::Null { value, negated } => json!({
            "type": "null",
            "value": expr_to_json(value),
            "negated": negated,
        }),
        Condition::Temporal { lhs, relation } => json!({
            "type": "temporal",
            "op": relation.op().as_str(),
            "lhs": expr_to_json(lhs),
            "rhs": temporal_rhs_to_json(relation),
        }),
        Condition::Spatial { lhs, rhs, relation } => {
            let mut object = Map::new();
            object.insert("type".into(), json!("spatial"));
            object.insert("op".into(), json!(relation.op().as_str()));
            object.insert("lhs".into(), expr_to_json(lhs));
            object.insert("rhs".into(), expr_to_json(rhs));
            if let Some(pattern) = relation.pattern() {
                object.insert("pattern".into(), json!(pattern));
            }
            if let Some(distance) = relation.distance() {
                object.insert("distance".into(), number(distance));
            }
            if let Some(units) = relation.units() {
                object.insert("units".into(), json!(units.as_str()));
            }
            Value::Object(object)
        }
        Condition::BBox {
            value,
            min_x,
            min_y,
            max_x,
            max_y,
            crs,
        } => json!({
            "type": "bbox",
            "value": expr_to_json(value),
            "min_x": number(*min_x),
            "min_y": number(*min_y),
            "max_x": number(*max_x),
            "max_y": number(*max_y),
            "crs": crs,
        }),
    }
}

pub fn expr_to_json(expr: &Expr) -> Value {
    match expr {
        Expr::Arithmetic { op, lhs, rhs } => json!({
            "type": "arithmetic",
            "op": op.as_str(),
            "lhs": expr_to_json(lhs),
            "rhs": expr_to_json(rhs),
        }),
        Expr::Attribute(name) => json!({
            "type": "attribute",
            "name": name,
        }),
        Expr::Literal(literal) => json!({
            "type": "literal",
            "value": literal_to_json(literal),
        }),
    }
}

fn literal_to_json(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => json!(s),
        Literal::Integer(n) => json!(n),
        Literal::Float(n) => number(*n),
        Literal::Geometry(g) => json!({ "geometry": g.wkt, "srid": g.srid }),
        Literal::Envelope(e) => json!({
            "envelope": [number(e.min_x), number(e.min_y), number(e.max_x), number(e.max_y)],
        }),
        Literal::Time(t) => json!({ "time": t.text }),
        Literal::Duration(d) => json!({ "duration": d.text }),
    }
}

fn temporal_rhs_to_json(relation: &TemporalRelation) -> Value {
    if let Some(time) = relation.instant() {
        return json!(time.text);
    }
    match relation.period() {
        Some(period) => json!([bound_to_json(period.start()), bound_to_json(period.end())]),
        None => Value::Null,
    }
}

fn bound_to_json(bound: TemporalBound<'_>) -> Value {
    match bound {
        TemporalBound::Instant(t) => json!({ "time": t.text }),
        TemporalBound::Duration(d) => json!({ "duration": d.text }),
    }
}

/// Non-finite floats have no JSON form and become `null`.
fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
