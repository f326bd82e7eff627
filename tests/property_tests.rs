//! Property tests for the parser
//!
//! Determinism: the same text always yields the same tree.
//! Rendering: the CQL printed for a tree parses back to that tree.

use proptest::prelude::*;

use cql_filter::{Condition, Lexer, TokenKind, parse};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators
// ═══════════════════════════════════════════════════════════════════════════

/// Whether `name` lexes as exactly one attribute token called `name`.
fn lexes_as_attribute(name: &str) -> bool {
    let mut lexer = Lexer::new(name);
    let first = lexer.next_token().map(|t| t.kind);
    let second = lexer.next_token().map(|t| t.kind);
    matches!(first, Ok(TokenKind::Attribute(ref n)) if n == name) && matches!(second, Ok(TokenKind::Eof))
}

fn attribute_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("name".to_string()),
        Just("ns:geom".to_string()),
        Just("\"two words\"".to_string()),
        "[a-z][a-z0-9_]{0,6}".prop_filter("keywords and literals are not attributes", |s| {
            lexes_as_attribute(s)
        }),
    ]
}

fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1000i64..1000).prop_map(|n| n.to_string()),
        (-1000.0f64..1000.0).prop_map(|n| format!("{:?}", n)),
        "[a-zA-Z ']{0,8}".prop_map(|s| format!("'{}'", s.replace('\'', "''"))),
    ]
}

fn expression_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![attribute_strategy(), literal_strategy()];
    leaf.prop_recursive(3, 16, 2, |inner| {
        (
            inner.clone(),
            prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
            inner,
        )
            .prop_map(|(l, op, r)| format!("({} {} {})", l, op, r))
    })
}

fn predicate_strategy() -> impl Strategy<Value = String> {
    let comparison = prop_oneof![Just("="), Just("<>"), Just("<"), Just("<="), Just(">"), Just(">=")];
    prop_oneof![
        (expression_strategy(), comparison, expression_strategy())
            .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
        (attribute_strategy(), any::<bool>(), literal_strategy(), literal_strategy()).prop_map(
            |(a, not, lo, hi)| format!("{} {}BETWEEN {} AND {}", a, if not { "NOT " } else { "" }, lo, hi)
        ),
        (attribute_strategy(), any::<bool>(), prop::collection::vec(literal_strategy(), 1..4))
            .prop_map(|(a, not, items)| format!(
                "{} {}IN ({})",
                a,
                if not { "NOT " } else { "" },
                items.join(", ")
            )),
        (attribute_strategy(), any::<bool>()).prop_map(|(a, not)| format!(
            "{} IS {}NULL",
            a,
            if not { "NOT " } else { "" }
        )),
        (attribute_strategy(), prop_oneof![Just("LIKE"), Just("ILIKE")], "[a-z%_]{0,6}")
            .prop_map(|(a, op, p)| format!("{} {} '{}'", a, op, p)),
        (attribute_strategy(), -180i32..180, -90i32..90)
            .prop_map(|(a, x, y)| format!("INTERSECTS({}, POINT({} {}))", a, x, y)),
        (attribute_strategy(), 0u32..100, prop_oneof![Just("meters"), Just("statute miles")])
            .prop_map(|(a, d, u)| format!("DWITHIN({}, POINT(0 0), {}, {})", a, d, u)),
        (attribute_strategy(), -10i32..0, 0i32..10)
            .prop_map(|(a, lo, hi)| format!("BBOX({}, {}, {}, {}, {}, 'EPSG:4326')", a, lo, lo, hi, hi)),
        attribute_strategy()
            .prop_map(|a| format!("{} DURING 2000-01-01T00:00:00Z / P1DT2H", a)),
        attribute_strategy().prop_map(|a| format!("{} BEFORE 2024-02-29", a)),
    ]
}

fn condition_strategy() -> impl Strategy<Value = String> {
    predicate_strategy().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop_oneof![Just("AND"), Just("OR")], inner.clone())
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            inner.clone().prop_map(|c| format!("NOT {}", c)),
            inner.clone().prop_map(|c| format!("({})", c)),
            inner.prop_map(|c| format!("[{}]", c)),
        ]
    })
}

fn parse_tree(text: &str) -> Condition {
    parse(text)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
        .unwrap_or_else(|| panic!("no tree for {:?}", text))
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Parsing the same text twice yields equal trees
    #[test]
    fn prop_parse_is_deterministic(text in condition_strategy()) {
        let first = parse_tree(&text);
        let second = parse_tree(&text);
        prop_assert_eq!(first, second);
    }

    /// Rendered CQL parses back to the same tree
    #[test]
    fn prop_display_round_trips(text in condition_strategy()) {
        let tree = parse_tree(&text);
        let rendered = tree.to_string();
        let reparsed = parse_tree(&rendered);
        prop_assert_eq!(tree, reparsed, "rendered as {}", rendered);
    }

    /// Surrounding whitespace and brackets never change the tree
    #[test]
    fn prop_brackets_are_transparent(text in predicate_strategy()) {
        let plain = parse_tree(&text);
        prop_assert_eq!(&plain, &parse_tree(&format!("  ( {} )\n", text)));
        prop_assert_eq!(&plain, &parse_tree(&format!("[{}]", text)));
    }

    /// Truncated input is an error, never a partial tree
    #[test]
    fn prop_dangling_combination_fails(
        text in condition_strategy(),
        op in prop_oneof![Just("AND"), Just("OR"), Just("AND NOT")],
    ) {
        let input = format!("{} {}", text, op);
        prop_assert!(parse(&input).is_err());
    }
}
