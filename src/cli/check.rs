//! Parse and validate CQL queries from the command line

use tracing::debug;

use super::CliError;
use crate::{Condition, DefaultFactory, ParseOptions, output};

/// Options shared by the `check` and `parse` commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The CQL query text
    pub query: String,
    /// CRS recorded on a `BBOX` that names none
    pub default_crs: Option<String>,
}

/// Result of a CLI operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Input was blank; there is no tree
    Empty,
    /// Query parsed; the tree rendered as JSON
    Parsed(serde_json::Value),
}

fn parse_query(options: &CheckOptions) -> Result<Option<Condition>, CliError> {
    let parse_options = ParseOptions {
        default_crs: options.default_crs.clone(),
        ..ParseOptions::default()
    };
    crate::parse_with_options(&options.query, &DefaultFactory, &parse_options).map_err(|error| {
        debug!(%error, "query rejected");
        CliError::Parse {
            error,
            query: options.query.clone(),
        }
    })
}

/// Validate the syntax of a query without rendering it
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    match parse_query(options)? {
        Some(_) => Ok(CheckResult::SyntaxValid),
        None => Ok(CheckResult::Empty),
    }
}

/// Parse a query and render its tree as JSON
pub fn execute_parse(options: &CheckOptions) -> Result<CheckResult, CliError> {
    match parse_query(options)? {
        Some(condition) => Ok(CheckResult::Parsed(output::condition_to_json(&condition))),
        None => Ok(CheckResult::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(query: &str) -> CheckOptions {
        CheckOptions {
            query: query.to_string(),
            default_crs: None,
        }
    }

    #[test]
    fn test_check_valid() {
        assert!(matches!(
            execute_check(&options("a = 1 AND b LIKE 'x%'")),
            Ok(CheckResult::SyntaxValid)
        ));
    }

    #[test]
    fn test_check_blank() {
        assert!(matches!(execute_check(&options("  ")), Ok(CheckResult::Empty)));
    }

    #[test]
    fn test_check_error_message_has_caret() {
        let err = execute_check(&options("a = ")).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
        assert!(err.to_string().ends_with("^"));
    }

    #[test]
    fn test_parse_default_crs() {
        let mut opts = options("BBOX(geom, 0, 0, 1, 1)");
        opts.default_crs = Some("EPSG:4326".to_string());
        match execute_parse(&opts) {
            Ok(CheckResult::Parsed(value)) => assert_eq!(value["crs"], "EPSG:4326"),
            other => panic!("expected parsed tree, got {:?}", other),
        }
    }
}
