//! Parsing of decider output into relation names

use crate::error::DeciderParseError;

const QUOTES: &[char] = &['"', '\'', '`'];

/// Parse a comma-separated relation list such as `orders, customers`.
///
/// Items are trimmed and unquoted, order is kept and repeats are dropped.
pub fn parse_relation_list(output: &str) -> Result<Vec<String>, DeciderParseError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(DeciderParseError::Empty);
    }

    let mut relations: Vec<String> = Vec::new();
    for (position, raw) in trimmed.split(',').enumerate() {
        let item = raw.trim().trim_matches(QUOTES).trim();
        if item.is_empty() {
            return Err(DeciderParseError::EmptyItem {
                position,
                output: trimmed.to_string(),
            });
        }
        if item.chars().any(char::is_whitespace) {
            return Err(DeciderParseError::NotARelationName(item.to_string()));
        }
        if !relations.iter().any(|existing| existing == item) {
            relations.push(item.to_string());
        }
    }

    Ok(relations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_list() {
        let relations = parse_relation_list(" orders, customers ").unwrap();
        assert_eq!(relations, vec!["orders", "customers"]);
    }

    #[test]
    fn test_parse_single_name() {
        assert_eq!(parse_relation_list("orders\n").unwrap(), vec!["orders"]);
    }

    #[test]
    fn test_parse_strips_quotes_and_dedupes() {
        let relations = parse_relation_list("\"orders\", `products`, orders").unwrap();
        assert_eq!(relations, vec!["orders", "products"]);
    }

    #[test]
    fn test_blank_output_rejected() {
        assert_eq!(parse_relation_list("  \n "), Err(DeciderParseError::Empty));
    }

    #[test]
    fn test_empty_item_rejected() {
        let err = parse_relation_list("orders,,customers").unwrap_err();
        assert!(matches!(err, DeciderParseError::EmptyItem { position: 1, .. }));
    }

    #[test]
    fn test_prose_rejected() {
        let err = parse_relation_list("I think you need orders").unwrap_err();
        assert_eq!(
            err,
            DeciderParseError::NotARelationName("I think you need orders".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_joined_names_round_trip(names in proptest::collection::vec("[a-z_][a-z0-9_]{0,12}", 1..8)) {
            let mut expected: Vec<String> = Vec::new();
            for name in &names {
                if !expected.contains(name) {
                    expected.push(name.clone());
                }
            }
            let parsed = parse_relation_list(&names.join(", ")).unwrap();
            prop_assert_eq!(parsed, expected);
        }
    }
}
