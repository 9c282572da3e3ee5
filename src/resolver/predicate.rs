//! Block-state predicates.
//!
//! Variant keys (`facing=north,half=top`) and multipart `when` clauses both
//! compile to a [`StatePredicate`], evaluated against a state's property
//! table.

use crate::types::StateProperties;
use serde_json::Value;

/// A boolean condition over block-state properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatePredicate {
    /// Matches every state.
    Always,
    /// Matches no state. Produced for conditions that could not be read.
    Never,
    /// Every listed property must equal one of its allowed values.
    Match(Vec<(String, Vec<String>)>),
    /// At least one sub-predicate matches.
    Any(Vec<StatePredicate>),
    /// Every sub-predicate matches.
    All(Vec<StatePredicate>),
}

impl StatePredicate {
    /// Compile a variant key. The empty key (and the legacy `normal` key)
    /// matches everything.
    pub fn from_variant_key(key: &str) -> Self {
        let conditions: Vec<(String, Vec<String>)> = key
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| match part.split_once('=') {
                Some((name, value)) => Some((name.trim().to_string(), vec![value.trim().to_string()])),
                None => {
                    if part != "normal" {
                        log::warn!("Ignoring malformed variant condition `{}`", part);
                    }
                    None
                }
            })
            .collect();

        if conditions.is_empty() {
            StatePredicate::Always
        } else {
            StatePredicate::Match(conditions)
        }
    }

    /// Compile a multipart `when` clause.
    ///
    /// Accepts a property object (values may list `a|b` alternatives), or an
    /// object holding an `OR` / `AND` array of such clauses.
    pub fn from_when(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            log::warn!("Multipart condition is not an object: {}", value);
            return StatePredicate::Never;
        };

        if let Some(list) = object.get("OR") {
            return StatePredicate::Any(Self::from_list(list));
        }
        if let Some(list) = object.get("AND") {
            return StatePredicate::All(Self::from_list(list));
        }

        let conditions: Vec<(String, Vec<String>)> = object
            .iter()
            .map(|(name, expected)| {
                let expected = match expected {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let allowed = expected.split('|').map(|v| v.trim().to_string()).collect();
                (name.clone(), allowed)
            })
            .collect();

        if conditions.is_empty() {
            StatePredicate::Always
        } else {
            StatePredicate::Match(conditions)
        }
    }

    fn from_list(list: &Value) -> Vec<StatePredicate> {
        match list.as_array() {
            Some(items) => items.iter().map(Self::from_when).collect(),
            None => {
                log::warn!("Multipart condition list is not an array: {}", list);
                vec![StatePredicate::Never]
            }
        }
    }

    /// Evaluate against a state. Properties the state lacks never match.
    pub fn check(&self, properties: &StateProperties) -> bool {
        match self {
            StatePredicate::Always => true,
            StatePredicate::Never => false,
            StatePredicate::Match(conditions) => conditions.iter().all(|(name, allowed)| {
                properties
                    .get(name)
                    .is_some_and(|actual| allowed.iter().any(|v| v == actual))
            }),
            StatePredicate::Any(list) => list.iter().any(|p| p.check(properties)),
            StatePredicate::All(list) => list.iter().all(|p| p.check(properties)),
        }
    }

    /// Number of property conditions; used to try specific variant keys
    /// before catch-all ones.
    pub fn condition_count(&self) -> usize {
        match self {
            StatePredicate::Always | StatePredicate::Never => 0,
            StatePredicate::Match(conditions) => conditions.len(),
            StatePredicate::Any(list) | StatePredicate::All(list) => {
                list.iter().map(StatePredicate::condition_count).sum()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> StateProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_key_always_matches() {
        assert_eq!(StatePredicate::from_variant_key(""), StatePredicate::Always);
        assert_eq!(StatePredicate::from_variant_key("normal"), StatePredicate::Always);
        assert!(StatePredicate::from_variant_key("").check(&props(&[])));
    }

    #[test]
    fn test_variant_key_conjunction() {
        let pred = StatePredicate::from_variant_key("facing=north,half=top");
        assert_eq!(pred.condition_count(), 2);
        assert!(pred.check(&props(&[("facing", "north"), ("half", "top"), ("lit", "true")])));
        assert!(!pred.check(&props(&[("facing", "north"), ("half", "bottom")])));
    }

    #[test]
    fn test_unknown_property_does_not_match() {
        let pred = StatePredicate::from_variant_key("waterlogged=false");
        assert!(!pred.check(&props(&[("facing", "north")])));
    }

    #[test]
    fn test_when_object_with_alternatives() {
        let when: Value = serde_json::from_str(r#"{ "north": "side|up", "east": true }"#).unwrap();
        let pred = StatePredicate::from_when(&when);
        assert!(pred.check(&props(&[("north", "up"), ("east", "true")])));
        assert!(!pred.check(&props(&[("north", "none"), ("east", "true")])));
        assert!(!pred.check(&props(&[("north", "side")])));
    }

    #[test]
    fn test_when_or() {
        let when: Value = serde_json::from_str(
            r#"{ "OR": [ { "north": "true" }, { "south": "true", "up": "false" } ] }"#,
        )
        .unwrap();
        let pred = StatePredicate::from_when(&when);
        assert!(pred.check(&props(&[("north", "true"), ("south", "false")])));
        assert!(pred.check(&props(&[("north", "false"), ("south", "true"), ("up", "false")])));
        assert!(!pred.check(&props(&[("north", "false"), ("south", "true"), ("up", "true")])));
    }

    #[test]
    fn test_when_and() {
        let when: Value =
            serde_json::from_str(r#"{ "AND": [ { "north": "true" }, { "up": "false" } ] }"#).unwrap();
        let pred = StatePredicate::from_when(&when);
        assert!(pred.check(&props(&[("north", "true"), ("up", "false")])));
        assert!(!pred.check(&props(&[("north", "true"), ("up", "true")])));
    }

    #[test]
    fn test_malformed_when_never_matches() {
        let pred = StatePredicate::from_when(&Value::from(3));
        assert_eq!(pred, StatePredicate::Never);
        assert!(!pred.check(&props(&[])));
    }
}
