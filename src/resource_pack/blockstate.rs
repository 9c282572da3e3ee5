//! Blockstate definition parsing.
//!
//! Blockstates map block properties to placed models. There are two formats:
//! `variants` (first matching key wins) and `multipart` (every matching part
//! contributes). Both are walked by hand from the parsed JSON tree so that
//! document order survives.

use crate::error::{CompileError, Result};
use crate::types::{Orientation, ResourceLocation};
use serde_json::Value;

/// A blockstate file.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockStateDocument {
    /// Variant key → weighted model choices, in document order.
    Variants(Vec<(String, Vec<WrapperDocument>)>),
    /// Conditional parts, in document order.
    Multipart(Vec<MultipartDocument>),
}

impl BlockStateDocument {
    pub fn from_value(value: &Value, path: &str) -> Result<Self> {
        let malformed = |reason: &str| CompileError::MalformedDocument {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if let Some(variants) = value.get("variants") {
            let variants = variants
                .as_object()
                .ok_or_else(|| malformed("`variants` is not an object"))?;

            let parsed = variants
                .iter()
                .map(|(key, choices)| {
                    let wrappers = match choices {
                        Value::Array(list) => list.iter().filter_map(WrapperDocument::from_value).collect(),
                        single => WrapperDocument::from_value(single).into_iter().collect(),
                    };
                    (key.clone(), wrappers)
                })
                .collect();
            return Ok(BlockStateDocument::Variants(parsed));
        }

        if let Some(parts) = value.get("multipart") {
            let parts = parts
                .as_array()
                .ok_or_else(|| malformed("`multipart` is not an array"))?;
            return Ok(BlockStateDocument::Multipart(
                parts.iter().filter_map(MultipartDocument::from_value).collect(),
            ));
        }

        Err(malformed("neither `variants` nor `multipart` present"))
    }
}

/// One `when`/`apply` rule of a multipart blockstate.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartDocument {
    /// Raw condition; `None` applies unconditionally.
    pub when: Option<Value>,
    pub apply: WrapperDocument,
}

impl MultipartDocument {
    /// Parse a part. Only the first wrapper of an `apply` list is used.
    pub fn from_value(value: &Value) -> Option<Self> {
        let apply = match value.get("apply")? {
            Value::Array(list) => {
                if list.len() > 1 {
                    log::debug!("Multipart apply lists {} models, using the first", list.len());
                }
                WrapperDocument::from_value(list.first()?)?
            }
            single => WrapperDocument::from_value(single)?,
        };
        Some(Self {
            when: value.get("when").cloned(),
            apply,
        })
    }
}

/// A placed model reference: `{model, x, y, uvlock, weight}`.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperDocument {
    pub model: ResourceLocation,
    /// Rotation about the east-west axis in degrees.
    pub x: i64,
    /// Rotation about the vertical axis in degrees.
    pub y: i64,
    pub uvlock: bool,
    /// Random-choice weight, at least 1.
    pub weight: u32,
}

impl WrapperDocument {
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(model) = value.get("model").and_then(Value::as_str) else {
            log::warn!("Wrapper does not name a model: {}", value);
            return None;
        };

        Some(Self {
            model: ResourceLocation::parse(model),
            x: value.get("x").and_then(as_integer).unwrap_or(0),
            y: value.get("y").and_then(as_integer).unwrap_or(0),
            uvlock: value.get("uvlock").and_then(as_bool).unwrap_or(false),
            weight: value
                .get("weight")
                .and_then(as_integer)
                .map(|w| u32::try_from(w.max(1)).unwrap_or(u32::MAX))
                .unwrap_or(1),
        })
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_degrees(self.x, self.y, self.uvlock)
    }
}

// Packs in the wild quote numbers and booleans as often as not.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<BlockStateDocument> {
        let value: Value = serde_json::from_str(json).unwrap();
        BlockStateDocument::from_value(&value, "test.json")
    }

    #[test]
    fn test_variants_keep_document_order() {
        let doc = parse(
            r#"{
                "variants": {
                    "facing=north": { "model": "block/furnace" },
                    "facing=east": { "model": "block/furnace", "y": 90 },
                    "facing=south": { "model": "block/furnace", "y": "180", "uvlock": "true" },
                    "facing=west": { "model": "block/furnace", "y": 270 }
                }
            }"#,
        )
        .unwrap();

        let BlockStateDocument::Variants(variants) = doc else {
            panic!("expected variants");
        };
        let keys: Vec<_> = variants.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["facing=north", "facing=east", "facing=south", "facing=west"]);

        let south = &variants[2].1[0];
        assert_eq!(south.y, 180);
        assert!(south.uvlock);
        assert_eq!(south.orientation(), Orientation::new(0, 2, true));
    }

    #[test]
    fn test_weighted_variant_list() {
        let doc = parse(
            r#"{ "variants": { "": [
                { "model": "block/stone" },
                { "model": "block/stone_mirrored", "weight": 3 },
                { "x": 90 }
            ] } }"#,
        )
        .unwrap();
        let BlockStateDocument::Variants(variants) = doc else {
            panic!("expected variants");
        };
        // The entry without a model is dropped.
        assert_eq!(variants[0].1.len(), 2);
        assert_eq!(variants[0].1[0].weight, 1);
        assert_eq!(variants[0].1[1].weight, 3);
    }

    #[test]
    fn test_weight_is_clamped() {
        let weight = |json: &str| {
            let value: Value = serde_json::from_str(json).unwrap();
            WrapperDocument::from_value(&value).unwrap().weight
        };
        assert_eq!(weight(r#"{ "model": "block/a", "weight": 0 }"#), 1);
        assert_eq!(weight(r#"{ "model": "block/a", "weight": -4 }"#), 1);
        assert_eq!(weight(r#"{ "model": "block/a", "weight": "7" }"#), 7);
        assert_eq!(weight(r#"{ "model": "block/a", "weight": 4294967296 }"#), u32::MAX);
    }

    #[test]
    fn test_multipart_uses_first_apply() {
        let doc = parse(
            r#"{ "multipart": [
                { "apply": { "model": "block/fence_post" } },
                { "when": { "north": "true" },
                  "apply": [ { "model": "block/fence_side", "uvlock": true }, { "model": "block/other" } ] }
            ] }"#,
        )
        .unwrap();
        let BlockStateDocument::Multipart(parts) = doc else {
            panic!("expected multipart");
        };
        assert_eq!(parts.len(), 2);
        assert!(parts[0].when.is_none());
        assert_eq!(parts[1].apply.model, ResourceLocation::parse("block/fence_side"));
        assert!(parts[1].apply.uvlock);
    }

    #[test]
    fn test_empty_document_is_malformed() {
        assert!(matches!(
            parse(r#"{ "something": {} }"#),
            Err(CompileError::MalformedDocument { .. })
        ));
    }
}
