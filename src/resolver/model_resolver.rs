//! Model inheritance resolution.

use super::chain::{follow_chain, ChainError, Step};
use crate::resource_pack::model::OverrideDocument;
use crate::resource_pack::{AssetSource, FileTables, Model, ModelDocument};
use crate::types::ResourceLocation;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Maximum depth for model inheritance to prevent infinite loops.
pub const MAX_PARENT_DEPTH: usize = 50;

/// How a model's geometry is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// Geometry comes from the model's elements.
    #[default]
    Elements,
    /// Flat layered sprite built from the `layerN` textures.
    Generated,
    /// Drawn by an external pipeline, no static geometry.
    Entity,
}

/// A model with its parent chain merged in.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModel {
    pub model: Model,
    pub kind: ModelKind,
    /// Override rules of the model's own document, not inherited.
    pub overrides: Vec<OverrideDocument>,
}

/// Where model documents are read from: one or more id → path tables,
/// searched in order.
pub struct ModelSource<'a> {
    tables: Vec<&'a HashMap<ResourceLocation, PathBuf>>,
    source: &'a dyn AssetSource,
}

impl<'a> ModelSource<'a> {
    /// Block models only.
    pub fn blocks(files: &'a FileTables, source: &'a dyn AssetSource) -> Self {
        Self {
            tables: vec![&files.block_models],
            source,
        }
    }

    /// Item models first, then block models.
    pub fn items(files: &'a FileTables, source: &'a dyn AssetSource) -> Self {
        Self {
            tables: vec![&files.item_models, &files.block_models],
            source,
        }
    }

    /// Whether any table names `id`. Builtin markers count as present.
    pub fn contains(&self, id: &ResourceLocation) -> bool {
        builtin_kind(id).is_some() || self.tables.iter().any(|t| t.contains_key(id))
    }

    /// Read one document. Missing and malformed files are logged and
    /// yield `None`.
    fn read(&self, id: &ResourceLocation) -> Option<ModelDocument> {
        let Some(path) = self.tables.iter().find_map(|t| t.get(id)) else {
            log::warn!("Model {} not found", id);
            return None;
        };

        let value = match self.source.read_document(path) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read model {}: {}", id, e);
                return None;
            }
        };

        match ModelDocument::from_value(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Malformed model {} ({}): {}", id, path.display(), e);
                None
            }
        }
    }
}

/// Marker parents that stand for a geometry source rather than a file.
pub fn builtin_kind(id: &ResourceLocation) -> Option<ModelKind> {
    match (id.namespace.as_str(), id.path.as_str()) {
        ("minecraft" | "builtin", "builtin/generated") => Some(ModelKind::Generated),
        ("minecraft" | "builtin", "builtin/entity") => Some(ModelKind::Entity),
        _ => None,
    }
}

/// What the parent walk stopped on.
enum ChainBase {
    /// An already resolved ancestor.
    Resolved(Arc<ResolvedModel>),
    /// A builtin marker parent.
    Marker(ModelKind),
    /// A model without a parent, or a missing one.
    Root,
}

/// Memoizing model resolver.
///
/// Every model on a resolved chain is cached, so siblings sharing a parent
/// never re-read it. The cache is insert-if-absent: if two threads race on
/// the same id, both compute the same result and the first one is kept.
#[derive(Debug, Default)]
pub struct ModelResolver {
    cache: RwLock<HashMap<ResourceLocation, Arc<ResolvedModel>>>,
}

impl ModelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// A previously resolved model.
    pub fn get(&self, id: &ResourceLocation) -> Option<Arc<ResolvedModel>> {
        self.cache.read().get(id).cloned()
    }

    /// Resolve a model and everything it inherits from.
    ///
    /// Never fails: missing or malformed files contribute nothing, and a
    /// parent chain that does not terminate yields an empty model.
    pub fn load(&self, id: &ResourceLocation, source: &ModelSource<'_>) -> Arc<ResolvedModel> {
        if let Some(cached) = self.get(id) {
            return cached;
        }

        // Walk up until something already known, collecting documents.
        let mut links: Vec<(ResourceLocation, Option<ModelDocument>)> = Vec::new();
        let walk = follow_chain(id.clone(), MAX_PARENT_DEPTH, |current| {
            if let Some(cached) = self.get(current) {
                return Step::Done(ChainBase::Resolved(cached));
            }
            if let Some(kind) = builtin_kind(current) {
                return Step::Done(ChainBase::Marker(kind));
            }

            let doc = source.read(current);
            let parent = doc.as_ref().and_then(ModelDocument::parent_location);
            links.push((current.clone(), doc));
            match parent {
                Some(parent) => Step::Next(parent),
                None => Step::Done(ChainBase::Root),
            }
        });

        let base = match walk {
            Ok(base) => base,
            Err(ChainError::TooDeep) | Err(ChainError::Missing) => {
                log::warn!("Parent chain of model {} does not terminate", id);
                return self.insert(id.clone(), ResolvedModel::default());
            }
        };

        let mut current = match base {
            ChainBase::Resolved(model) => model,
            ChainBase::Marker(kind) => Arc::new(ResolvedModel {
                kind,
                ..Default::default()
            }),
            ChainBase::Root => Arc::new(ResolvedModel::default()),
        };

        // Apply from the top-most ancestor down to the requested model.
        for (link_id, doc) in links.into_iter().rev() {
            let mut merged = ResolvedModel {
                model: current.model.clone(),
                kind: current.kind,
                overrides: Vec::new(),
            };

            if let Some(doc) = &doc {
                merged.model.apply_document(doc, &link_id);
                if doc.elements.is_some() {
                    merged.kind = ModelKind::Elements;
                }
                merged.overrides = doc.overrides.clone().unwrap_or_default();
            }

            if is_generated_alias(&link_id) && merged.kind == ModelKind::Elements && merged.model.is_empty() {
                merged.kind = ModelKind::Generated;
            }

            current = self.insert(link_id, merged);
        }

        current
    }

    fn insert(&self, id: ResourceLocation, model: ResolvedModel) -> Arc<ResolvedModel> {
        let mut cache = self.cache.write();
        cache.entry(id).or_insert_with(|| Arc::new(model)).clone()
    }
}

/// `item/generated` counts as the generated marker even when the pack
/// does not ship the file.
fn is_generated_alias(id: &ResourceLocation) -> bool {
    id.namespace == "minecraft" && id.path == "item/generated"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::MemoryAssetSource;

    struct Fixture {
        files: FileTables,
        source: MemoryAssetSource,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                files: FileTables::new(),
                source: MemoryAssetSource::new(),
            }
        }

        fn block(&mut self, id: &str, json: &str) {
            let path = format!("models/{}.json", id);
            self.files
                .block_models
                .insert(ResourceLocation::parse(id), PathBuf::from(&path));
            self.source.insert(path, json);
        }

        fn item(&mut self, id: &str, json: &str) {
            let path = format!("models/{}.json", id);
            self.files
                .item_models
                .insert(ResourceLocation::parse(id), PathBuf::from(&path));
            self.source.insert(path, json);
        }
    }

    fn cube_pack() -> Fixture {
        let mut fx = Fixture::new();
        fx.block(
            "block/cube",
            r##"{
                "display": { "gui": { "rotation": [30, 225, 0] } },
                "elements": [ {
                    "from": [0, 0, 0], "to": [16, 16, 16],
                    "faces": {
                        "down":  { "texture": "#down", "cullface": "down" },
                        "up":    { "texture": "#up", "cullface": "up" },
                        "north": { "texture": "#north", "cullface": "north" },
                        "south": { "texture": "#south", "cullface": "south" },
                        "west":  { "texture": "#west", "cullface": "west" },
                        "east":  { "texture": "#east", "cullface": "east" }
                    }
                } ]
            }"##,
        );
        fx.block(
            "block/cube_all",
            r##"{
                "parent": "block/cube",
                "textures": {
                    "particle": "#all", "down": "#all", "up": "#all",
                    "north": "#all", "east": "#all", "south": "#all", "west": "#all"
                }
            }"##,
        );
        fx.block(
            "block/stone",
            r#"{ "parent": "block/cube_all", "textures": { "all": "block/stone" } }"#,
        );
        fx
    }

    #[test]
    fn test_child_inherits_elements() {
        let fx = cube_pack();
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);

        let stone = resolver.load(&ResourceLocation::parse("block/stone"), &source);
        let cube = resolver.load(&ResourceLocation::parse("block/cube"), &source);

        assert_eq!(stone.model.elements.len(), cube.model.elements.len());
        assert_eq!(stone.model.elements[0].faces.len(), 6);
        assert_eq!(
            stone.model.resolve_texture("north"),
            ResourceLocation::parse("block/stone")
        );
        assert_eq!(stone.model.display.len(), 1);
        // The whole chain got cached on the way.
        assert_eq!(resolver.len(), 3);
    }

    #[test]
    fn test_child_elements_replace_parent() {
        let mut fx = cube_pack();
        fx.block(
            "block/slab",
            r##"{
                "parent": "block/cube_all",
                "elements": [
                    { "from": [0, 0, 0], "to": [16, 8, 16], "faces": { "up": { "texture": "#all" } } },
                    { "from": [0, 0, 0], "to": [8, 8, 8], "faces": {} }
                ]
            }"##,
        );
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);
        let slab = resolver.load(&ResourceLocation::parse("block/slab"), &source);

        assert_eq!(slab.model.elements.len(), 2);
        assert_eq!(slab.model.elements[0].faces.len(), 1);
        assert_eq!(slab.model.elements[1].faces.len(), 0);
    }

    #[test]
    fn test_child_textures_override_parent() {
        let mut fx = cube_pack();
        fx.block(
            "block/mossy",
            r#"{ "parent": "block/stone", "textures": { "all": "block/mossy", "extra": "block/x" } }"#,
        );
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);
        let mossy = resolver.load(&ResourceLocation::parse("block/mossy"), &source);

        assert_eq!(mossy.model.resolve_texture("up"), ResourceLocation::parse("block/mossy"));
        assert_eq!(mossy.model.resolve_texture("extra"), ResourceLocation::parse("block/x"));
        let ids = mossy.model.texture_ids();
        assert!(ids.contains(&ResourceLocation::parse("block/mossy")));
        assert!(!ids.contains(&ResourceLocation::parse("block/stone")));
    }

    #[test]
    fn test_missing_model_is_empty() {
        let fx = cube_pack();
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);
        let missing = resolver.load(&ResourceLocation::parse("block/nonexistent"), &source);

        assert!(missing.model.is_empty());
        assert!(missing.model.textures.is_empty());
    }

    #[test]
    fn test_missing_parent_keeps_own_content() {
        let mut fx = Fixture::new();
        fx.block(
            "block/orphan",
            r#"{ "parent": "block/gone", "textures": { "all": "block/dirt" } }"#,
        );
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);
        let orphan = resolver.load(&ResourceLocation::parse("block/orphan"), &source);
        assert_eq!(orphan.model.resolve_texture("all"), ResourceLocation::parse("block/dirt"));
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut fx = Fixture::new();
        fx.block("block/a", r#"{ "parent": "block/b" }"#);
        fx.block("block/b", r#"{ "parent": "block/a" }"#);
        let resolver = ModelResolver::new();
        let source = ModelSource::blocks(&fx.files, &fx.source);
        let a = resolver.load(&ResourceLocation::parse("block/a"), &source);
        assert!(a.model.is_empty());
    }

    #[test]
    fn test_generated_marker_is_inherited() {
        let mut fx = Fixture::new();
        fx.item(
            "item/generated",
            r#"{ "parent": "builtin/generated", "display": { "ground": { "scale": [0.5, 0.5, 0.5] } } }"#,
        );
        fx.item(
            "item/apple",
            r#"{ "parent": "item/generated", "textures": { "layer0": "item/apple" } }"#,
        );
        fx.item(
            "item/chest",
            r#"{ "parent": "builtin/entity" }"#,
        );
        fx.item(
            "item/custom",
            r##"{ "parent": "item/apple", "elements": [ { "from": [0,0,0], "to": [1,1,1], "faces": {} } ] }"##,
        );
        fx.item(
            "item/bare",
            r#"{ "parent": "minecraft:item/handheld_missing_generated", "textures": { "layer0": "item/stick" } }"#,
        );

        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);

        let apple = resolver.load(&ResourceLocation::parse("item/apple"), &source);
        assert_eq!(apple.kind, ModelKind::Generated);
        assert_eq!(apple.model.display.len(), 1);

        let chest = resolver.load(&ResourceLocation::parse("item/chest"), &source);
        assert_eq!(chest.kind, ModelKind::Entity);

        let custom = resolver.load(&ResourceLocation::parse("item/custom"), &source);
        assert_eq!(custom.kind, ModelKind::Elements);

        let bare = resolver.load(&ResourceLocation::parse("item/bare"), &source);
        assert_eq!(bare.kind, ModelKind::Elements);
    }

    #[test]
    fn test_generated_alias_without_file() {
        let mut fx = Fixture::new();
        fx.item(
            "item/stick",
            r#"{ "parent": "item/generated", "textures": { "layer0": "item/stick" } }"#,
        );
        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);
        let stick = resolver.load(&ResourceLocation::parse("item/stick"), &source);
        assert_eq!(stick.kind, ModelKind::Generated);
    }

    #[test]
    fn test_item_parent_falls_back_to_block_table() {
        let mut fx = cube_pack();
        fx.item("item/stone", r#"{ "parent": "block/stone" }"#);
        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);
        let stone = resolver.load(&ResourceLocation::parse("item/stone"), &source);
        assert_eq!(stone.kind, ModelKind::Elements);
        assert_eq!(stone.model.elements.len(), 1);
    }

    #[test]
    fn test_overrides_are_not_inherited() {
        let mut fx = Fixture::new();
        fx.item(
            "item/bow",
            r#"{ "parent": "item/generated", "overrides": [ { "predicate": { "pulling": 1 }, "model": "item/bow_pulling_0" } ] }"#,
        );
        fx.item("item/bow_pulling_0", r#"{ "parent": "item/bow" }"#);
        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);

        assert_eq!(resolver.load(&ResourceLocation::parse("item/bow"), &source).overrides.len(), 1);
        assert!(resolver
            .load(&ResourceLocation::parse("item/bow_pulling_0"), &source)
            .overrides
            .is_empty());
    }
}
