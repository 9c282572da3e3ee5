//! Building item models from resolved item model documents.

use super::model_resolver::{ModelKind, ModelResolver, ModelSource, ResolvedModel};
use crate::atlas::TextureAtlas;
use crate::mesher::item::{layer_count, DEFAULT_PRECISION, DEFAULT_THICKNESS};
use crate::mesher::{GeneratedElementCache, GeneratedKey, ItemGeometry};
use crate::types::{BlockStatePalette, RenderType, ResourceLocation};
use std::collections::HashMap;

/// Item property values, e.g. `{"pulling": 1.0, "pull": 0.65}`.
pub type ItemProperties = HashMap<String, f32>;

/// Alternative geometry used when the item's properties reach every
/// threshold of the predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOverride {
    pub predicate: HashMap<String, f32>,
    pub geometry: ItemGeometry,
}

impl ItemOverride {
    pub fn matches(&self, properties: &ItemProperties) -> bool {
        self.predicate
            .iter()
            .all(|(name, threshold)| properties.get(name).is_some_and(|value| value >= threshold))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemModel {
    pub geometry: ItemGeometry,
    pub render_type: RenderType,
    pub overrides: Vec<ItemOverride>,
}

impl ItemModel {
    /// Geometry for the given properties. Later overrides take precedence,
    /// the base geometry is used when none match.
    pub fn select(&self, properties: &ItemProperties) -> &ItemGeometry {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.matches(properties))
            .map_or(&self.geometry, |o| &o.geometry)
    }
}

/// Builds [`ItemModel`]s.
pub struct ItemAssembler<'a> {
    models: &'a ModelResolver,
    source: &'a ModelSource<'a>,
    atlas: &'a TextureAtlas,
    generated: &'a GeneratedElementCache,
    blocks: Option<&'a dyn BlockStatePalette>,
    precision: u32,
    thickness: u32,
}

impl<'a> ItemAssembler<'a> {
    pub fn new(
        models: &'a ModelResolver,
        source: &'a ModelSource<'a>,
        atlas: &'a TextureAtlas,
        generated: &'a GeneratedElementCache,
    ) -> Self {
        Self {
            models,
            source,
            atlas,
            generated,
            blocks: None,
            precision: DEFAULT_PRECISION,
            thickness: DEFAULT_THICKNESS,
        }
    }

    /// Block items take the render type of the block with the same id.
    pub fn with_blocks(mut self, blocks: &'a dyn BlockStatePalette) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn with_generated_shape(mut self, precision: u32, thickness: u32) -> Self {
        self.precision = precision;
        self.thickness = thickness;
        self
    }

    /// Model id of an item: `minecraft:apple` → `minecraft:item/apple`.
    pub fn model_id(item: &ResourceLocation) -> ResourceLocation {
        item.with_path(format!("item/{}", item.path))
    }

    fn geometry(&self, resolved: &ResolvedModel, tintable: bool) -> ItemGeometry {
        match resolved.kind {
            ModelKind::Elements => ItemGeometry::build(&resolved.model, self.atlas),
            ModelKind::Generated => {
                let key = GeneratedKey {
                    layers: layer_count(&resolved.model),
                    precision: self.precision,
                    thickness: self.thickness,
                    tintable,
                };
                let elements = self.generated.get(key);
                ItemGeometry::build_generated(&resolved.model, &elements, self.atlas)
            }
            ModelKind::Entity => ItemGeometry {
                display: resolved
                    .model
                    .display
                    .iter()
                    .map(|(position, transform)| (*position, transform.to_mat3()))
                    .collect(),
                ..Default::default()
            },
        }
    }

    /// Build the model of one item. Items without a model file are logged
    /// and skipped.
    pub fn assemble(&self, item: &ResourceLocation, tintable: bool) -> Option<ItemModel> {
        let id = Self::model_id(item);
        if !self.source.contains(&id) {
            log::warn!("Item model not assigned for {}", id);
            return None;
        }

        let resolved = self.models.load(&id, self.source);
        let render_type = match resolved.kind {
            ModelKind::Generated => RenderType::Cutout,
            ModelKind::Entity => RenderType::Entity,
            ModelKind::Elements => self
                .blocks
                .map_or(RenderType::Solid, |blocks| blocks.render_type(item)),
        };

        let overrides = resolved
            .overrides
            .iter()
            .filter_map(|rule| {
                let target = ResourceLocation::parse(&rule.model);
                if !self.source.contains(&target) {
                    log::warn!("Override model {} of {} not found, skipping", target, id);
                    return None;
                }
                let model = self.models.load(&target, self.source);
                Some(ItemOverride {
                    predicate: rule.predicate.clone(),
                    geometry: self.geometry(&model, tintable),
                })
            })
            .collect();

        Some(ItemModel {
            geometry: self.geometry(&resolved, tintable),
            render_type,
            overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_pack::{FileTables, MemoryAssetSource};
    use crate::types::{StatePalette, StateProperties};
    use std::path::PathBuf;

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

        fn add(&mut self, id: &str, json: &str, block: bool) {
            let path = format!("models/{}.json", id);
            let table = if block {
                &mut self.files.block_models
            } else {
                &mut self.files.item_models
            };
            table.insert(ResourceLocation::parse(id), PathBuf::from(&path));
            self.source.insert(path, json);
        }
    }

    fn bow_pack() -> Fixture {
        let mut fx = Fixture::new();
        fx.add(
            "item/bow",
            r#"{
                "parent": "item/generated",
                "textures": { "layer0": "item/bow" },
                "overrides": [
                    { "predicate": { "pulling": 1 }, "model": "item/bow_pulling_0" },
                    { "predicate": { "pulling": 1, "pull": 0.65 }, "model": "item/bow_pulling_1" },
                    { "predicate": { "pulling": 1 }, "model": "item/missing" }
                ]
            }"#,
            false,
        );
        fx.add(
            "item/bow_pulling_0",
            r#"{ "parent": "item/bow", "textures": { "layer0": "item/bow_pulling_0" } }"#,
            false,
        );
        fx.add(
            "item/bow_pulling_1",
            r#"{ "parent": "item/bow", "textures": { "layer0": "item/bow_pulling_1", "layer1": "item/arrow" } }"#,
            false,
        );
        fx
    }

    fn with_assembler<T>(fx: &Fixture, f: impl FnOnce(&ItemAssembler<'_>) -> T) -> T {
        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);
        let atlas = TextureAtlas::empty();
        let generated = GeneratedElementCache::new();
        let assembler = ItemAssembler::new(&resolver, &source, &atlas, &generated).with_generated_shape(4, 1);
        f(&assembler)
    }

    fn props(pairs: &[(&str, f32)]) -> ItemProperties {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_model_id() {
        assert_eq!(
            ItemAssembler::model_id(&ResourceLocation::parse("mymod:wand")),
            ResourceLocation::parse("mymod:item/wand")
        );
    }

    #[test]
    fn test_generated_item() {
        let fx = bow_pack();
        let bow = with_assembler(&fx, |a| a.assemble(&ResourceLocation::parse("bow"), false)).unwrap();

        assert_eq!(bow.render_type, RenderType::Cutout);
        // 4 columns, 4 rows and a slab, two faces each.
        assert_eq!(bow.geometry.vertex_count(), (4 * 2 + 1) * 2 * 4);
        // The override pointing at a missing model is dropped.
        assert_eq!(bow.overrides.len(), 2);
        // Two layers on the second pull stage.
        assert_eq!(bow.overrides[1].geometry.vertex_count(), 2 * bow.geometry.vertex_count());
    }

    #[test]
    fn test_last_matching_override_wins() {
        let fx = bow_pack();
        let bow = with_assembler(&fx, |a| a.assemble(&ResourceLocation::parse("bow"), false)).unwrap();

        assert!(std::ptr::eq(bow.select(&props(&[])), &bow.geometry));
        assert!(std::ptr::eq(bow.select(&props(&[("pulling", 0.0)])), &bow.geometry));
        assert!(std::ptr::eq(
            bow.select(&props(&[("pulling", 1.0)])),
            &bow.overrides[0].geometry
        ));
        assert!(std::ptr::eq(
            bow.select(&props(&[("pulling", 1.0), ("pull", 0.9)])),
            &bow.overrides[1].geometry
        ));
    }

    #[test]
    fn test_block_item_takes_block_render_type() {
        let mut fx = Fixture::new();
        fx.add(
            "block/glass",
            r##"{ "textures": { "all": "block/glass" }, "elements": [ { "from": [0,0,0], "to": [16,16,16],
                "faces": { "up": { "texture": "#all" }, "down": { "texture": "#all" } } } ] }"##,
            true,
        );
        fx.add("item/glass", r#"{ "parent": "block/glass" }"#, false);

        let mut blocks = StatePalette::new();
        let glass = ResourceLocation::parse("glass");
        blocks.add_state(glass.clone(), 0, StateProperties::new());
        blocks.set_render_type(glass.clone(), RenderType::Translucent);

        let resolver = ModelResolver::new();
        let source = ModelSource::items(&fx.files, &fx.source);
        let atlas = TextureAtlas::empty();
        let generated = GeneratedElementCache::new();
        let model = ItemAssembler::new(&resolver, &source, &atlas, &generated)
            .with_blocks(&blocks)
            .assemble(&glass, false)
            .unwrap();

        assert_eq!(model.render_type, RenderType::Translucent);
        assert_eq!(model.geometry.vertex_count(), 8);
        assert!(model.overrides.is_empty());
    }

    #[test]
    fn test_entity_and_missing_items() {
        let mut fx = Fixture::new();
        fx.add(
            "item/chest",
            r#"{ "parent": "builtin/entity", "display": { "gui": { "rotation": [30, 45, 0] } } }"#,
            false,
        );

        with_assembler(&fx, |a| {
            let chest = a.assemble(&ResourceLocation::parse("chest"), false).unwrap();
            assert_eq!(chest.render_type, RenderType::Entity);
            assert!(chest.geometry.is_empty());
            assert_eq!(chest.geometry.display.len(), 1);

            assert!(a.assemble(&ResourceLocation::parse("nothing"), false).is_none());
        });
    }
}
