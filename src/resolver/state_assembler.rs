//! Assigning compiled geometry to numeric block states.
//!
//! Variants are exclusive: each state takes the most specific matching key.
//! Multipart rules are cumulative: each state takes the union of every part
//! whose condition holds. Geometry is compiled once per (model, orientation)
//! and shared by reference between all states that use it.

use super::model_resolver::{ModelResolver, ModelSource, ResolvedModel};
use super::predicate::StatePredicate;
use crate::atlas::TextureAtlas;
use crate::mesher::{compile, emit, CompiledGeometry, EmitContext, VertexBuffer};
use crate::resource_pack::{BlockStateDocument, MultipartDocument, WrapperDocument};
use crate::types::{BlockStatePalette, OffsetType, Orientation, RenderType, ResourceLocation};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const PARTICLE_SLOT: &str = "particle";

/// One random choice of a state: the parts drawn together, and how likely
/// the choice is.
#[derive(Debug, Clone, PartialEq)]
pub struct StateGeometry {
    pub parts: Vec<Arc<CompiledGeometry>>,
    pub weight: u32,
}

impl StateGeometry {
    /// Vertices [`StateGeometry::emit`] writes for a cull-flag mask.
    pub fn vertex_count(&self, cull_flags: u8) -> usize {
        self.parts.iter().map(|p| p.vertex_count(cull_flags)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.is_empty())
    }

    /// Emit every part in order.
    pub fn emit(&self, ctx: &EmitContext, buffer: &mut VertexBuffer, vertex_offset: usize) -> usize {
        self.parts
            .iter()
            .fold(vertex_offset, |cursor, part| emit(part, ctx, buffer, cursor))
    }
}

/// Everything the mesher needs to draw one block state.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStateModel {
    pub geometries: Vec<StateGeometry>,
    pub render_type: RenderType,
    pub offset_type: OffsetType,
    pub particle_texture: ResourceLocation,
}

impl BlockStateModel {
    /// Pick a geometry by weight. The same seed always picks the same one.
    pub fn choose(&self, seed: u64) -> Option<&StateGeometry> {
        let total: u64 = self.geometries.iter().map(|g| g.weight.max(1) as u64).sum();
        if total == 0 {
            return None;
        }

        let mut pick = seed % total;
        for geometry in &self.geometries {
            let weight = geometry.weight.max(1) as u64;
            if pick < weight {
                return Some(geometry);
            }
            pick -= weight;
        }
        self.geometries.last()
    }
}

/// Compiled geometry keyed by model id and orientation.
#[derive(Debug, Default)]
pub struct GeometryCache {
    cache: RwLock<HashMap<(ResourceLocation, Orientation), Arc<CompiledGeometry>>>,
}

impl GeometryCache {
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

    pub fn get(&self, model: &ResourceLocation, orientation: Orientation) -> Option<Arc<CompiledGeometry>> {
        self.cache.read().get(&(model.clone(), orientation)).cloned()
    }

    /// Cached geometry, compiling it on a miss. When two threads miss at
    /// once the first insert is kept and both get it.
    pub fn get_or_compile(
        &self,
        model: &ResourceLocation,
        orientation: Orientation,
        compile: impl FnOnce() -> CompiledGeometry,
    ) -> Arc<CompiledGeometry> {
        if let Some(geometry) = self.get(model, orientation) {
            return geometry;
        }
        let geometry = Arc::new(compile());
        self.cache
            .write()
            .entry((model.clone(), orientation))
            .or_insert(geometry)
            .clone()
    }
}

/// A wrapper turned into geometry.
struct PlacedModel {
    geometry: Arc<CompiledGeometry>,
    particle: ResourceLocation,
    weight: u32,
}

/// Builds [`BlockStateModel`]s from blockstate documents.
pub struct StateAssembler<'a> {
    models: &'a ModelResolver,
    source: &'a ModelSource<'a>,
    atlas: &'a TextureAtlas,
    cache: &'a GeometryCache,
}

impl<'a> StateAssembler<'a> {
    pub fn new(
        models: &'a ModelResolver,
        source: &'a ModelSource<'a>,
        atlas: &'a TextureAtlas,
        cache: &'a GeometryCache,
    ) -> Self {
        Self {
            models,
            source,
            atlas,
            cache,
        }
    }

    /// The model a wrapper names. Bare ids such as `stone` are retried as
    /// `block/stone`; a wrapper naming neither is skipped.
    fn wrapper_model(&self, wrapper: &WrapperDocument) -> Option<(ResourceLocation, Arc<ResolvedModel>)> {
        let id = if self.source.contains(&wrapper.model) {
            wrapper.model.clone()
        } else {
            let fallback = wrapper.model.with_path(format!("block/{}", wrapper.model.path));
            if !self.source.contains(&fallback) {
                log::warn!("Block model {} not found, skipping", wrapper.model);
                return None;
            }
            fallback
        };

        let model = self.models.load(&id, self.source);
        Some((id, model))
    }

    fn place(&self, wrapper: &WrapperDocument) -> Option<PlacedModel> {
        let (id, resolved) = self.wrapper_model(wrapper)?;
        let orientation = wrapper.orientation();
        let geometry = self
            .cache
            .get_or_compile(&id, orientation, || compile(&resolved.model, orientation, self.atlas));

        Some(PlacedModel {
            geometry,
            particle: resolved.model.resolve_texture(PARTICLE_SLOT),
            weight: wrapper.weight,
        })
    }

    /// Build the models of every state of `block`.
    pub fn assemble(
        &self,
        block: &ResourceLocation,
        document: &BlockStateDocument,
        palette: &dyn BlockStatePalette,
    ) -> Vec<(u32, BlockStateModel)> {
        let render_type = palette.render_type(block);
        let offset_type = palette.offset_type(block);

        let shaped: Vec<(u32, Vec<StateGeometry>, ResourceLocation)> = match document {
            BlockStateDocument::Variants(variants) => self.assemble_variants(block, variants, palette),
            BlockStateDocument::Multipart(parts) => self.assemble_multipart(block, parts, palette),
        };

        shaped
            .into_iter()
            .map(|(state, geometries, particle_texture)| {
                (
                    state,
                    BlockStateModel {
                        geometries,
                        render_type,
                        offset_type,
                        particle_texture,
                    },
                )
            })
            .collect()
    }

    fn assemble_variants(
        &self,
        block: &ResourceLocation,
        variants: &[(String, Vec<WrapperDocument>)],
        palette: &dyn BlockStatePalette,
    ) -> Vec<(u32, Vec<StateGeometry>, ResourceLocation)> {
        let mut compiled: Vec<(StatePredicate, Vec<StateGeometry>, ResourceLocation)> = variants
            .iter()
            .map(|(key, wrappers)| {
                let placed: Vec<PlacedModel> = wrappers.iter().filter_map(|w| self.place(w)).collect();
                let particle = placed
                    .last()
                    .map(|p| p.particle.clone())
                    .unwrap_or_else(ResourceLocation::missing_texture);
                let geometries = placed
                    .into_iter()
                    .map(|p| StateGeometry {
                        parts: vec![p.geometry],
                        weight: p.weight,
                    })
                    .collect();
                (StatePredicate::from_variant_key(key), geometries, particle)
            })
            .collect();

        // Most specific key first, so "a=1,b=2" beats an earlier "a=1" and
        // "a=1" beats "". Stable: equally specific keys keep document order.
        compiled.sort_by_key(|(predicate, _, _)| std::cmp::Reverse(predicate.condition_count()));

        let mut states = Vec::new();
        for state in palette.state_ids(block) {
            let Some(properties) = palette.properties(state) else {
                continue;
            };
            match compiled.iter().find(|(predicate, _, _)| predicate.check(properties)) {
                Some((_, geometries, particle)) => states.push((state, geometries.clone(), particle.clone())),
                None => log::debug!("No variant of {} matches state {}", block, state),
            }
        }
        states
    }

    fn assemble_multipart(
        &self,
        block: &ResourceLocation,
        parts: &[MultipartDocument],
        palette: &dyn BlockStatePalette,
    ) -> Vec<(u32, Vec<StateGeometry>, ResourceLocation)> {
        let compiled: Vec<(StatePredicate, PlacedModel)> = parts
            .iter()
            .filter_map(|part| {
                let predicate = part
                    .when
                    .as_ref()
                    .map_or(StatePredicate::Always, StatePredicate::from_when);
                self.place(&part.apply).map(|placed| (predicate, placed))
            })
            .collect();

        let particle = compiled
            .last()
            .map(|(_, p)| p.particle.clone())
            .unwrap_or_else(ResourceLocation::missing_texture);

        palette
            .state_ids(block)
            .into_iter()
            .filter_map(|state| {
                let properties = palette.properties(state)?;
                let parts = compiled
                    .iter()
                    .filter(|(predicate, _)| predicate.check(properties))
                    .map(|(_, placed)| placed.geometry.clone())
                    .collect();
                Some((state, vec![StateGeometry { parts, weight: 1 }], particle.clone()))
            })
            .collect()
    }
}
