//! The load pipeline and its owned state.
//!
//! A [`ResourceManager`] holds everything one load cycle produces: the
//! resolved models, the atlas, compiled geometry and the per-id state and
//! item tables. Nothing here is global; dropping or clearing the manager
//! throws it all away, and a reload is just another [`ResourceManager::build`].

use crate::atlas::{AtlasBuilder, Colormap, Colormaps, TextureAtlas, DEFAULT_ATLAS_SIZE, DEFAULT_FILL_RATIO};
use crate::error::{CompileError, Result};
use crate::mesher::item::{DEFAULT_PRECISION, DEFAULT_THICKNESS};
use crate::mesher::GeneratedElementCache;
use crate::resolver::{
    BlockStateModel, GeometryCache, ItemAssembler, ItemModel, ModelResolver, ModelSource, ResolvedModel,
    StateAssembler,
};
use crate::resource_pack::loader::gather_pack_directory;
use crate::resource_pack::{AssetSource, BlockStateDocument, FileTables, FsAssetSource, TextureData};
use crate::types::{BlockStatePalette, ItemPalette, ResourceLocation};
use crate::upload::UploadQueue;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Atlas page edge length in pixels.
    pub atlas_size: u32,
    /// Fraction of a page filled before starting the next one.
    pub atlas_fill_ratio: f32,
    /// Mip levels generated per page, 0 to disable.
    pub mipmap_levels: u32,
    /// Pixel columns of generated item sprites.
    pub generated_item_precision: u32,
    /// Thickness of generated item sprites in model units.
    pub generated_item_thickness: u32,
    /// Textures packed even when no model references them.
    pub extra_textures: Vec<ResourceLocation>,
    /// Resolve and assemble in parallel.
    pub parallel: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            atlas_size: DEFAULT_ATLAS_SIZE,
            atlas_fill_ratio: DEFAULT_FILL_RATIO,
            mipmap_levels: 4,
            generated_item_precision: DEFAULT_PRECISION,
            generated_item_thickness: DEFAULT_THICKNESS,
            extra_textures: Vec::new(),
            parallel: true,
        }
    }
}

impl CompilerConfig {
    pub fn with_atlas_size(mut self, size: u32) -> Self {
        self.atlas_size = size;
        self
    }

    pub fn with_fill_ratio(mut self, ratio: f32) -> Self {
        self.atlas_fill_ratio = ratio;
        self
    }

    pub fn with_mipmaps(mut self, levels: u32) -> Self {
        self.mipmap_levels = levels;
        self
    }

    pub fn with_generated_items(mut self, precision: u32, thickness: u32) -> Self {
        self.generated_item_precision = precision;
        self.generated_item_thickness = thickness;
        self
    }

    /// Also pack these textures, e.g. fluids and block breaking overlays.
    pub fn with_extra_textures(mut self, textures: impl IntoIterator<Item = ResourceLocation>) -> Self {
        self.extra_textures.extend(textures);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

fn map_all<T, R, F>(parallel: bool, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Owns one load cycle's worth of compiled resources.
pub struct ResourceManager {
    config: CompilerConfig,
    files: FileTables,
    source: Box<dyn AssetSource>,
    block_models: ModelResolver,
    item_models: ModelResolver,
    geometry: GeometryCache,
    generated: GeneratedElementCache,
    atlas: Arc<TextureAtlas>,
    colormaps: Colormaps,
    states: HashMap<u32, BlockStateModel>,
    items: HashMap<u32, ItemModel>,
    loaded: bool,
}

impl ResourceManager {
    /// A manager reading packs from the file system.
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_source(config, FsAssetSource)
    }

    /// A manager reading through a custom source. Paths in the file tables
    /// are interpreted by that source.
    pub fn with_source(config: CompilerConfig, source: impl AssetSource + 'static) -> Self {
        Self {
            config,
            files: FileTables::new(),
            source: Box::new(source),
            block_models: ModelResolver::new(),
            item_models: ModelResolver::new(),
            geometry: GeometryCache::new(),
            generated: GeneratedElementCache::new(),
            atlas: Arc::new(TextureAtlas::empty()),
            colormaps: Colormaps::default(),
            states: HashMap::new(),
            items: HashMap::new(),
            loaded: false,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn files(&self) -> &FileTables {
        &self.files
    }

    /// For hosts that enumerate assets themselves.
    pub fn files_mut(&mut self) -> &mut FileTables {
        &mut self.files
    }

    /// Register a pack directory. Later packs override earlier ones.
    pub fn add_pack<P: AsRef<Path>>(&mut self, root: P) -> Result<()> {
        gather_pack_directory(root, &mut self.files)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drop everything a build produced. The file tables are kept.
    pub fn clear(&mut self) {
        self.loaded = false;
        self.block_models.clear();
        self.item_models.clear();
        self.geometry.clear();
        self.generated.clear();
        self.atlas = Arc::new(TextureAtlas::empty());
        self.colormaps = Colormaps::default();
        self.states.clear();
        self.items.clear();
    }

    /// Forget every pack, gather `packs` again and build.
    pub fn rebuild<P: AsRef<Path>>(
        &mut self,
        packs: &[P],
        palette: &dyn BlockStatePalette,
        items: &dyn ItemPalette,
        uploads: &UploadQueue,
    ) -> Result<()> {
        self.clear();
        self.files.clear();
        for pack in packs {
            self.add_pack(pack)?;
        }
        self.build(palette, items, uploads)
    }

    /// Run the whole pipeline over the registered packs.
    ///
    /// Per-document problems are logged and skipped. An error means the
    /// atlas could not be built or uploaded; the manager is left not
    /// loaded.
    pub fn build(
        &mut self,
        palette: &dyn BlockStatePalette,
        items: &dyn ItemPalette,
        uploads: &UploadQueue,
    ) -> Result<()> {
        self.clear();
        let parallel = self.config.parallel;

        log::info!("Resolving models");
        let block_source = ModelSource::blocks(&self.files, self.source.as_ref());
        let item_source = ModelSource::items(&self.files, self.source.as_ref());

        let block_ids: Vec<ResourceLocation> = self.files.block_models.keys().cloned().collect();
        let item_ids: Vec<ResourceLocation> = self.files.item_models.keys().cloned().collect();
        let mut resolved: Vec<Arc<ResolvedModel>> =
            map_all(parallel, &block_ids, |id| self.block_models.load(id, &block_source));
        resolved.extend(map_all(parallel, &item_ids, |id| {
            self.item_models.load(id, &item_source)
        }));

        let mut texture_ids: BTreeSet<ResourceLocation> = resolved
            .iter()
            .flat_map(|model| model.model.texture_ids())
            .collect();
        texture_ids.extend(self.config.extra_textures.iter().cloned());

        log::info!("Loading {} textures", texture_ids.len());
        let texture_ids: Vec<ResourceLocation> = texture_ids.into_iter().collect();
        let decoded: Vec<Option<(ResourceLocation, TextureData)>> = map_all(parallel, &texture_ids, |id| {
            self.load_texture(id).map(|texture| (id.clone(), texture))
        });

        let mut builder = AtlasBuilder::new(self.config.atlas_size, self.config.atlas_fill_ratio)
            .with_mipmaps(self.config.mipmap_levels);
        for (id, texture) in decoded.into_iter().flatten() {
            builder.add_texture(id, texture);
        }
        let atlas = Arc::new(builder.build()?);
        log::info!(
            "Packed {} textures into {} atlas pages",
            atlas.len(),
            atlas.page_count()
        );

        uploads.upload(atlas.clone())?;
        let colormaps = self.load_colormaps();

        log::info!("Building block state geometries");
        let states = {
            let assembler = StateAssembler::new(&self.block_models, &block_source, &atlas, &self.geometry);
            let blocks = palette.block_ids();
            let per_block = map_all(parallel, &blocks, |block| {
                let Some(document) = self.read_blockstate(block) else {
                    return Vec::new();
                };
                assembler.assemble(block, &document, palette)
            });

            let mut states = HashMap::new();
            for (state, model) in per_block.into_iter().flatten() {
                if states.contains_key(&state) {
                    log::warn!("Block state {} assigned twice, keeping the first", state);
                    continue;
                }
                states.insert(state, model);
            }
            states
        };

        log::info!("Building item geometries");
        let item_table: HashMap<u32, ItemModel> = {
            let assembler = ItemAssembler::new(&self.item_models, &item_source, &atlas, &self.generated)
                .with_blocks(palette)
                .with_generated_shape(
                    self.config.generated_item_precision,
                    self.config.generated_item_thickness,
                );
            let entries = items.items();
            map_all(parallel, &entries, |(num_id, item)| {
                assembler
                    .assemble(item, items.is_tintable(item))
                    .map(|model| (*num_id, model))
            })
            .into_iter()
            .flatten()
            .collect()
        };

        self.atlas = atlas;
        self.colormaps = colormaps;
        self.states = states;
        self.items = item_table;
        self.loaded = true;
        log::info!(
            "Resources loaded: {} block states, {} items",
            self.states.len(),
            self.items.len()
        );
        Ok(())
    }

    /// Decode one texture and its animation sidecar. Missing or broken
    /// files are logged and left to the missing-texture sentinel.
    fn load_texture(&self, id: &ResourceLocation) -> Option<TextureData> {
        let Some(path) = self.files.textures.get(id) else {
            log::warn!("Texture {} not found", id);
            return None;
        };

        let mcmeta_path = FileTables::mcmeta_path(path);
        let mcmeta = if self.source.exists(&mcmeta_path) {
            match self.source.read_bytes(&mcmeta_path) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    log::warn!("Failed to read animation of {}: {}", id, e);
                    None
                }
            }
        } else {
            None
        };

        let decoded = self
            .source
            .read_bytes(path)
            .and_then(|png| TextureData::decode(&png, mcmeta.as_deref()));
        match decoded {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Failed to load texture {}: {}", id, e);
                None
            }
        }
    }

    fn load_colormap(&self, id: &ResourceLocation) -> Option<Colormap> {
        let path = self.files.textures.get(id)?;
        match self.source.read_bytes(path).and_then(|png| Colormap::decode(&png)) {
            Ok(colormap) => Some(colormap),
            Err(e) => {
                log::warn!("Failed to load colormap {}: {}", id, e);
                None
            }
        }
    }

    fn load_colormaps(&self) -> Colormaps {
        Colormaps {
            grass: self.load_colormap(&Colormaps::grass_id()),
            foliage: self.load_colormap(&Colormaps::foliage_id()),
        }
    }

    fn read_blockstate(&self, block: &ResourceLocation) -> Option<BlockStateDocument> {
        let Some(path) = self.files.blockstates.get(block) else {
            log::warn!("Block state model definition not assigned for {}", block);
            return None;
        };

        let parsed = self
            .source
            .read_document(path)
            .and_then(|value| BlockStateDocument::from_value(&value, &path.display().to_string()));
        match parsed {
            Ok(document) => Some(document),
            Err(e) => {
                log::warn!("Invalid block state file for {}: {}", block, e);
                None
            }
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(CompileError::NotLoaded)
        }
    }

    /// Model of a numeric block state. `Ok(None)` for states the packs do
    /// not cover.
    pub fn state_model(&self, state_id: u32) -> Result<Option<&BlockStateModel>> {
        self.ensure_loaded()?;
        Ok(self.states.get(&state_id))
    }

    /// Model of a numeric item id.
    pub fn item_model(&self, item_id: u32) -> Result<Option<&ItemModel>> {
        self.ensure_loaded()?;
        Ok(self.items.get(&item_id))
    }

    pub fn state_models(&self) -> Result<&HashMap<u32, BlockStateModel>> {
        self.ensure_loaded()?;
        Ok(&self.states)
    }

    pub fn item_models(&self) -> Result<&HashMap<u32, ItemModel>> {
        self.ensure_loaded()?;
        Ok(&self.items)
    }

    pub fn atlas(&self) -> Result<&Arc<TextureAtlas>> {
        self.ensure_loaded()?;
        Ok(&self.atlas)
    }

    pub fn colormaps(&self) -> Result<&Colormaps> {
        self.ensure_loaded()?;
        Ok(&self.colormaps)
    }

    /// Number of distinct (model, orientation) geometries compiled.
    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }
}
