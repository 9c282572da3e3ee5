//! Resource pack inputs.
//!
//! This module holds the flat identifier → file tables the compiler reads
//! from, the [`AssetSource`] seam used to read those files, and the typed
//! views of the documents themselves (models, blockstates, textures).

pub mod blockstate;
pub mod loader;
pub mod model;
pub mod texture;

pub use blockstate::{BlockStateDocument, MultipartDocument, WrapperDocument};
pub use model::{
    DisplayPosition, DisplayTransform, Element, Face, Model, ModelDocument, TextureReference,
};
pub use texture::{AnimationInfo, TextureData};

use crate::error::{CompileError, Result};
use crate::types::ResourceLocation;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identifier → file path lookup per asset category.
#[derive(Debug, Default, Clone)]
pub struct FileTables {
    /// Texture id (e.g. `minecraft:block/stone`) → PNG file.
    pub textures: HashMap<ResourceLocation, PathBuf>,
    /// Block model id (e.g. `minecraft:block/stone`) → JSON file.
    pub block_models: HashMap<ResourceLocation, PathBuf>,
    /// Item model id (e.g. `minecraft:item/apple`) → JSON file.
    pub item_models: HashMap<ResourceLocation, PathBuf>,
    /// Block id (e.g. `minecraft:stone`) → blockstate JSON file.
    pub blockstates: HashMap<ResourceLocation, PathBuf>,
}

impl FileTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.block_models.clear();
        self.item_models.clear();
        self.blockstates.clear();
    }

    /// Path of the animation sidecar for a texture file.
    pub fn mcmeta_path(texture_path: &Path) -> PathBuf {
        let mut name = texture_path.as_os_str().to_os_string();
        name.push(".mcmeta");
        PathBuf::from(name)
    }
}

/// Read access to the files named by [`FileTables`].
pub trait AssetSource: Send + Sync {
    /// Read a whole file.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Whether the file exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read and parse a JSON document.
    fn read_document(&self, path: &Path) -> Result<serde_json::Value> {
        let bytes = self.read_bytes(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Reads assets straight from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssetSource;

impl AssetSource for FsAssetSource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Serves assets from memory, keyed by the same paths the tables hold.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetSource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }
}

impl AssetSource for MemoryAssetSource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CompileError::ResourceNotFound(path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcmeta_path() {
        let path = FileTables::mcmeta_path(Path::new("textures/block/fire.png"));
        assert_eq!(path, PathBuf::from("textures/block/fire.png.mcmeta"));
    }

    #[test]
    fn test_memory_source_reads_documents() {
        let mut source = MemoryAssetSource::new();
        source.insert("a.json", r#"{"parent": "block/cube"}"#);
        let doc = source.read_document(Path::new("a.json")).unwrap();
        assert_eq!(doc["parent"], "block/cube");
        assert!(source.exists(Path::new("a.json")));
        assert!(source.read_bytes(Path::new("b.json")).is_err());
    }
}
