//! Resource pack discovery from directories.
//!
//! Walks `assets/<namespace>/…` and records where every asset lives. No
//! file content is read here; documents are parsed lazily by the resolvers.

use super::FileTables;
use crate::error::{CompileError, Result};
use crate::types::ResourceLocation;
use std::path::{Path, PathBuf};

/// Add every asset of the pack rooted at `root` to the tables.
///
/// Packs gathered later override entries from earlier ones.
pub fn gather_pack_directory<P: AsRef<Path>>(root: P, tables: &mut FileTables) -> Result<()> {
    let root = root.as_ref();

    let assets_path = root.join("assets");
    if !assets_path.is_dir() {
        return Err(CompileError::InvalidResourcePack(format!(
            "No assets directory found in {}",
            root.display()
        )));
    }

    for namespace_entry in std::fs::read_dir(&assets_path)? {
        let namespace_entry = namespace_entry?;
        if !namespace_entry.file_type()?.is_dir() {
            continue;
        }

        let namespace = namespace_entry.file_name().to_string_lossy().to_string();
        let namespace_path = namespace_entry.path();

        let blockstates_path = namespace_path.join("blockstates");
        if blockstates_path.is_dir() {
            collect_files(&blockstates_path, &blockstates_path, ".json", &mut |id, path| {
                tables
                    .blockstates
                    .insert(ResourceLocation::new(&namespace, id), path);
            })?;
        }

        let models_path = namespace_path.join("models");
        if models_path.is_dir() {
            collect_files(&models_path, &models_path, ".json", &mut |id, path| {
                let location = ResourceLocation::new(&namespace, id);
                if location.path.starts_with("item/") {
                    tables.item_models.insert(location, path);
                } else {
                    tables.block_models.insert(location, path);
                }
            })?;
        }

        let textures_path = namespace_path.join("textures");
        if textures_path.is_dir() {
            collect_files(&textures_path, &textures_path, ".png", &mut |id, path| {
                tables.textures.insert(ResourceLocation::new(&namespace, id), path);
            })?;
        }
    }

    log::info!(
        "Gathered {}: {} textures, {} block models, {} item models, {} blockstates",
        root.display(),
        tables.textures.len(),
        tables.block_models.len(),
        tables.item_models.len(),
        tables.blockstates.len()
    );

    Ok(())
}

/// Recursively visit files ending in `suffix`, reporting their id relative
/// to `base` with the suffix stripped.
fn collect_files<F>(base: &Path, dir: &Path, suffix: &str, handler: &mut F) -> Result<()>
where
    F: FnMut(&str, PathBuf),
{
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(base, &path, suffix, handler)?;
            continue;
        }

        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if let Some(id) = relative.strip_suffix(suffix) {
            handler(id, path.clone());
        }
    }
    Ok(())
}
