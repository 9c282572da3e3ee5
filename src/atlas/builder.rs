//! Texture atlas builder using greedy paging and shelf packing.

use super::mipmap;
use super::{AtlasEntry, AtlasPage, AtlasRect, TextureAtlas, DEFAULT_ATLAS_SIZE, DEFAULT_FILL_RATIO};
use crate::error::{CompileError, Result};
use crate::resource_pack::TextureData;
use crate::types::ResourceLocation;
use image::{imageops, RgbaImage};
use std::collections::HashMap;

/// Builder for creating texture atlases.
///
/// The three reserved textures (blank, empty, missing) are always packed
/// first, followed by added textures in insertion order.
pub struct AtlasBuilder {
    size: u32,
    fill_ratio: f32,
    mipmap_levels: u32,
    textures: Vec<(ResourceLocation, TextureData)>,
    slots: HashMap<ResourceLocation, usize>,
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ATLAS_SIZE, DEFAULT_FILL_RATIO)
    }
}

impl AtlasBuilder {
    /// Create a new atlas builder.
    pub fn new(size: u32, fill_ratio: f32) -> Self {
        let textures = vec![
            (ResourceLocation::blank_texture(), TextureData::blank()),
            (ResourceLocation::empty_texture(), TextureData::empty()),
            (ResourceLocation::missing_texture(), TextureData::missing()),
        ];
        let slots = textures
            .iter()
            .enumerate()
            .map(|(slot, (id, _))| (id.clone(), slot))
            .collect();
        Self {
            size: size.max(1),
            fill_ratio,
            mipmap_levels: 0,
            textures,
            slots,
        }
    }

    /// Number of mip levels generated per page, 0 for none.
    pub fn with_mipmaps(mut self, levels: u32) -> Self {
        self.mipmap_levels = levels;
        self
    }

    /// Add a texture to the atlas. Re-adding an id replaces the texture.
    pub fn add_texture(&mut self, id: ResourceLocation, texture: TextureData) {
        match self.slots.get(&id) {
            Some(&slot) => {
                log::warn!("Texture {} added twice, keeping the later one", id);
                self.textures[slot].1 = texture;
            }
            None => {
                self.slots.insert(id.clone(), self.textures.len());
                self.textures.push((id, texture));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Pack everything into pages.
    pub fn build(self) -> Result<TextureAtlas> {
        let size = self.size;
        let max_volume = (size as f64 * size as f64 * self.fill_ratio as f64) as u64;

        let mut textures = self.textures;
        let mut pages = Vec::new();
        let mut entries = HashMap::new();
        let mut start = 0;

        while start < textures.len() {
            // Take textures while the projected fill stays under the threshold.
            let mut end = start;
            let mut volume = 0u64;
            while end < textures.len() {
                volume += textures[end].1.area();
                if volume >= max_volume {
                    break;
                }
                end += 1;
            }

            if end == start {
                // Too large to share a page; shrink it onto its own.
                let (id, texture) = &textures[start];
                if texture.width() > size || texture.height() > size {
                    log::warn!(
                        "Texture {} ({}x{}) exceeds the atlas page, scaling down",
                        id,
                        texture.width(),
                        texture.height()
                    );
                }
                textures[start].1 = textures[start].1.fit_within(size);
                end = start + 1;
            }

            // Whatever the packer cannot place moves on to the next page.
            let placements = loop {
                let group: Vec<&TextureData> = textures[start..end].iter().map(|(_, t)| t).collect();
                if let Some(placements) = pack_page(&group, size) {
                    break placements;
                }
                if end - start == 1 {
                    return Err(CompileError::AtlasBuild(format!(
                        "Texture {} does not fit a {}x{} page",
                        textures[start].0, size, size
                    )));
                }
                end -= 1;
            };

            let page_index = pages.len() as u32;
            let mut image = RgbaImage::new(size, size);
            for (offset, (x, y)) in placements.iter().enumerate() {
                let (id, texture) = &textures[start + offset];
                imageops::replace(&mut image, &texture.image, *x as i64, *y as i64);

                let bounds = AtlasRect {
                    x: *x as f32 / size as f32,
                    y: *y as f32 / size as f32,
                    width: texture.width() as f32 / size as f32,
                    height: texture.height() as f32 / size as f32,
                };
                entries.insert(
                    id.clone(),
                    AtlasEntry {
                        page: page_index,
                        bounds,
                        animation: texture.animation,
                    },
                );
            }

            let mips = mipmap::generate_chain(&image, self.mipmap_levels);
            pages.push(AtlasPage { image, mips });

            log::debug!(
                "Atlas page {} holds {} textures",
                page_index,
                end - start
            );
            start = end;
        }

        log::info!(
            "Built atlas: {} textures on {} page(s) of {}x{}",
            entries.len(),
            pages.len(),
            size,
            size
        );

        Ok(TextureAtlas::from_parts(size, pages, entries))
    }
}

/// Place textures on one page, returning the top-left corner of each.
///
/// Packs into the smallest power-of-two square that fits, so a sparse last
/// page keeps its textures together in the top-left corner; the caller
/// normalizes against the full page size, which is the same as scaling the
/// rectangles of the smaller square.
fn pack_page(textures: &[&TextureData], max_size: u32) -> Option<Vec<(u32, u32)>> {
    let total_area: u64 = textures.iter().map(|t| t.area()).sum();
    let min_size = (total_area as f64).sqrt().ceil() as u32;

    let mut size = 16u32;
    while size < min_size && size < max_size {
        size *= 2;
    }
    let mut size = size.min(max_size);

    loop {
        if let Some(placements) = try_pack(textures, size) {
            return Some(placements);
        }
        if size >= max_size {
            return None;
        }
        size = (size * 2).min(max_size);
    }
}

/// Shelf packing, tallest textures first.
fn try_pack(textures: &[&TextureData], atlas_size: u32) -> Option<Vec<(u32, u32)>> {
    let mut order: Vec<usize> = (0..textures.len()).collect();
    order.sort_by(|a, b| textures[*b].height().cmp(&textures[*a].height()));

    let mut placements = vec![(0u32, 0u32); textures.len()];
    let mut current_x = 0u32;
    let mut current_y = 0u32;
    let mut row_height = 0u32;

    for index in order {
        let texture = textures[index];
        let (width, height) = (texture.width(), texture.height());

        // Check if we need to start a new row
        if current_x + width > atlas_size {
            current_x = 0;
            current_y += row_height;
            row_height = 0;
        }

        if width > atlas_size || current_y + height > atlas_size {
            return None;
        }

        placements[index] = (current_x, current_y);
        current_x += width;
        row_height = row_height.max(height);
    }

    Some(placements)
}
