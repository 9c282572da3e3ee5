//! Texture atlas: packed pages plus per-texture UV lookup.
//!
//! Pages are fixed-size square images addressed by index. UVs handed out by
//! [`TextureAtlas::get_uvs`] carry the page index in their third component,
//! so a page array can be sampled without any other per-vertex data.

pub mod builder;
pub mod colormap;
pub mod mipmap;

pub use builder::AtlasBuilder;
pub use colormap::{Colormap, Colormaps};

use crate::error::{CompileError, Result};
use crate::resource_pack::AnimationInfo;
use crate::types::ResourceLocation;
use image::{ImageEncoder, RgbaImage};
use std::collections::HashMap;

/// Default page edge length in pixels.
pub const DEFAULT_ATLAS_SIZE: u32 = 2048;

/// Fraction of a page's area filled before it is sealed.
pub const DEFAULT_FILL_RATIO: f32 = 0.97;

/// Per-vertex animation descriptor:
/// `[frame_count, frame_interval, frame_size_u, frames_per_row]`.
/// All zero for static textures.
pub type UvAnimation = [f32; 4];

/// A rectangle in normalized page coordinates, v pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AtlasRect {
    pub const UNIT: AtlasRect = AtlasRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Map a local coordinate (0-1) into the page.
    pub fn transform_uv(&self, u: f32, v: f32) -> [f32; 2] {
        [self.x + u * self.width, self.y + v * self.height]
    }
}

/// Where one texture lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasEntry {
    pub page: u32,
    /// The whole packed region; for animations, the full frame grid.
    pub bounds: AtlasRect,
    pub animation: Option<AnimationInfo>,
}

impl AtlasEntry {
    /// Region of the first animation frame, or the whole bounds.
    pub fn first_frame(&self) -> AtlasRect {
        match &self.animation {
            Some(anim) => AtlasRect {
                x: self.bounds.x,
                y: self.bounds.y,
                width: self.bounds.width / anim.frames_per_row as f32,
                height: self.bounds.height / anim.rows() as f32,
            },
            None => self.bounds,
        }
    }

    pub fn uv_animation(&self) -> UvAnimation {
        match &self.animation {
            Some(anim) => [
                anim.frame_count as f32,
                anim.frame_interval,
                self.bounds.width / anim.frames_per_row as f32,
                anim.frames_per_row as f32,
            ],
            None => [0.0; 4],
        }
    }
}

/// One page and its mip chain (level 1 onwards).
#[derive(Debug, Clone)]
pub struct AtlasPage {
    pub image: RgbaImage,
    pub mips: Vec<RgbaImage>,
}

/// A built texture atlas. Rebuilt wholesale on every load.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    size: u32,
    pages: Vec<AtlasPage>,
    entries: HashMap<ResourceLocation, AtlasEntry>,
}

impl TextureAtlas {
    pub(crate) fn from_parts(
        size: u32,
        pages: Vec<AtlasPage>,
        entries: HashMap<ResourceLocation, AtlasEntry>,
    ) -> Self {
        Self {
            size,
            pages,
            entries,
        }
    }

    /// An atlas with no pages; every lookup yields the unit rectangle of
    /// page 0.
    pub fn empty() -> Self {
        Self {
            size: 0,
            pages: Vec::new(),
            entries: HashMap::new(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &ResourceLocation) -> bool {
        self.entries.contains_key(id)
    }

    /// Entry of a texture, falling back to the missing-texture entry.
    pub fn entry(&self, id: &ResourceLocation) -> AtlasEntry {
        if let Some(entry) = self.entries.get(id) {
            return *entry;
        }
        log::debug!("Texture {} is not in the atlas", id);
        self.entries
            .get(&ResourceLocation::missing_texture())
            .copied()
            .unwrap_or(AtlasEntry {
                page: 0,
                bounds: AtlasRect::UNIT,
                animation: None,
            })
    }

    /// Atlas UVs of a sub-rectangle of a texture.
    ///
    /// `part` is `[u1, v1, u2, v2]` in 0-16 texture units, measured on one
    /// animation frame. The four results are ordered `(u1,v1) (u2,v1)
    /// (u1,v2) (u2,v2)` before rotation; `area_rotation` turns the sampled
    /// area by quarter turns so corner (0,0) lands on (0,0), (0,1), (1,1)
    /// or (1,0).
    pub fn get_uvs(
        &self,
        id: &ResourceLocation,
        part: [f32; 4],
        area_rotation: u8,
    ) -> ([[f32; 3]; 4], UvAnimation) {
        let entry = self.entry(id);
        let frame = entry.first_frame();
        let layer = entry.page as f32;

        let [u1, v1, u2, v2] = part.map(|c| c / 16.0);
        let corners = [[u1, v1], [u2, v1], [u1, v2], [u2, v2]];

        let uvs = corners.map(|[u, v]| {
            let [u, v] = rotate_area(u, v, area_rotation);
            let [u, v] = frame.transform_uv(u, v);
            [u, v, layer]
        });

        (uvs, entry.uv_animation())
    }

    /// Encode one page as PNG.
    pub fn to_png(&self, page: usize) -> Result<Vec<u8>> {
        let page = self
            .pages
            .get(page)
            .ok_or_else(|| CompileError::AtlasBuild(format!("No atlas page {}", page)))?;

        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(
                page.image.as_raw(),
                page.image.width(),
                page.image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| CompileError::AtlasBuild(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes)
    }
}

/// Turn a local coordinate by quarter turns within the unit square.
pub fn rotate_area(u: f32, v: f32, steps: u8) -> [f32; 2] {
    let (mut u, mut v) = (u, v);
    for _ in 0..steps % 4 {
        (u, v) = (v, 1.0 - u);
    }
    [u, v]
}
