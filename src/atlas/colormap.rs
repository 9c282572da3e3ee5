//! Biome colormaps for grass and foliage tinting.

use crate::error::Result;
use crate::types::ResourceLocation;
use image::RgbaImage;

/// A square temperature/downfall lookup image.
#[derive(Debug, Clone)]
pub struct Colormap {
    image: RgbaImage,
}

impl Colormap {
    pub fn new(image: RgbaImage) -> Self {
        if image.width() != image.height() {
            log::warn!(
                "Colormap is not square ({}x{})",
                image.width(),
                image.height()
            );
        }
        Self { image }
    }

    pub fn decode(png: &[u8]) -> Result<Self> {
        Ok(Self::new(image::load_from_memory(png)?.to_rgba8()))
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Colour at a climate point, both inputs clamped to 0-1.
    ///
    /// Downfall is scaled by temperature, so only the lower-left triangle
    /// of the image is ever sampled.
    pub fn sample(&self, temperature: f32, downfall: f32) -> [u8; 3] {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return [255, 255, 255];
        }

        let t = temperature.clamp(0.0, 1.0);
        let d = downfall.clamp(0.0, 1.0) * t;
        let x = ((1.0 - t) * (w - 1) as f32) as u32;
        let y = ((1.0 - d) * (h - 1) as f32) as u32;

        let p = self.image.get_pixel(x.min(w - 1), y.min(h - 1));
        [p[0], p[1], p[2]]
    }

    /// [`Self::sample`] packed as `0xRRGGBB`.
    pub fn sample_rgb(&self, temperature: f32, downfall: f32) -> u32 {
        let [r, g, b] = self.sample(temperature, downfall);
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }
}

/// The colormaps a pack may provide.
#[derive(Debug, Clone, Default)]
pub struct Colormaps {
    pub grass: Option<Colormap>,
    pub foliage: Option<Colormap>,
}

impl Colormaps {
    pub fn grass_id() -> ResourceLocation {
        ResourceLocation::parse("colormap/grass")
    }

    pub fn foliage_id() -> ResourceLocation {
        ResourceLocation::parse("colormap/foliage")
    }
}
