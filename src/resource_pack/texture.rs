//! Texture loading and handling.

use crate::error::Result;
use image::{imageops, Rgba, RgbaImage};
use serde::Deserialize;

/// Edge length of the built-in placeholder textures.
pub const PLACEHOLDER_SIZE: u32 = 16;

/// Seconds per game tick, the unit of `frametime`.
const TICK_SECONDS: f32 = 0.05;

/// Animation of a texture whose frames were rearranged into a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationInfo {
    pub frame_count: u32,
    pub frames_per_row: u32,
    /// Seconds each frame is shown.
    pub frame_interval: f32,
    pub interpolate: bool,
}

impl AnimationInfo {
    /// Number of grid rows the frames occupy.
    pub fn rows(&self) -> u32 {
        self.frame_count.div_ceil(self.frames_per_row)
    }
}

/// A decoded texture, ready for packing.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub image: RgbaImage,
    /// Present when the image holds an animation grid.
    pub animation: Option<AnimationInfo>,
}

impl TextureData {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            animation: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Solid white.
    pub fn blank() -> Self {
        Self::new(RgbaImage::from_pixel(
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
            Rgba([255, 255, 255, 255]),
        ))
    }

    /// Fully transparent.
    pub fn empty() -> Self {
        Self::new(RgbaImage::from_pixel(
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
            Rgba([0, 0, 0, 0]),
        ))
    }

    /// Magenta and black quadrants.
    pub fn missing() -> Self {
        let half = PLACEHOLDER_SIZE / 2;
        Self::new(RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
            if (x < half) == (y < half) {
                Rgba([255, 0, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    /// Decode a PNG, applying its `.mcmeta` animation block if given.
    ///
    /// A malformed sidecar only loses the animation, never the texture.
    pub fn decode(png: &[u8], mcmeta: Option<&[u8]>) -> Result<Self> {
        let image = image::load_from_memory(png)?.to_rgba8();

        let Some(meta) = mcmeta else {
            return Ok(Self::new(image));
        };

        match serde_json::from_slice::<McMeta>(meta) {
            Ok(McMeta {
                animation: Some(animation),
            }) => Ok(animate(image, &animation)),
            Ok(_) => Ok(Self::new(image)),
            Err(e) => {
                log::warn!("Invalid animation metadata, treating texture as static: {}", e);
                Ok(Self::new(image))
            }
        }
    }

    /// Scale down to fit within `max_size`, keeping the aspect ratio.
    pub fn fit_within(&self, max_size: u32) -> Self {
        let (w, h) = (self.width(), self.height());
        if w <= max_size && h <= max_size {
            return self.clone();
        }
        let scale = max_size as f32 / w.max(h) as f32;
        let nw = ((w as f32 * scale) as u32).max(1);
        let nh = ((h as f32 * scale) as u32).max(1);
        Self {
            image: imageops::resize(&self.image, nw, nh, imageops::FilterType::Nearest),
            animation: self.animation,
        }
    }
}

#[derive(Debug, Deserialize)]
struct McMeta {
    #[serde(default)]
    animation: Option<AnimationSection>,
}

#[derive(Debug, Deserialize)]
struct AnimationSection {
    #[serde(default)]
    frames: Option<Vec<FrameEntry>>,
    #[serde(default)]
    frametime: Option<f32>,
    #[serde(default)]
    interpolate: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameEntry {
    Index(u32),
    Timed { index: u32 },
}

impl FrameEntry {
    fn index(&self) -> u32 {
        match self {
            FrameEntry::Index(index) | FrameEntry::Timed { index } => *index,
        }
    }
}

fn animate(strip: RgbaImage, section: &AnimationSection) -> TextureData {
    let frame_size = strip.width();
    let sprite_count = if frame_size == 0 { 0 } else { strip.height() / frame_size };

    let frames: Vec<u32> = match &section.frames {
        Some(entries) => entries
            .iter()
            .map(FrameEntry::index)
            .filter(|i| {
                let valid = *i < sprite_count;
                if !valid {
                    log::warn!("Animation frame {} out of range ({} sprites)", i, sprite_count);
                }
                valid
            })
            .collect(),
        None => (0..sprite_count).collect(),
    };

    if frames.len() <= 1 {
        return TextureData::new(strip);
    }

    let (image, frames_per_row) = arrange_frames(&strip, &frames);
    TextureData {
        image,
        animation: Some(AnimationInfo {
            frame_count: frames.len() as u32,
            frames_per_row,
            frame_interval: section.frametime.unwrap_or(1.0) * TICK_SECONDS,
            interpolate: section.interpolate,
        }),
    }
}

/// Rearrange a vertical filmstrip into a near-square grid.
///
/// Output frame `i` is sprite `frames[i]` of the strip, placed at column
/// `i % per_row`, row `i / per_row`. Returns the grid and `per_row`.
pub fn arrange_frames(strip: &RgbaImage, frames: &[u32]) -> (RgbaImage, u32) {
    let frame_size = strip.width();
    let count = frames.len() as u32;
    let per_row = (count as f32).sqrt().ceil().max(1.0) as u32;
    let rows = count.div_ceil(per_row);

    let mut grid = RgbaImage::new(per_row * frame_size, rows * frame_size);
    for (i, sprite) in frames.iter().enumerate() {
        let i = i as u32;
        let frame = imageops::crop_imm(strip, 0, sprite * frame_size, frame_size, frame_size);
        imageops::replace(
            &mut grid,
            &*frame,
            ((i % per_row) * frame_size) as i64,
            ((i / per_row) * frame_size) as i64,
        );
    }
    (grid, per_row)
}
