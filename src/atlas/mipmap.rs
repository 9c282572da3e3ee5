//! Cutout-aware mip generation.
//!
//! Colour channels are stored gamma-encoded and averaged in linear space;
//! fully transparent texels are left out of the average entirely so cutout
//! edges do not pick up a dark fringe.

use image::{Rgba, RgbaImage};

/// Convert an sRGB-encoded channel (0-1) to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear channel (0-1) to sRGB encoding.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Blend four texels into one.
///
/// At least three non-transparent sources give an averaged texel, exactly
/// two give one only on even `(x + y)` positions, anything less is
/// transparent.
pub fn blend_texels(texels: [Rgba<u8>; 4], x: u32, y: u32) -> Rgba<u8> {
    let visible: Vec<&Rgba<u8>> = texels.iter().filter(|t| t[3] > 0).collect();

    let keep = match visible.len() {
        3 | 4 => true,
        2 => (x + y) % 2 == 0,
        _ => false,
    };
    if !keep {
        return Rgba([0, 0, 0, 0]);
    }

    let n = visible.len() as f32;
    let mut linear = [0.0f32; 3];
    let mut alpha = 0.0f32;
    for texel in &visible {
        for (c, sum) in linear.iter_mut().enumerate() {
            *sum += srgb_to_linear(texel[c] as f32 / 255.0);
        }
        alpha += texel[3] as f32;
    }

    let encode = |sum: f32| (linear_to_srgb(sum / n) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([
        encode(linear[0]),
        encode(linear[1]),
        encode(linear[2]),
        (alpha / n).round() as u8,
    ])
}

/// Halve an image in both directions (never below 1×1).
pub fn downsample(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));

    RgbaImage::from_fn(nw, nh, |x, y| {
        let sx = (x * 2).min(w - 1);
        let sy = (y * 2).min(h - 1);
        let sx1 = (sx + 1).min(w - 1);
        let sy1 = (sy + 1).min(h - 1);
        blend_texels(
            [
                *src.get_pixel(sx, sy),
                *src.get_pixel(sx1, sy),
                *src.get_pixel(sx, sy1),
                *src.get_pixel(sx1, sy1),
            ],
            x,
            y,
        )
    })
}

/// Mip levels 1..=`levels` of `base`. Stops early at 1×1.
pub fn generate_chain(base: &RgbaImage, levels: u32) -> Vec<RgbaImage> {
    let mut chain: Vec<RgbaImage> = Vec::with_capacity(levels as usize);
    for _ in 0..levels {
        let prev = chain.last().unwrap_or(base);
        if prev.width() == 1 && prev.height() == 1 {
            break;
        }
        let next = downsample(prev);
        chain.push(next);
    }
    chain
}
