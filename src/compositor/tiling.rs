//! Tiling a texture layer across a canvas and blending it inside a region.

use crate::error::{CompositorError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};

/// Composite one texture layer onto a canvas inside a region mask.
///
/// `source` is resampled by `scale` (Lanczos3), tiled from the top-left
/// corner until it covers `target_size`, linearly blended with the canvas by
/// `blend`, and written back only where `region` is set.
///
/// Without an existing canvas a black canvas of `target_size` is allocated
/// and the blend weight is forced to 1.0, since there is nothing to blend
/// against.
pub fn composite(
    canvas: Option<RgbImage>,
    target_size: (u32, u32),
    source: &DynamicImage,
    scale: f32,
    blend: f32,
    region: &GrayImage,
) -> Result<RgbImage> {
    check_size(target_size, region.dimensions())?;

    let (mut canvas, blend) = match canvas {
        Some(canvas) => {
            check_size(target_size, canvas.dimensions())?;
            (canvas, blend)
        }
        None => (RgbImage::new(target_size.0, target_size.1), 1.0),
    };

    let tiled = tile_layer(source, scale, target_size)?;

    for ((out, tile), mask) in canvas
        .pixels_mut()
        .zip(tiled.pixels())
        .zip(region.pixels())
    {
        let coverage = mask.0[0];
        if coverage == 0 {
            continue;
        }

        for c in 0..3 {
            let blended = blend_channel(out.0[c], tile.0[c], blend);
            out.0[c] = paste_channel(out.0[c], blended, coverage);
        }
    }

    Ok(canvas)
}

/// Resample `source` by `scale` and repeat it over a buffer of `target_size`.
///
/// One extra tile is placed past the last full row and column so that a
/// tile size not dividing the target still covers it; the overhang is clipped.
pub fn tile_layer(source: &DynamicImage, scale: f32, target_size: (u32, u32)) -> Result<RgbImage> {
    let (tile_width, tile_height) = scaled_size(source, scale)?;

    let rgb = source.to_rgb8();
    let tile = if rgb.dimensions() == (tile_width, tile_height) {
        rgb
    } else {
        imageops::resize(&rgb, tile_width, tile_height, FilterType::Lanczos3)
    };

    let (target_width, target_height) = target_size;
    let mut tiled = RgbImage::new(target_width, target_height);

    let width_copies = target_width / tile_width;
    let height_copies = target_height / tile_height;
    for i in 0..=width_copies {
        for j in 0..=height_copies {
            imageops::replace(
                &mut tiled,
                &tile,
                i as i64 * tile_width as i64,
                j as i64 * tile_height as i64,
            );
        }
    }

    Ok(tiled)
}

/// Tile dimensions after scaling, rejecting scales that yield an empty tile.
pub fn scaled_size(source: &DynamicImage, scale: f32) -> Result<(u32, u32)> {
    let (width, height) = (source.width(), source.height());
    let invalid = || CompositorError::InvalidScale { scale, width, height };

    if !scale.is_finite() || scale <= 0.0 {
        return Err(invalid());
    }

    let scaled_width = (width as f64 * scale as f64).floor();
    let scaled_height = (height as f64 * scale as f64).floor();
    let max = u32::MAX as f64;
    if scaled_width < 1.0
        || scaled_height < 1.0
        || scaled_width > max
        || scaled_height > max
    {
        return Err(invalid());
    }

    Ok((scaled_width as u32, scaled_height as u32))
}

/// `base * (1 - weight) + over * weight`, clamped and truncated to 8 bits.
fn blend_channel(base: u8, over: u8, weight: f32) -> u8 {
    let value = base as f32 + weight * (over as f32 - base as f32);
    value.clamp(0.0, 255.0) as u8
}

/// Masked paste: full coverage overwrites, partial coverage interpolates.
fn paste_channel(base: u8, over: u8, coverage: u8) -> u8 {
    if coverage == 255 {
        return over;
    }
    let coverage = coverage as u32;
    ((over as u32 * coverage + base as u32 * (255 - coverage) + 127) / 255) as u8
}

fn check_size(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        return Err(CompositorError::SizeMismatch { expected, actual });
    }
    Ok(())
}
