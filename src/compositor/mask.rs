//! Resolving color-coded masks into per-binding regions.

use super::tiling::composite;
use crate::error::Result;
use crate::material::{Material, MaterialApplier};
use crate::types::{ColorKey, LayerKind};
use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};
use tracing::{debug, Level};

/// A mask color bound to the material painted where it appears.
#[derive(Debug, Clone)]
pub struct ColorBinding {
    pub color: ColorKey,
    pub applier: MaterialApplier,
}

/// Color bindings of one mask, in application order.
///
/// Bindings are applied first to last, so where regions overlap the last
/// binding wins.
#[derive(Debug, Clone, Default)]
pub struct ColorBindings {
    bindings: Vec<ColorBinding>,
}

impl ColorBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a color.
    ///
    /// Rebinding a color replaces its applier but keeps its original position.
    pub fn insert(&mut self, color: ColorKey, applier: MaterialApplier) {
        match self.bindings.iter_mut().find(|b| b.color == color) {
            Some(existing) => existing.applier = applier,
            None => self.bindings.push(ColorBinding { color, applier }),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorBinding> {
        self.bindings.iter()
    }
}

/// Mask pixels normalized for color comparison.
///
/// Masks with an alpha channel are compared against fully opaque keys;
/// masks without one (including gray and paletted masks) as RGB.
#[derive(Debug, Clone)]
pub enum MaskPixels {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl MaskPixels {
    pub fn new(mask: &DynamicImage) -> Self {
        if mask.color().has_alpha() {
            MaskPixels::Rgba(mask.to_rgba8())
        } else {
            MaskPixels::Rgb(mask.to_rgb8())
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            MaskPixels::Rgb(image) => image.dimensions(),
            MaskPixels::Rgba(image) => image.dimensions(),
        }
    }

    /// Binary region where the mask equals `color`: 255 selected, 0 not.
    pub fn region(&self, color: ColorKey) -> GrayImage {
        let (width, height) = self.dimensions();
        match self {
            MaskPixels::Rgb(image) => {
                let key = color.rgb();
                GrayImage::from_fn(width, height, |x, y| selected(image.get_pixel(x, y).0 == key))
            }
            MaskPixels::Rgba(image) => {
                let key = color.rgba();
                GrayImage::from_fn(width, height, |x, y| selected(image.get_pixel(x, y).0 == key))
            }
        }
    }
}

fn selected(matches: bool) -> Luma<u8> {
    Luma([if matches { 255 } else { 0 }])
}

/// Binary region of `mask` covered by `color`.
pub fn region_mask(mask: &DynamicImage, color: ColorKey) -> GrayImage {
    MaskPixels::new(mask).region(color)
}

/// Paint every present, non-albedo layer of an applier's material into
/// `output` inside `region`.
pub fn apply_material(
    output: &mut Material,
    target_size: (u32, u32),
    applier: &MaterialApplier,
    region: &GrayImage,
) -> Result<()> {
    for kind in LayerKind::COMPOSITED {
        let Some(source) = applier.material.layer(kind) else {
            continue;
        };

        let slot = output.layer_mut(kind);
        let canvas = slot.take().map(DynamicImage::into_rgb8);
        let blend = applier.blend.weight(kind);
        debug!("Compositing {} layer (scale {}, blend {})", kind, applier.scale, blend);

        let result = composite(canvas, target_size, source, applier.scale, blend, region)?;
        *slot = Some(DynamicImage::ImageRgb8(result));
    }

    Ok(())
}

/// Apply every binding of a mask onto the output material, in order.
pub fn apply_color_mask(mask: &DynamicImage, output: &mut Material, bindings: &ColorBindings) -> Result<()> {
    let pixels = MaskPixels::new(mask);
    let target_size = pixels.dimensions();

    for binding in bindings.iter() {
        let region = pixels.region(binding.color);
        if tracing::enabled!(Level::DEBUG) {
            let covered = region.pixels().filter(|p| p.0[0] != 0).count();
            debug!("Color {} covers {} pixels", binding.color, covered);
        }

        apply_material(output, target_size, &binding.applier, &region)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositorError;
    use crate::material::BlendWeights;
    use image::{Rgb, Rgba};

    fn uniform(value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([value])))
    }

    fn metal_applier(value: u8) -> MaterialApplier {
        let mut material = Material::new();
        material.metal = Some(uniform(value));
        MaterialApplier::new(material)
    }

    fn red_green_mask() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(2, 2, |x, y| {
            if (x, y) == (0, 0) {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 255, 0])
            }
        }))
    }

    #[test]
    fn test_alpha_normalized_match() {
        let mask = DynamicImage::ImageRgba8(RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([10, 20, 30, 200])
            } else {
                Rgba([10, 20, 30, 255])
            }
        }));

        let region = region_mask(&mask, ColorKey::new(10, 20, 30));
        assert_eq!(region.get_pixel(0, 0).0[0], 0);
        assert_eq!(region.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_translucent_only_mask_matches_nothing() {
        let mask = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 200])));
        let region = region_mask(&mask, ColorKey::new(10, 20, 30));
        assert!(region.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_rgb_mask_region() {
        let region = region_mask(&red_green_mask(), ColorKey::new(0, 255, 0));
        assert_eq!(region.get_pixel(0, 0).0[0], 0);
        assert_eq!(region.get_pixel(1, 0).0[0], 255);
        assert_eq!(region.get_pixel(0, 1).0[0], 255);
        assert_eq!(region.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn test_two_color_metal_mask() {
        let mut bindings = ColorBindings::new();
        bindings.insert(ColorKey::new(255, 0, 0), metal_applier(100));
        bindings.insert(ColorKey::new(0, 255, 0), metal_applier(200));

        let mut output = Material::new();
        apply_color_mask(&red_green_mask(), &mut output, &bindings).unwrap();

        let metal = output.metal.unwrap().to_rgb8();
        assert_eq!(metal.get_pixel(0, 0).0, [100, 100, 100]);
        assert_eq!(metal.get_pixel(1, 0).0, [200, 200, 200]);
        assert_eq!(metal.get_pixel(0, 1).0, [200, 200, 200]);
        assert_eq!(metal.get_pixel(1, 1).0, [200, 200, 200]);

        // Only layers some applier contributed are present.
        assert!(output.normal.is_none());
        assert!(output.color.is_none());
    }

    #[test]
    fn test_albedo_is_never_composited() {
        let mut material = Material::new();
        material.color = Some(uniform(50));
        material.height = Some(uniform(60));

        let mut bindings = ColorBindings::new();
        bindings.insert(ColorKey::new(255, 0, 0), MaterialApplier::new(material));

        let mut output = Material::new();
        apply_color_mask(&red_green_mask(), &mut output, &bindings).unwrap();
        assert!(output.color.is_none());
        assert!(output.height.is_some());
    }

    #[test]
    fn test_blend_weight_per_layer() {
        let mut output = Material::new();
        output.metal = Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]))));
        output.occlusion = Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]))));

        let mut material = Material::new();
        material.metal = Some(uniform(200));
        material.occlusion = Some(uniform(200));
        let mut blend = BlendWeights::default();
        blend.metal = 0.5;
        blend.occlusion = 0.0;

        let mut bindings = ColorBindings::new();
        bindings.insert(ColorKey::new(255, 0, 0), MaterialApplier::new(material).with_blend(blend));
        apply_color_mask(&red_green_mask(), &mut output, &bindings).unwrap();

        let metal = output.metal.unwrap().to_rgb8();
        assert_eq!(metal.get_pixel(0, 0).0, [150, 150, 150]);
        assert_eq!(metal.get_pixel(1, 1).0, [100, 100, 100]);
        let occlusion = output.occlusion.unwrap().to_rgb8();
        assert_eq!(occlusion.get_pixel(0, 0).0, [100, 100, 100]);
    }

    #[test]
    fn test_rebinding_keeps_position() {
        let red = ColorKey::new(255, 0, 0);
        let green = ColorKey::new(0, 255, 0);

        let mut bindings = ColorBindings::new();
        bindings.insert(red, metal_applier(1));
        bindings.insert(green, metal_applier(2));
        bindings.insert(red, metal_applier(3).with_scale(2.0));

        let order: Vec<_> = bindings.iter().map(|b| b.color).collect();
        assert_eq!(order, vec![red, green]);
        assert_eq!(bindings.iter().next().unwrap().applier.scale, 2.0);
    }

    #[test]
    fn test_seeded_canvas_must_match_mask() {
        let mut output = Material::new();
        output.metal = Some(DynamicImage::ImageRgb8(RgbImage::new(4, 4)));

        let mut bindings = ColorBindings::new();
        bindings.insert(ColorKey::new(255, 0, 0), metal_applier(10));

        let result = apply_color_mask(&red_green_mask(), &mut output, &bindings);
        assert!(matches!(result, Err(CompositorError::SizeMismatch { .. })));
    }
}
