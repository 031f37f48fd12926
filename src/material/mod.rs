//! Decoded materials and the parameters used to paint them.

use crate::types::LayerKind;
use image::DynamicImage;
use serde::Serialize;

/// Up to seven decoded texture layers.
///
/// Used both for source materials loaded from the library (read-only once
/// loaded) and for the output accumulator, which starts empty or seeded and
/// is mutated as each mask binding is applied.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub color: Option<DynamicImage>,
    pub normal: Option<DynamicImage>,
    pub height: Option<DynamicImage>,
    pub metal: Option<DynamicImage>,
    pub roughness: Option<DynamicImage>,
    pub emissive: Option<DynamicImage>,
    pub occlusion: Option<DynamicImage>,
}

impl Material {
    /// Create a material with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a layer, if present.
    pub fn layer(&self, kind: LayerKind) -> Option<&DynamicImage> {
        match kind {
            LayerKind::Color => self.color.as_ref(),
            LayerKind::Normal => self.normal.as_ref(),
            LayerKind::Height => self.height.as_ref(),
            LayerKind::Metal => self.metal.as_ref(),
            LayerKind::Roughness => self.roughness.as_ref(),
            LayerKind::Emissive => self.emissive.as_ref(),
            LayerKind::Occlusion => self.occlusion.as_ref(),
        }
    }

    /// Mutable access to a layer slot.
    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Option<DynamicImage> {
        match kind {
            LayerKind::Color => &mut self.color,
            LayerKind::Normal => &mut self.normal,
            LayerKind::Height => &mut self.height,
            LayerKind::Metal => &mut self.metal,
            LayerKind::Roughness => &mut self.roughness,
            LayerKind::Emissive => &mut self.emissive,
            LayerKind::Occlusion => &mut self.occlusion,
        }
    }

    /// Replace a layer.
    pub fn set_layer(&mut self, kind: LayerKind, image: DynamicImage) {
        *self.layer_mut(kind) = Some(image);
    }

    /// Kinds of the layers that are present, in [`LayerKind::ALL`] order.
    pub fn present_layers(&self) -> impl Iterator<Item = LayerKind> + '_ {
        LayerKind::ALL
            .into_iter()
            .filter(move |kind| self.layer(*kind).is_some())
    }

    /// Whether no layer is present.
    pub fn is_empty(&self) -> bool {
        self.present_layers().next().is_none()
    }
}

/// Per-layer blend weights for a material applier.
///
/// 1.0 replaces the accumulated output inside the region, 0.0 keeps it.
/// Values outside [0, 1] extrapolate and are clamped per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendWeights {
    pub normal: f32,
    pub height: f32,
    pub metal: f32,
    pub roughness: f32,
    pub emissive: f32,
    pub occlusion: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl BlendWeights {
    /// The same weight for every layer.
    pub fn uniform(weight: f32) -> Self {
        Self {
            normal: weight,
            height: weight,
            metal: weight,
            roughness: weight,
            emissive: weight,
            occlusion: weight,
        }
    }

    /// Weight for a layer. Albedo is never blended and always reports 1.0.
    pub fn weight(&self, kind: LayerKind) -> f32 {
        match kind {
            LayerKind::Color => 1.0,
            LayerKind::Normal => self.normal,
            LayerKind::Height => self.height,
            LayerKind::Metal => self.metal,
            LayerKind::Roughness => self.roughness,
            LayerKind::Emissive => self.emissive,
            LayerKind::Occlusion => self.occlusion,
        }
    }
}

/// A loaded material plus the scale and blend weights used to paint it
/// into one mask region.
#[derive(Debug, Clone)]
pub struct MaterialApplier {
    pub material: Material,
    /// Uniform tile scale applied to every layer.
    pub scale: f32,
    pub blend: BlendWeights,
}

impl MaterialApplier {
    /// Create an applier with scale 1.0 and full blend weights.
    pub fn new(material: Material) -> Self {
        Self {
            material,
            scale: 1.0,
            blend: BlendWeights::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_blend(mut self, blend: BlendWeights) -> Self {
        self.blend = blend;
        self
    }
}
