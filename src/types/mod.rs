//! Shared types used throughout the library.

mod color;

pub use color::{parse_color, ColorKey};

use serde::Serialize;
use std::fmt;

/// The physical property a texture layer describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Color,
    Normal,
    Height,
    Metal,
    Roughness,
    Emissive,
    Occlusion,
}

impl LayerKind {
    /// All layer kinds, in save order.
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Color,
        LayerKind::Normal,
        LayerKind::Height,
        LayerKind::Metal,
        LayerKind::Roughness,
        LayerKind::Emissive,
        LayerKind::Occlusion,
    ];

    /// Layer kinds painted by mask compositing. Albedo is only ever seeded.
    pub const COMPOSITED: [LayerKind; 6] = [
        LayerKind::Normal,
        LayerKind::Height,
        LayerKind::Metal,
        LayerKind::Roughness,
        LayerKind::Emissive,
        LayerKind::Occlusion,
    ];

    /// Suffix appended to the output base name when saving this layer.
    pub fn output_suffix(self) -> &'static str {
        match self {
            LayerKind::Color => "_albedo",
            LayerKind::Normal => "_norm",
            LayerKind::Height => "_height",
            LayerKind::Metal => "_metal",
            LayerKind::Roughness => "_roughness",
            LayerKind::Emissive => "_emissive",
            LayerKind::Occlusion => "_ao",
        }
    }

    /// Lowercase name, as used in configuration keys.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Color => "color",
            LayerKind::Normal => "normal",
            LayerKind::Height => "height",
            LayerKind::Metal => "metal",
            LayerKind::Roughness => "roughness",
            LayerKind::Emissive => "emissive",
            LayerKind::Occlusion => "occlusion",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
