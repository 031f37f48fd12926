//! Material library scanning and loading.
//!
//! A material library is a directory holding one subdirectory per material.
//! Each subdirectory's files are classified by filename into texture layers
//! (see [`classify`]) and recorded as a [`MaterialReference`].

pub mod classify;
pub mod loader;

pub use classify::{classify_stem, ClassifyRule, CLASSIFY_RULES};
pub use loader::{load_material, scan_library, scan_material_dir};

use crate::types::LayerKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Paths to the classified texture files of one material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterialReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metal: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<PathBuf>,
    /// The roughness file stores smoothness and must be inverted on load.
    pub roughness_inverted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion: Option<PathBuf>,
}

impl MaterialReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the path recorded for a layer.
    pub fn path(&self, kind: LayerKind) -> Option<&Path> {
        match kind {
            LayerKind::Color => self.color.as_deref(),
            LayerKind::Normal => self.normal.as_deref(),
            LayerKind::Height => self.height.as_deref(),
            LayerKind::Metal => self.metal.as_deref(),
            LayerKind::Roughness => self.roughness.as_deref(),
            LayerKind::Emissive => self.emissive.as_deref(),
            LayerKind::Occlusion => self.occlusion.as_deref(),
        }
    }

    /// Record a path for a layer, replacing any earlier one.
    pub fn set_path(&mut self, kind: LayerKind, path: PathBuf) {
        let slot = match kind {
            LayerKind::Color => &mut self.color,
            LayerKind::Normal => &mut self.normal,
            LayerKind::Height => &mut self.height,
            LayerKind::Metal => &mut self.metal,
            LayerKind::Roughness => &mut self.roughness,
            LayerKind::Emissive => &mut self.emissive,
            LayerKind::Occlusion => &mut self.occlusion,
        };
        *slot = Some(path);
    }

    /// Number of layers with a recorded path.
    pub fn layer_count(&self) -> usize {
        LayerKind::ALL
            .iter()
            .filter(|kind| self.path(**kind).is_some())
            .count()
    }
}

/// All materials found under a library root, keyed by subdirectory name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, MaterialReference>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a material.
    pub fn insert(&mut self, name: impl Into<String>, reference: MaterialReference) {
        self.materials.insert(name.into(), reference);
    }

    /// Look up a material by name.
    pub fn get(&self, name: &str) -> Option<&MaterialReference> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Iterate materials in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialReference)> {
        self.materials.iter().map(|(k, v)| (k.as_str(), v))
    }
}
