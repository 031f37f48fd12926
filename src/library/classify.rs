//! Filename classification of material texture files.

use crate::types::LayerKind;

/// Infix marking backup files, which are never classified.
const BACKUP_MARKER: &str = ".bak";

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyRule {
    /// Lowercase substring searched for in the file stem.
    pub pattern: &'static str,
    /// Layer the file is assigned to.
    pub kind: LayerKind,
    /// Whether the file holds the inverse of the layer (smoothness for roughness).
    pub inverted: bool,
}

const fn rule(pattern: &'static str, kind: LayerKind) -> ClassifyRule {
    ClassifyRule { pattern, kind, inverted: false }
}

/// Rules evaluated top to bottom; the first match wins.
///
/// Order matters: `_nor` shadows every later `_nor*` pattern and
/// `_roughness` is tested before `_smoothness` and `_rough`.
pub const CLASSIFY_RULES: &[ClassifyRule] = &[
    rule("_normal", LayerKind::Normal),
    rule("_nor", LayerKind::Normal),
    rule("_height", LayerKind::Height),
    rule("_disp", LayerKind::Height),
    rule("_metallic", LayerKind::Metal),
    rule("_metal", LayerKind::Metal),
    rule("_roughness", LayerKind::Roughness),
    ClassifyRule {
        pattern: "_smoothness",
        kind: LayerKind::Roughness,
        inverted: true,
    },
    rule("_rough", LayerKind::Roughness),
    rule("_emissive", LayerKind::Emissive),
    rule("_occ", LayerKind::Occlusion),
    rule("_ao", LayerKind::Occlusion),
    rule("_ambientocclusion", LayerKind::Occlusion),
    rule("_diffuse", LayerKind::Color),
    rule("_base", LayerKind::Color),
    rule("_color", LayerKind::Color),
    rule("_albedo", LayerKind::Color),
];

/// Classify a file by its stem.
///
/// Returns `None` for backup files and for stems matching no rule.
pub fn classify_stem(stem: &str) -> Option<&'static ClassifyRule> {
    if stem.contains(BACKUP_MARKER) {
        return None;
    }

    let lower = stem.to_lowercase();
    CLASSIFY_RULES.iter().find(|rule| lower.contains(rule.pattern))
}
