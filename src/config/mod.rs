//! YAML configuration.
//!
//! A configuration names the material library, the output directory, optional
//! starting textures and, per mask file, which material each mask color is
//! painted with:
//!
//! ```yaml
//! material_library_path: materials
//! output:
//!   directory: out
//!   starting:
//!     normal: base_normal.png
//! masks:
//!   hull_mask.png:
//!     colors:
//!       "#ff0000":
//!         material: painted_metal
//!         scale: 0.5
//!         blend: { roughness: 0.8 }
//! ```

mod document;
mod job;

pub use document::{
    BlendSection, ColorSection, ConfigDocument, MaskSection, OrderedMap, OutputSection, StartingSection,
};
pub use job::{BindingPlan, CompositeJob, LayerSeed, MaskPlan, OutputSettings, DEFAULT_OUTPUT_FORMAT};
