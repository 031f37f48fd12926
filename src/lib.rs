//! # Mask Compositor
//!
//! A Rust library for compositing PBR material texture sets with
//! color-coded masks.
//!
//! ## Overview
//!
//! A mask is a hand-painted image whose flat colors mark material zones. Each
//! color is bound to a material from a material library (a directory of
//! texture sets) together with a tile scale and per-layer blend weights. Every
//! bound material is tiled across the canvas and blended into the output
//! texture set (normal, height, metal, roughness, emissive, occlusion) inside
//! the zone its color covers.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mask_compositor::{CompositeJob, run};
//!
//! // Parse and validate a YAML config, scanning its material library
//! let job = CompositeJob::from_path("hull.yaml")?;
//!
//! // Composite every mask and write hull_norm.png, hull_metal.png, ...
//! let written = run(&job)?;
//! ```
//!
//! ## Library Integration
//!
//! The compositing core works on in-memory images and can be driven without
//! a config file:
//!
//! ```ignore
//! use mask_compositor::{apply_color_mask, ColorBindings, ColorKey, Material, MaterialApplier};
//!
//! let mut bindings = ColorBindings::new();
//! bindings.insert(ColorKey::new(255, 0, 0), MaterialApplier::new(rust).with_scale(0.5));
//!
//! let mut output = Material::new();
//! apply_color_mask(&mask, &mut output, &bindings)?;
//! ```

pub mod error;
pub mod types;
pub mod material;
pub mod library;
pub mod compositor;
pub mod config;
pub mod pipeline;

// Re-export main types for convenience
pub use error::{CompositorError, Result};
pub use types::{parse_color, ColorKey, LayerKind};
pub use material::{BlendWeights, Material, MaterialApplier};
pub use library::{load_material, scan_library, MaterialLibrary, MaterialReference};
pub use compositor::{apply_color_mask, composite, region_mask, ColorBinding, ColorBindings};
pub use config::{CompositeJob, ConfigDocument};
pub use pipeline::{composite_job, run, save_material};
