//! Mask-driven texture compositing.
//!
//! [`tiling`] tiles and blends a single layer into a region; [`mask`] turns a
//! color-coded mask and its bindings into regions and paints every layer of
//! each bound material.

pub mod mask;
pub mod tiling;

pub use mask::{apply_color_mask, apply_material, region_mask, ColorBinding, ColorBindings, MaskPixels};
pub use tiling::{composite, scaled_size, tile_layer};
