//! Validation of a configuration document into a runnable job.

use super::document::{BlendSection, ColorSection, ConfigDocument, OutputSection, StartingSection};
use crate::error::{CompositorError, Result};
use crate::library::{scan_library, MaterialLibrary};
use crate::material::BlendWeights;
use crate::types::{parse_color, ColorKey, LayerKind};
use image::ImageFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension used when the configuration does not name an output format.
pub const DEFAULT_OUTPUT_FORMAT: &str = "png";

/// File name marker of a starting occlusion texture that stores smoothness.
const SMOOTH_SEED_MARKER: &str = "_smooth";

/// A validated compositing job.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeJob {
    /// Base name of every output file.
    pub name: String,
    pub library_path: PathBuf,
    pub library: MaterialLibrary,
    pub output: OutputSettings,
    pub seeds: Vec<LayerSeed>,
    pub masks: Vec<MaskPlan>,
}

/// Where and how output layers are written.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSettings {
    pub directory: PathBuf,
    /// File extension, without the dot.
    pub extension: String,
}

impl OutputSettings {
    /// Image format implied by the extension.
    pub fn format(&self) -> Result<ImageFormat> {
        output_format(&self.extension)
    }

    /// Output path of one layer.
    pub fn layer_path(&self, name: &str, kind: LayerKind) -> PathBuf {
        self.directory
            .join(format!("{}{}.{}", name, kind.output_suffix(), self.extension))
    }
}

/// A starting texture copied into the output before any mask is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSeed {
    pub kind: LayerKind,
    pub path: PathBuf,
    /// Invert after loading.
    pub inverted: bool,
}

/// One mask file and its ordered color bindings.
#[derive(Debug, Clone, Serialize)]
pub struct MaskPlan {
    pub path: PathBuf,
    pub bindings: Vec<BindingPlan>,
}

/// A mask color bound to a library material, not yet loaded.
#[derive(Debug, Clone, Serialize)]
pub struct BindingPlan {
    /// The color as written in the configuration.
    pub spec: String,
    pub color: ColorKey,
    pub material: String,
    pub scale: f32,
    pub blend: BlendWeights,
}

impl CompositeJob {
    /// Validate a document and scan its material library.
    ///
    /// `name` is the base name of the output files, normally the
    /// configuration file's stem. Relative paths in the document are taken
    /// relative to the working directory.
    pub fn from_document(document: ConfigDocument, name: impl Into<String>) -> Result<Self> {
        let library_path = document
            .material_library_path
            .ok_or_else(|| config_error("material_library_path not in config"))?;
        if !library_path.is_dir() {
            return Err(config_error(format!(
                "Invalid material library path {:?}",
                library_path
            )));
        }

        let library = scan_library(&library_path)?;
        info!("Found {} materials in {:?}", library.len(), library_path);

        let output_section = document
            .output
            .ok_or_else(|| config_error("output section not in config"))?;
        let (output, starting) = validate_output(output_section)?;
        let seeds = match starting {
            Some(starting) => validate_seeds(starting)?,
            None => Vec::new(),
        };

        let mask_sections = document
            .masks
            .ok_or_else(|| config_error("masks section not in config"))?;
        if mask_sections.is_empty() {
            return Err(config_error("Need at least one mask specified in config"));
        }

        let mut masks = Vec::with_capacity(mask_sections.len());
        for (mask_key, section) in mask_sections.0 {
            let path = PathBuf::from(&mask_key);
            if !path.is_file() {
                return Err(config_error(format!("Mask {} does not exist", mask_key)));
            }

            let colors = section
                .colors
                .ok_or_else(|| config_error(format!("Mask {} has no colors section", mask_key)))?;
            if colors.is_empty() {
                warn!("Mask {} binds no colors", mask_key);
            }

            let mut bindings = Vec::with_capacity(colors.len());
            for (spec, color_section) in colors.0 {
                bindings.push(validate_binding(&library, &mask_key, spec, color_section)?);
            }

            masks.push(MaskPlan { path, bindings });
        }

        Ok(Self {
            name: name.into(),
            library_path,
            library,
            output,
            seeds,
            masks,
        })
    }

    /// Read, parse and validate a configuration file.
    ///
    /// The output base name is the file's stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let document = ConfigDocument::from_yaml(&text)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| config_error(format!("Config path {:?} has no file name", path)))?;

        Self::from_document(document, name)
    }

    /// Replace the output format, validating the extension.
    pub fn set_output_format(&mut self, extension: &str) -> Result<()> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        output_format(&extension)?;
        self.output.extension = extension;
        Ok(())
    }

    /// Pretty JSON description of the job.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn validate_output(section: OutputSection) -> Result<(OutputSettings, Option<StartingSection>)> {
    let directory = section
        .directory
        .ok_or_else(|| config_error("output.directory not in config"))?;
    if !directory.is_dir() {
        return Err(config_error(format!(
            "Output directory {:?} is not a directory",
            directory
        )));
    }

    let extension = section
        .format
        .map(|f| f.trim_start_matches('.').to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());
    output_format(&extension)?;

    Ok((OutputSettings { directory, extension }, section.starting))
}

fn validate_seeds(starting: StartingSection) -> Result<Vec<LayerSeed>> {
    let entries = [
        (LayerKind::Color, starting.color),
        (LayerKind::Normal, starting.normal),
        (LayerKind::Occlusion, starting.occlusion),
    ];

    let mut seeds = Vec::new();
    for (kind, path) in entries {
        let Some(path) = path else {
            continue;
        };
        if !path.is_file() {
            return Err(config_error(format!(
                "Starting {} texture {:?} does not exist",
                kind, path
            )));
        }

        let inverted = kind == LayerKind::Occlusion && is_smooth_seed(&path);
        seeds.push(LayerSeed { kind, path, inverted });
    }

    Ok(seeds)
}

/// Whether a seed file name marks it as a smoothness map.
fn is_smooth_seed(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(SMOOTH_SEED_MARKER))
        .unwrap_or(false)
}

fn validate_binding(
    library: &MaterialLibrary,
    mask_key: &str,
    spec: String,
    section: ColorSection,
) -> Result<BindingPlan> {
    let material = section.material.ok_or_else(|| {
        config_error(format!(
            "Need to specify a material name for {} in mask {}",
            spec, mask_key
        ))
    })?;
    if !library.contains(&material) {
        return Err(config_error(format!(
            "Material {} not found in material library for {} in mask {}",
            material, spec, mask_key
        )));
    }

    let color = parse_color(&spec)?;

    Ok(BindingPlan {
        spec,
        color,
        material,
        scale: section.scale.unwrap_or(1.0),
        blend: section.blend.map(blend_weights).unwrap_or_default(),
    })
}

fn blend_weights(section: BlendSection) -> BlendWeights {
    BlendWeights {
        normal: section.normal.unwrap_or(1.0),
        height: section.height.unwrap_or(1.0),
        metal: section.metal.unwrap_or(1.0),
        roughness: section.roughness.unwrap_or(1.0),
        emissive: section.emissive.unwrap_or(1.0),
        occlusion: section.occlusion.unwrap_or(1.0),
    }
}

fn output_format(extension: &str) -> Result<ImageFormat> {
    ImageFormat::from_extension(extension)
        .filter(|format| format.writing_enabled())
        .ok_or_else(|| CompositorError::UnsupportedFormat(extension.to_string()))
}

fn config_error(message: impl Into<String>) -> CompositorError {
    CompositorError::Config(message.into())
}
