//! Running a validated job: seed, apply every mask, save.

use crate::compositor::{apply_color_mask, ColorBindings};
use crate::config::{CompositeJob, LayerSeed, MaskPlan, OutputSettings};
use crate::error::{CompositorError, Result};
use crate::library::{load_material, MaterialLibrary};
use crate::material::{Material, MaterialApplier};
use crate::types::LayerKind;
use image::{imageops, DynamicImage};
use std::path::PathBuf;
use tracing::{debug, info};

/// Composite every mask of a job and save the result.
///
/// Returns the paths written. Nothing is written if any mask fails.
pub fn run(job: &CompositeJob) -> Result<Vec<PathBuf>> {
    let output = composite_job(job)?;
    save_material(&output, &job.output, &job.name)
}

/// Build the output material of a job without saving it.
pub fn composite_job(job: &CompositeJob) -> Result<Material> {
    let mut output = seed_output(&job.seeds)?;

    for plan in &job.masks {
        info!("Applying mask {:?} ({} colors)", plan.path, plan.bindings.len());
        let mask = image::open(&plan.path)?;
        let bindings = load_bindings(plan, &job.library)?;
        apply_color_mask(&mask, &mut output, &bindings)?;
    }

    Ok(output)
}

/// Output material holding the starting textures, converted to RGB.
pub fn seed_output(seeds: &[LayerSeed]) -> Result<Material> {
    let mut output = Material::new();

    for seed in seeds {
        let mut image = image::open(&seed.path)?.into_rgb8();
        if seed.inverted {
            imageops::invert(&mut image);
        }
        debug!("Seeded {} layer from {:?} (inverted: {})", seed.kind, seed.path, seed.inverted);
        output.set_layer(seed.kind, DynamicImage::ImageRgb8(image));
    }

    Ok(output)
}

/// Load the material of every binding of a mask.
///
/// Materials are decoded per binding, even when several bindings share one.
pub fn load_bindings(plan: &MaskPlan, library: &MaterialLibrary) -> Result<ColorBindings> {
    let mut bindings = ColorBindings::new();

    for binding in &plan.bindings {
        let reference = library.get(&binding.material).ok_or_else(|| {
            CompositorError::Config(format!(
                "Material {} not found in material library",
                binding.material
            ))
        })?;

        debug!("Binding {} ({}) to material {}", binding.spec, binding.color, binding.material);
        let applier = MaterialApplier::new(load_material(reference)?)
            .with_scale(binding.scale)
            .with_blend(binding.blend);
        bindings.insert(binding.color, applier);
    }

    Ok(bindings)
}

/// Save every present layer as `<name><suffix>.<extension>`.
pub fn save_material(material: &Material, output: &OutputSettings, name: &str) -> Result<Vec<PathBuf>> {
    let format = output.format()?;
    let mut written = Vec::new();

    for kind in LayerKind::ALL {
        let Some(layer) = material.layer(kind) else {
            continue;
        };

        let path = output.layer_path(name, kind);
        layer.save_with_format(&path, format)?;
        info!("Wrote {} layer to {:?}", kind, path);
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_gray(path: &Path, width: u32, height: u32, value: u8) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        GrayImage::from_pixel(width, height, Luma([value])).save(path).unwrap();
    }

    fn p(dir: &TempDir, relative: &str) -> String {
        dir.path().join(relative).to_string_lossy().to_string()
    }

    /// Library with red_mat (metal 100) and green_mat (metal 200), a 2x2 mask
    /// with a red top-left pixel and green elsewhere.
    fn red_green_scene() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_gray(&dir.path().join("lib/red_mat/red_metal.png"), 4, 4, 100);
        write_gray(&dir.path().join("lib/green_mat/green_metal.png"), 4, 4, 200);
        fs::create_dir(dir.path().join("out")).unwrap();

        let mask = RgbImage::from_fn(2, 2, |x, y| {
            if (x, y) == (0, 0) {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 255, 0])
            }
        });
        mask.save(dir.path().join("mask.png")).unwrap();
        dir
    }

    fn write_config(dir: &TempDir, starting: &str) -> PathBuf {
        let yaml = format!(
            "material_library_path: '{}'\noutput:\n  directory: '{}'\n{}masks:\n  '{}':\n    colors:\n      '#ff0000':\n        material: red_mat\n      '#00ff00':\n        material: green_mat\n",
            p(dir, "lib"),
            p(dir, "out"),
            starting,
            p(dir, "mask.png"),
        );
        let path = dir.path().join("scene.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_red_green_metal_end_to_end() {
        let dir = red_green_scene();
        let job = CompositeJob::from_path(write_config(&dir, "")).unwrap();

        let written = run(&job).unwrap();
        assert_eq!(written, vec![dir.path().join("out/scene_metal.png")]);

        let metal = image::open(&written[0]).unwrap().to_luma8();
        assert_eq!(metal.dimensions(), (2, 2));
        assert_eq!(metal.get_pixel(0, 0).0[0], 100);
        assert_eq!(metal.get_pixel(1, 0).0[0], 200);
        assert_eq!(metal.get_pixel(0, 1).0[0], 200);
        assert_eq!(metal.get_pixel(1, 1).0[0], 200);
    }

    #[test]
    fn test_smooth_occlusion_seed() {
        let dir = red_green_scene();
        write_gray(&dir.path().join("seed_smoothness.png"), 2, 2, 40);
        let starting = format!("  starting:\n    occlusion: '{}'\n", p(&dir, "seed_smoothness.png"));
        let job = CompositeJob::from_path(write_config(&dir, &starting)).unwrap();

        let seeded = seed_output(&job.seeds).unwrap();
        let occlusion = seeded.occlusion.as_ref().unwrap().to_rgb8();
        assert!(occlusion.pixels().all(|p| p.0 == [215, 215, 215]));

        // No bound material has occlusion, so the seed is saved unchanged.
        let written = run(&job).unwrap();
        assert!(written.contains(&dir.path().join("out/scene_ao.png")));
        let saved = image::open(dir.path().join("out/scene_ao.png")).unwrap().to_rgb8();
        assert!(saved.pixels().all(|p| p.0 == [215, 215, 215]));
    }

    #[test]
    fn test_albedo_seed_passes_through() {
        let dir = red_green_scene();
        write_gray(&dir.path().join("base_color.png"), 2, 2, 30);
        let starting = format!("  starting:\n    color: '{}'\n", p(&dir, "base_color.png"));
        let job = CompositeJob::from_path(write_config(&dir, &starting)).unwrap();

        let written = run(&job).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("out/scene_albedo.png"),
                dir.path().join("out/scene_metal.png"),
            ]
        );
    }

    #[test]
    fn test_masks_share_one_accumulator() {
        let dir = red_green_scene();
        write_gray(&dir.path().join("lib/blue_mat/blue_metal.png"), 4, 4, 200);

        // First mask paints only x=0; the second covers both pixels at half weight.
        let first = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        first.save(dir.path().join("first.png")).unwrap();
        RgbImage::from_pixel(2, 1, Rgb([0, 0, 255]))
            .save(dir.path().join("second.png"))
            .unwrap();

        let yaml = format!(
            "material_library_path: '{}'\noutput:\n  directory: '{}'\nmasks:\n  '{}':\n    colors:\n      red:\n        material: red_mat\n  '{}':\n    colors:\n      blue:\n        material: blue_mat\n        blend: {{ metal: 0.5 }}\n",
            p(&dir, "lib"),
            p(&dir, "out"),
            p(&dir, "first.png"),
            p(&dir, "second.png"),
        );
        let config = dir.path().join("layered.yaml");
        fs::write(&config, yaml).unwrap();

        let job = CompositeJob::from_path(&config).unwrap();
        assert_eq!(job.masks.len(), 2);

        let output = composite_job(&job).unwrap();
        let metal = output.metal.as_ref().unwrap().to_rgb8();
        assert_eq!(*metal.get_pixel(0, 0), Rgb([150, 150, 150]));
        assert_eq!(*metal.get_pixel(1, 0), Rgb([100, 100, 100]));
        assert!(output.normal.is_none());
    }

    #[test]
    fn test_materials_loaded_per_binding() {
        let dir = red_green_scene();
        let job = CompositeJob::from_path(write_config(&dir, "")).unwrap();

        let bindings = load_bindings(&job.masks[0], &job.library).unwrap();
        assert_eq!(bindings.len(), 2);
        let metal = bindings.iter().next().unwrap().applier.material.metal.as_ref().unwrap();
        assert_eq!(metal.to_luma8().get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn test_nothing_written_on_failure() {
        let dir = red_green_scene();
        let job = CompositeJob::from_path(write_config(&dir, "")).unwrap();
        fs::write(dir.path().join("lib/green_mat/green_metal.png"), b"corrupt").unwrap();

        assert!(matches!(run(&job), Err(CompositorError::Image(_))));
        assert_eq!(fs::read_dir(dir.path().join("out")).unwrap().count(), 0);
    }

    #[test]
    fn test_yaml_syntax_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "masks: [unclosed\n").unwrap();
        assert!(matches!(CompositeJob::from_path(&path), Err(CompositorError::Yaml(_))));
    }
}
