//! Material library scanning from directories and material decoding.

use super::{classify_stem, MaterialLibrary, MaterialReference};
use crate::error::{CompositorError, Result};
use crate::material::Material;
use crate::types::LayerKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scan a library root directory.
///
/// Every immediate subdirectory becomes one material, named after the
/// subdirectory. Other entries at the root are ignored.
pub fn scan_library<P: AsRef<Path>>(root: P) -> Result<MaterialLibrary> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(CompositorError::Config(format!(
            "Material library {:?} is not a directory",
            root
        )));
    }

    let mut library = MaterialLibrary::new();

    for path in sorted_entries(root)? {
        if !path.is_dir() {
            debug!("Skipping non-directory library entry {:?}", path);
            continue;
        }

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };

        let reference = scan_material_dir(&path)?;
        if reference.layer_count() == 0 {
            warn!("Material {} has no recognised texture files", name);
        }
        library.insert(name, reference);
    }

    Ok(library)
}

/// Classify the files of one material directory.
///
/// Files are visited in file name order and a later match for a layer
/// replaces an earlier one.
pub fn scan_material_dir(dir: &Path) -> Result<MaterialReference> {
    let mut reference = MaterialReference::new();

    for path in sorted_entries(dir)? {
        if !path.is_file() {
            continue;
        }

        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => continue,
        };

        match classify_stem(&stem) {
            Some(rule) => {
                debug!("Classified {:?} as {} (pattern {})", path, rule.kind, rule.pattern);
                if rule.kind == LayerKind::Roughness {
                    reference.roughness_inverted = rule.inverted;
                }
                reference.set_path(rule.kind, path);
            }
            None => debug!("Ignoring unclassified file {:?}", path),
        }
    }

    Ok(reference)
}

/// Decode every layer of a material reference.
///
/// A smoothness map recorded as roughness is inverted right after decoding.
pub fn load_material(reference: &MaterialReference) -> Result<Material> {
    let mut material = Material::new();

    for kind in LayerKind::ALL {
        let Some(path) = reference.path(kind) else {
            continue;
        };

        let mut image = image::open(path)?;
        if kind == LayerKind::Roughness && reference.roughness_inverted {
            image.invert();
        }
        material.set_layer(kind, image);
    }

    Ok(material)
}

/// Directory entries sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        paths.push(entry?.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::fs;

    fn write_gray(path: &Path, value: u8) {
        GrayImage::from_pixel(2, 2, Luma([value])).save(path).unwrap();
    }

    #[test]
    fn test_scan_library_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("brick")).unwrap();
        fs::create_dir(dir.path().join("steel")).unwrap();
        fs::write(dir.path().join("readme.txt"), "not a material").unwrap();
        write_gray(&dir.path().join("brick/brick_normal.png"), 128);
        write_gray(&dir.path().join("steel/steel_metallic.png"), 255);

        let library = scan_library(dir.path()).unwrap();
        assert_eq!(library.len(), 2);
        assert!(library.get("brick").unwrap().normal.is_some());
        assert!(library.get("steel").unwrap().metal.is_some());
        assert!(!library.contains("readme.txt"));
    }

    #[test]
    fn test_scan_material_last_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(&dir.path().join("a_metal.png"), 1);
        write_gray(&dir.path().join("b_metal.png"), 2);
        write_gray(&dir.path().join("c_normal.bak.png"), 3);
        write_gray(&dir.path().join("thumbnail.png"), 4);

        let reference = scan_material_dir(dir.path()).unwrap();
        assert_eq!(reference.metal, Some(dir.path().join("b_metal.png")));
        assert!(reference.normal.is_none());
        assert_eq!(reference.layer_count(), 1);
    }

    #[test]
    fn test_inversion_flag_follows_winning_file() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(&dir.path().join("a_smoothness.png"), 1);
        write_gray(&dir.path().join("b_roughness.png"), 2);

        let reference = scan_material_dir(dir.path()).unwrap();
        assert_eq!(reference.roughness, Some(dir.path().join("b_roughness.png")));
        assert!(!reference.roughness_inverted);
    }

    #[test]
    fn test_load_material_inverts_smoothness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steel_smoothness.png");
        write_gray(&path, 60);

        let reference = scan_material_dir(dir.path()).unwrap();
        assert!(reference.roughness_inverted);

        let material = load_material(&reference).unwrap();
        let roughness = material.roughness.unwrap().to_luma8();
        assert!(roughness.pixels().all(|p| p.0[0] == 195));
    }

    #[test]
    fn test_load_material_keeps_plain_roughness() {
        let dir = tempfile::tempdir().unwrap();
        write_gray(&dir.path().join("steel_roughness.png"), 60);

        let material = load_material(&scan_material_dir(dir.path()).unwrap()).unwrap();
        assert!(material.roughness.unwrap().to_luma8().pixels().all(|p| p.0[0] == 60));
        assert!(material.normal.is_none());
    }

    #[test]
    fn test_load_material_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken_normal.png"), b"not a png").unwrap();

        let reference = scan_material_dir(dir.path()).unwrap();
        assert!(matches!(load_material(&reference), Err(CompositorError::Image(_))));
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_library(dir.path().join("nope"));
        assert!(matches!(result, Err(CompositorError::Config(_))));
    }
}
