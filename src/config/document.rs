//! Raw YAML configuration document.
//!
//! Every field is optional here so that missing keys are reported by
//! validation with a descriptive message rather than as a serde error.

use crate::error::Result;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

/// The parsed configuration document.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ConfigDocument {
    /// Directory holding one subdirectory per material.
    #[serde(default)]
    pub material_library_path: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<OutputSection>,
    /// Mask file path to mask options, in document order.
    #[serde(default)]
    pub masks: Option<OrderedMap<MaskSection>>,
}

impl ConfigDocument {
    /// Parse a document from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// The `output` section.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Output file extension, `png` when absent.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub starting: Option<StartingSection>,
}

/// Textures the output accumulator is seeded with.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct StartingSection {
    #[serde(default)]
    pub color: Option<PathBuf>,
    #[serde(default)]
    pub normal: Option<PathBuf>,
    #[serde(default)]
    pub occlusion: Option<PathBuf>,
}

/// Options for one mask file.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct MaskSection {
    /// Color spec to material binding, in document order.
    #[serde(default)]
    pub colors: Option<OrderedMap<ColorSection>>,
}

/// Material binding for one mask color.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ColorSection {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub blend: Option<BlendSection>,
}

/// Per-layer blend weights; absent entries default to 1.0.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BlendSection {
    #[serde(default)]
    pub normal: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub metal: Option<f32>,
    #[serde(default)]
    pub roughness: Option<f32>,
    #[serde(default)]
    pub emissive: Option<f32>,
    #[serde(default)]
    pub occlusion: Option<f32>,
}

/// A string-keyed YAML mapping that keeps document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T>(pub Vec<(String, T)>);

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OrderedMap<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de, T> Deserialize<'de> for OrderedMap<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for OrderedMapVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = OrderedMap<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
