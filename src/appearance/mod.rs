//! Appearance support: document-level material and texture catalogues plus
//! the per-geometry, per-theme value arrays.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod values;

pub use values::{
    SolidCollectionMaterial, SolidCollectionTexture, SolidMaterial, SolidTexture,
    SurfaceCollectionMaterial, SurfaceCollectionTexture, TextureRefs, ValueRef,
};

/// Document-level appearance block: the catalogues that per-geometry value
/// arrays index into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    #[serde(rename = "default-theme-texture", skip_serializing_if = "Option::is_none")]
    pub default_theme_texture: Option<String>,

    #[serde(rename = "default-theme-material", skip_serializing_if = "Option::is_none")]
    pub default_theme_material: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,

    #[serde(rename = "vertices-texture", skip_serializing_if = "Vec::is_empty")]
    pub vertices_texture: Vec<[f64; 2]>,
}

impl Appearance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.default_theme_texture.is_none()
            && self.default_theme_material.is_none()
            && self.materials.is_empty()
            && self.textures.is_empty()
            && self.vertices_texture.is_empty()
    }
}

/// An X3D-style material definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "ambientIntensity", skip_serializing_if = "Option::is_none")]
    pub ambient_intensity: Option<f64>,

    #[serde(rename = "diffuseColor", skip_serializing_if = "Option::is_none")]
    pub diffuse_color: Option<[f64; 3]>,

    #[serde(rename = "emissiveColor", skip_serializing_if = "Option::is_none")]
    pub emissive_color: Option<[f64; 3]>,

    #[serde(rename = "specularColor", skip_serializing_if = "Option::is_none")]
    pub specular_color: Option<[f64; 3]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shininess: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,

    #[serde(rename = "isSmooth", skip_serializing_if = "Option::is_none")]
    pub is_smooth: Option<bool>,

    /// Members outside the core material schema.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A texture image reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture {
    /// Image format, e.g. "PNG" or "JPG".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub image_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "wrapMode", skip_serializing_if = "Option::is_none")]
    pub wrap_mode: Option<WrapMode>,

    #[serde(rename = "textureType", skip_serializing_if = "Option::is_none")]
    pub texture_type: Option<String>,

    #[serde(rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<[f64; 4]>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Texture wrap behavior outside the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    None,
    Wrap,
    Mirror,
    Clamp,
    Border,
}
