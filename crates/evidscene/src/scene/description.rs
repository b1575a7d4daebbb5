//! Declarative scene output consumed by a 3D presentation layer.

use std::io::Cursor;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageBuffer, ImageFormat, PixelWithColorType};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::EvidenceCategory;

/// Schema tag written into every serialized scene.
pub const SCENE_SCHEMA_V1: &str = "evidscene.scene.v1";

/// Image source for a surface texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextureRef {
    /// Inline `data:` URI.
    DataUri(String),
    /// File written next to the scene.
    Path(PathBuf),
}

impl TextureRef {
    /// Encode an image as an inline PNG data URI.
    pub fn png_data_uri<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Self>
    where
        P: PixelWithColorType,
        [P::Subpixel]: image::EncodableLayout,
    {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(|source| Error::Encode {
                what: "texture png",
                source,
            })?;
        Ok(Self::DataUri(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(buf.into_inner())
        )))
    }

    /// Value usable as an HTML `src` attribute.
    pub fn as_src(&self) -> String {
        match self {
            Self::DataUri(uri) => uri.clone(),
            Self::Path(p) => p.display().to_string(),
        }
    }
}

/// The displaced wall primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub position: [f64; 3],
    pub width: f64,
    pub height: f64,
    pub segments: u32,
    pub color_texture: TextureRef,
    pub depth_texture: TextureRef,
    pub displacement_scale: f64,
    pub displacement_bias: f64,
}

/// Line from a shifted label back to its marker center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

/// One detection in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub label: String,
    pub confidence: f32,
    /// Display text, e.g. `"Knife 50%"`.
    pub text: String,
    pub category: EvidenceCategory,
    /// `#rrggbb`.
    pub color: String,
    pub position: [f64; 3],
    /// Box extents `(width, height, depth)`.
    pub size: [f64; 3],
    pub label_position: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,
    /// The depth sample was substituted with the mid-range fallback.
    #[serde(default)]
    pub depth_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerRig {
    pub position: [f64; 3],
}

/// Complete scene: one surface plus one marker per detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub schema: String,
    pub image_size: [u32; 2],
    pub viewer: ViewerRig,
    pub surface: Surface,
    pub markers: Vec<Marker>,
}

impl SceneDescription {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
