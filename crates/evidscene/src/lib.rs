//! evidscene: evidence fusion over heterogeneous object detectors and
//! depth-displaced 3D scene projection.
//!
//! The pipeline stages are:
//!
//! 1. **Detectors** – backend adapters that return raw class-id detections.
//! 2. **Fusion** – maps native class ids to a unified vocabulary, tags each
//!    detection with its source and clamps boxes into one ordered ledger.
//! 3. **Render** – draws high-confidence ledger entries onto a copy of the
//!    source image with bounds-aware label placement.
//! 4. **Depth** – monocular depth backends and depth-map normalization.
//! 5. **Scene** – projects ledger entries onto a depth-displaced wall,
//!    resolves label collisions and emits a declarative scene description.
//! 6. **Report** – tabular per-detection records and an evidence summary.
//!
//! # Public API
//! - [`Analyzer`] runs the whole pipeline for one image
//! - [`fuse`], [`render`], [`project`] expose the individual stages
//! - [`DetectorBackend`] and [`DepthBackend`] are the seams for model runtimes

mod config;
mod depth;
mod detector;
mod error;
mod fusion;
mod pipeline;
mod render;
mod report;
mod scene;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{PipelineConfig, PolicyConfig};
pub use depth::{estimate_depth, DepthBackend, DepthImageBackend, DepthMap, DepthSample};
pub use detector::{
    suppress_overlaps, ClassTable, DetectorAdapter, DetectorBackend, DetectorSet, ModelSlot,
    RawDetection, ReplayBackend,
};
pub use error::{BackendError, Error, Result};
pub use fusion::{fuse, EvidenceLedger, FusionConfig};
pub use pipeline::{decode_image, load_image, Analysis, Analyzer};
pub use render::{
    is_visualized, label_text, place_label, render, EvidenceCategory, LabelLayout, LabelStyle,
    RenderConfig,
};
pub use report::{EvidenceReport, EvidenceSummary, ReportRecord};
pub use scene::{
    aframe, project, stack_labels, Connector, LabelPlacement, LabelStackConfig, LabelStacker,
    Marker, SceneAnchor, SceneDescription, Surface, TextureRef, ViewerRig, WallFrame,
    WallGeometry, SCENE_SCHEMA_V1,
};

/// Which detector backend produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// General-purpose model (COCO-style class set).
    Standard,
    /// Domain-specialized model (firearms, biohazard stains).
    Specialized,
}

impl EvidenceSource {
    /// Tag used in exported report records.
    pub fn report_tag(self) -> &'static str {
        match self {
            Self::Standard => "Standard_Model",
            Self::Specialized => "Custom_Model",
        }
    }
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.report_tag())
    }
}

/// Axis-aligned box `(x1, y1, x2, y2)` in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PixelBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl PixelBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_xyxy(xyxy: [f32; 4]) -> Self {
        Self::new(xyxy[0], xyxy[1], xyxy[2], xyxy[3])
    }

    pub fn to_xyxy(self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Order the corners and clamp into `[0, width] × [0, height]`.
    ///
    /// Non-finite coordinates collapse to 0. The result always satisfies
    /// `0 <= x1 <= x2 <= width` and `0 <= y1 <= y2 <= height`.
    pub fn clamped(self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let fix = |v: f32, max: f32| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        let (x1, x2) = (fix(self.x1, w), fix(self.x2, w));
        let (y1, y2) = (fix(self.y1, h), fix(self.y2, h));
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> [f32; 2] {
        [(self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5]
    }

    /// Intersection over union; 0 when either box is degenerate.
    pub fn iou(&self, other: &PixelBox) -> f32 {
        let ix = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let iy = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }

    /// Integer pixel corners, truncated toward zero.
    pub fn to_pixel_corners(self) -> [i32; 4] {
        [
            self.x1 as i32,
            self.y1 as i32,
            self.x2 as i32,
            self.y2 as i32,
        ]
    }
}

/// One candidate object found by one detector backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    /// Backend that produced the detection.
    pub source: EvidenceSource,
    /// Label from the unified evidence vocabulary.
    pub label: String,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
    /// Box clamped to the source image bounds.
    #[serde(rename = "box")]
    pub bbox: PixelBox,
}
