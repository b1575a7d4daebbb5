//! One-call analysis: fuse, report, render, estimate depth, project.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;

use crate::config::PipelineConfig;
use crate::depth::{estimate_depth, DepthBackend, DepthMap};
use crate::detector::DetectorSet;
use crate::error::{Error, Result};
use crate::fusion::{fuse, EvidenceLedger};
use crate::render::{render, LabelStyle};
use crate::report::EvidenceReport;
use crate::scene::{project, SceneDescription};

/// All artifacts of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Every fused detection, regardless of confidence.
    pub ledger: EvidenceLedger,
    pub report: EvidenceReport,
    /// Source image with visualized entries drawn.
    pub annotated: RgbImage,
    /// Raw depth estimate (not normalized).
    pub depth: DepthMap,
    pub scene: SceneDescription,
}

/// Owns the backends and configuration for repeated analyses.
pub struct Analyzer {
    config: PipelineConfig,
    detectors: DetectorSet,
    depth: Arc<dyn DepthBackend>,
    style: LabelStyle,
}

impl Analyzer {
    /// Validates `config` and loads the label font if one is configured.
    pub fn new(config: PipelineConfig, detectors: DetectorSet, depth: Arc<dyn DepthBackend>) -> Result<Self> {
        config.validate()?;
        if detectors.is_empty() {
            return Err(Error::InvalidConfig("no detector backends configured".into()));
        }
        let style = LabelStyle::from_config(&config.render)?;
        Ok(Self {
            config,
            detectors,
            depth,
            style,
        })
    }

    /// Replace the label style (e.g. with an in-memory font).
    pub fn with_style(mut self, style: LabelStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detectors(&self) -> &DetectorSet {
        &self.detectors
    }

    /// Run the full pipeline on one image.
    ///
    /// Detector and depth failures abort the call; a missing depth sample
    /// only degrades the affected marker.
    pub fn analyze(&self, image: &RgbImage) -> Result<Analysis> {
        let cutoff = self.config.policy.visual_cutoff;

        let ledger = fuse(image, &self.detectors, &self.config.fusion)?;
        let report = EvidenceReport::from_ledger(&ledger, &self.config.policy);
        let annotated = render(image, &ledger, cutoff, &self.style);
        let depth = estimate_depth(self.depth.as_ref(), image)?;
        let scene = project(
            ledger.visualized(cutoff),
            image,
            &depth,
            &self.config.wall,
            &self.config.labels,
        )?;

        let summary = report.summary();
        tracing::info!(
            "Analysis: {} ledger entries, {} visualized, {} weapons, {} persons",
            ledger.len(),
            summary.total,
            summary.weapons,
            summary.persons
        );

        Ok(Analysis {
            ledger,
            report,
            annotated,
            depth,
            scene,
        })
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("detectors", &self.detectors)
            .field("depth", &self.depth.name())
            .field("style", &self.style)
            .finish()
    }
}

/// Decode an encoded image; fails fast before any backend runs.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::MalformedImage(e.to_string()))?;
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(Error::MalformedImage("decoded image has no pixels".into()));
    }
    Ok(rgb)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    decode_image(&bytes)
}
