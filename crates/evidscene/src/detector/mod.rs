//! Detector adapters.
//!
//! A [`DetectorBackend`] wraps one object-detection runtime. The pipeline
//! never inspects backend types at runtime: every backend exposes the same
//! `infer` capability and is paired with a [`ClassTable`] and an
//! [`EvidenceSource`] tag inside a [`DetectorAdapter`].

mod cache;
mod class_table;
mod nms;
mod replay;

use std::sync::Arc;

use image::RgbImage;

use crate::error::{BackendError, Error, Result};
use crate::EvidenceSource;

pub use cache::ModelSlot;
pub use class_table::ClassTable;
pub use nms::suppress_overlaps;
pub use replay::ReplayBackend;

/// One detection as emitted by a backend, in native class ids.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawDetection {
    /// Backend-native class id.
    pub class_id: u32,
    /// Backend confidence.
    pub confidence: f32,
    /// Box `[x1, y1, x2, y2]` in source-image pixels (unclamped).
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
}

/// Object-detection runtime contract.
///
/// Implementations must be deterministic for a fixed image when the
/// underlying model is; the fusion ledger inherits their ordering.
///
/// # Example
///
/// ```
/// use evidscene::{BackendError, DetectorBackend, RawDetection};
/// use image::RgbImage;
///
/// struct Nothing;
///
/// impl DetectorBackend for Nothing {
///     fn name(&self) -> &str {
///         "nothing"
///     }
///     fn infer(&self, _: &RgbImage, _: f32, _: f32) -> Result<Vec<RawDetection>, BackendError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait DetectorBackend: Send + Sync {
    /// Human-readable backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Run inference. Candidates below `confidence_floor` may be omitted and
    /// overlapping candidates above `overlap_threshold` IoU suppressed.
    fn infer(
        &self,
        image: &RgbImage,
        confidence_floor: f32,
        overlap_threshold: f32,
    ) -> Result<Vec<RawDetection>, BackendError>;
}

/// A backend bound to its source tag and unified-label table.
#[derive(Clone)]
pub struct DetectorAdapter {
    source: EvidenceSource,
    backend: Arc<dyn DetectorBackend>,
    classes: ClassTable,
}

impl DetectorAdapter {
    pub fn new(source: EvidenceSource, backend: Arc<dyn DetectorBackend>, classes: ClassTable) -> Self {
        Self {
            source,
            backend,
            classes,
        }
    }

    pub fn source(&self) -> EvidenceSource {
        self.source
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub(crate) fn infer(
        &self,
        image: &RgbImage,
        confidence_floor: f32,
        overlap_threshold: f32,
    ) -> Result<Vec<RawDetection>> {
        self.backend
            .infer(image, confidence_floor, overlap_threshold)
            .map_err(|source| Error::InferenceFailure {
                backend: self.name().to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for DetectorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorAdapter")
            .field("source", &self.source)
            .field("backend", &self.name())
            .field("classes", &self.classes.len())
            .finish()
    }
}

/// Ordered set of detector adapters run by the fusion engine.
#[derive(Debug, Clone, Default)]
pub struct DetectorSet {
    adapters: Vec<DetectorAdapter>,
}

impl DetectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter; fusion runs adapters in insertion order.
    pub fn with(mut self, adapter: DetectorAdapter) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Build the standard two-backend set from load results.
    ///
    /// A primary that failed to load is fatal. A specialized backend that
    /// failed to load is logged and left out, so the pipeline runs with the
    /// primary alone.
    pub fn assemble(
        primary: Result<DetectorAdapter>,
        specialized: Option<Result<DetectorAdapter>>,
    ) -> Result<Self> {
        let primary = primary?;
        let mut set = Self::new().with(primary);
        match specialized {
            Some(Ok(adapter)) => set.adapters.push(adapter),
            Some(Err(err)) => {
                tracing::warn!("Specialized detector unavailable, continuing without it: {err}");
            }
            None => {
                tracing::info!("No specialized detector configured");
            }
        }
        Ok(set)
    }

    pub fn adapters(&self) -> &[DetectorAdapter] {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Union of labels the set can emit.
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .adapters
            .iter()
            .flat_map(|a| a.classes.labels())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}
