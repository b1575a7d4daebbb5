//! Backend that serves recorded detections.
//!
//! Model runtimes live outside this crate. `ReplayBackend` stands in for one
//! by replaying the raw output of a previous inference run, recorded as JSON:
//!
//! ```json
//! [{"class_id": 43, "confidence": 0.5, "box": [10, 10, 50, 50]}]
//! ```

use std::path::Path;

use image::RgbImage;

use super::{suppress_overlaps, DetectorBackend, RawDetection};
use crate::error::{BackendError, Error, Result};

#[derive(Debug, Clone)]
pub struct ReplayBackend {
    name: String,
    detections: Vec<RawDetection>,
}

impl ReplayBackend {
    pub fn new(name: impl Into<String>, detections: Vec<RawDetection>) -> Self {
        Self {
            name: name.into(),
            detections,
        }
    }

    /// Load a recording. A missing or unreadable file means the backend is
    /// unavailable, not that the request failed.
    pub fn from_json_file(name: impl Into<String>, path: &Path) -> Result<Self> {
        let name = name.into();
        let data = std::fs::read_to_string(path).map_err(|e| Error::BackendUnavailable {
            backend: name.clone(),
            reason: format!("{}: {e}", path.display()),
        })?;
        let detections: Vec<RawDetection> =
            serde_json::from_str(&data).map_err(|e| Error::BackendUnavailable {
                backend: name.clone(),
                reason: format!("{}: {e}", path.display()),
            })?;
        tracing::debug!(
            "Loaded {} recorded detections for backend '{}'",
            detections.len(),
            name
        );
        Ok(Self::new(name, detections))
    }

    pub fn recorded(&self) -> &[RawDetection] {
        &self.detections
    }
}

impl DetectorBackend for ReplayBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(
        &self,
        _image: &RgbImage,
        confidence_floor: f32,
        overlap_threshold: f32,
    ) -> Result<Vec<RawDetection>, BackendError> {
        let candidates: Vec<RawDetection> = self
            .detections
            .iter()
            .copied()
            .filter(|d| d.confidence >= confidence_floor)
            .collect();
        Ok(suppress_overlaps(candidates, overlap_threshold))
    }
}
