//! Evidence fusion engine.
//!
//! Runs every detector adapter over the same image with a permissive
//! confidence floor, maps native class ids to the unified vocabulary and
//! appends survivors to one ledger in detector-then-box order. Confidence
//! policy is applied downstream (render, report), never here.

mod ledger;

use image::RgbImage;

use crate::detector::DetectorSet;
use crate::error::{Error, Result};
use crate::{Detection, PixelBox};

pub use ledger::EvidenceLedger;

/// Thresholds passed to every backend invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Inference confidence floor; near zero so every candidate reaches the ledger.
    pub confidence_floor: f32,
    /// IoU threshold for backend-side overlap suppression.
    pub overlap_threshold: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.001,
            overlap_threshold: 0.5,
        }
    }
}

/// Fuse the outputs of all detectors into one evidence ledger.
///
/// Any backend failure aborts the whole call; there is no partial ledger.
pub fn fuse(image: &RgbImage, detectors: &DetectorSet, config: &FusionConfig) -> Result<EvidenceLedger> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::MalformedImage(format!("image has no pixels ({w}x{h})")));
    }

    let mut detections = Vec::new();
    for adapter in detectors.adapters() {
        let raw = adapter.infer(image, config.confidence_floor, config.overlap_threshold)?;
        let n_raw = raw.len();
        let before = detections.len();

        for r in raw {
            let Some(label) = adapter.classes().label(r.class_id) else {
                tracing::trace!(
                    "Dropping class {} from '{}' (not in vocabulary)",
                    r.class_id,
                    adapter.name()
                );
                continue;
            };
            let confidence = if r.confidence.is_finite() {
                r.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            detections.push(Detection {
                source: adapter.source(),
                label: label.to_string(),
                confidence,
                bbox: PixelBox::from_xyxy(r.bbox).clamped(w, h),
            });
        }

        tracing::debug!(
            "Backend '{}' ({}): {} raw, {} kept",
            adapter.name(),
            adapter.source(),
            n_raw,
            detections.len() - before,
        );
    }

    tracing::info!(
        "Fused {} detections from {} backends",
        detections.len(),
        detectors.len()
    );
    Ok(EvidenceLedger::new([w, h], detections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{ClassTable, DetectorAdapter};
    use crate::test_utils::{gray_image, raw, FailingBackend, FixedBackend};
    use crate::EvidenceSource;
    use std::sync::Arc;

    fn two_backend_set() -> DetectorSet {
        let general = FixedBackend::new(
            "general",
            vec![
                raw(43, 0.5, [10.0, 10.0, 50.0, 50.0]),
                raw(2, 0.99, [0.0, 0.0, 20.0, 20.0]),
                raw(0, 0.2, [-15.0, 80.0, 130.0, 140.0]),
            ],
        );
        let forensic = FixedBackend::new(
            "forensic",
            vec![raw(1, 0.8, [60.0, 60.0, 90.0, 90.0]), raw(9, 0.9, [0.0, 0.0, 1.0, 1.0])],
        );
        DetectorSet::new()
            .with(DetectorAdapter::new(
                EvidenceSource::Standard,
                Arc::new(general),
                ClassTable::coco_evidence(),
            ))
            .with(DetectorAdapter::new(
                EvidenceSource::Specialized,
                Arc::new(forensic),
                ClassTable::forensic(),
            ))
    }

    #[test]
    fn unmapped_classes_are_dropped_and_order_kept() {
        let ledger = fuse(&gray_image(100, 100), &two_backend_set(), &FusionConfig::default()).unwrap();
        let labels: Vec<&str> = ledger.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Knife", "Person", "Blood Stain"]);
        assert_eq!(ledger.entries()[2].source, EvidenceSource::Specialized);
    }

    #[test]
    fn boxes_are_clamped_to_image() {
        let ledger = fuse(&gray_image(100, 100), &two_backend_set(), &FusionConfig::default()).unwrap();
        for d in ledger.iter() {
            let b = d.bbox;
            assert!(0.0 <= b.x1 && b.x1 <= b.x2 && b.x2 <= 100.0, "{b:?}");
            assert!(0.0 <= b.y1 && b.y1 <= b.y2 && b.y2 <= 100.0, "{b:?}");
        }
        assert_eq!(ledger.entries()[1].bbox, PixelBox::new(0.0, 80.0, 100.0, 100.0));
    }

    #[test]
    fn backend_failure_is_fatal() {
        let set = DetectorSet::new()
            .with(DetectorAdapter::new(
                EvidenceSource::Standard,
                Arc::new(FixedBackend::new("general", vec![raw(0, 0.9, [0.0, 0.0, 5.0, 5.0])])),
                ClassTable::coco_evidence(),
            ))
            .with(DetectorAdapter::new(
                EvidenceSource::Specialized,
                Arc::new(FailingBackend::new("forensic")),
                ClassTable::forensic(),
            ));
        let err = fuse(&gray_image(10, 10), &set, &FusionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InferenceFailure { .. }));
    }

    #[test]
    fn empty_image_rejected_before_backends() {
        let set = DetectorSet::new().with(DetectorAdapter::new(
            EvidenceSource::Standard,
            Arc::new(FailingBackend::new("general")),
            ClassTable::coco_evidence(),
        ));
        let err = fuse(&RgbImage::new(0, 0), &set, &FusionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedImage(_)));
    }

    #[test]
    fn fusion_is_idempotent() {
        let set = two_backend_set();
        let img = gray_image(100, 100);
        let a = fuse(&img, &set, &FusionConfig::default()).unwrap();
        let b = fuse(&img, &set, &FusionConfig::default()).unwrap();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }
}
