//! Class-wise greedy overlap suppression.

use super::RawDetection;
use crate::PixelBox;

/// Keep the highest-confidence candidate of every overlapping same-class
/// group.
///
/// Candidates are visited in descending confidence (ties keep input order);
/// a candidate is dropped when its IoU with an already kept candidate of the
/// same class exceeds `iou_threshold`. The returned list is in visit order.
pub fn suppress_overlaps(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for cand in detections {
        let cand_box = PixelBox::from_xyxy(cand.bbox);
        let overlaps = kept.iter().any(|k| {
            k.class_id == cand.class_id && PixelBox::from_xyxy(k.bbox).iou(&cand_box) > iou_threshold
        });
        if !overlaps {
            kept.push(cand);
        }
    }
    kept
}
