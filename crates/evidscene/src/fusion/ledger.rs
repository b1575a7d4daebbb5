use crate::error::Result;
use crate::Detection;

/// Ordered detections from one fusion run over one image.
///
/// Order is backend-then-detection-index. Sorting by confidence is a
/// presentation concern (see [`crate::EvidenceReport::sorted_by_confidence`]).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvidenceLedger {
    /// Source image dimensions [width, height].
    pub image_size: [u32; 2],
    detections: Vec<Detection>,
}

impl EvidenceLedger {
    pub(crate) fn new(image_size: [u32; 2], detections: Vec<Detection>) -> Self {
        Self {
            image_size,
            detections,
        }
    }

    pub fn entries(&self) -> &[Detection] {
        &self.detections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Entries strictly above `cutoff`, in ledger order.
    pub fn visualized(&self, cutoff: f32) -> impl Iterator<Item = &Detection> + '_ {
        self.detections
            .iter()
            .filter(move |d| crate::render::is_visualized(d.confidence, cutoff))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a EvidenceLedger {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
