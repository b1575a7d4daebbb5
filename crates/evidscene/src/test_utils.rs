//! Shared scripted backends and synthetic inputs for unit tests.

use image::{Rgb, RgbImage};

use crate::depth::{DepthBackend, DepthMap};
use crate::detector::{DetectorBackend, RawDetection};
use crate::error::BackendError;
use crate::{Detection, EvidenceSource, PixelBox};

pub(crate) fn raw(class_id: u32, confidence: f32, bbox: [f32; 4]) -> RawDetection {
    RawDetection {
        class_id,
        confidence,
        bbox,
    }
}

pub(crate) fn detection(label: &str, confidence: f32, bbox: [f32; 4]) -> Detection {
    Detection {
        source: EvidenceSource::Standard,
        label: label.to_string(),
        confidence,
        bbox: PixelBox::from_xyxy(bbox),
    }
}

/// Mid-gray image of the given size.
pub(crate) fn gray_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([128, 128, 128]))
}

/// Backend that returns its scripted detections verbatim.
pub(crate) struct FixedBackend {
    name: String,
    detections: Vec<RawDetection>,
}

impl FixedBackend {
    pub(crate) fn new(name: &str, detections: Vec<RawDetection>) -> Self {
        Self {
            name: name.to_string(),
            detections,
        }
    }

    pub(crate) fn empty(name: &str) -> Self {
        Self::new(name, Vec::new())
    }
}

impl DetectorBackend for FixedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, _: &RgbImage, _: f32, _: f32) -> Result<Vec<RawDetection>, BackendError> {
        Ok(self.detections.clone())
    }
}

/// Backend whose every call fails.
pub(crate) struct FailingBackend {
    name: String,
}

impl FailingBackend {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl DetectorBackend for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, _: &RgbImage, _: f32, _: f32) -> Result<Vec<RawDetection>, BackendError> {
        Err("device lost".into())
    }
}

/// Depth backend producing a horizontal ramp `0..=max` across the image.
pub(crate) struct RampDepth {
    pub(crate) max: f32,
}

impl DepthBackend for RampDepth {
    fn name(&self) -> &str {
        "ramp"
    }

    fn infer(&self, image: &RgbImage) -> Result<DepthMap, BackendError> {
        let (w, h) = image.dimensions();
        let denom = (w.max(2) - 1) as f32;
        let values = (0..h)
            .flat_map(|_| (0..w).map(move |x| x as f32 / denom * self.max))
            .collect();
        Ok(DepthMap::new(w, h, values)?)
    }
}
