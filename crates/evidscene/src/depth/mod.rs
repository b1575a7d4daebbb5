//! Depth estimator adapters.
//!
//! A [`DepthBackend`] wraps a monocular depth model. Its output is an
//! estimate of arbitrary range; consumers normalize it with
//! [`DepthMap::normalized`] before use.

mod map;

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{BackendError, Error, Result};

pub use map::{DepthMap, DepthSample};

/// Monocular depth runtime contract.
pub trait DepthBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Estimate per-pixel depth for `image`.
    fn infer(&self, image: &RgbImage) -> Result<DepthMap, BackendError>;
}

/// Run a depth backend, attaching its name to any failure.
pub fn estimate_depth(backend: &dyn DepthBackend, image: &RgbImage) -> Result<DepthMap> {
    let map = backend
        .infer(image)
        .map_err(|source| Error::InferenceFailure {
            backend: backend.name().to_string(),
            source,
        })?;
    let (w, h) = map.dimensions();
    match map.range() {
        Some((lo, hi)) => tracing::debug!(
            "Depth '{}': {}x{} range [{:.3}, {:.3}]",
            backend.name(),
            w,
            h,
            lo,
            hi
        ),
        None => tracing::warn!("Depth '{}': {}x{} has no finite values", backend.name(), w, h),
    }
    Ok(map)
}

/// Serves a depth image previously produced by an external depth model.
#[derive(Debug, Clone)]
pub struct DepthImageBackend {
    path: PathBuf,
    map: DepthMap,
}

impl DepthImageBackend {
    /// Load the depth image. Decoding failures mean the backend is unavailable.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| Error::BackendUnavailable {
            backend: "depth-image".into(),
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            map: DepthMap::from_luma(&img.to_luma8()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DepthBackend for DepthImageBackend {
    fn name(&self) -> &str {
        "depth-image"
    }

    fn infer(&self, image: &RgbImage) -> Result<DepthMap, BackendError> {
        let (w, h) = image.dimensions();
        let (dw, dh) = self.map.dimensions();
        if (w, h) != (dw, dh) {
            tracing::debug!("Depth image {dw}x{dh} differs from source {w}x{h}; sampling is normalized");
        }
        Ok(self.map.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gray_image, RampDepth};
    use image::{GrayImage, Luma};

    #[test]
    fn estimate_depth_passes_map_through() {
        let map = estimate_depth(&RampDepth { max: 200.0 }, &gray_image(5, 3)).unwrap();
        assert_eq!(map.dimensions(), (5, 3));
        assert_eq!(map.range(), Some((0.0, 200.0)));
    }

    #[test]
    fn depth_image_backend_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.png");
        GrayImage::from_fn(4, 2, |x, _| Luma([(x * 60) as u8]))
            .save(&path)
            .unwrap();
        let backend = DepthImageBackend::open(&path).unwrap();
        let map = estimate_depth(&backend, &gray_image(8, 4)).unwrap();
        assert_eq!(map.get(3, 1), Some(180.0));
    }

    #[test]
    fn missing_depth_image_is_unavailable() {
        let err = DepthImageBackend::open(Path::new("/nonexistent/depth.png")).unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { .. }));
    }
}
