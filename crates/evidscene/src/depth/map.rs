//! Dense depth maps, normalization and sampling.

use image::{GrayImage, Luma};

use crate::error::{Error, Result};

/// Depth used when a sample cannot be taken.
pub(crate) const FALLBACK_DEPTH: f32 = 0.5;

/// Row-major per-pixel depth values of arbitrary range.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

/// Outcome of sampling a depth map at a normalized coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthSample {
    /// Value read from the map.
    Sampled(f32),
    /// Coordinate was unusable; mid-range depth substituted.
    Fallback(f32),
}

impl DepthSample {
    pub fn value(self) -> f32 {
        match self {
            Self::Sampled(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl DepthMap {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(Error::InvalidConfig(format!(
                "depth map {width}x{height} expects {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Build from `rows[y][x]`; all rows must have equal length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, Vec::len) as u32;
        if rows.iter().any(|r| r.len() != width as usize) {
            return Err(Error::InvalidConfig("depth rows have unequal length".into()));
        }
        Self::new(width, height, rows.concat())
    }

    /// Interpret an 8-bit depth image (0..=255).
    pub fn from_luma(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            values: img.pixels().map(|p| p[0] as f32).collect(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// `(min, max)` over finite values.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Map values into [0, 1].
    ///
    /// Maps already inside [0, 1] are kept as-is; otherwise values are
    /// rescaled with `(v - min) / (max - min)`. A constant map (or one with no
    /// finite values) normalizes to all zeros. Non-finite entries become 0.
    pub fn normalized(&self) -> DepthMap {
        let values = match self.range() {
            None => vec![0.0; self.values.len()],
            Some((lo, hi)) if hi == lo => vec![0.0; self.values.len()],
            Some((lo, hi)) if lo >= 0.0 && hi <= 1.0 => self
                .values
                .iter()
                .map(|&v| if v.is_finite() { v } else { 0.0 })
                .collect(),
            Some((lo, hi)) => {
                let span = hi - lo;
                self.values
                    .iter()
                    .map(|&v| if v.is_finite() { (v - lo) / span } else { 0.0 })
                    .collect()
            }
        };
        DepthMap {
            width: self.width,
            height: self.height,
            values,
        }
    }

    /// Nearest-pixel lookup at normalized `(nx, ny)` ∈ [0, 1]², clamped to
    /// the array bounds.
    pub fn sample_normalized(&self, nx: f64, ny: f64) -> DepthSample {
        if self.width == 0 || self.height == 0 || !nx.is_finite() || !ny.is_finite() {
            return DepthSample::Fallback(FALLBACK_DEPTH);
        }
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let px = (nx * max_x).round().clamp(0.0, max_x) as u32;
        let py = (ny * max_y).round().clamp(0.0, max_y) as u32;
        match self.get(px, py) {
            Some(v) if v.is_finite() => DepthSample::Sampled(v),
            _ => DepthSample::Fallback(FALLBACK_DEPTH),
        }
    }

    /// 8-bit depth texture of the normalized map (near = bright).
    pub fn to_luma8(&self) -> GrayImage {
        let norm = self.normalized();
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = norm.get(x, y).unwrap_or(0.0);
            Luma([(v.clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }
}
