use nalgebra::{Point3, Vector3};

use super::wall::WallFrame;
use crate::depth::DepthMap;
use crate::PixelBox;

/// 3D placement of one detection on the displaced wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAnchor {
    /// Box centroid on the displaced surface.
    pub position: Point3<f64>,
    /// Projected box width in world units.
    pub width: f64,
    /// Projected box height in world units.
    pub height: f64,
    /// Normalized depth used for z.
    pub depth: f64,
    /// The depth sample was substituted.
    pub depth_fallback: bool,
}

impl SceneAnchor {
    /// `depth` must already be normalized to [0, 1].
    pub fn compute(frame: &WallFrame, bbox: &PixelBox, image_size: [u32; 2], depth: &DepthMap) -> Self {
        let iw = image_size[0].max(1) as f64;
        let ih = image_size[1].max(1) as f64;
        let nx1 = bbox.x1 as f64 / iw;
        let ny1 = bbox.y1 as f64 / ih;
        let nx2 = bbox.x2 as f64 / iw;
        let ny2 = bbox.y2 as f64 / ih;
        let ncx = (nx1 + nx2) / 2.0;
        let ncy = (ny1 + ny2) / 2.0;

        let (x, y) = frame.map_normalized(ncx, ncy);
        let sample = depth.sample_normalized(ncx, ncy);
        if sample.is_fallback() {
            tracing::warn!(
                "Depth sample at ({:.3}, {:.3}) unavailable, using {:.2}",
                ncx,
                ncy,
                sample.value()
            );
        }
        let d = sample.value() as f64;

        Self {
            position: Point3::new(x, y, frame.marker_z(d)),
            width: (nx2 - nx1) * frame.width(),
            height: (ny2 - ny1) * frame.height(),
            depth: d,
            depth_fallback: sample.is_fallback(),
        }
    }

    /// Center of the box's top edge.
    pub fn top(&self) -> Point3<f64> {
        self.position + Vector3::new(0.0, self.height / 2.0, 0.0)
    }
}
