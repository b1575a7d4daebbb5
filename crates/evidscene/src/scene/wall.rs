//! The virtual wall the source image is displaced onto.

use nalgebra::Point3;

use crate::error::{Error, Result};

/// Largest coordinate or length magnitude accepted for wall geometry, in
/// world units. Keeps label steps representable next to wall coordinates.
pub const MAX_WORLD_EXTENT: f64 = 1e6;

/// Fixed world placement of the wall and viewer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WallGeometry {
    /// Wall center (x, y, z) in world units. z is the undisplaced depth.
    pub center: [f64; 3],
    /// Wall width in world units; height follows the image aspect ratio.
    pub width: f64,
    /// World-unit displacement at normalized depth 1.0.
    pub displacement_scale: f64,
    /// Constant displacement offset applied by the renderer.
    pub displacement_bias: f64,
    /// Forward offset of markers so they never sit exactly on the surface.
    pub marker_forward_bias: f64,
    /// Thickness of marker boxes along z.
    pub marker_depth: f64,
    /// Surface mesh resolution per axis.
    pub segments: u32,
    /// Viewer eye position.
    pub viewer_position: [f64; 3],
}

impl Default for WallGeometry {
    fn default() -> Self {
        Self {
            center: [0.0, 1.6, -4.0],
            width: 12.0,
            displacement_scale: 3.5,
            displacement_bias: 0.0,
            marker_forward_bias: 0.1,
            marker_depth: 0.1,
            segments: 128,
            viewer_position: [0.0, 1.6, 2.0],
        }
    }
}

impl WallGeometry {
    pub fn validate(&self) -> Result<()> {
        let finite = self.center.iter().chain(&self.viewer_position).all(|v| v.is_finite())
            && self.displacement_scale.is_finite()
            && self.displacement_bias.is_finite()
            && self.marker_forward_bias.is_finite()
            && self.marker_depth.is_finite();
        if !finite {
            return Err(Error::InvalidConfig("wall geometry has non-finite values".into()));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "wall width must be positive, got {}",
                self.width
            )));
        }
        let out_of_range = self
            .center
            .iter()
            .chain(&self.viewer_position)
            .chain([
                &self.width,
                &self.displacement_scale,
                &self.displacement_bias,
                &self.marker_forward_bias,
                &self.marker_depth,
            ])
            .any(|v| v.abs() > MAX_WORLD_EXTENT);
        if out_of_range {
            return Err(Error::InvalidConfig(format!(
                "wall geometry values must be within ±{MAX_WORLD_EXTENT}"
            )));
        }
        if self.segments == 0 {
            return Err(Error::InvalidConfig("wall segments must be at least 1".into()));
        }
        Ok(())
    }
}

/// Wall geometry resolved against one source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFrame {
    center: Point3<f64>,
    width: f64,
    height: f64,
    displacement_scale: f64,
    forward_bias: f64,
}

impl WallFrame {
    /// Derive the frame; height is `width × image_height / image_width` so
    /// the image is never distorted.
    pub fn new(geometry: &WallGeometry, image_width: u32, image_height: u32) -> Result<Self> {
        geometry.validate()?;
        if image_width == 0 || image_height == 0 {
            return Err(Error::MalformedImage(format!(
                "cannot frame a {image_width}x{image_height} image"
            )));
        }
        let [cx, cy, cz] = geometry.center;
        Ok(Self {
            center: Point3::new(cx, cy, cz),
            width: geometry.width,
            height: geometry.width * image_height as f64 / image_width as f64,
            displacement_scale: geometry.displacement_scale,
            forward_bias: geometry.marker_forward_bias,
        })
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn x_min(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn y_max(&self) -> f64 {
        self.center.y + self.height / 2.0
    }

    /// Map a normalized image coordinate onto the wall plane. Image row 0 is
    /// the top of the wall.
    pub fn map_normalized(&self, nx: f64, ny: f64) -> (f64, f64) {
        (self.x_min() + nx * self.width, self.y_max() - ny * self.height)
    }

    /// Marker depth for a normalized depth sample.
    pub fn marker_z(&self, depth: f64) -> f64 {
        self.center.z + depth * self.displacement_scale + self.forward_bias
    }
}
