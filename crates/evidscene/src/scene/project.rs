use image::{GrayImage, Luma, RgbImage};
use nalgebra::Point3;

use super::anchor::SceneAnchor;
use super::description::{
    Connector, Marker, SceneDescription, Surface, TextureRef, ViewerRig, SCENE_SCHEMA_V1,
};
use super::labels::{LabelStackConfig, LabelStacker};
use super::wall::{WallFrame, WallGeometry};
use crate::depth::DepthMap;
use crate::error::Result;
use crate::render::{label_text, EvidenceCategory};
use crate::Detection;

/// Project detections onto the depth-displaced wall.
///
/// `depth` may have any range; it is normalized once here. Detections are
/// processed in iteration order, which also fixes label stacking priority.
/// A missing depth sample substitutes the mid-range fallback for that
/// marker only.
pub fn project<'a, I>(
    detections: I,
    image: &RgbImage,
    depth: &DepthMap,
    wall: &WallGeometry,
    labels: &LabelStackConfig,
) -> Result<SceneDescription>
where
    I: IntoIterator<Item = &'a Detection>,
{
    labels.validate()?;
    let (iw, ih) = image.dimensions();
    let frame = WallFrame::new(wall, iw, ih)?;
    let depth = depth.normalized();
    let depth_texture = match depth.dimensions() {
        // PNG cannot encode an empty image; a mid-gray pixel matches the fallback depth.
        (0, _) | (_, 0) => GrayImage::from_pixel(1, 1, Luma([128])),
        _ => depth.to_luma8(),
    };

    let surface = Surface {
        position: to_array(frame.center()),
        width: frame.width(),
        height: frame.height(),
        segments: wall.segments,
        color_texture: TextureRef::png_data_uri(image)?,
        depth_texture: TextureRef::png_data_uri(&depth_texture)?,
        displacement_scale: wall.displacement_scale,
        displacement_bias: wall.displacement_bias,
    };

    let mut stacker = LabelStacker::new(labels);
    let mut markers = Vec::new();
    let mut n_fallback = 0usize;
    for det in detections {
        let anchor = SceneAnchor::compute(&frame, &det.bbox, [iw, ih], &depth);
        let top = anchor.top();
        let placement = stacker.place(Point3::new(top.x, top.y + labels.gap, top.z));
        let connector = placement.was_shifted().then(|| Connector {
            start: to_array(placement.position),
            end: to_array(anchor.position),
        });
        if anchor.depth_fallback {
            n_fallback += 1;
        }

        let category = EvidenceCategory::classify(&det.label);
        tracing::debug!(
            "Marker '{}' at ({:.2}, {:.2}, {:.2}), label steps {}",
            det.label,
            anchor.position.x,
            anchor.position.y,
            anchor.position.z,
            placement.steps
        );
        markers.push(Marker {
            label: det.label.clone(),
            confidence: det.confidence,
            text: label_text(det),
            category,
            color: category.scene_color().to_string(),
            position: to_array(anchor.position),
            size: [anchor.width, anchor.height, wall.marker_depth],
            label_position: to_array(placement.position),
            connector,
            depth_fallback: anchor.depth_fallback,
        });
    }

    tracing::info!(
        "Projected {} markers onto {:.2}x{:.2} wall ({} depth fallbacks)",
        markers.len(),
        frame.width(),
        frame.height(),
        n_fallback
    );

    Ok(SceneDescription {
        schema: SCENE_SCHEMA_V1.to_string(),
        image_size: [iw, ih],
        viewer: ViewerRig {
            position: wall.viewer_position,
        },
        surface,
        markers,
    })
}

fn to_array(p: Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}
