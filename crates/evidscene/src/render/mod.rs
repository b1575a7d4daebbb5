//! Visualization renderer.
//!
//! Draws boxes and `"{label} {confidence:.0%}"` labels for ledger entries
//! above the visual cutoff onto a copy of the source image. The ledger is
//! never filtered or mutated; visualization is a view.

mod layout;
mod palette;

use std::path::PathBuf;

use ab_glyph::FontArc;
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::error::{Error, Result};
use crate::fusion::EvidenceLedger;
use crate::Detection;

pub use layout::{place_label, LabelLayout};
pub use palette::EvidenceCategory;

/// Raster annotation settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// TrueType/OpenType font for label text. `None` uses the bundled
    /// DejaVu Sans Mono.
    pub font_path: Option<PathBuf>,
    /// Text height in pixels.
    pub text_scale: f32,
    /// Box border thickness in pixels.
    pub box_thickness: u32,
    /// Padding between label text and its background edge (pixels).
    pub label_padding: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            text_scale: 24.0,
            box_thickness: 3,
            label_padding: 10,
        }
    }
}

// DejaVu Sans Mono, Bitstream Vera license (assets/DejaVuSansMono-LICENSE.txt).
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

// Fallback glyph metrics as fractions of the text scale, used only when no
// font could be loaded.
const FALLBACK_ADVANCE: f32 = 0.55;
const FALLBACK_HEIGHT: f32 = 0.75;

fn bundled_font() -> Option<FontArc> {
    match FontArc::try_from_slice(BUNDLED_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!("Bundled label font failed to parse: {e}; labels drawn without text");
            None
        }
    }
}

/// Resolved label style (font loaded).
#[derive(Clone)]
pub struct LabelStyle {
    font: Option<FontArc>,
    text_scale: f32,
    box_thickness: u32,
    padding: u32,
}

impl LabelStyle {
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        let font = match &config.font_path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
                let font = FontArc::try_from_vec(bytes).map_err(|e| {
                    Error::InvalidConfig(format!("font {}: {e}", path.display()))
                })?;
                Some(font)
            }
            None => bundled_font(),
        };
        Ok(Self {
            font,
            text_scale: config.text_scale,
            box_thickness: config.box_thickness,
            padding: config.label_padding,
        })
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Text extents (w, h) in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.text_scale, font, text),
            None => {
                let n = text.chars().count() as f32;
                (
                    (n * self.text_scale * FALLBACK_ADVANCE).ceil() as u32,
                    (self.text_scale * FALLBACK_HEIGHT).ceil() as u32,
                )
            }
        }
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        let cfg = RenderConfig::default();
        Self {
            font: bundled_font(),
            text_scale: cfg.text_scale,
            box_thickness: cfg.box_thickness,
            padding: cfg.label_padding,
        }
    }
}

impl std::fmt::Debug for LabelStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelStyle")
            .field("font", &self.font.is_some())
            .field("text_scale", &self.text_scale)
            .field("box_thickness", &self.box_thickness)
            .field("padding", &self.padding)
            .finish()
    }
}

/// Visualization filter: strictly above the cutoff.
pub fn is_visualized(confidence: f32, visual_cutoff: f32) -> bool {
    confidence > visual_cutoff
}

/// Label text drawn next to a box, e.g. `"Knife 50%"`.
///
/// The percentage is computed in f64 so that values like 0.175 round from
/// their stored value (17.4999...) rather than an f32 product.
pub fn label_text(detection: &Detection) -> String {
    format!("{} {:.0}%", detection.label, f64::from(detection.confidence) * 100.0)
}

/// Annotate a copy of `image` with every ledger entry above `visual_cutoff`.
pub fn render(
    image: &RgbImage,
    ledger: &EvidenceLedger,
    visual_cutoff: f32,
    style: &LabelStyle,
) -> RgbImage {
    let mut canvas = image.clone();
    let (w, _) = canvas.dimensions();

    let mut n_drawn = 0usize;
    for det in ledger.visualized(visual_cutoff) {
        let color = EvidenceCategory::classify(&det.label).raster_color();
        let corners = det.bbox.to_pixel_corners();
        draw_box(&mut canvas, corners, color, style.box_thickness);

        let text = label_text(det);
        let layout = place_label(corners, style.measure(&text), w, style.padding as i32);
        if let Some(rect) = rect_from_corners(layout.background) {
            draw_filled_rect_mut(&mut canvas, rect, palette::LABEL_BACKGROUND);
        }
        if let Some(font) = &style.font {
            draw_text_mut(
                &mut canvas,
                palette::LABEL_TEXT,
                layout.text_origin[0],
                layout.text_origin[1],
                style.text_scale,
                font,
                &text,
            );
        }
        n_drawn += 1;
    }

    tracing::debug!(
        "Rendered {}/{} ledger entries above cutoff {:.2}",
        n_drawn,
        ledger.len(),
        visual_cutoff
    );
    canvas
}

fn draw_box(canvas: &mut RgbImage, corners: [i32; 4], color: image::Rgb<u8>, thickness: u32) {
    let [x1, y1, x2, y2] = corners;
    for t in 0..thickness as i32 {
        match rect_from_corners([x1 + t, y1 + t, x2 - t, y2 - t]) {
            Some(rect) => draw_hollow_rect_mut(canvas, rect, color),
            None => break,
        }
    }
}

/// Rect covering `[x1, x2) × [y1, y2)`; `None` when empty.
fn rect_from_corners(c: [i32; 4]) -> Option<Rect> {
    let [x1, y1, x2, y2] = c;
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(Rect::at(x1, y1).of_size((x2 - x1) as u32, (y2 - y1) as u32))
}
