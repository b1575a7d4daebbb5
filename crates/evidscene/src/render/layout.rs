//! Label background placement relative to a detection box.

/// Pixel placement of one label: background rectangle and text origin.
///
/// Coordinates may be negative when a label wider than the image is shifted
/// left; drawing clips to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    /// Background `[x1, y1, x2, y2]`.
    pub background: [i32; 4],
    /// Top-left corner of the text.
    pub text_origin: [i32; 2],
    /// Label was flipped below the box.
    pub flipped: bool,
    /// Horizontal shift applied to stay inside the right edge.
    pub shift_left: i32,
}

/// Place a label of `text_size` (w, h) next to `bbox` (`[x1, y1, x2, y2]`).
///
/// Default is above the box. If that starts above row 0 it flips below the
/// box; then, independently, if it overflows `image_width` it is shifted left
/// by the overflow.
pub fn place_label(bbox: [i32; 4], text_size: (u32, u32), image_width: u32, padding: i32) -> LabelLayout {
    let [x1, y1, _, _] = bbox;
    let tw = text_size.0 as i32;
    let th = text_size.1 as i32;
    let inset = padding / 2;

    let mut bg = [x1, y1 - th - padding, x1 + tw + padding, y1];
    let mut text = [x1 + inset, y1 - th - inset];

    let flipped = y1 - th - padding < 0;
    if flipped {
        bg[1] = y1;
        bg[3] = y1 + th + padding;
        text[1] = y1 + inset;
    }

    let overflow = x1 + tw + padding - image_width as i32;
    let shift_left = overflow.max(0);
    if shift_left > 0 {
        bg[0] -= shift_left;
        bg[2] -= shift_left;
        text[0] -= shift_left;
    }

    LabelLayout {
        background: bg,
        text_origin: text,
        flipped,
        shift_left,
    }
}
