//! A-Frame HTML export of a [`SceneDescription`].
//!
//! The document contains the displaced wall plane, one wireframe box with a
//! camera-facing label per marker (plus a connector line when the label was
//! shifted), a viewer rig at the configured eye position, and lights.

use std::fmt::{self, Write};

use super::description::{Marker, SceneDescription};

const AFRAME_JS: &str = "https://aframe.io/releases/1.4.0/aframe.min.js";
const LOOK_AT_JS: &str =
    "https://unpkg.com/aframe-look-at-component@0.8.0/dist/aframe-look-at-component.min.js";

/// Render the scene as a standalone HTML document.
pub fn to_html(scene: &SceneDescription) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_html(scene, &mut out);
    out
}

/// Stream the HTML document into `w`.
pub fn write_html<W: Write>(scene: &SceneDescription, w: &mut W) -> fmt::Result {
    let s = &scene.surface;
    let [vx, vy, vz] = scene.viewer.position;
    let [px, py, pz] = s.position;

    writeln!(w, "<!DOCTYPE html>")?;
    writeln!(w, "<html>")?;
    writeln!(w, "  <head>")?;
    writeln!(w, "    <meta charset=\"utf-8\">")?;
    writeln!(w, "    <title>Evidence Scene</title>")?;
    writeln!(w, "    <script src=\"{AFRAME_JS}\"></script>")?;
    writeln!(w, "    <script src=\"{LOOK_AT_JS}\"></script>")?;
    writeln!(w, "  </head>")?;
    writeln!(w, "  <body>")?;
    writeln!(
        w,
        "    <a-scene background=\"color: #050505\" fog=\"type: exponential; color: #000; density: 0.05\">"
    )?;
    writeln!(w, "      <a-light type=\"ambient\" color=\"#222\"></a-light>")?;
    writeln!(
        w,
        "      <a-light type=\"spot\" position=\"0 4 2\" target=\"#evidence-wall\" color=\"#a855f7\" intensity=\"0.8\" angle=\"60\" penumbra=\"0.5\"></a-light>"
    )?;
    writeln!(
        w,
        "      <a-light type=\"point\" position=\"2 2 2\" intensity=\"0.4\" color=\"#fff\"></a-light>"
    )?;
    writeln!(w, "      <a-entity id=\"rig\" position=\"{vx} {vy} {vz}\">")?;
    writeln!(w, "        <a-camera look-controls wasd-controls=\"acceleration: 20\">")?;
    writeln!(w, "          <a-cursor color=\"#a855f7\" scale=\"0.5 0.5 0.5\"></a-cursor>")?;
    writeln!(w, "        </a-camera>")?;
    writeln!(w, "      </a-entity>")?;

    writeln!(
        w,
        "      <a-plane id=\"evidence-wall\" src=\"{}\" displacement-map=\"{}\" displacement-scale=\"{}\" displacement-bias=\"{}\" position=\"{px} {py} {pz}\" width=\"{}\" height=\"{}\" segments-width=\"{seg}\" segments-height=\"{seg}\" material=\"shader: standard; roughness: 1; metalness: 0; side: double\"></a-plane>",
        escape_attr(&s.color_texture.as_src()),
        escape_attr(&s.depth_texture.as_src()),
        s.displacement_scale,
        s.displacement_bias,
        s.width,
        s.height,
        seg = s.segments,
    )?;

    for m in &scene.markers {
        write_marker(w, m)?;
    }

    writeln!(w, "    </a-scene>")?;
    writeln!(w, "  </body>")?;
    writeln!(w, "</html>")
}

fn write_marker<W: Write>(w: &mut W, m: &Marker) -> fmt::Result {
    let [x, y, z] = m.position;
    let [bw, bh, bd] = m.size;
    let [lx, ly, lz] = m.label_position;
    let color = escape_attr(&m.color);

    writeln!(w, "      <a-entity position=\"{x} {y} {z}\">")?;
    writeln!(
        w,
        "        <a-box width=\"{bw}\" height=\"{bh}\" depth=\"{bd}\" material=\"color: {color}; wireframe: true\"></a-box>"
    )?;
    writeln!(w, "      </a-entity>")?;
    writeln!(w, "      <a-entity position=\"{lx} {ly} {lz}\" look-at=\"[camera]\">")?;
    writeln!(
        w,
        "        <a-text value=\"{}\" color=\"white\" align=\"center\" width=\"4\"></a-text>",
        escape_attr(&m.label)
    )?;
    writeln!(
        w,
        "        <a-text value=\"{:.0}%\" position=\"0 -0.15 0\" color=\"#ddd\" align=\"center\" width=\"2.5\"></a-text>",
        f64::from(m.confidence) * 100.0
    )?;
    writeln!(w, "      </a-entity>")?;
    if let Some(c) = &m.connector {
        let [sx, sy, sz] = c.start;
        let [ex, ey, ez] = c.end;
        writeln!(
            w,
            "      <a-entity line=\"start: {sx} {sy} {sz}; end: {ex} {ey} {ez}; color: {color}; opacity: 0.5\"></a-entity>"
        )?;
    }
    Ok(())
}

/// Escape text for a double-quoted HTML attribute.
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
