//! Export of the composited try-on image
//!
//! Flattens the render surface into a PNG and names it after the ring and
//! color. Delivery to share/download sinks lives in [`share`].

pub mod share;

use std::io;

use image::RgbaImage;

use crate::error::{Result, TryOnError};
use crate::render::image::Surface;
use crate::session::state::RingAssignment;

/// Flattened PNG ready for sharing or download
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

/// Flatten the surface into a PNG artifact
///
/// Fails without producing anything if an opaque cross-origin image was drawn.
pub fn flatten(surface: &Surface, assignment: Option<&RingAssignment>) -> Result<ExportArtifact> {
    if surface.is_tainted() {
        return Err(TryOnError::ExportCapture(
            "surface contains a ring image served without CORS".into(),
        ));
    }

    let img = surface.to_rgba();
    let mut png = Vec::new();
    write_png(&mut png, &img).map_err(|e| TryOnError::ExportCapture(e.to_string()))?;
    if png.is_empty() {
        return Err(TryOnError::ExportCapture("encoder produced no data".into()));
    }

    let filename = match assignment {
        Some(a) => suggested_filename(&a.ring.name, &a.color.name),
        None => timestamped_filename(),
    };
    log::info!(
        "Exported {}x{} try-on image as {} ({} bytes)",
        img.width(),
        img.height(),
        filename,
        png.len()
    );
    Ok(ExportArtifact {
        png,
        width: img.width(),
        height: img.height(),
        filename,
    })
}

/// `ring-color.png`, lowercased with anything but letters and digits turned into dashes
pub fn suggested_filename(ring_name: &str, color_name: &str) -> String {
    let ring = slug(ring_name);
    let color = slug(color_name);
    match (ring.is_empty(), color.is_empty()) {
        (true, true) => timestamped_filename(),
        (false, true) => format!("{ring}.png"),
        (true, false) => format!("{color}.png"),
        (false, false) => format!("{ring}-{color}.png"),
    }
}

fn timestamped_filename() -> String {
    chrono::Local::now()
        .format("ring-try-on_%Y-%m-%d_%H-%M-%S.png")
        .to_string()
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

pub(crate) fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}
