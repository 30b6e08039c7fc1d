//! Photo validation before it enters the session
//!
//! Checks run in a fixed order and the first failure wins: MIME type, byte
//! size, then resolution read from the image header. Pixels are only decoded
//! once the header passes.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::ImageReader;

use super::image::PhotoImage;
use crate::config::IngestLimits;
use crate::error::{Result, TryOnError};

const ACCEPTED_SUBTYPES: [&str; 3] = ["jpeg", "jpg", "png"];

/// An image blob as picked by the user or grabbed from the camera
#[derive(Clone, Debug)]
pub struct ImageCandidate {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageCandidate {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file, deriving the declared MIME type from its extension
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let mime_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
            Some("png") => "image/png".to_string(),
            Some(other) => format!("image/{other}"),
            None => "application/octet-stream".to_string(),
        };
        Ok(Self::new(mime_type, bytes))
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Whether a declared MIME type is one of the accepted photo types
pub fn is_accepted_mime(mime_type: &str) -> bool {
    let mime = mime_type.trim().to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/").unwrap_or(&mime);
    ACCEPTED_SUBTYPES.contains(&subtype)
}

/// Validate and decode a candidate photo
pub fn validate(candidate: &ImageCandidate, limits: &IngestLimits) -> Result<PhotoImage> {
    if !is_accepted_mime(&candidate.mime_type) {
        return Err(TryOnError::ImageType(candidate.mime_type.clone()));
    }

    let size = candidate.byte_size();
    if size > limits.max_bytes {
        return Err(TryOnError::ImageSize {
            size,
            limit: limits.max_bytes,
        });
    }

    let (width, height) = reader(&candidate.bytes)?
        .into_dimensions()
        .map_err(|e| TryOnError::ImageDecode(e.to_string()))?;
    if width > limits.max_dimension || height > limits.max_dimension {
        return Err(TryOnError::ImageResolution {
            width,
            height,
            max: limits.max_dimension,
        });
    }

    let rgba = reader(&candidate.bytes)?
        .decode()
        .map_err(|e| TryOnError::ImageDecode(e.to_string()))?
        .to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(TryOnError::ImageDecode("image has no pixels".into()));
    }

    Ok(PhotoImage::new(rgba, candidate.mime_type.clone(), size))
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TryOnError::ImageDecode(e.to_string()))
}
