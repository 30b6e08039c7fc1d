//! Error taxonomy for the try-on session
//!
//! Every variant is recoverable: callers surface it as a notice and keep the
//! session alive.

use crate::session::state::StepKind;

/// Errors produced by the try-on engine
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TryOnError {
    #[error("unsupported image type `{0}`, only jpg, jpeg and png are accepted")]
    ImageType(String),
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    ImageSize { size: u64, limit: u64 },
    #[error("image resolution {width}x{height} exceeds {max}x{max}")]
    ImageResolution { width: u32, height: u32, max: u32 },
    #[error("image could not be decoded: {0}")]
    ImageDecode(String),
    #[error("hand detection unavailable: {0}")]
    DetectionUnavailable(String),
    #[error("ring asset `{url}` failed to load: {reason}")]
    AssetLoad { url: String, reason: String },
    #[error("ring `{ring_id}` with color `{color_id}` is not in the catalog")]
    UnknownRing { ring_id: String, color_id: String },
    #[error("export capture failed: {0}")]
    ExportCapture(String),
    #[error("invalid geometry input: {0}")]
    InvalidGeometryInput(String),
    #[error("`{action}` is not allowed in the {from:?} step")]
    InvalidTransition { from: StepKind, action: &'static str },
}

pub type Result<T, E = TryOnError> = std::result::Result<T, E>;
