//! Ring overlay placement
//!
//! Turns the selected finger's anchor and the loaded ring artwork into a
//! render directive. Painting happens in [`super::image`].

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::assets::OverlayAsset;
use crate::config::OverlayParams;
use crate::domain::{Finger, RingAnchor};
use crate::error::{Result, TryOnError};

/// Per-finger placement tweak applied on top of the detected anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub dx: f32,
    pub dy: f32,
    /// Extra rotation in radians
    pub angle_offset: f32,
    pub size_multiplier: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            angle_offset: 0.0,
            size_multiplier: 1.0,
        }
    }
}

/// Where and how to draw the ring artwork on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderDirective {
    pub finger: Finger,
    /// Center of the artwork in canvas pixels
    pub x: f32,
    pub y: f32,
    /// Rotation in radians
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
}

/// Artwork width for an anchor segment length
///
/// Falls back to a fixed width when the length is not a usable number.
pub fn overlay_width(length: f32, params: &OverlayParams, size_multiplier: f32) -> f32 {
    if !length.is_finite() {
        return params.fallback_width;
    }
    (length * params.length_factor).clamp(params.min_width, params.max_width) * size_multiplier
}

/// Build the render directive for one finger
///
/// The artwork is authored along the horizontal axis, so it is turned a
/// quarter turn to sit across the finger.
pub fn compose(
    anchor: &RingAnchor,
    asset: &OverlayAsset,
    calibration: &Calibration,
    params: &OverlayParams,
) -> Result<RenderDirective> {
    let (asset_w, asset_h) = asset.dimensions();
    if asset_w == 0 || asset_h == 0 {
        return Err(TryOnError::AssetLoad {
            url: asset.url.clone(),
            reason: "overlay image is empty".into(),
        });
    }

    let width = overlay_width(anchor.length, params, calibration.size_multiplier);
    let height = width * asset_h as f32 / asset_w as f32;

    Ok(RenderDirective {
        finger: anchor.finger,
        x: anchor.center_x + calibration.dx,
        y: anchor.center_y + calibration.dy,
        rotation: anchor.angle + FRAC_PI_2 + calibration.angle_offset,
        width,
        height,
    })
}
