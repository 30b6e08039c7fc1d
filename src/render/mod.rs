//! Try-on rendering module
//!
//! This module contains:
//! - Landmark to canvas geometry (anchors, fit mapping)
//! - Ring overlay placement (render directives, calibration)
//! - Raster surface painting using tiny-skia (for preview and export)

pub mod geometry;
pub mod image;
pub mod overlay;
