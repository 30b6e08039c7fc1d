//! Photo acquisition module
//!
//! This module consolidates:
//! - Camera capture sessions (camera.rs)
//! - Upload validation (ingest.rs)
//! - Decoded photo type (image.rs)

pub mod camera;
pub mod image;
pub mod ingest;
