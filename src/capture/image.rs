//! Decoded photo held by the session

use image::RgbaImage;

use crate::domain::Size;

/// A validated, decoded hand photo
#[derive(Clone, Debug)]
pub struct PhotoImage {
    pub rgba: RgbaImage,
    /// MIME type the photo was submitted with
    pub mime_type: String,
    /// Size of the encoded upload in bytes
    pub byte_size: u64,
}

impl PhotoImage {
    pub fn new(rgba: RgbaImage, mime_type: impl Into<String>, byte_size: u64) -> Self {
        let photo = Self {
            rgba,
            mime_type: mime_type.into(),
            byte_size,
        };
        log::debug!(
            "PhotoImage decoded: {}x{} pixels ({} bytes, {})",
            photo.width(),
            photo.height(),
            photo.byte_size,
            photo.mime_type
        );
        photo
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Natural size used for the canvas fit mapping
    pub fn natural_size(&self) -> Size {
        Size::from_pixels(self.width(), self.height())
    }
}
