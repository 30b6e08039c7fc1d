//! Raster surface for the try-on preview using tiny-skia
//!
//! The surface is what export flattens, so everything visible in the final
//! image is drawn here: the fitted photo, the single ring overlay, and the
//! optional landmark dots.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use super::geometry::FitMapping;
use super::overlay::RenderDirective;
use crate::assets::OverlayAsset;
use crate::domain::{HandLandmarkSet, Size};
use crate::error::{Result, TryOnError};

/// Landmark dot color (#d97a7c)
pub const LANDMARK_COLOR: [u8; 4] = [0xd9, 0x7a, 0x7c, 0xff];
/// Landmark dot radius in canvas pixels
pub const LANDMARK_RADIUS: f32 = 4.0;

/// Convert a straight-alpha image into a premultiplied pixmap
fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Canvas the photo and overlay are painted onto
pub struct Surface {
    pixmap: Pixmap,
    tainted: bool,
}

impl Surface {
    /// Create a white canvas
    pub fn new(canvas: Size) -> Result<Self> {
        let (w, h) = canvas.validate("canvas")?.to_pixels();
        let mut pixmap = Pixmap::new(w, h).ok_or_else(|| {
            TryOnError::InvalidGeometryInput(format!("cannot allocate a {w}x{h} surface"))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self {
            pixmap,
            tainted: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Whether an opaque cross-origin image has been drawn
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Paint the photo through the fit mapping
    pub fn draw_photo(&mut self, photo: &RgbaImage, mapping: &FitMapping) {
        let Some(src) = to_pixmap(photo) else {
            return;
        };
        let sx = mapping.draw_width / photo.width() as f32;
        let sy = mapping.draw_height / photo.height() as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, mapping.offset_x, mapping.offset_y);
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    }

    /// Paint the ring artwork centered on the directive, rotated and scaled
    pub fn draw_overlay(&mut self, directive: &RenderDirective, asset: &OverlayAsset) {
        let Some(src) = to_pixmap(&asset.image) else {
            return;
        };
        let (aw, ah) = (src.width() as f32, src.height() as f32);
        let transform = Transform::from_translate(directive.x, directive.y)
            .pre_concat(Transform::from_rotate(directive.rotation.to_degrees()))
            .pre_concat(Transform::from_scale(
                directive.width / aw,
                directive.height / ah,
            ))
            .pre_concat(Transform::from_translate(-aw / 2.0, -ah / 2.0));
        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);

        if asset.origin.taints_surface() {
            log::warn!("Overlay {} is not CORS-enabled; surface is now tainted", asset.url);
            self.tainted = true;
        }
    }

    /// Paint a dot on every landmark
    pub fn draw_landmarks(&mut self, landmarks: &HandLandmarkSet, mapping: &FitMapping) {
        let [r, g, b, a] = LANDMARK_COLOR;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        for landmark in landmarks.iter() {
            let p = mapping.map(*landmark);
            if let Some(path) = PathBuilder::from_circle(p.x, p.y, LANDMARK_RADIUS) {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }

    /// Copy the surface out as a straight-alpha image
    pub fn to_rgba(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width(), self.height());
        for (dst, src) in img.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        img
    }
}
