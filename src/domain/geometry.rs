//! Geometric types for images, canvases and pixel coordinates

use serde::{Deserialize, Serialize};

use crate::error::{Result, TryOnError};

/// Pixel-space point on the canvas
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in radians of the vector from `self` to `other`
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Width and height of an image or canvas in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size of a decoded image
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Width divided by height
    pub fn ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Reject zero, negative and non-finite dimensions, and aspect ratios
    /// that do not fit in an `f32`
    pub fn validate(self, what: &str) -> Result<Self> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) && ok(self.ratio()) {
            Ok(self)
        } else {
            Err(TryOnError::InvalidGeometryInput(format!(
                "{what} size must be positive with a finite aspect ratio, got {}x{}",
                self.width, self.height
            )))
        }
    }

    /// Rounded integer dimensions, at least 1x1
    pub fn to_pixels(self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `600x600`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
        let width: f32 = w.trim().parse().map_err(|_| format!("bad width `{w}`"))?;
        let height: f32 = h.trim().parse().map_err(|_| format!("bad height `{h}`"))?;
        Size::new(width, height)
            .validate("canvas")
            .map_err(|e| e.to_string())
    }
}

/// How a source image is laid onto a differently-proportioned canvas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Letterbox: the whole image is visible
    Contain,
    /// Crop: the canvas is filled completely
    #[default]
    Cover,
}

impl std::str::FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contain" => Ok(FitMode::Contain),
            "cover" => Ok(FitMode::Cover),
            other => Err(format!("unknown fit mode `{other}`")),
        }
    }
}
