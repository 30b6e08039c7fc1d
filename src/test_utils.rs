//! Shared fixtures for unit tests.
//!
//! Everything is built in memory: catalog documents, encoded images, landmark
//! sets, and fake fetchers and detectors.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::assets::{AssetFetcher, AssetOrigin, CatalogSource, FetchedAsset};
use crate::capture::image::PhotoImage;
use crate::detect::{DetectorConfig, HandDetector};
use crate::domain::{HandLandmarkSet, Landmark, RingCatalog};

/// Two rings: one using the `imageUrl`/`availableColors` keys, one the native keys.
pub(crate) const CATALOG_JSON: &str = r##"[
  {
    "id": "solitaire",
    "name": "Solitaire",
    "imageUrl": "/rings/solitaire.png",
    "availableColors": [
      {
        "id": "gold",
        "name": "Gold",
        "colorCode": "#d4af37",
        "imageUrl": "/rings/solitaire-gold.png"
      },
      {
        "id": "silver",
        "name": "Silver",
        "colorCode": "#c0c0c0",
        "imageUrl": "/rings/solitaire-silver.png"
      }
    ]
  },
  {
    "id": "band",
    "name": "Plain Band",
    "thumbnailUrl": "/rings/band.png",
    "variants": [
      {
        "id": "rose",
        "name": "Rose Gold",
        "colorCode": "#b76e79",
        "overlayUrl": "/rings/band-rose.png"
      }
    ]
  }
]"##;

pub(crate) fn sample_catalog() -> RingCatalog {
    RingCatalog::from_json(CATALOG_JSON).unwrap()
}

/// Horizontal gradient so scaled copies are not trivially uniform
fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            128,
            255,
        ])
    })
}

/// Encoded PNG of the given size
pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::new();
    crate::export::write_png(&mut out, &gradient(w, h)).unwrap();
    out
}

/// A small JPEG whose SOF0 header claims `w`x`h`
///
/// Only the header is valid for the claimed size, which is all the
/// resolution check reads.
pub(crate) fn jpeg_with_header_size(w: u16, h: u16) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(gradient(16, 16)).to_rgb8();
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Jpeg).unwrap();
    let mut bytes = cursor.into_inner();

    // Walk marker segments after SOI until the baseline frame header
    let mut i = 2;
    while i + 9 < bytes.len() {
        assert_eq!(bytes[i], 0xFF, "lost marker sync at {i}");
        let marker = bytes[i + 1];
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if marker == 0xC0 {
            bytes[i + 5..i + 7].copy_from_slice(&h.to_be_bytes());
            bytes[i + 7..i + 9].copy_from_slice(&w.to_be_bytes());
            return bytes;
        }
        i += 2 + len;
    }
    panic!("no SOF0 marker in encoded JPEG");
}

/// Decoded photo of the given size
pub(crate) fn test_photo(w: u32, h: u32) -> PhotoImage {
    PhotoImage::new(gradient(w, h), "image/png", u64::from(w * h * 4))
}

/// 21 distinct landmarks of an upright hand: wrist at the bottom, each finger
/// a vertical column of four points
pub(crate) fn full_hand() -> HandLandmarkSet {
    let mut points = vec![Landmark::new(0.5, 0.9)];
    for finger in 0..5 {
        let x = 0.3 + 0.1 * finger as f32;
        for joint in 0..4 {
            points.push(Landmark::new(x, 0.7 - 0.1 * joint as f32));
        }
    }
    HandLandmarkSet::new(points)
}

pub(crate) fn full_hand_json() -> String {
    serde_json::to_string(&full_hand()).unwrap()
}

/// In-memory asset server counting fetches
#[derive(Default)]
pub(crate) struct MemoryAssets {
    assets: HashMap<String, FetchedAsset>,
    catalog: Option<String>,
    fetches: AtomicUsize,
}

impl MemoryAssets {
    pub(crate) fn with_png(mut self, url: &str, w: u32, h: u32, origin: AssetOrigin) -> Self {
        self.assets.insert(
            url.to_string(),
            FetchedAsset {
                bytes: png_bytes(w, h),
                origin,
            },
        );
        self
    }

    pub(crate) fn with_bytes(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(
            url.to_string(),
            FetchedAsset {
                bytes,
                origin: AssetOrigin::SameOrigin,
            },
        );
        self
    }

    pub(crate) fn with_catalog(mut self, json: &str) -> Self {
        self.catalog = Some(json.to_string());
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for MemoryAssets {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<FetchedAsset>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.assets
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("404 Not Found: {url}"))
        })
    }
}

impl CatalogSource for MemoryAssets {
    fn fetch_catalog<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<RingCatalog>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let json = self
                .catalog
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("404 Not Found: {url}"))?;
            Ok(RingCatalog::from_json(json)?)
        })
    }
}

/// Detector returning a fixed answer
pub(crate) enum FakeDetector {
    Hand(HandLandmarkSet),
    NoHand,
    Broken,
}

impl HandDetector for FakeDetector {
    fn detect<'a>(
        &'a self,
        _photo: &'a PhotoImage,
        _config: &'a DetectorConfig,
    ) -> BoxFuture<'a, anyhow::Result<Option<HandLandmarkSet>>> {
        Box::pin(async move {
            match self {
                FakeDetector::Hand(hand) => Ok(Some(hand.clone())),
                FakeDetector::NoHand => Ok(None),
                FakeDetector::Broken => Err(anyhow::anyhow!("model failed to load")),
            }
        })
    }
}
