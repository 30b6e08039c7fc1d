//! Ring catalog types
//!
//! The catalog is read-only reference data fetched once per session.

use serde::{Deserialize, Serialize};

/// One color option of a ring, with the artwork drawn over the finger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingColorVariant {
    pub id: String,
    pub name: String,
    /// CSS-style hex color, e.g. `#d4af37`
    pub color_code: String,
    /// Overlay artwork location
    #[serde(alias = "imageUrl")]
    pub overlay_url: String,
}

impl RingColorVariant {
    /// Parse `color_code` as `#rrggbb` (or `#rgb`)
    pub fn rgb(&self) -> Option<[u8; 3]> {
        let hex = self.color_code.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ]),
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(out)
            }
            _ => None,
        }
    }
}

/// A ring model offered in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingAsset {
    pub id: String,
    pub name: String,
    #[serde(alias = "imageUrl")]
    pub thumbnail_url: String,
    #[serde(alias = "availableColors", default)]
    pub variants: Vec<RingColorVariant>,
}

impl RingAsset {
    pub fn variant(&self, color_id: &str) -> Option<&RingColorVariant> {
        self.variants.iter().find(|v| v.id == color_id)
    }

    /// Variant preselected when the ring is picked
    pub fn default_variant(&self) -> Option<&RingColorVariant> {
        self.variants.first()
    }
}

/// Ordered list of rings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RingCatalog {
    pub rings: Vec<RingAsset>,
}

impl RingCatalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn ring(&self, ring_id: &str) -> Option<&RingAsset> {
        self.rings.iter().find(|r| r.id == ring_id)
    }

    /// Look up a ring and one of its colors
    pub fn pick(&self, ring_id: &str, color_id: &str) -> Option<(&RingAsset, &RingColorVariant)> {
        let ring = self.ring(ring_id)?;
        Some((ring, ring.variant(color_id)?))
    }

    /// Every overlay URL in catalog order
    pub fn overlay_urls(&self) -> impl Iterator<Item = &str> {
        self.rings
            .iter()
            .flat_map(|r| r.variants.iter().map(|v| v.overlay_url.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::sample_catalog;

    #[test]
    fn test_parse_catalog_with_both_key_styles() {
        let catalog = sample_catalog();
        assert_eq!(catalog.rings.len(), 2);
        assert_eq!(catalog.rings[0].thumbnail_url, "/rings/solitaire.png");
        assert_eq!(catalog.rings[0].variants.len(), 2);
        assert_eq!(catalog.rings[1].variants[0].overlay_url, "/rings/band-rose.png");
    }

    #[test]
    fn test_pick_and_default_variant() {
        let catalog = sample_catalog();
        let (ring, color) = catalog.pick("solitaire", "silver").unwrap();
        assert_eq!(ring.name, "Solitaire");
        assert_eq!(color.name, "Silver");
        assert!(catalog.pick("solitaire", "rose").is_none());
        assert_eq!(
            catalog.ring("band").unwrap().default_variant().unwrap().id,
            "rose"
        );
        assert_eq!(catalog.overlay_urls().count(), 3);
    }

    #[test]
    fn test_color_code_parsing() {
        let catalog = sample_catalog();
        let gold = catalog.rings[0].variant("gold").unwrap();
        assert_eq!(gold.rgb(), Some([0xd4, 0xaf, 0x37]));

        let mut short = gold.clone();
        short.color_code = "#fff".into();
        assert_eq!(short.rgb(), Some([255, 255, 255]));

        short.color_code = "gold".into();
        assert_eq!(short.rgb(), None);
    }
}
