//! Configuration persistence for ringfit settings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::detect::DetectorConfig;
use crate::domain::{Finger, FitMode, Size};
use crate::render::overlay::Calibration;

/// Upload constraints enforced before a photo enters the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestLimits {
    /// Maximum encoded size in bytes
    pub max_bytes: u64,
    /// Maximum width and height in pixels
    pub max_dimension: u32,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            max_dimension: 3000,
        }
    }
}

/// Sizing rules for the ring overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Ring width as a fraction of the anchor segment length
    pub length_factor: f32,
    pub min_width: f32,
    pub max_width: f32,
    /// Width used when the anchor length is unknown
    pub fallback_width: f32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            length_factor: 0.7,
            min_width: 30.0,
            max_width: 90.0,
            fallback_width: 55.0,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TryOnConfig {
    /// Preview canvas the photo is fitted onto
    pub canvas: Size,
    pub fit_mode: FitMode,
    pub ingest: IngestLimits,
    pub overlay: OverlayParams,
    /// Per-finger placement tweaks; missing fingers use identity
    pub calibration: BTreeMap<Finger, Calibration>,
    pub detector: DetectorConfig,
    /// Where the ring catalog document is fetched from
    pub catalog_url: String,
    /// Download folder (None = Pictures folder)
    pub export_dir: Option<PathBuf>,
    /// Caption handed to share sinks
    pub share_caption: String,
    /// Base URL of the ring storefront, if any
    pub storefront_base_url: Option<String>,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(300.0, 300.0),
            fit_mode: FitMode::Cover,
            ingest: IngestLimits::default(),
            overlay: OverlayParams::default(),
            calibration: BTreeMap::new(),
            detector: DetectorConfig::default(),
            catalog_url: "/data/rings.json".to_string(),
            export_dir: None,
            share_caption: "Trying on a new ring".to_string(),
            storefront_base_url: None,
        }
    }
}

impl TryOnConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "ringfit";

    /// Calibration for a finger, identity when none is configured
    pub fn calibration_for(&self, finger: Finger) -> Calibration {
        self.calibration.get(&finger).copied().unwrap_or_default()
    }

    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("Could not resolve config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("Could not resolve config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Folder downloads are written to
    pub fn download_dir(&self) -> Option<PathBuf> {
        self.export_dir.clone().or_else(|| {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        })
    }
}
