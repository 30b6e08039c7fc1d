//! Hand-pose detector seam and stale-result guard
//!
//! The detector itself is external. Each accepted photo gets a new
//! [`Generation`]; a detection result is applied only if it was started for
//! the generation that is still current.

use std::path::PathBuf;

use anyhow::Context;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::capture::image::PhotoImage;
use crate::domain::HandLandmarkSet;

/// Options passed to the hand-pose detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_hands: u8,
    pub model_complexity: u8,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// External hand-pose inference engine
///
/// Resolves to `None` when no hand was found in the photo.
pub trait HandDetector {
    fn detect<'a>(
        &'a self,
        photo: &'a PhotoImage,
        config: &'a DetectorConfig,
    ) -> BoxFuture<'a, anyhow::Result<Option<HandLandmarkSet>>>;
}

/// Token identifying which photo a detection pass belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic source of generations
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Generation,
}

impl GenerationCounter {
    /// Start a new generation, making every earlier one stale
    pub fn advance(&mut self) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.current
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.current
    }
}

/// Result of one detector invocation, tagged with its generation
#[derive(Debug)]
pub struct DetectionReport {
    pub generation: Generation,
    pub result: anyhow::Result<Option<HandLandmarkSet>>,
}

/// Run the detector for a photo and tag the outcome with `generation`
pub async fn run_detection<D: HandDetector + ?Sized>(
    detector: &D,
    photo: &PhotoImage,
    config: &DetectorConfig,
    generation: Generation,
) -> DetectionReport {
    log::debug!(
        "Running hand detection for generation {} ({}x{})",
        generation.value(),
        photo.width(),
        photo.height()
    );
    let result = detector.detect(photo, config).await;
    DetectionReport { generation, result }
}

/// Detector that replays landmarks recorded by an external run
///
/// The file holds either a single landmark array or an array of hands; only
/// the first hand is used.
#[derive(Debug, Clone)]
pub struct RecordedDetector {
    path: PathBuf,
}

impl RecordedDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> anyhow::Result<Option<HandLandmarkSet>> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read landmarks: {}", self.path.display()))?;
        parse_hands(&json)
            .with_context(|| format!("Invalid landmark file: {}", self.path.display()))
    }
}

impl HandDetector for RecordedDetector {
    fn detect<'a>(
        &'a self,
        _photo: &'a PhotoImage,
        config: &'a DetectorConfig,
    ) -> BoxFuture<'a, anyhow::Result<Option<HandLandmarkSet>>> {
        log::debug!("Replaying recorded landmarks with {:?}", config);
        Box::pin(async move { self.read() })
    }
}

/// Parse detector JSON: `[{x,y}, ...]` or `[[{x,y}, ...], ...]`
pub fn parse_hands(json: &str) -> serde_json::Result<Option<HandLandmarkSet>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hands {
        Many(Vec<HandLandmarkSet>),
        One(HandLandmarkSet),
    }

    let hands: Hands = serde_json::from_str(json)?;
    let first = match hands {
        Hands::Many(mut hands) => {
            if hands.len() > 1 {
                log::warn!("{} hands detected, only the first is used", hands.len());
            }
            if hands.is_empty() {
                None
            } else {
                Some(hands.swap_remove(0))
            }
        }
        Hands::One(hand) => Some(hand),
    };
    Ok(first.filter(|hand| !hand.is_empty()))
}
