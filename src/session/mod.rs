//! Try-on session management module
//!
//! This module contains:
//! - The workflow state machine ([`state`])
//! - Ring picker state for the selection step ([`picker`])
//! - Message types and the update dispatcher ([`messages`])
//! - [`TryOnSession`], which ties photo, landmarks, catalog, overlay and
//!   export together for one user session

pub mod messages;
pub mod picker;
pub mod state;

use std::sync::Arc;

use serde::Serialize;

use crate::assets::{self, AssetCache, AssetFetcher, CatalogSource, OverlayAsset};
use crate::capture::image::PhotoImage;
use crate::capture::ingest::{self, ImageCandidate};
use crate::config::TryOnConfig;
use crate::detect::{self, DetectionReport, Generation, GenerationCounter, HandDetector};
use crate::domain::{Finger, HandLandmarkSet, RingAnchor, RingCatalog, Size};
use crate::error::{Result, TryOnError};
use crate::export::{self, ExportArtifact};
use crate::render::geometry::{FitMapping, compute_anchors};
use crate::render::image::Surface;
use crate::render::overlay::{self, RenderDirective};
use state::{SelectionState, StepKind};

/// Handle for the detection pass belonging to an accepted photo
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    pub generation: Generation,
    pub photo: Arc<PhotoImage>,
}

/// Overlay fetch to run while the session keeps handling user actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub url: String,
}

/// What happened to a detection report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// Landmarks stored; `anchors` fingers can carry the ring
    Applied { anchors: usize },
    /// Detector found no hand; overlay withheld
    NoHand,
    /// Detector failed; overlay withheld
    Failed,
    /// Report belonged to an earlier photo and was dropped
    Stale,
}

/// Serializable view of the session for debugging and tests
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub step: StepKind,
    pub step_number: u8,
    pub step_label: &'static str,
    pub generation: Generation,
    pub photo_size: Option<(u32, u32)>,
    pub canvas: Size,
    pub landmark_count: usize,
    pub anchors: Vec<RingAnchor>,
    pub active_finger: Option<Finger>,
    pub ring: Option<String>,
    pub directive: Option<RenderDirective>,
    pub can_export: bool,
    pub error: Option<String>,
}

/// One try-on session
pub struct TryOnSession {
    config: TryOnConfig,
    state: SelectionState,
    catalog: Option<RingCatalog>,
    generations: GenerationCounter,
    landmarks: Option<HandLandmarkSet>,
    anchors: Vec<RingAnchor>,
    assets: AssetCache,
    canvas: Size,
}

impl TryOnSession {
    pub fn new(config: TryOnConfig) -> Self {
        let canvas = config.canvas;
        Self {
            config,
            state: SelectionState::new(),
            catalog: None,
            generations: GenerationCounter::default(),
            landmarks: None,
            anchors: Vec::new(),
            assets: AssetCache::default(),
            canvas,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn config(&self) -> &TryOnConfig {
        &self.config
    }

    pub fn catalog(&self) -> Option<&RingCatalog> {
        self.catalog.as_ref()
    }

    pub fn landmarks(&self) -> Option<&HandLandmarkSet> {
        self.landmarks.as_ref()
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Record a user-facing error as the dismissible notice
    fn notice(&mut self, err: TryOnError) -> TryOnError {
        log::warn!("{}", err);
        self.state.set_error(err.to_string());
        err
    }

    pub fn set_catalog(&mut self, catalog: RingCatalog) {
        log::debug!("Catalog set with {} rings", catalog.rings.len());
        self.catalog = Some(catalog);
    }

    /// Fetch the catalog from the configured URL, once per session
    pub async fn load_catalog<S: CatalogSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        if self.catalog.is_some() {
            return Ok(());
        }
        let url = self.config.catalog_url.clone();
        let fetched = source.fetch_catalog(&url).await;
        match fetched {
            Ok(catalog) => {
                self.set_catalog(catalog);
                Ok(())
            }
            Err(e) => Err(self.notice(TryOnError::AssetLoad {
                url,
                reason: format!("{e:#}"),
            })),
        }
    }

    /// Catalog overlays that are not cached yet
    pub fn preload_urls(&self) -> Vec<String> {
        self.catalog
            .iter()
            .flat_map(|c| c.overlay_urls())
            .filter(|url| self.assets.get(url).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Take over overlays loaded by [`assets::preload_overlays`]
    pub fn merge_preloaded(&mut self, loaded: AssetCache) -> usize {
        let added = self.assets.merge(loaded);
        log::debug!("{} preloaded overlays merged", added);
        added
    }

    /// Preload every catalog overlay and merge the result
    pub async fn preload_assets<F: AssetFetcher + ?Sized>(&mut self, fetcher: &F) -> usize {
        let loaded = assets::preload_overlays(fetcher, self.preload_urls()).await;
        self.merge_preloaded(loaded)
    }

    /// Validate a photo and make it the session photo
    ///
    /// On failure the notice is set and nothing else changes. On success any
    /// earlier landmarks are dropped and pending detections become stale.
    pub fn ingest(&mut self, candidate: &ImageCandidate) -> Result<DetectionTicket> {
        let photo = match ingest::validate(candidate, &self.config.ingest) {
            Ok(photo) => Arc::new(photo),
            Err(e) => return Err(self.notice(e)),
        };
        self.state.accept_photo(photo.clone())?;

        let generation = self.generations.advance();
        self.landmarks = None;
        self.anchors.clear();
        log::info!(
            "Photo accepted ({}x{}, generation {})",
            photo.width(),
            photo.height(),
            generation.value()
        );
        Ok(DetectionTicket { generation, photo })
    }

    /// Apply a detector report if it belongs to the current photo
    pub fn apply_detection(&mut self, report: DetectionReport) -> DetectionOutcome {
        if !self.generations.is_current(report.generation) || self.state.photo().is_none() {
            log::warn!(
                "Discarding stale detection for generation {} (current {})",
                report.generation.value(),
                self.generations.current().value()
            );
            return DetectionOutcome::Stale;
        }

        match report.result {
            Ok(Some(landmarks)) => {
                self.landmarks = Some(landmarks);
                self.recompute_anchors();
                if self.anchors.is_empty() {
                    self.notice(TryOnError::DetectionUnavailable(
                        "hand landmarks incomplete".into(),
                    ));
                }
                DetectionOutcome::Applied {
                    anchors: self.anchors.len(),
                }
            }
            Ok(None) => {
                self.landmarks = None;
                self.anchors.clear();
                self.notice(TryOnError::DetectionUnavailable("no hand found in the photo".into()));
                DetectionOutcome::NoHand
            }
            Err(e) => {
                self.landmarks = None;
                self.anchors.clear();
                self.notice(TryOnError::DetectionUnavailable(format!("{e:#}")));
                DetectionOutcome::Failed
            }
        }
    }

    /// Run the detector for a ticket and apply the result
    pub async fn detect<D: HandDetector + ?Sized>(
        &mut self,
        detector: &D,
        ticket: &DetectionTicket,
    ) -> DetectionOutcome {
        let report =
            detect::run_detection(detector, &ticket.photo, &self.config.detector, ticket.generation)
                .await;
        self.apply_detection(report)
    }

    fn recompute_anchors(&mut self) {
        self.anchors.clear();
        let (Some(landmarks), Some(photo)) = (&self.landmarks, self.state.photo()) else {
            return;
        };
        match compute_anchors(landmarks, photo.natural_size(), self.canvas, self.config.fit_mode) {
            Ok(anchors) => self.anchors = anchors,
            Err(e) => log::warn!("Anchor computation failed: {}", e),
        }
    }

    /// Resize the preview canvas; anchors follow
    pub fn set_canvas(&mut self, canvas: Size) -> Result<()> {
        self.canvas = canvas.validate("canvas")?;
        self.recompute_anchors();
        Ok(())
    }

    pub fn anchors(&self) -> &[RingAnchor] {
        &self.anchors
    }

    pub fn anchor_for(&self, finger: Finger) -> Option<&RingAnchor> {
        self.anchors.iter().find(|a| a.finger == finger)
    }

    /// Commit a catalog ring and color onto the thumb
    pub fn commit_ring(&mut self, ring_id: &str, color_id: &str) -> Result<()> {
        let picked = self
            .catalog
            .as_ref()
            .and_then(|c| c.pick(ring_id, color_id))
            .map(|(ring, color)| (ring.clone(), color.clone()));
        let Some((ring, color)) = picked else {
            return Err(self.notice(TryOnError::UnknownRing {
                ring_id: ring_id.to_string(),
                color_id: color_id.to_string(),
            }));
        };
        self.state.commit_ring(ring, color)
    }

    pub fn select_finger(&mut self, finger: Finger) -> Result<()> {
        self.state.select_finger(finger)
    }

    pub fn back(&mut self) -> Result<()> {
        self.state.back()
    }

    pub fn share(&mut self) -> Result<()> {
        self.state.enter_share()
    }

    /// Start over; in-flight detections become stale
    pub fn reset(&mut self) {
        self.state.reset();
        self.generations.advance();
        self.landmarks = None;
        self.anchors.clear();
        log::info!("Session reset");
    }

    pub fn dismiss_error(&mut self) {
        self.state.dismiss_error();
    }

    /// Overlay the committed color still needs, if any
    pub fn overlay_request(&self) -> Option<OverlayRequest> {
        let url = &self.state.assignment()?.color.overlay_url;
        if self.assets.get(url).is_some() {
            return None;
        }
        Some(OverlayRequest { url: url.clone() })
    }

    /// Store the outcome of an overlay fetch
    ///
    /// The asset is cached either way. A failure only becomes a notice if the
    /// committed color still uses that overlay.
    pub fn apply_overlay(
        &mut self,
        request: &OverlayRequest,
        loaded: Result<OverlayAsset>,
    ) -> Result<Option<Arc<OverlayAsset>>> {
        let wanted = self
            .state
            .assignment()
            .is_some_and(|a| a.color.overlay_url == request.url);
        match loaded {
            Ok(asset) => {
                let asset = self.assets.insert(asset);
                Ok(wanted.then_some(asset))
            }
            Err(e) if wanted => Err(self.notice(e)),
            Err(e) => {
                log::warn!("Ignoring failed load of {}, no longer selected: {}", request.url, e);
                Ok(None)
            }
        }
    }

    /// Fetch the overlay for the committed color and apply it
    pub async fn load_overlay<F: AssetFetcher + ?Sized>(
        &mut self,
        fetcher: &F,
    ) -> Result<Option<Arc<OverlayAsset>>> {
        let Some(request) = self.overlay_request() else {
            return Ok(self.overlay());
        };
        let loaded = assets::load_overlay(fetcher, &request.url).await;
        self.apply_overlay(&request, loaded)
    }

    /// Overlay loaded for the committed color, if any
    pub fn overlay(&self) -> Option<Arc<OverlayAsset>> {
        let assignment = self.state.assignment()?;
        self.assets.get(&assignment.color.overlay_url)
    }

    /// Directive for the active finger, when anchor and artwork are both available
    pub fn directive(&self) -> Result<Option<RenderDirective>> {
        let (Some(finger), Some(asset)) = (self.state.active_finger(), self.overlay()) else {
            return Ok(None);
        };
        let Some(anchor) = self.anchor_for(finger) else {
            return Ok(None);
        };
        let calibration = self.config.calibration_for(finger);
        overlay::compose(anchor, &asset, &calibration, &self.config.overlay).map(Some)
    }

    /// Paint the current photo and overlay
    pub fn render(&self, show_landmarks: bool) -> Result<Surface> {
        let mut surface = Surface::new(self.canvas)?;
        let Some(photo) = self.state.photo() else {
            return Ok(surface);
        };
        let mapping = FitMapping::new(photo.natural_size(), self.canvas, self.config.fit_mode)?;
        surface.draw_photo(&photo.rgba, &mapping);

        if show_landmarks && let Some(landmarks) = &self.landmarks {
            surface.draw_landmarks(landmarks, &mapping);
        }

        match (self.directive(), self.overlay()) {
            (Ok(Some(directive)), Some(asset)) => surface.draw_overlay(&directive, &asset),
            (Err(e), _) => log::warn!("Overlay omitted: {}", e),
            _ => log::debug!("No overlay to draw"),
        }
        Ok(surface)
    }

    /// Flatten the current composition into a PNG
    ///
    /// Only possible with a photo and a ring on a finger. A successful export
    /// moves the session to the share step; a failed one leaves it as it was.
    pub fn export(&mut self) -> Result<ExportArtifact> {
        let from = self.state.kind();
        if !self.state.can_export() {
            return Err(TryOnError::InvalidTransition {
                from,
                action: "export",
            });
        }

        let result = self
            .render(false)
            .and_then(|surface| export::flatten(&surface, self.state.assignment()));
        match result {
            Ok(artifact) => {
                if from == StepKind::AdjustFinger {
                    self.state.enter_share()?;
                }
                Ok(artifact)
            }
            Err(e) => Err(self.notice(e)),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let kind = self.state.kind();
        let snapshot = SessionSnapshot {
            step: kind,
            step_number: kind.number(),
            step_label: kind.label(),
            generation: self.generations.current(),
            photo_size: self.state.photo().map(|p| (p.width(), p.height())),
            canvas: self.canvas,
            landmark_count: self.landmarks.as_ref().map_or(0, |l| l.len()),
            anchors: self.anchors.clone(),
            active_finger: self.state.active_finger(),
            ring: self.state.assignment().map(|a| a.display_tag()),
            directive: self.directive().ok().flatten(),
            can_export: self.state.can_export(),
            error: self.state.error().map(str::to_string),
        };
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string(&snapshot) {
                Ok(json) => log::debug!("Session snapshot: {}", json),
                Err(e) => log::debug!("Session snapshot not serializable: {}", e),
            }
        }
        snapshot
    }
}
