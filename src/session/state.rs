//! Try-on workflow state machine
//!
//! Each step carries only the data that is meaningful at that point, so a
//! finger can never be selected without a photo and a ring. There is one ring
//! assignment per session and it always sits on the active finger.

use std::sync::Arc;

use serde::Serialize;

use crate::capture::image::PhotoImage;
use crate::domain::{Finger, RingAsset, RingColorVariant};
use crate::error::{Result, TryOnError};

/// Finger a freshly committed ring is placed on
pub const DEFAULT_FINGER: Finger = Finger::Thumb;

/// Step discriminant, for display and error reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StepKind {
    Capture,
    SelectRing,
    AdjustFinger,
    Share,
}

impl StepKind {
    /// 1-based position in the progress indicator
    pub fn number(self) -> u8 {
        match self {
            StepKind::Capture => 1,
            StepKind::SelectRing => 2,
            StepKind::AdjustFinger => 3,
            StepKind::Share => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StepKind::Capture => "Take Photo",
            StepKind::SelectRing => "Select Ring",
            StepKind::AdjustFinger => "Adjust",
            StepKind::Share => "Share",
        }
    }
}

/// The ring and color currently being tried on
#[derive(Clone, Debug, PartialEq)]
pub struct RingAssignment {
    pub ring: RingAsset,
    pub color: RingColorVariant,
}

impl RingAssignment {
    /// "Ring / Color" tag shown under the picker
    pub fn display_tag(&self) -> String {
        format!("{} / {}", self.ring.name, self.color.name)
    }
}

/// The assignment together with the finger wearing it
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub finger: Finger,
    pub assignment: RingAssignment,
}

/// Workflow step with its data
#[derive(Clone, Debug, Default)]
pub enum Step {
    /// Waiting for a photo
    #[default]
    Capture,
    /// Photo accepted; `previous` keeps the placement when stepping back
    SelectRing {
        photo: Arc<PhotoImage>,
        previous: Option<Placement>,
    },
    /// Ring on a finger; the user may move it between fingers
    AdjustFinger {
        photo: Arc<PhotoImage>,
        placement: Placement,
    },
    /// Export view
    Share {
        photo: Arc<PhotoImage>,
        placement: Placement,
    },
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Capture => StepKind::Capture,
            Step::SelectRing { .. } => StepKind::SelectRing,
            Step::AdjustFinger { .. } => StepKind::AdjustFinger,
            Step::Share { .. } => StepKind::Share,
        }
    }
}

/// Session progression plus the dismissible error notice
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    step: Step,
    error: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn photo(&self) -> Option<&Arc<PhotoImage>> {
        match &self.step {
            Step::Capture => None,
            Step::SelectRing { photo, .. }
            | Step::AdjustFinger { photo, .. }
            | Step::Share { photo, .. } => Some(photo),
        }
    }

    /// Placement that is live (not just remembered for going forward again)
    pub fn placement(&self) -> Option<&Placement> {
        match &self.step {
            Step::AdjustFinger { placement, .. } | Step::Share { placement, .. } => Some(placement),
            _ => None,
        }
    }

    /// Placement kept from before stepping back to ring selection
    pub fn previous_placement(&self) -> Option<&Placement> {
        match &self.step {
            Step::SelectRing { previous, .. } => previous.as_ref(),
            _ => None,
        }
    }

    pub fn active_finger(&self) -> Option<Finger> {
        self.placement().map(|p| p.finger)
    }

    pub fn assignment(&self) -> Option<&RingAssignment> {
        self.placement().map(|p| &p.assignment)
    }

    /// Assignment carried by `finger`; only the active finger carries one
    pub fn assignment_for(&self, finger: Finger) -> Option<&RingAssignment> {
        self.placement()
            .filter(|p| p.finger == finger)
            .map(|p| &p.assignment)
    }

    /// Export needs a photo, an active finger and a ring on it
    pub fn can_export(&self) -> bool {
        self.photo().is_some() && self.placement().is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn reject(&self, action: &'static str) -> TryOnError {
        TryOnError::InvalidTransition {
            from: self.kind(),
            action,
        }
    }

    fn transition(&mut self, from: StepKind, next: Step) {
        self.step = next;
        if from != self.kind() {
            log::debug!("Step {:?} -> {:?}", from, self.kind());
        }
    }

    /// Take a newly validated photo, releasing any previous one
    ///
    /// From `Capture` this moves to `SelectRing`; in `SelectRing` the photo is
    /// replaced and any remembered placement is dropped.
    pub fn accept_photo(&mut self, photo: Arc<PhotoImage>) -> Result<()> {
        match self.kind() {
            from @ (StepKind::Capture | StepKind::SelectRing) => {
                self.error = None;
                self.transition(from, Step::SelectRing {
                    photo,
                    previous: None,
                });
                Ok(())
            }
            _ => Err(self.reject("accept photo")),
        }
    }

    /// Commit a ring and color; the pair lands on the default finger
    pub fn commit_ring(&mut self, ring: RingAsset, color: RingColorVariant) -> Result<()> {
        let from = self.kind();
        let photo = match std::mem::take(&mut self.step) {
            Step::SelectRing { photo, .. } => photo,
            other => {
                self.step = other;
                return Err(self.reject("commit ring"));
            }
        };
        log::info!("Committed ring {} / {}", ring.name, color.name);
        self.transition(from, Step::AdjustFinger {
            photo,
            placement: Placement {
                finger: DEFAULT_FINGER,
                assignment: RingAssignment { ring, color },
            },
        });
        Ok(())
    }

    /// Move the live assignment to another finger
    pub fn select_finger(&mut self, finger: Finger) -> Result<()> {
        match &mut self.step {
            Step::AdjustFinger { placement, .. } | Step::Share { placement, .. } => {
                if placement.finger != finger {
                    log::debug!("Ring moved from {} to {}", placement.finger, finger);
                    placement.finger = finger;
                }
                Ok(())
            }
            _ => Err(self.reject("select finger")),
        }
    }

    /// Enter the export view
    pub fn enter_share(&mut self) -> Result<()> {
        let from = self.kind();
        match std::mem::take(&mut self.step) {
            Step::AdjustFinger { photo, placement } | Step::Share { photo, placement } => {
                self.transition(from, Step::Share { photo, placement });
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.reject("share"))
            }
        }
    }

    /// One step back, keeping photo, finger and ring
    pub fn back(&mut self) -> Result<()> {
        let from = self.kind();
        match std::mem::take(&mut self.step) {
            Step::AdjustFinger { photo, placement } => {
                self.transition(from, Step::SelectRing {
                    photo,
                    previous: Some(placement),
                });
                Ok(())
            }
            Step::Share { photo, placement } => {
                self.transition(from, Step::AdjustFinger { photo, placement });
                Ok(())
            }
            other => {
                self.step = other;
                Err(self.reject("back"))
            }
        }
    }

    /// Start over: photo, ring and finger are all cleared
    pub fn reset(&mut self) {
        self.error = None;
        let from = self.kind();
        self.transition(from, Step::Capture);
    }
}
