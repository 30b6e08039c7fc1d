//! Ring and color choice before commit

use crate::domain::RingCatalog;
use crate::error::{Result, TryOnError};

use super::TryOnSession;
use super::state::SelectionState;

/// Uncommitted ring/color choice in the selection step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingPicker {
    ring_id: Option<String>,
    color_id: Option<String>,
}

impl RingPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picker for the selection step, preselecting the ring and color that
    /// were on the hand before stepping back
    pub fn resume(state: &SelectionState) -> Self {
        match state.previous_placement() {
            Some(previous) => Self {
                ring_id: Some(previous.assignment.ring.id.clone()),
                color_id: Some(previous.assignment.color.id.clone()),
            },
            None => Self::new(),
        }
    }

    pub fn ring_id(&self) -> Option<&str> {
        self.ring_id.as_deref()
    }

    pub fn color_id(&self) -> Option<&str> {
        self.color_id.as_deref()
    }

    /// Pick a ring; its first color is preselected
    pub fn select_ring(&mut self, catalog: &RingCatalog, ring_id: &str) -> Result<()> {
        let ring = catalog.ring(ring_id).ok_or_else(|| TryOnError::UnknownRing {
            ring_id: ring_id.to_string(),
            color_id: String::new(),
        })?;
        self.ring_id = Some(ring.id.clone());
        self.color_id = ring.default_variant().map(|v| v.id.clone());
        Ok(())
    }

    /// Pick a color of the selected ring
    pub fn select_color(&mut self, catalog: &RingCatalog, color_id: &str) -> Result<()> {
        let ring_id = self.ring_id.clone().unwrap_or_default();
        if catalog.pick(&ring_id, color_id).is_none() {
            return Err(TryOnError::UnknownRing {
                ring_id,
                color_id: color_id.to_string(),
            });
        }
        self.color_id = Some(color_id.to_string());
        Ok(())
    }

    pub fn can_commit(&self) -> bool {
        self.ring_id.is_some() && self.color_id.is_some()
    }

    /// "Ring / Color" for the current choice
    pub fn display_tag(&self, catalog: &RingCatalog) -> Option<String> {
        let (ring, color) = catalog.pick(self.ring_id.as_deref()?, self.color_id.as_deref()?)?;
        Some(format!("{} / {}", ring.name, color.name))
    }

    /// Commit the choice to the session
    pub fn commit(&self, session: &mut TryOnSession) -> Result<()> {
        match (&self.ring_id, &self.color_id) {
            (Some(ring_id), Some(color_id)) => session.commit_ring(ring_id, color_id),
            _ => Err(TryOnError::InvalidTransition {
                from: session.state().kind(),
                action: "commit ring without a color",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ingest::ImageCandidate;
    use crate::config::TryOnConfig;
    use crate::domain::Finger;
    use crate::test_utils::{png_bytes, sample_catalog};

    #[test]
    fn test_ring_preselects_first_color() {
        let catalog = sample_catalog();
        let mut picker = RingPicker::new();
        assert!(!picker.can_commit());

        picker.select_ring(&catalog, "solitaire").unwrap();
        assert_eq!(picker.color_id(), Some("gold"));
        assert!(picker.can_commit());
        assert_eq!(picker.display_tag(&catalog).as_deref(), Some("Solitaire / Gold"));

        picker.select_color(&catalog, "silver").unwrap();
        assert_eq!(picker.display_tag(&catalog).as_deref(), Some("Solitaire / Silver"));

        // Switching rings resets the color to the new ring's first variant
        picker.select_ring(&catalog, "band").unwrap();
        assert_eq!(picker.color_id(), Some("rose"));
    }

    #[test]
    fn test_color_must_belong_to_ring() {
        let catalog = sample_catalog();
        let mut picker = RingPicker::new();
        assert!(picker.select_color(&catalog, "gold").is_err());
        picker.select_ring(&catalog, "band").unwrap();
        assert!(picker.select_color(&catalog, "gold").is_err());
        assert_eq!(picker.color_id(), Some("rose"));
        assert!(picker.select_ring(&catalog, "missing").is_err());
        assert_eq!(picker.ring_id(), Some("band"));
    }

    #[test]
    fn test_resume_preselects_previous_choice() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        session.set_catalog(sample_catalog());
        assert_eq!(RingPicker::resume(session.state()), RingPicker::new());

        session
            .ingest(&ImageCandidate::new("image/png", png_bytes(16, 16)))
            .unwrap();
        session.commit_ring("solitaire", "silver").unwrap();
        session.select_finger(Finger::Pinky).unwrap();
        session.back().unwrap();

        let picker = RingPicker::resume(session.state());
        assert_eq!(picker.ring_id(), Some("solitaire"));
        assert_eq!(picker.color_id(), Some("silver"));
        assert!(picker.can_commit());

        picker.commit(&mut session).unwrap();
        assert_eq!(
            session.state().assignment().unwrap().display_tag(),
            "Solitaire / Silver"
        );
    }

    #[test]
    fn test_commit_places_ring_on_thumb() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        session.set_catalog(sample_catalog());
        session
            .ingest(&ImageCandidate::new("image/png", png_bytes(16, 16)))
            .unwrap();

        let mut picker = RingPicker::new();
        assert!(picker.commit(&mut session).is_err());

        let catalog = sample_catalog();
        picker.select_ring(&catalog, "solitaire").unwrap();
        picker.commit(&mut session).unwrap();
        assert_eq!(session.state().active_finger(), Some(Finger::Thumb));
        assert_eq!(
            session.state().assignment().unwrap().display_tag(),
            "Solitaire / Gold"
        );
    }
}
