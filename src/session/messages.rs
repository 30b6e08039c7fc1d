//! Message types for the try-on session
//!
//! This module contains:
//! - Msg enum with a nested ring-picker sub-enum
//! - `update_msg`, which applies one message to the session
//! - Effect enum for follow-up work the caller must run (detection)

use crate::capture::ingest::ImageCandidate;
use crate::domain::{Finger, Size};
use crate::error::{Result, TryOnError};

use super::picker::RingPicker;
use super::{DetectionTicket, TryOnSession};

// ============================================================================
// Message Types
// ============================================================================

/// Ring picker messages (selection step)
#[derive(Debug, Clone)]
pub enum RingMsg {
    /// Pick a ring by id; preselects its first color
    Select(String),
    /// Pick a color of the selected ring
    Color(String),
    /// Commit the picked ring and color
    Commit,
}

/// All session messages
#[derive(Debug, Clone)]
pub enum Msg {
    /// A photo was picked or captured
    Photo(ImageCandidate),
    /// Ring picker actions
    Ring(RingMsg),
    /// Move the ring to another finger
    SelectFinger(Finger),
    /// One step back
    Back,
    /// Go to the share step
    Share,
    /// Start over
    Reset,
    /// Hide the error notice
    DismissError,
    /// Preview canvas resized
    Canvas(Size),
}

/// Follow-up work produced by a message
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    /// Run hand detection for the newly accepted photo
    Detect(DetectionTicket),
}

// ============================================================================
// Update
// ============================================================================

/// Apply a message to the session and picker
pub fn update_msg(session: &mut TryOnSession, picker: &mut RingPicker, msg: Msg) -> Result<Effect> {
    match msg {
        Msg::Photo(candidate) => {
            let ticket = session.ingest(&candidate)?;
            *picker = RingPicker::new();
            Ok(Effect::Detect(ticket))
        }
        Msg::Ring(ring_msg) => {
            update_ring(session, picker, ring_msg)?;
            Ok(Effect::None)
        }
        Msg::SelectFinger(finger) => session.select_finger(finger).map(|_| Effect::None),
        Msg::Back => {
            session.back()?;
            if session.state().previous_placement().is_some() {
                *picker = RingPicker::resume(session.state());
            }
            Ok(Effect::None)
        }
        Msg::Share => session.share().map(|_| Effect::None),
        Msg::Reset => {
            session.reset();
            *picker = RingPicker::new();
            Ok(Effect::None)
        }
        Msg::DismissError => {
            session.dismiss_error();
            Ok(Effect::None)
        }
        Msg::Canvas(size) => session.set_canvas(size).map(|_| Effect::None),
    }
}

fn update_ring(session: &mut TryOnSession, picker: &mut RingPicker, msg: RingMsg) -> Result<()> {
    if let RingMsg::Commit = msg {
        return picker.commit(session);
    }
    let Some(catalog) = session.catalog() else {
        return Err(TryOnError::AssetLoad {
            url: session.config().catalog_url.clone(),
            reason: "catalog not loaded".into(),
        });
    };
    match msg {
        RingMsg::Select(ring_id) => picker.select_ring(catalog, &ring_id),
        RingMsg::Color(color_id) => picker.select_color(catalog, &color_id),
        RingMsg::Commit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TryOnConfig;
    use crate::session::state::StepKind;
    use crate::test_utils::{png_bytes, sample_catalog};

    fn photo() -> Msg {
        Msg::Photo(ImageCandidate::new("image/png", png_bytes(20, 20)))
    }

    #[test]
    fn test_full_flow_through_messages() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        session.set_catalog(sample_catalog());
        let mut picker = RingPicker::new();

        let effect = update_msg(&mut session, &mut picker, photo()).unwrap();
        assert!(matches!(effect, Effect::Detect(_)));
        assert_eq!(session.state().kind(), StepKind::SelectRing);

        for msg in [
            Msg::Ring(RingMsg::Select("solitaire".into())),
            Msg::Ring(RingMsg::Color("silver".into())),
            Msg::Ring(RingMsg::Commit),
            Msg::SelectFinger(Finger::Middle),
            Msg::Share,
        ] {
            update_msg(&mut session, &mut picker, msg).unwrap();
        }
        assert_eq!(session.state().kind(), StepKind::Share);
        assert_eq!(session.state().active_finger(), Some(Finger::Middle));
        assert_eq!(
            session.state().assignment().unwrap().display_tag(),
            "Solitaire / Silver"
        );

        update_msg(&mut session, &mut picker, Msg::Reset).unwrap();
        assert_eq!(session.state().kind(), StepKind::Capture);
        assert!(!picker.can_commit());
    }

    #[test]
    fn test_back_to_ring_selection_restores_picker() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        session.set_catalog(sample_catalog());
        let mut picker = RingPicker::new();

        // The picker drifts to another ring before going back
        for msg in [
            photo(),
            Msg::Ring(RingMsg::Select("band".into())),
            Msg::Ring(RingMsg::Commit),
            Msg::Ring(RingMsg::Select("solitaire".into())),
            Msg::Back,
        ] {
            update_msg(&mut session, &mut picker, msg).unwrap();
        }
        assert_eq!(session.state().kind(), StepKind::SelectRing);
        assert_eq!(picker.ring_id(), Some("band"));
        assert_eq!(picker.color_id(), Some("rose"));
    }

    #[test]
    fn test_ring_messages_need_catalog() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        let mut picker = RingPicker::new();
        update_msg(&mut session, &mut picker, photo()).unwrap();
        let err = update_msg(
            &mut session,
            &mut picker,
            Msg::Ring(RingMsg::Select("solitaire".into())),
        )
        .unwrap_err();
        assert!(matches!(err, TryOnError::AssetLoad { .. }));
    }

    #[test]
    fn test_invalid_message_keeps_state() {
        let mut session = TryOnSession::new(TryOnConfig::default());
        let mut picker = RingPicker::new();
        assert!(update_msg(&mut session, &mut picker, Msg::Share).is_err());
        assert!(update_msg(&mut session, &mut picker, Msg::SelectFinger(Finger::Ring)).is_err());
        assert!(update_msg(&mut session, &mut picker, Msg::Canvas(Size::new(0.0, 0.0))).is_err());
        assert_eq!(session.state().kind(), StepKind::Capture);
    }
}
