//! Hand landmark and finger types
//!
//! Landmarks follow the 21-point hand model convention: index 0 is the wrist,
//! then four points per finger from the base outward.

use serde::{Deserialize, Serialize};

/// Number of points in a complete landmark set
pub const LANDMARK_COUNT: usize = 21;

/// A single detected keypoint, normalized to [0, 1] relative to the source image
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Landmarks of one detected hand, immutable once received
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarkSet {
    points: Vec<Landmark>,
}

impl HandLandmarkSet {
    /// Build a set from detector output; points beyond the model size are dropped
    pub fn new(mut points: Vec<Landmark>) -> Self {
        if points.len() > LANDMARK_COUNT {
            log::warn!(
                "Expected at most {} landmarks, got {}; extra points ignored",
                LANDMARK_COUNT,
                points.len()
            );
            points.truncate(LANDMARK_COUNT);
        }
        Self { points }
    }

    /// Parse a JSON array of `{x, y}` objects (extra fields such as `z` are ignored)
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let points: Vec<Landmark> = serde_json::from_str(json)?;
        Ok(Self::new(points))
    }

    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }
}

/// Finger a ring can be placed on
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers in display order
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Landmark indices bounding the ring placement zone (base side first)
    pub fn anchor_pair(self) -> (usize, usize) {
        match self {
            Finger::Thumb => (2, 3),
            Finger::Index => (5, 6),
            Finger::Middle => (9, 10),
            Finger::Ring => (13, 14),
            Finger::Pinky => (17, 18),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

impl std::fmt::Display for Finger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Finger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Finger::ALL
            .into_iter()
            .find(|finger| finger.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown finger `{s}`"))
    }
}

/// Ring placement for one finger in canvas pixel space
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RingAnchor {
    pub finger: Finger,
    pub center_x: f32,
    pub center_y: f32,
    /// Direction of the finger axis (base to tip) in radians
    pub angle: f32,
    /// Distance between the two anchor landmarks in pixels
    pub length: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_roundtrip_names() {
        for finger in Finger::ALL {
            assert_eq!(finger.as_str().parse::<Finger>().unwrap(), finger);
        }
        assert_eq!("INDEX".parse::<Finger>().unwrap(), Finger::Index);
        assert!("toe".parse::<Finger>().is_err());
    }

    #[test]
    fn test_anchor_pairs_are_adjacent_joints() {
        let pairs: Vec<_> = Finger::ALL.iter().map(|f| f.anchor_pair()).collect();
        assert_eq!(pairs, vec![(2, 3), (5, 6), (9, 10), (13, 14), (17, 18)]);
        assert!(pairs.iter().all(|(a, b)| *b < LANDMARK_COUNT && b - a == 1));
    }

    #[test]
    fn test_landmarks_from_detector_json() {
        let json = r#"[{"x": 0.1, "y": 0.2, "z": -0.03}, {"x": 0.5, "y": 0.5}]"#;
        let set = HandLandmarkSet::from_json(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), Some(Landmark::new(0.1, 0.2)));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_oversized_set_is_truncated() {
        let set = HandLandmarkSet::new(vec![Landmark::default(); 30]);
        assert_eq!(set.len(), LANDMARK_COUNT);
    }
}
