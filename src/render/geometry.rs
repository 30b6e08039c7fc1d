//! Landmark to canvas geometry
//!
//! Maps normalized hand landmarks through the image-to-canvas fit and derives
//! one [`RingAnchor`] per finger. Everything here is a pure function of its
//! inputs.

use crate::domain::{FitMode, Finger, HandLandmarkSet, Landmark, Point, RingAnchor, Size};
use crate::error::{Result, TryOnError};

/// Scale and offset placing a source image on the canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitMapping {
    /// Drawn image width in canvas pixels
    pub draw_width: f32,
    /// Drawn image height in canvas pixels
    pub draw_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl FitMapping {
    /// Compute the mapping of `image` onto `canvas` under `mode`
    pub fn new(image: Size, canvas: Size, mode: FitMode) -> Result<Self> {
        let image = image.validate("image")?;
        let canvas = canvas.validate("canvas")?;

        let image_ratio = image.ratio();
        let canvas_ratio = canvas.ratio();
        let wider = image_ratio > canvas_ratio;

        // Cover fills the canvas along the wider side; contain does the opposite
        let fill_height = match mode {
            FitMode::Cover => wider,
            FitMode::Contain => !wider,
        };
        let (draw_width, draw_height) = if fill_height {
            (canvas.height * image_ratio, canvas.height)
        } else {
            (canvas.width, canvas.width / image_ratio)
        };

        let mapping = Self {
            draw_width,
            draw_height,
            offset_x: (canvas.width - draw_width) / 2.0,
            offset_y: (canvas.height - draw_height) / 2.0,
        };
        let finite = [
            mapping.draw_width,
            mapping.draw_height,
            mapping.offset_x,
            mapping.offset_y,
        ];
        if finite.iter().all(|v| v.is_finite()) && draw_width > 0.0 && draw_height > 0.0 {
            Ok(mapping)
        } else {
            Err(TryOnError::InvalidGeometryInput(format!(
                "{}x{} image cannot be fitted onto a {}x{} canvas",
                image.width, image.height, canvas.width, canvas.height
            )))
        }
    }

    /// Map a normalized landmark into canvas pixels
    #[inline]
    pub fn map(&self, landmark: Landmark) -> Point {
        Point {
            x: landmark.x * self.draw_width + self.offset_x,
            y: landmark.y * self.draw_height + self.offset_y,
        }
    }
}

/// Anchor for one finger, if both of its landmarks are present
pub fn finger_anchor(
    landmarks: &HandLandmarkSet,
    mapping: &FitMapping,
    finger: Finger,
) -> Option<RingAnchor> {
    let (a, b) = finger.anchor_pair();
    let base = mapping.map(landmarks.get(a)?);
    let tip = mapping.map(landmarks.get(b)?);
    let center = base.midpoint(tip);
    Some(RingAnchor {
        finger,
        center_x: center.x,
        center_y: center.y,
        angle: base.angle_to(tip),
        length: base.distance(tip),
    })
}

/// Compute ring anchors for every finger present in the landmark set
///
/// An empty landmark set yields no anchors; invalid image or canvas
/// dimensions are an error even then.
pub fn compute_anchors(
    landmarks: &HandLandmarkSet,
    image: Size,
    canvas: Size,
    mode: FitMode,
) -> Result<Vec<RingAnchor>> {
    let mapping = FitMapping::new(image, canvas, mode)?;
    let anchors: Vec<RingAnchor> = Finger::ALL
        .into_iter()
        .filter_map(|finger| finger_anchor(landmarks, &mapping, finger))
        .collect();
    log::debug!(
        "Computed {} ring anchors from {} landmarks ({:?}, draw {}x{})",
        anchors.len(),
        landmarks.len(),
        mode,
        mapping.draw_width,
        mapping.draw_height
    );
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::full_hand;

    #[test]
    fn test_cover_wide_image_on_square_canvas() {
        let mapping = FitMapping::new(
            Size::new(800.0, 400.0),
            Size::new(600.0, 600.0),
            FitMode::Cover,
        )
        .unwrap();
        assert_eq!(mapping.draw_height, 600.0);
        assert_eq!(mapping.draw_width, 1200.0);
        assert_eq!(mapping.offset_x, -300.0);
        assert_eq!(mapping.offset_y, 0.0);

        assert_eq!(mapping.map(Landmark::new(0.5, 0.5)), Point::new(300.0, 300.0));
        assert_eq!(mapping.map(Landmark::new(0.0, 0.0)), Point::new(-300.0, 0.0));
    }

    #[test]
    fn test_contain_wide_image_letterboxes() {
        let mapping = FitMapping::new(
            Size::new(800.0, 400.0),
            Size::new(600.0, 600.0),
            FitMode::Contain,
        )
        .unwrap();
        assert_eq!(mapping.draw_width, 600.0);
        assert_eq!(mapping.draw_height, 300.0);
        assert_eq!(mapping.offset_x, 0.0);
        assert_eq!(mapping.offset_y, 150.0);
        assert_eq!(mapping.map(Landmark::new(1.0, 1.0)), Point::new(600.0, 450.0));
    }

    #[test]
    fn test_tall_image_modes() {
        let image = Size::new(300.0, 600.0);
        let canvas = Size::new(400.0, 400.0);

        let cover = FitMapping::new(image, canvas, FitMode::Cover).unwrap();
        assert_eq!((cover.draw_width, cover.draw_height), (400.0, 800.0));
        assert_eq!((cover.offset_x, cover.offset_y), (0.0, -200.0));

        let contain = FitMapping::new(image, canvas, FitMode::Contain).unwrap();
        assert_eq!((contain.draw_width, contain.draw_height), (200.0, 400.0));
        assert_eq!((contain.offset_x, contain.offset_y), (100.0, 0.0));
    }

    #[test]
    fn test_full_hand_gives_five_anchors() {
        let anchors = compute_anchors(
            &full_hand(),
            Size::new(640.0, 480.0),
            Size::new(300.0, 300.0),
            FitMode::Cover,
        )
        .unwrap();
        assert_eq!(anchors.len(), 5);
        let fingers: Vec<_> = anchors.iter().map(|a| a.finger).collect();
        assert_eq!(fingers, Finger::ALL.to_vec());
        assert!(anchors.iter().all(|a| a.length >= 0.0));
    }

    #[test]
    fn test_anchor_midpoint_angle_length() {
        let mut points = vec![Landmark::default(); 21];
        points[5] = Landmark::new(0.25, 0.5);
        points[6] = Landmark::new(0.25, 0.25);
        let landmarks = HandLandmarkSet::new(points);
        let mapping = FitMapping::new(
            Size::new(400.0, 400.0),
            Size::new(400.0, 400.0),
            FitMode::Cover,
        )
        .unwrap();

        let anchor = finger_anchor(&landmarks, &mapping, Finger::Index).unwrap();
        assert_eq!((anchor.center_x, anchor.center_y), (100.0, 150.0));
        assert_eq!(anchor.length, 100.0);
        // Pointing straight up in image coordinates
        assert_eq!(anchor.angle, -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_partial_set_skips_missing_pairs() {
        // Indices 0..=9 cover thumb and index; middle needs index 10
        let landmarks = HandLandmarkSet::new(vec![Landmark::new(0.5, 0.5); 10]);
        let anchors = compute_anchors(
            &landmarks,
            Size::new(100.0, 100.0),
            Size::new(100.0, 100.0),
            FitMode::Contain,
        )
        .unwrap();
        let fingers: Vec<_> = anchors.iter().map(|a| a.finger).collect();
        assert_eq!(fingers, vec![Finger::Thumb, Finger::Index]);
    }

    #[test]
    fn test_empty_set_gives_no_anchors() {
        let anchors = compute_anchors(
            &HandLandmarkSet::default(),
            Size::new(100.0, 100.0),
            Size::new(100.0, 100.0),
            FitMode::Cover,
        )
        .unwrap();
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let err = compute_anchors(
            &full_hand(),
            Size::new(0.0, 100.0),
            Size::new(100.0, 100.0),
            FitMode::Cover,
        )
        .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidGeometryInput(_)));

        assert!(
            FitMapping::new(Size::new(10.0, 10.0), Size::new(10.0, -5.0), FitMode::Contain)
                .is_err()
        );
    }

    #[test]
    fn test_extreme_aspect_ratios_rejected() {
        let err = compute_anchors(
            &full_hand(),
            Size::new(1e30, 1e-30),
            Size::new(300.0, 300.0),
            FitMode::Cover,
        )
        .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidGeometryInput(_)));

        // Valid sizes whose fitted extent overflows
        let err = FitMapping::new(Size::new(1e30, 1.0), Size::new(1e10, 1e10), FitMode::Cover)
            .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidGeometryInput(_)));
    }

    #[test]
    fn test_pure_bit_identical() {
        let run = || {
            compute_anchors(
                &full_hand(),
                Size::new(1234.0, 987.0),
                Size::new(333.0, 517.0),
                FitMode::Contain,
            )
            .unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.center_x.to_bits(), y.center_x.to_bits());
            assert_eq!(x.center_y.to_bits(), y.center_y.to_bits());
            assert_eq!(x.angle.to_bits(), y.angle.to_bits());
            assert_eq!(x.length.to_bits(), y.length.to_bits());
        }
    }
}
