//! Landmark sampling
//!
//! Converts raw per-frame face-mesh output into the handful of named points
//! the interaction controller cares about, then derives the per-frame
//! measurements from them.

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point2D, Velocity};

/// Raw detector output for one camera frame, already in display coordinates
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectorFrame {
    /// One landmark mesh per detected face
    #[serde(default)]
    pub faces: Vec<Vec<[f32; 2]>>,
}

impl DetectorFrame {
    /// A frame with no detected face
    #[must_use]
    pub const fn empty() -> Self {
        Self { faces: Vec::new() }
    }

    /// A frame with a single tracked face
    #[must_use]
    pub fn single(mesh: Vec<[f32; 2]>) -> Self {
        Self { faces: vec![mesh] }
    }
}

/// Mesh indices for each named point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LandmarkIndices {
    pub upper_lip: usize,
    pub lower_lip: usize,
    pub mouth_left: usize,
    pub mouth_right: usize,
    pub nose_tip: usize,
}

impl Default for LandmarkIndices {
    /// Inner-lip, mouth-corner and nose-tip indices of the 468-point face mesh
    fn default() -> Self {
        Self {
            upper_lip: 13,
            lower_lip: 14,
            mouth_left: 61,
            mouth_right: 291,
            nose_tip: 1,
        }
    }
}

/// Named points for the tracked subject; any of them may be missing this frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FacePoints {
    pub upper_lip: Option<Point2D>,
    pub lower_lip: Option<Point2D>,
    pub mouth_left: Option<Point2D>,
    pub mouth_right: Option<Point2D>,
    pub nose_tip: Option<Point2D>,
}

impl FacePoints {
    /// Whether any point was detected
    #[must_use]
    pub const fn is_detected(&self) -> bool {
        self.upper_lip.is_some()
            || self.lower_lip.is_some()
            || self.mouth_left.is_some()
            || self.mouth_right.is_some()
            || self.nose_tip.is_some()
    }
}

/// Picks the named points out of a face mesh
#[derive(Debug, Clone, Default)]
pub struct LandmarkSampler {
    indices: LandmarkIndices,
}

impl LandmarkSampler {
    #[must_use]
    pub const fn new(indices: LandmarkIndices) -> Self {
        Self { indices }
    }

    /// Sample the first face in the frame; other faces are ignored
    #[must_use]
    pub fn sample(&self, frame: &DetectorFrame) -> FacePoints {
        let Some(mesh) = frame.faces.first() else {
            return FacePoints::default();
        };

        let point = |index: usize| mesh.get(index).copied().map(Point2D::from);

        FacePoints {
            upper_lip: point(self.indices.upper_lip),
            lower_lip: point(self.indices.lower_lip),
            mouth_left: point(self.indices.mouth_left),
            mouth_right: point(self.indices.mouth_right),
            nose_tip: point(self.indices.nose_tip),
        }
    }

    #[must_use]
    pub const fn indices(&self) -> LandmarkIndices {
        self.indices
    }
}

/// Scalars derived from one frame (and the frame before it)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FaceMeasurements {
    /// Vertical lip gap; drives the mouth gesture
    pub mouth_gap: Option<f32>,
    /// Corner-to-corner mouth width
    pub mouth_width: Option<f32>,
    /// Tilt of the mouth line in degrees
    pub mouth_tilt: Option<f32>,
    /// Nose-tip motion since the previous frame
    pub nose_velocity: Velocity,
}

impl FaceMeasurements {
    #[must_use]
    pub fn measure(current: &FacePoints, previous: &FacePoints) -> Self {
        Self {
            mouth_gap: geometry::distance(current.upper_lip, current.lower_lip),
            mouth_width: geometry::distance(current.mouth_left, current.mouth_right),
            mouth_tilt: geometry::angle(current.mouth_left, current.mouth_right),
            nose_velocity: geometry::velocity(current.nose_tip, previous.nose_tip),
        }
    }
}
