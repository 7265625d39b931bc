//! Geometric measures between tracked points
//!
//! Pure functions over optional points. A missing point yields a missing
//! measurement, except for [`velocity`] which falls back to a zero vector so
//! downstream motion logic never stalls on a dropped frame.

use serde::{Deserialize, Serialize};

/// A screen-space coordinate in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point2D {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Frame-to-frame displacement of a point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    /// Magnitude of the displacement
    pub speed: f32,
}

impl Velocity {
    /// The "no motion data" vector
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        speed: 0.0,
    };
}

/// Euclidean distance between two points, in the units of the inputs
#[must_use]
pub fn distance(p1: Option<Point2D>, p2: Option<Point2D>) -> Option<f32> {
    let (a, b) = (p1?, p2?);
    Some((b.x - a.x).hypot(b.y - a.y))
}

/// Direction from `base` to `end` in degrees, normalized to `[0, 360)`
#[must_use]
pub fn angle(base: Option<Point2D>, end: Option<Point2D>) -> Option<f32> {
    let (a, b) = (base?, end?);
    let degrees = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    Some(if normalized >= 360.0 { 0.0 } else { normalized })
}

/// Displacement from `previous` to `current`, or [`Velocity::ZERO`] if either is missing
#[must_use]
pub fn velocity(current: Option<Point2D>, previous: Option<Point2D>) -> Velocity {
    match (current, previous) {
        (Some(c), Some(p)) => {
            let x = c.x - p.x;
            let y = c.y - p.y;
            Velocity {
                x,
                y,
                speed: x.hypot(y),
            }
        }
        _ => Velocity::ZERO,
    }
}
