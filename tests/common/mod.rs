//! Shared test utilities

use std::time::{Duration, Instant};

use bloom_gateway::config::{GestureConfig, SelectionConfig};
use bloom_gateway::{Config, DetectorFrame, LandmarkIndices, SpeechEngine};

/// Mesh layout used by the test frames: lips, mouth corners, nose tip
pub const TEST_INDICES: LandmarkIndices = LandmarkIndices {
    upper_lip: 0,
    lower_lip: 1,
    mouth_left: 2,
    mouth_right: 3,
    nose_tip: 4,
};

/// Config with a 3.0/2.0 hysteresis band, 500ms cooldowns and 10s timeouts
#[must_use]
pub fn test_config() -> Config {
    Config {
        gesture: GestureConfig {
            open_threshold: 3.0,
            close_threshold: 2.0,
            ..GestureConfig::default()
        },
        selection: SelectionConfig {
            seed: Some(17),
            ..SelectionConfig::default()
        },
        landmarks: TEST_INDICES,
        ..Config::default()
    }
}

/// A single face whose lips are `gap` pixels apart
#[must_use]
pub fn face_with_gap(gap: f32) -> DetectorFrame {
    DetectorFrame::single(vec![
        [320.0, 400.0],
        [320.0, 400.0 + gap],
        [290.0, 405.0],
        [350.0, 405.0],
        [320.0, 340.0],
    ])
}

/// `start` plus `ms` milliseconds
#[must_use]
pub fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

/// Speech engine that records every request
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<&'static str>,
}

impl RecordingEngine {
    #[must_use]
    pub fn starts(&self) -> usize {
        self.calls.iter().filter(|c| **c == "start").count()
    }

    #[must_use]
    pub fn stops(&self) -> usize {
        self.calls.iter().filter(|c| **c == "stop").count()
    }
}

impl SpeechEngine for RecordingEngine {
    fn start(&mut self) {
        self.calls.push("start");
    }

    fn stop(&mut self) {
        self.calls.push("stop");
    }
}
