//! Interaction controller
//!
//! Owns every piece of interaction state and runs the per-tick pipeline in a
//! fixed order: sample landmarks, measure, debounce, drive the capture window.
//! Speech results come in between ticks through [`InteractionController::on_speech`];
//! because both entry points take `&mut self`, each one is applied whole
//! before the next begins.

use std::time::Instant;

use serde::Serialize;

use crate::capture::{CaptureOutcome, SpeechEngine, SpeechResult, VoiceCaptureController};
use crate::catalogue::Catalogue;
use crate::config::Config;
use crate::gesture::{GestureDebouncer, GestureState};
use crate::landmarks::{DetectorFrame, FaceMeasurements, FacePoints, LandmarkSampler};
use crate::matcher::PhraseMatcher;
use crate::selection::{Outcome, Resolution, SelectionResolver};

/// What the renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub current_index: usize,
    pub current_label: String,
    pub gesture_is_open: bool,
    pub capturing: bool,
    pub feedback_message: String,
    pub last_outcome: Option<Outcome>,
    pub measurements: FaceMeasurements,
}

/// Composes the gesture, capture, matching and selection stages
#[derive(Debug)]
pub struct InteractionController<E> {
    sampler: LandmarkSampler,
    debouncer: GestureDebouncer,
    capture: VoiceCaptureController,
    matcher: PhraseMatcher,
    resolver: SelectionResolver,
    catalogue: Catalogue,
    engine: E,
    previous_points: FacePoints,
    measurements: FaceMeasurements,
}

impl<E: SpeechEngine> InteractionController<E> {
    #[must_use]
    pub fn new(config: &Config, catalogue: Catalogue, engine: E) -> Self {
        Self {
            sampler: LandmarkSampler::new(config.landmarks),
            debouncer: GestureDebouncer::new(config.gesture),
            capture: VoiceCaptureController::new(config.capture),
            matcher: PhraseMatcher::new(&catalogue),
            resolver: SelectionResolver::new(
                config.selection.timeout_fallback,
                config.selection.seed,
            ),
            catalogue,
            engine,
            previous_points: FacePoints::default(),
            measurements: FaceMeasurements::default(),
        }
    }

    /// Run one tick of the pipeline
    ///
    /// Returns a resolution when a capture timed out during this tick.
    pub fn tick(&mut self, frame: &DetectorFrame, now: Instant) -> Option<Resolution> {
        let points = self.sampler.sample(frame);
        self.measurements = FaceMeasurements::measure(&points, &self.previous_points);
        self.previous_points = points;

        if let Some(event) = self.debouncer.update(self.measurements.mouth_gap, now)
            && let Some(outcome) = self.capture.on_gesture(&event, &mut self.engine)
        {
            return Some(self.resolve(outcome));
        }

        self.capture
            .poll(now, &mut self.engine)
            .map(|outcome| self.resolve(outcome))
    }

    /// Apply a result from the speech engine
    ///
    /// Returns a resolution when the result closed an active capture window.
    pub fn on_speech(&mut self, result: SpeechResult, now: Instant) -> Option<Resolution> {
        self.capture
            .on_speech(result, now, &mut self.engine)
            .map(|outcome| self.resolve(outcome))
    }

    fn resolve(&mut self, outcome: CaptureOutcome) -> Resolution {
        match outcome {
            CaptureOutcome::Phrase(text) => {
                let matched = self.matcher.find(&text);
                self.resolver.resolve_match(matched, &self.catalogue)
            }
            CaptureOutcome::TimedOut => self.resolver.resolve_timeout(&self.catalogue),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let current_index = self.resolver.current_index();
        Snapshot {
            current_index,
            current_label: self
                .catalogue
                .label(current_index)
                .unwrap_or_default()
                .to_string(),
            gesture_is_open: self.debouncer.is_open(),
            capturing: self.capture.is_active(),
            feedback_message: self.resolver.feedback_message().to_string(),
            last_outcome: self.resolver.state().last_outcome,
            measurements: self.measurements,
        }
    }
}

impl<E> InteractionController<E> {
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.resolver.current_index()
    }

    #[must_use]
    pub const fn gesture_is_open(&self) -> bool {
        self.debouncer.is_open()
    }

    #[must_use]
    pub const fn gesture_state(&self) -> GestureState {
        self.debouncer.state()
    }

    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.capture.is_active()
    }

    #[must_use]
    pub fn feedback_message(&self) -> &str {
        self.resolver.feedback_message()
    }

    #[must_use]
    pub const fn measurements(&self) -> FaceMeasurements {
        self.measurements
    }

    #[must_use]
    pub const fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }
}
