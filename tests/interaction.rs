//! Interaction controller integration tests
//!
//! Drives the full pipeline with synthetic frames and speech results; no
//! camera or speech hardware involved.

use std::collections::HashSet;

use bloom_gateway::{
    CaptureOutcome, Catalogue, CatalogueEntry, CloseReason, DetectorFrame, GestureDebouncer,
    GestureEvent, InteractionController, Outcome, SpeechResult, VoiceCaptureController,
};

mod common;
use common::{RecordingEngine, at, face_with_gap, test_config};

fn controller() -> InteractionController<RecordingEngine> {
    InteractionController::new(&test_config(), Catalogue::builtin(), RecordingEngine::default())
}

#[test]
fn test_debounced_sequence_yields_one_cycle() {
    let config = test_config();
    let mut debouncer = GestureDebouncer::new(config.gesture);
    let start = std::time::Instant::now();

    let events: Vec<GestureEvent> = [1.0, 1.0, 4.0, 4.0, 1.0, 1.0]
        .into_iter()
        .zip((0..).map(|i| i * 100))
        .filter_map(|(gap, ms)| debouncer.update(Some(gap), at(start, ms)))
        .collect();

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], GestureEvent::Opened { .. }));
    assert!(matches!(
        events[1],
        GestureEvent::Closed {
            reason: CloseReason::Natural,
            ..
        }
    ));
}

#[test]
fn test_full_capture_cycle() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    assert_eq!(ctl.snapshot().last_outcome, None);

    ctl.tick(&face_with_gap(1.0), start);
    ctl.tick(&face_with_gap(6.0), at(start, 33));
    assert!(ctl.gesture_is_open());
    assert!(ctl.is_capturing());

    ctl.tick(&face_with_gap(0.5), at(start, 600));
    assert!(!ctl.gesture_is_open());
    assert!(ctl.is_capturing());

    // Interim results do not end the window
    assert_eq!(ctl.on_speech(SpeechResult::interim("i would"), at(start, 700)), None);

    let resolution = ctl
        .on_speech(
            SpeechResult::final_text("I would like to see a lotus flower"),
            at(start, 900),
        )
        .unwrap();
    assert_eq!(resolution.outcome, Outcome::Matched);

    let snapshot = ctl.snapshot();
    assert_eq!(snapshot.current_label, "Lotus");
    assert_eq!(snapshot.feedback_message, "showing Lotus");
    assert!(!snapshot.capturing);
    assert_eq!(ctl.engine().calls, vec!["start", "stop"]);
}

#[test]
fn test_unmatched_phrase_falls_back_to_random() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    let resolution = ctl
        .on_speech(SpeechResult::final_text("a giant cactus"), at(start, 500))
        .unwrap();

    assert_eq!(resolution.outcome, Outcome::NoMatch);
    assert!(resolution.index < ctl.catalogue().len());
    assert_eq!(ctl.current_index(), resolution.index);
}

#[test]
fn test_stuck_open_mouth_times_out_at_max_open() {
    let mut config = test_config();
    config.gesture.release_after_timeout = true;
    let mut ctl = InteractionController::new(&config, Catalogue::builtin(), RecordingEngine::default());
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    for ms in (100..10_000).step_by(100) {
        assert_eq!(ctl.tick(&face_with_gap(6.0), at(start, ms)), None, "closed early at {ms}ms");
    }

    let resolution = ctl.tick(&face_with_gap(6.0), at(start, 10_000)).unwrap();
    assert_eq!(resolution.outcome, Outcome::TimedOut);
    assert!(!ctl.gesture_is_open());
    assert!(!ctl.is_capturing());
    assert_eq!(ctl.engine().stops(), 1);

    // Still wide open well past every cooldown: no new window
    for ms in (10_100..12_000).step_by(100) {
        ctl.tick(&face_with_gap(6.0), at(start, ms));
    }
    assert_eq!(ctl.engine().starts(), 1);
}

#[test]
fn test_stuck_open_mouth_rearms_after_cooldown_by_default() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    for ms in (100..=10_000).step_by(100) {
        ctl.tick(&face_with_gap(6.0), at(start, ms));
    }
    assert!(!ctl.gesture_is_open());
    assert_eq!(ctl.engine().stops(), 1);

    // Threshold plus re-arm cooldown is all it takes to reopen
    ctl.tick(&face_with_gap(6.0), at(start, 10_400));
    assert!(!ctl.gesture_is_open());
    ctl.tick(&face_with_gap(6.0), at(start, 10_500));
    assert!(ctl.gesture_is_open());
    assert!(ctl.is_capturing());
    assert_eq!(ctl.engine().starts(), 2);
}

#[test]
fn test_capture_expires_after_natural_close() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    ctl.tick(&face_with_gap(1.0), at(start, 400));
    assert!(ctl.is_capturing());

    assert_eq!(ctl.tick(&face_with_gap(1.0), at(start, 9_900)), None);
    let resolution = ctl.tick(&face_with_gap(1.0), at(start, 10_000)).unwrap();
    assert_eq!(resolution.outcome, Outcome::TimedOut);
    assert!(!ctl.is_capturing());
}

#[test]
fn test_lost_tracking_does_not_cancel_capture() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    for ms in (100..2_000).step_by(100) {
        ctl.tick(&DetectorFrame::empty(), at(start, ms));
    }
    assert!(ctl.gesture_is_open());
    assert!(ctl.is_capturing());

    let resolution = ctl
        .on_speech(SpeechResult::final_text("tulips"), at(start, 2_100))
        .unwrap();
    assert_eq!(ctl.catalogue().label(resolution.index), Some("Tulip"));
}

#[test]
fn test_late_result_after_timeout_ignored() {
    let mut ctl = controller();
    let start = std::time::Instant::now();

    ctl.tick(&face_with_gap(6.0), start);
    ctl.tick(&face_with_gap(6.0), at(start, 10_000));
    let before = ctl.snapshot();

    assert_eq!(
        ctl.on_speech(SpeechResult::final_text("rose"), at(start, 10_050)),
        None
    );
    assert_eq!(ctl.snapshot().current_index, before.current_index);
    assert_eq!(ctl.snapshot().last_outcome, Some(Outcome::TimedOut));
}

#[test]
fn test_overlapping_start_requests() {
    let config = test_config();
    let mut capture = VoiceCaptureController::new(config.capture);
    let mut engine = RecordingEngine::default();
    let start = std::time::Instant::now();

    assert!(capture.try_start(start, &mut engine));
    assert!(!capture.try_start(at(start, 10), &mut engine));
    assert!(capture.window().active);
    assert_eq!(engine.starts(), 1);

    // A result closes the window; restarting waits for the cooldown
    let outcome = capture.on_speech(SpeechResult::final_text("daisy"), at(start, 200), &mut engine);
    assert_eq!(outcome, Some(CaptureOutcome::Phrase("daisy".to_string())));
    assert!(!capture.try_start(at(start, 300), &mut engine));
    assert!(capture.try_start(at(start, 700), &mut engine));
    assert_eq!(engine.starts(), 2);
}

#[test]
fn test_random_fallback_visits_many_entries() {
    let entries: Vec<CatalogueEntry> = Catalogue::builtin().entries().to_vec();
    let mut config = test_config();
    config.selection.seed = None;
    let mut ctl = InteractionController::new(
        &config,
        Catalogue::new(entries).unwrap(),
        RecordingEngine::default(),
    );
    let start = std::time::Instant::now();

    let mut seen = HashSet::new();
    let mut ms = 0;
    for _ in 0..1000 {
        // open, then say something that matches nothing
        ctl.tick(&face_with_gap(1.0), at(start, ms));
        ctl.tick(&face_with_gap(6.0), at(start, ms + 600));
        let resolution = ctl
            .on_speech(SpeechResult::final_text("nothing at all"), at(start, ms + 700))
            .unwrap();
        assert!(resolution.index < 17);
        seen.insert(resolution.index);
        ms += 1_400;
    }
    assert!(seen.len() > 1);
}
