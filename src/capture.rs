//! Voice capture windows
//!
//! Opens a listening window on the external speech engine when the mouth
//! opens, and closes it when a final phrase arrives or the window times out.
//! Closing the mouth naturally does not end a window.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::gesture::{CloseReason, GestureEvent};

/// The external speech recognizer
///
/// Both calls are fire-and-forget requests; results come back later as
/// [`SpeechResult`]s on their own schedule.
pub trait SpeechEngine {
    fn start(&mut self);
    fn stop(&mut self);
}

/// A recognition result delivered by the speech engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpeechResult {
    #[serde(default = "default_final")]
    pub is_final: bool,
    pub text: String,
}

const fn default_final() -> bool {
    true
}

impl SpeechResult {
    /// A final result
    #[must_use]
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            is_final: true,
            text: text.into(),
        }
    }

    /// An interim (non-final) result
    #[must_use]
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            is_final: false,
            text: text.into(),
        }
    }
}

/// How a capture window ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A final phrase arrived while listening
    Phrase(String),
    /// Nothing usable arrived before the window was force-closed
    TimedOut,
}

/// The current listening window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureWindow {
    pub active: bool,
    pub started_at: Option<Instant>,
    pub cooldown_until: Option<Instant>,
}

/// Starts and stops the speech engine in response to gestures and results
#[derive(Debug, Clone)]
pub struct VoiceCaptureController {
    config: CaptureConfig,
    window: CaptureWindow,
}

impl VoiceCaptureController {
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            window: CaptureWindow::default(),
        }
    }

    /// React to a mouth transition
    pub fn on_gesture<E>(&mut self, event: &GestureEvent, engine: &mut E) -> Option<CaptureOutcome>
    where
        E: SpeechEngine + ?Sized,
    {
        match *event {
            GestureEvent::Opened { at } => {
                self.try_start(at, engine);
                None
            }
            GestureEvent::Closed {
                reason: CloseReason::Natural,
                ..
            } => {
                if self.window.active {
                    tracing::debug!("mouth closed, still listening for a result");
                }
                None
            }
            GestureEvent::Closed {
                at,
                reason: CloseReason::Timeout,
            } => {
                if !self.window.active {
                    return None;
                }
                tracing::info!("gesture timed out, stopping capture");
                self.finish(at, engine);
                Some(CaptureOutcome::TimedOut)
            }
        }
    }

    /// Open a window unless one is already active or the cooldown is running
    ///
    /// Returns whether a new window was opened.
    pub fn try_start<E>(&mut self, now: Instant, engine: &mut E) -> bool
    where
        E: SpeechEngine + ?Sized,
    {
        if self.window.active {
            tracing::debug!("capture already active, ignoring start request");
            return false;
        }
        if let Some(until) = self.window.cooldown_until
            && now < until
        {
            tracing::debug!(
                remaining = ?(until - now),
                "capture cooling down, ignoring start request"
            );
            return false;
        }

        self.window.active = true;
        self.window.started_at = Some(now);
        engine.start();
        tracing::info!("capture started");
        true
    }

    /// Enforce the maximum window duration; call once per tick
    pub fn poll<E>(&mut self, now: Instant, engine: &mut E) -> Option<CaptureOutcome>
    where
        E: SpeechEngine + ?Sized,
    {
        let started_at = self.window.started_at.filter(|_| self.window.active)?;
        if now.saturating_duration_since(started_at) < self.config.max_duration {
            return None;
        }

        tracing::info!("capture window expired without a result");
        self.finish(now, engine);
        Some(CaptureOutcome::TimedOut)
    }

    /// Accept a result from the speech engine
    ///
    /// Interim results and results arriving outside a window are dropped.
    pub fn on_speech<E>(
        &mut self,
        result: SpeechResult,
        now: Instant,
        engine: &mut E,
    ) -> Option<CaptureOutcome>
    where
        E: SpeechEngine + ?Sized,
    {
        if !result.is_final {
            tracing::trace!(text = %result.text, "interim result");
            return None;
        }
        if !self.window.active {
            tracing::debug!(text = %result.text, "result outside capture window, ignoring");
            return None;
        }

        tracing::info!(text = %result.text, "phrase recognized");
        self.finish(now, engine);
        Some(CaptureOutcome::Phrase(result.text))
    }

    fn finish<E>(&mut self, now: Instant, engine: &mut E)
    where
        E: SpeechEngine + ?Sized,
    {
        engine.stop();
        self.window.active = false;
        self.window.cooldown_until = Some(now + self.config.cooldown);
    }

    #[must_use]
    pub const fn window(&self) -> CaptureWindow {
        self.window
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.window.active
    }
}
