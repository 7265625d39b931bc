//! Mouth gesture debouncing
//!
//! Turns the noisy per-frame lip gap into an edge-triggered open/closed
//! signal. Opening needs the gap above `open_threshold` and the re-arm
//! cooldown elapsed since the last close; closing needs the gap below
//! `close_threshold` or the mouth being open for `max_open`.

use std::time::Instant;

use serde::Serialize;

use crate::config::GestureConfig;

/// Why the mouth was considered closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    /// Gap dropped below the close threshold
    Natural,
    /// Mouth stayed open for the maximum duration
    Timeout,
}

/// An open/closed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Opened { at: Instant },
    Closed { at: Instant, reason: CloseReason },
}

/// Current mouth state and the times of the last transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    pub is_open: bool,
    pub opened_at: Option<Instant>,
    pub closed_at: Option<Instant>,
}

/// Hysteresis debouncer over the lip gap
#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    config: GestureConfig,
    state: GestureState,
    /// Set after a timeout close until the gap drops below the close threshold
    awaiting_release: bool,
}

impl GestureDebouncer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
            awaiting_release: false,
        }
    }

    /// Feed one tick's lip gap
    ///
    /// A missing gap (no face this frame) never changes the state on its own;
    /// only the max-open timeout can close the mouth while tracking is lost.
    pub fn update(&mut self, gap: Option<f32>, now: Instant) -> Option<GestureEvent> {
        if self.state.is_open {
            let opened_at = self.state.opened_at.unwrap_or(now);
            if now.saturating_duration_since(opened_at) >= self.config.max_open {
                return Some(self.close(now, CloseReason::Timeout));
            }
            return match gap {
                Some(gap) if gap < self.config.close_threshold => {
                    Some(self.close(now, CloseReason::Natural))
                }
                _ => None,
            };
        }

        let gap = gap?;

        if self.awaiting_release {
            if gap < self.config.close_threshold {
                tracing::debug!(gap, "mouth released after timeout, re-armed");
                self.awaiting_release = false;
            }
            return None;
        }

        if gap > self.config.open_threshold && self.rearmed(now) {
            self.state.is_open = true;
            self.state.opened_at = Some(now);
            tracing::info!(gap, "mouth opened");
            return Some(GestureEvent::Opened { at: now });
        }

        None
    }

    fn rearmed(&self, now: Instant) -> bool {
        self.state.closed_at.is_none_or(|closed_at| {
            now.saturating_duration_since(closed_at) >= self.config.rearm_cooldown
        })
    }

    fn close(&mut self, now: Instant, reason: CloseReason) -> GestureEvent {
        self.state.is_open = false;
        self.state.closed_at = Some(now);
        self.awaiting_release =
            reason == CloseReason::Timeout && self.config.release_after_timeout;
        tracing::info!(?reason, "mouth closed");
        GestureEvent::Closed { at: now, reason }
    }

    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_open
    }
}
