//! Selection resolution
//!
//! The only place the displayed catalogue index changes. Matches select their
//! entry; misses and timeouts fall back to a uniformly random entry.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::catalogue::Catalogue;
use crate::{Error, Result};

/// Feedback shown before the first capture
pub const WELCOME_MESSAGE: &str = "open your mouth and name what you'd like to see";

/// Feedback after a timed-out capture that fell back to a random entry
pub const TIMED_OUT_MESSAGE: &str = "no match — showing a random entry";

/// Feedback after a phrase that matched nothing
pub const NOT_FOUND_MESSAGE: &str = "no entry — showing a random entry";

/// How the last capture was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Matched,
    NoMatch,
    TimedOut,
}

/// What a timed-out capture does to the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Pick a random entry, same as a miss
    #[default]
    Random,
    /// Leave the current entry on display
    KeepCurrent,
}

impl FromStr for FallbackPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "keep" | "keep_current" | "keep-current" => Ok(Self::KeepCurrent),
            other => Err(Error::Config(format!(
                "unknown timeout fallback {other:?} (expected \"random\" or \"keep\")"
            ))),
        }
    }
}

/// The displayed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub current_index: usize,
    pub last_outcome: Option<Outcome>,
}

/// Result of resolving one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub index: usize,
    pub outcome: Outcome,
    pub message: String,
}

/// Applies match results and fallbacks to the selection
#[derive(Debug)]
pub struct SelectionResolver {
    state: SelectionState,
    policy: FallbackPolicy,
    feedback: String,
    rng: StdRng,
}

impl SelectionResolver {
    /// Create a resolver; a `seed` makes the fallback picks reproducible
    #[must_use]
    pub fn new(policy: FallbackPolicy, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            state: SelectionState::default(),
            policy,
            feedback: WELCOME_MESSAGE.to_string(),
            rng,
        }
    }

    /// Resolve a recognized phrase's match result
    pub fn resolve_match(&mut self, matched: Option<usize>, catalogue: &Catalogue) -> Resolution {
        match matched.and_then(|index| catalogue.label(index).map(|label| (index, label))) {
            Some((index, label)) => {
                let message = format!("showing {label}");
                self.apply(index, Outcome::Matched, message)
            }
            None => {
                let index = self.random_index(catalogue);
                self.apply(index, Outcome::NoMatch, NOT_FOUND_MESSAGE.to_string())
            }
        }
    }

    /// Resolve a capture that ended without a phrase
    pub fn resolve_timeout(&mut self, catalogue: &Catalogue) -> Resolution {
        match self.policy {
            FallbackPolicy::Random => {
                let index = self.random_index(catalogue);
                self.apply(index, Outcome::TimedOut, TIMED_OUT_MESSAGE.to_string())
            }
            FallbackPolicy::KeepCurrent => {
                let index = self.state.current_index;
                let label = catalogue.label(index).unwrap_or_default();
                let message = format!("timed out — still showing {label}");
                self.apply(index, Outcome::TimedOut, message)
            }
        }
    }

    fn random_index(&mut self, catalogue: &Catalogue) -> usize {
        if catalogue.is_empty() {
            return 0;
        }
        self.rng.gen_range(0..catalogue.len())
    }

    fn apply(&mut self, index: usize, outcome: Outcome, message: String) -> Resolution {
        tracing::info!(index, ?outcome, message = %message, "selection resolved");
        self.state = SelectionState {
            current_index: index,
            last_outcome: Some(outcome),
        };
        self.feedback.clone_from(&message);
        Resolution {
            index,
            outcome,
            message,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.state.current_index
    }

    #[must_use]
    pub fn feedback_message(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }
}
