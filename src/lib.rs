//! Bloom Gateway - gesture and voice interaction controller for a
//! face-tracking art installation
//!
//! A visitor opens their mouth to start a voice capture and names what they
//! would like to see; the installation shows the matching catalogue entry, or
//! a random one when nothing matches.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Collaborators                       │
//! │   Camera + landmarks  │  Speech engine  │  Renderer  │
//! └────────────────────┬────────────────────────────────┘
//!                      │ JSON lines (bridge)
//! ┌────────────────────▼────────────────────────────────┐
//! │                     Daemon                           │
//! │   periodic tick  │  frame events  │  speech events   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Interaction Controller                  │
//! │ Landmarks → Geometry → Gesture → Capture             │
//! │                     → Matcher → Selection            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod capture;
pub mod catalogue;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod matcher;
pub mod selection;

pub use capture::{CaptureOutcome, CaptureWindow, SpeechEngine, SpeechResult, VoiceCaptureController};
pub use catalogue::{Catalogue, CatalogueEntry};
pub use config::Config;
pub use controller::{InteractionController, Snapshot};
pub use daemon::{ChannelSpeechEngine, Daemon, DaemonChannels, EngineCommand};
pub use error::{Error, Result};
pub use geometry::{Point2D, Velocity, angle, distance, velocity};
pub use gesture::{CloseReason, GestureDebouncer, GestureEvent, GestureState};
pub use landmarks::{DetectorFrame, FaceMeasurements, FacePoints, LandmarkIndices, LandmarkSampler};
pub use matcher::{PhraseMatcher, match_phrase, tokenize};
pub use selection::{FallbackPolicy, Outcome, Resolution, SelectionResolver, SelectionState};
