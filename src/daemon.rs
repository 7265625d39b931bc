//! Daemon - the interaction runtime
//!
//! Owns the single [`InteractionController`] and feeds it from two message
//! sources: camera frames and speech results. A periodic tick drives the
//! pipeline with the most recent frame; speech results are applied as soon as
//! they arrive. Nothing else touches the controller, so no locking is needed.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::bridge::InputEvent;
use crate::capture::SpeechEngine;
use crate::controller::{InteractionController, Snapshot};
use crate::landmarks::DetectorFrame;
use crate::{Catalogue, Config, Error, Result};

/// A frame older than this many ticks counts as "no face"
const STALE_FRAME_TICKS: u32 = 4;

/// Request sent to the external speech engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineCommand {
    Start,
    Stop,
}

/// Speech engine that forwards start/stop requests over a channel
#[derive(Debug, Clone)]
pub struct ChannelSpeechEngine {
    tx: mpsc::UnboundedSender<EngineCommand>,
}

impl ChannelSpeechEngine {
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<EngineCommand>) -> Self {
        Self { tx }
    }

    fn send(&self, command: EngineCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!(?command, "speech engine channel closed, request dropped");
        }
    }
}

impl SpeechEngine for ChannelSpeechEngine {
    fn start(&mut self) {
        self.send(EngineCommand::Start);
    }

    fn stop(&mut self) {
        self.send(EngineCommand::Stop);
    }
}

/// Channels connecting the daemon to its collaborators
#[derive(Debug)]
pub struct DaemonChannels {
    /// Frames and speech results
    pub inputs: mpsc::Receiver<InputEvent>,
    /// Start/stop requests for the speech engine
    pub engine: mpsc::UnboundedSender<EngineCommand>,
    /// Renderer state, sent whenever it changes
    pub snapshots: mpsc::UnboundedSender<Snapshot>,
    /// Stops the loop
    pub shutdown: mpsc::Receiver<()>,
}

/// The Bloom daemon
pub struct Daemon {
    config: Config,
    catalogue: Catalogue,
}

impl Daemon {
    #[must_use]
    pub const fn new(config: Config, catalogue: Catalogue) -> Self {
        Self { config, catalogue }
    }

    /// Run until shutdown is requested or the input channel closes
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot receiver goes away
    pub async fn run(self, channels: DaemonChannels) -> Result<()> {
        let DaemonChannels {
            mut inputs,
            engine,
            snapshots,
            mut shutdown,
        } = channels;

        let tick_interval = self.config.runtime.tick_interval;
        let stale_after = tick_interval * STALE_FRAME_TICKS;

        let engine = ChannelSpeechEngine::new(engine);
        let mut controller = InteractionController::new(&self.config, self.catalogue, engine);
        let mut publisher = SnapshotPublisher::new(snapshots);

        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let no_face = DetectorFrame::empty();
        let mut latest: Option<(DetectorFrame, Instant)> = None;

        tracing::info!(
            tick = ?tick_interval,
            entries = controller.catalogue().len(),
            "interaction loop started"
        );
        publisher.publish(&controller)?;

        loop {
            tokio::select! {
                Some(()) = shutdown.recv() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                event = inputs.recv() => {
                    match event {
                        Some(InputEvent::Frame(frame)) => latest = Some((frame, now())),
                        Some(InputEvent::Speech(result)) => {
                            controller.on_speech(result, now());
                            publisher.publish(&controller)?;
                        }
                        None => {
                            tracing::info!("input closed");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let now = now();
                    let frame = latest
                        .as_ref()
                        .filter(|(_, received)| fresh(*received, now, stale_after))
                        .map_or(&no_face, |(frame, _)| frame);
                    controller.tick(frame, now);
                    publisher.publish(&controller)?;
                }
            }
        }

        Ok(())
    }
}

/// Sends a snapshot only when it differs from the last one sent
struct SnapshotPublisher {
    tx: mpsc::UnboundedSender<Snapshot>,
    last: Option<Snapshot>,
}

impl SnapshotPublisher {
    const fn new(tx: mpsc::UnboundedSender<Snapshot>) -> Self {
        Self { tx, last: None }
    }

    fn publish<E: SpeechEngine>(&mut self, controller: &InteractionController<E>) -> Result<()> {
        let snapshot = controller.snapshot();
        if self.last.as_ref() == Some(&snapshot) {
            return Ok(());
        }
        self.tx
            .send(snapshot.clone())
            .map_err(|_| Error::Bridge("snapshot receiver dropped".to_string()))?;
        self.last = Some(snapshot);
        Ok(())
    }
}

/// Current time on the tokio clock, so paused test clocks apply
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

fn fresh(received: Instant, now: Instant, stale_after: Duration) -> bool {
    now.saturating_duration_since(received) < stale_after
}
