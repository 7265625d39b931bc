//! Newline-delimited JSON bridge to the camera, speech and render collaborators
//!
//! Input lines (one object per line):
//!
//! ```text
//! {"type":"frame","faces":[[[x,y], ...]]}
//! {"type":"speech","is_final":true,"text":"a red rose please"}
//! ```
//!
//! Output lines carry an `"event"` tag: `engine` (start/stop requests for the
//! speech engine) and `snapshot` (state for the renderer).

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::capture::SpeechResult;
use crate::controller::Snapshot;
use crate::daemon::EngineCommand;
use crate::landmarks::DetectorFrame;
use crate::Result;

/// Messages from the camera and speech collaborators
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Landmark detector output for one camera frame
    Frame(DetectorFrame),
    /// Recognition result from the speech engine
    Speech(SpeechResult),
}

/// Messages to the speech engine and renderer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutputEvent {
    /// Start or stop listening
    Engine { command: EngineCommand },
    /// Current interaction state
    Snapshot(Snapshot),
}

/// Parse one input line; blank lines yield `None`
///
/// # Errors
///
/// Returns error if the line is not a valid input event
pub fn parse_line(line: &str) -> Result<Option<InputEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Encode one output event as a single JSON line (without the newline)
///
/// # Errors
///
/// Returns error if serialization fails
pub fn encode(event: &OutputEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Read input lines and forward parsed events until EOF
///
/// Malformed lines are logged and skipped.
///
/// # Errors
///
/// Returns error if reading fails
pub async fn pump_input<R>(reader: R, tx: mpsc::Sender<InputEvent>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Some(event)) => {
                if tx.send(event).await.is_err() {
                    tracing::debug!("daemon gone, stopping input");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "skipping malformed input line"),
        }
    }
    tracing::debug!("input reached end of stream");
    Ok(())
}

/// Write engine commands and snapshots as JSON lines until both channels close
///
/// # Errors
///
/// Returns error if encoding or writing fails
pub async fn pump_output<W>(
    mut writer: W,
    mut engine_rx: mpsc::UnboundedReceiver<EngineCommand>,
    mut snapshot_rx: mpsc::UnboundedReceiver<Snapshot>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = tokio::select! {
            biased;
            Some(command) = engine_rx.recv() => OutputEvent::Engine { command },
            Some(snapshot) = snapshot_rx.recv() => OutputEvent::Snapshot(snapshot),
            else => break,
        };

        let mut line = encode(&event)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
