//! Scripted host events: drive an [`Engine`] from JSON lines.
//!
//! Each input line is one [`HostEvent`]; every resulting [`Action`] is
//! written back as one JSON line, followed by activation outcomes and, at the
//! end, the toasts still on screen. Blank lines and `#` comments are skipped.
//!
//! Collaborator tasks spawned by an event are awaited before the next line is
//! read, so a script's output does not depend on scheduling.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::card::{CardId, IconRef};
use crate::containment::ReservoirBounds;
use crate::engine::{Action, Activation, Engine};
use crate::geometry::{Point, Rect, Viewport};
use crate::persistence::KvStore;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid event: {source}")]
    Parse { line: usize, source: serde_json::Error },
    #[error("output encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One host-side event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    PointerDown { id: CardId, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerCancel,
    Activate { id: CardId },
    Viewport { width: f64, height: f64 },
    Reservoir { left: f64, top: f64, right: f64, bottom: f64 },
    ReservoirHidden,
    AddCard {
        name: String,
        action: String,
        #[serde(default)]
        icon: Option<String>,
    },
    Reset,
    ConfigurePath { path: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub actions: usize,
}

/// Run every event in `input` through `engine`.
///
/// `bounds` must be the probe the engine was built with; reservoir events
/// update it.
///
/// # Errors
///
/// Stops at the first unreadable or malformed line, or when `output` fails.
/// Rejected form input is not an error; it surfaces as a toast.
pub async fn replay<S, R, W>(
    engine: &mut Engine<S>,
    bounds: &ReservoirBounds,
    input: R,
    output: &mut W,
) -> Result<ReplaySummary, ReplayError>
where
    S: KvStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = input.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: HostEvent =
            serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse { line: line_no, source })?;
        debug!(line = line_no, ?event, "replaying event");
        summary.events += 1;

        match event {
            HostEvent::Activate { id } => {
                let activation = engine.on_activate(&id);
                let outcome = match &activation {
                    Activation::Unknown => "unknown",
                    Activation::Suppressed => "suppressed",
                    Activation::Dispatched(_) => "dispatched",
                    Activation::Unavailable => "unavailable",
                };
                write_line(output, &json!({ "type": "activation", "id": id, "outcome": outcome })).await?;
                if let Activation::Dispatched(handle) = activation {
                    settle(handle).await;
                }
            }
            HostEvent::ConfigurePath { path } => {
                if let Some(handle) = engine.configure_local_path(&path) {
                    settle(handle).await;
                }
            }
            other => {
                for action in apply(engine, bounds, other) {
                    write_line(output, &action).await?;
                    summary.actions += 1;
                }
            }
        }
    }

    for toast in engine.toasts().active() {
        write_line(output, &json!({ "type": "toast", "text": toast.text, "severity": toast.severity })).await?;
    }
    output.flush().await?;
    Ok(summary)
}

fn apply<S: KvStore>(engine: &mut Engine<S>, bounds: &ReservoirBounds, event: HostEvent) -> Vec<Action> {
    match event {
        HostEvent::PointerDown { id, x, y } => engine.on_pointer_down(&id, Point::new(x, y)),
        HostEvent::PointerMove { x, y } => engine.on_pointer_move(Point::new(x, y)),
        HostEvent::PointerUp { x, y } => engine.on_pointer_up(Point::new(x, y)),
        HostEvent::PointerCancel => engine.on_pointer_cancel(),
        HostEvent::Viewport { width, height } => {
            engine.set_viewport(Viewport::new(width, height));
            Vec::new()
        }
        HostEvent::Reservoir { left, top, right, bottom } => {
            bounds.set(Rect::new(left, top, right, bottom));
            Vec::new()
        }
        HostEvent::ReservoirHidden => {
            bounds.clear();
            Vec::new()
        }
        HostEvent::AddCard { name, action, icon } => match engine.add_card(&name, &action, icon.map(IconRef::new)) {
            Ok(_) => vec![Action::RenderNeeded],
            Err(_) => Vec::new(),
        },
        HostEvent::Reset => engine.reset_layout(),
        HostEvent::Activate { .. } | HostEvent::ConfigurePath { .. } => Vec::new(),
    }
}

async fn settle(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        warn!(error = %e, "collaborator task failed");
    }
}

async fn write_line<W, T>(output: &mut W, value: &T) -> Result<(), ReplayError>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    Ok(())
}
