//! Widget bridge transport
//!
//! The third-party embeddable player runs inside a companion embed page.
//! That page connects back to this process over a single local TCP
//! connection and speaks newline-delimited JSON: commands go out, lifecycle
//! events come in. The connection being established plus the `ready` event
//! is the widget's asynchronous script-load handshake.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Which container the widget surface is mounted in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mount {
    /// Hidden persistent container; audio keeps playing
    Background,
    /// The full-screen player view's container
    Stage,
}

/// Commands sent to the embed page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum WidgetCommand {
    /// Sent once after the ready handshake; disables the widget's native
    /// chrome since the application supplies its own transport UI
    Configure {
        autoplay: bool,
        native_controls: bool,
        related_content: bool,
        branding_mark: bool,
    },
    Load { media_id: String },
    Play,
    Pause,
    Stop,
    Seek { seconds: f64 },
    /// Ask for a `time` report; the widget has no push-based progress
    Poll,
    Mount { target: Mount },
}

/// Playback states the widget may report. Anything beyond the three the
/// application cares about is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportedState {
    Playing,
    Paused,
    Ended,
    #[serde(other)]
    Other,
}

/// Events received from the embed page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WidgetEvent {
    Ready,
    State {
        state: ReportedState,
        #[serde(default)]
        media_id: Option<String>,
    },
    Time {
        position: f64,
        duration: f64,
        #[serde(default)]
        media_id: Option<String>,
    },
}

/// Outbound half of the widget boundary. Fire-and-forget: a send that
/// cannot be delivered is logged, never surfaced to callers.
pub trait WidgetLink: Send + Sync + 'static {
    fn send(&self, command: WidgetCommand);
}

/// Production link backed by the TCP bridge task
#[derive(Clone)]
pub struct TcpLink {
    tx: mpsc::UnboundedSender<WidgetCommand>,
}

impl WidgetLink for TcpLink {
    fn send(&self, command: WidgetCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Widget bridge is down, command dropped");
        }
    }
}

/// Bind the bridge and wait for the single embed-page connection.
///
/// Returns immediately; commands sent before the page connects are buffered
/// and flushed once it does, which is what makes the ready-handshake race
/// harmless. When the page disconnects the event channel closes and the
/// adapter reports the widget as unavailable.
pub fn spawn_tcp_bridge(
    listen_addr: String,
) -> (TcpLink, mpsc::UnboundedReceiver<WidgetEvent>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<WidgetCommand>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WidgetEvent>();

    let handle = tokio::spawn(run_bridge(listen_addr, cmd_rx, event_tx));

    (TcpLink { tx: cmd_tx }, event_rx, handle)
}

async fn run_bridge(
    listen_addr: String,
    mut cmd_rx: mpsc::UnboundedReceiver<WidgetCommand>,
    event_tx: mpsc::UnboundedSender<WidgetEvent>,
) {
    let listener = match TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %listen_addr, error = %e, "Widget bridge failed to bind");
            return;
        }
    };
    tracing::info!(addr = %listen_addr, "Widget bridge listening for the embed page");

    let (stream, peer) = match listener.accept().await {
        Ok(accepted) => accepted,
        Err(e) => {
            tracing::error!(error = %e, "Widget bridge accept failed");
            return;
        }
    };
    tracing::info!(%peer, "Embed page connected");

    let (read_half, mut write_half) = stream.into_split();

    // Writer: drain buffered and future commands as JSON lines
    let writer = tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            let mut line = match serde_json::to_string(&command) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode widget command");
                    continue;
                }
            };
            line.push('\n');
            if let Err(e) = write_half.write_all(line.as_bytes()).await {
                tracing::warn!(error = %e, "Widget command write failed, stopping writer");
                break;
            }
        }
    });

    // Reader: parse event lines until the page goes away
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<WidgetEvent>(line) {
                    Ok(event) => {
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, line, "Ignoring malformed widget event");
                    }
                }
            }
            Ok(None) => {
                tracing::warn!("Embed page disconnected");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Widget bridge read failed");
                break;
            }
        }
    }

    writer.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_encode_with_tag() {
        let line = serde_json::to_string(&WidgetCommand::Load {
            media_id: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(line, r#"{"cmd":"load","media_id":"abc"}"#);
    }

    #[test]
    fn events_decode_from_tagged_json() {
        let event: WidgetEvent =
            serde_json::from_str(r#"{"event":"state","state":"playing","media_id":"abc"}"#)
                .unwrap();
        assert_eq!(
            event,
            WidgetEvent::State {
                state: ReportedState::Playing,
                media_id: Some("abc".to_string()),
            }
        );
    }

    #[test]
    fn unknown_reported_states_map_to_other() {
        let event: WidgetEvent =
            serde_json::from_str(r#"{"event":"state","state":"buffering"}"#).unwrap();
        assert_eq!(
            event,
            WidgetEvent::State {
                state: ReportedState::Other,
                media_id: None,
            }
        );
    }
}
