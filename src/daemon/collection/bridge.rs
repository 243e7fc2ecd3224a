use anyhow::Result;
use futures::StreamExt;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};
use tokio_stream::wrappers::SplitStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::daemon::processing::tracker::InputKind;

/// Events the host forwards from the page (or whatever it observes), one JSON object per line.
///
/// ```json
/// {"event": "input", "kind": "click"}
/// {"event": "visibility", "visible": false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Input { kind: InputKind },
    Visibility { visible: bool },
    Focus,
    Blur,
    ScreenView { name: String },
    /// The page is about to unload. Triggers a save.
    Unload,
    /// Asks for a summary on the output channel.
    Summary,
    /// Settings were changed by another process, reread them from the store.
    ReloadSettings,
    /// Deletes all persisted data and restarts tracking from scratch.
    Clear,
}

/// Reads host events from an input stream and forwards them to the processing module.
/// Malformed lines, including ones that aren't valid UTF-8, are logged and skipped. Returns when the input ends or on shutdown; dropping
/// the sender then lets the processing module finish.
pub struct HostBridge<R> {
    input: R,
    next: mpsc::Sender<HostEvent>,
    shutdown: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> HostBridge<R> {
    pub fn new(input: R, next: mpsc::Sender<HostEvent>, shutdown: CancellationToken) -> Self {
        Self {
            input,
            next,
            shutdown,
        }
    }

    /// Executes the bridge event loop.
    pub async fn run(self) -> Result<()> {
        let mut lines = SplitStream::new(self.input.split(b'\n'));
        loop {
            let line = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                line = lines.next() => line
            };

            let line = match line {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    error!("Failed to read host input {e:?}");
                    return Err(e.into());
                }
                None => {
                    info!("Host closed its input");
                    return Ok(());
                }
            };

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<HostEvent>(&line) {
                Ok(event) => {
                    debug!("Forwarding {event:?}");
                    if self.next.send(event).await.is_err() {
                        // Processing module is gone, nothing left to feed.
                        return Ok(());
                    }
                }
                Err(e) => warn!(
                    "Skipping malformed host event {:?}: {e}",
                    String::from_utf8_lossy(&line)
                ),
            }
        }
    }
}
