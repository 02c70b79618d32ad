//! TCP link to the game engine.
//!
//! Both directions are newline-delimited JSON: [`EngineEvent`]s come in and go
//! to the ingest channel, [`Outbound`] answers and chat lines go out.
use anyhow::{Context, Result};
use bridge_runtime::{EngineEvent, Outbound};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Connects to the engine and pumps messages until either side closes.
pub async fn run(
    addr: &str,
    events: mpsc::Sender<EngineEvent>,
    outbound: mpsc::UnboundedReceiver<Outbound>,
) -> Result<()> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to engine at {addr}"))?;
    info!(%addr, "engine link connected");
    let (read, write) = stream.into_split();
    pump(BufReader::new(read), write, events, outbound).await
}

/// Moves messages between an engine stream and the bridge channels.
///
/// Returns when the engine closes its side or the ingest channel is gone.
/// Malformed lines are logged and skipped.
pub async fn pump<R, W>(
    reader: R,
    mut writer: W,
    events: mpsc::Sender<EngineEvent>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("engine link read failed")? else {
                    info!("engine closed the link");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<EngineEvent>(&line) {
                    Ok(event) => {
                        debug!(context = %event.context(), event = event.label(), "engine event");
                        if events.send(event).await.is_err() {
                            warn!("ingest channel closed; dropping engine link");
                            break;
                        }
                    }
                    Err(err) => warn!(error = %err, "skipping malformed engine message"),
                }
            }
            Some(message) = outbound.recv() => {
                let mut encoded = serde_json::to_string(&message)
                    .context("failed to encode outbound message")?;
                encoded.push('\n');
                writer
                    .write_all(encoded.as_bytes())
                    .await
                    .context("engine link write failed")?;
                writer.flush().await.context("engine link flush failed")?;
            }
        }
    }
    Ok(())
}
