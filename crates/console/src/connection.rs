use anyhow::Context;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use protocol::framing::MAX_FRAME_LENGTH;
use protocol::{ClientEvent, ServerEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;

/// Handle to the single classifier connection.
///
/// One connect attempt is made at startup; there is no reconnect. After the
/// stream drops, `is_connected` turns false and submits are rejected until
/// the console is restarted.
pub(crate) struct ClassifierConnection {
    outbound_tx: mpsc::Sender<ClientEvent>,
    live: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl ClassifierConnection {
    pub(crate) async fn connect(
        endpoint: &str,
        event_tx: mpsc::Sender<ServerEvent>,
    ) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(endpoint)
            .await
            .with_context(|| format!("failed to connect classifier {endpoint}"))?;
        let mut codec = LengthDelimitedCodec::new();
        codec.set_max_frame_length(MAX_FRAME_LENGTH);
        let framed = Framed::new(stream, codec);

        let live = Arc::new(AtomicBool::new(true));
        let shutdown = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(16);
        tokio::spawn(io_loop(
            framed,
            outbound_rx,
            event_tx,
            Arc::clone(&live),
            shutdown.clone(),
        ));
        tracing::info!(endpoint = %endpoint, "classifier connection established");
        Ok(Self {
            outbound_tx,
            live,
            shutdown,
        })
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Hands one request to the IO task. Rejected synchronously when the
    /// connection is not live; the request is dropped, never queued.
    pub(crate) fn try_emit(&self, event: ClientEvent) -> anyhow::Result<()> {
        if !self.is_connected() {
            anyhow::bail!("classifier connection is not established");
        }
        self.outbound_tx
            .try_send(event)
            .map_err(|_| anyhow::anyhow!("classifier connection is not accepting requests"))
    }

    /// Idempotent teardown; the IO task closes the stream and exits.
    pub(crate) fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

async fn io_loop(
    mut framed: Framed<TcpStream, LengthDelimitedCodec>,
    mut outbound_rx: mpsc::Receiver<ClientEvent>,
    event_tx: mpsc::Sender<ServerEvent>,
    live: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            outbound = outbound_rx.recv() => {
                let Some(event) = outbound else { break };
                let payload = match serde_json::to_vec(&event) {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to encode client event");
                        continue;
                    }
                };
                if let Err(err) = framed.send(Bytes::from(payload)).await {
                    tracing::warn!(error = %err, "classifier send failed");
                    break;
                }
            }
            frame = framed.next() => {
                let Some(frame) = frame else {
                    tracing::info!("classifier closed the connection");
                    break;
                };
                let bytes = match frame {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        tracing::warn!(error = %err, "classifier frame read failed");
                        break;
                    }
                };
                match serde_json::from_slice::<ServerEvent>(&bytes) {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "invalid server event payload");
                    }
                }
            }
        }
    }
    live.store(false, Ordering::SeqCst);
}
