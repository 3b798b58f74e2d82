//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket client with reconnection, backoff and ping keepalive
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Connect and return `(message_receiver, message_sender)`
    ///
    /// A background task owns the socket. It emits `Connected` after every
    /// successful (re)connect so the caller can resubscribe, forwards text
    /// frames, and writes whatever is sent on the returned sender.
    pub fn connect(&self, buffer_size: usize) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::channel(buffer_size);
        let (send_tx, send_rx) = mpsc::channel(64);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = run_connection_loop(config, msg_tx, send_rx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        (msg_rx, send_tx)
    }
}

/// Reconnect with exponential backoff until closed cleanly or out of attempts
async fn run_connection_loop(
    config: WsConfig,
    tx: mpsc::Sender<WsMessage>,
    mut send_rx: mpsc::Receiver<String>,
) -> Result<(), WsError> {
    let mut reconnect_attempts = 0;
    let mut reconnect_delay = config.initial_reconnect_delay;

    loop {
        let mut connected = false;
        match connect_and_stream(&config, &tx, &mut send_rx, &mut connected).await {
            Ok(()) => {
                tracing::info!("WebSocket connection closed cleanly");
                let _ = tx.send(WsMessage::Disconnected).await;
                return Ok(());
            }
            Err(e) => {
                // A drop after a working session starts a fresh backoff sequence
                if connected {
                    reconnect_attempts = 0;
                    reconnect_delay = config.initial_reconnect_delay;
                }
                reconnect_attempts += 1;
                tracing::warn!(
                    error = %e,
                    attempt = reconnect_attempts,
                    "WebSocket connection error, reconnecting..."
                );

                if config.max_reconnect_attempts > 0
                    && reconnect_attempts >= config.max_reconnect_attempts
                {
                    tracing::error!("Max reconnection attempts reached");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    return Err(WsError::MaxReconnectsExceeded);
                }

                if tx.is_closed() {
                    tracing::info!("Receiver dropped, stopping reconnection");
                    return Ok(());
                }

                let _ = tx
                    .send(WsMessage::Reconnecting {
                        attempt: reconnect_attempts,
                    })
                    .await;

                sleep(reconnect_delay).await;
                reconnect_delay = config.next_delay(reconnect_delay);
            }
        }
    }
}

/// Drive one connection until it closes or fails
///
/// `connected` is set once the handshake completes, so the caller can tell a
/// failed connect from a dropped session.
async fn connect_and_stream(
    config: &WsConfig,
    tx: &mpsc::Sender<WsMessage>,
    send_rx: &mut mpsc::Receiver<String>,
    connected: &mut bool,
) -> Result<(), WsError> {
    tracing::info!(url = %config.url, "Connecting to WebSocket");

    let (ws_stream, _response) = connect_async(&config.url)
        .await
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    *connected = true;
    let (mut write, mut read) = ws_stream.split();

    if tx.send(WsMessage::Connected).await.is_err() {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(config.ping_interval);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick fires immediately
    ping_interval.tick().await;
    let mut waiting_for_pong = false;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsMessage::Text(text)).await.is_err() {
                            tracing::debug!("Receiver dropped, closing connection");
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        waiting_for_pong = false;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Received close frame");
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(WsError::ConnectionFailed(e.to_string()));
                    }
                    None => {
                        return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                    }
                    // Binary and raw frames carry nothing for us
                    _ => {}
                }
            }

            outgoing = send_rx.recv() => {
                match outgoing {
                    Some(text) => {
                        write.send(Message::Text(text)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    None => return Ok(()),
                }
            }

            _ = ping_interval.tick() => {
                if waiting_for_pong {
                    return Err(WsError::ConnectionFailed("Pong timeout".into()));
                }
                write.send(Message::Ping(vec![])).await
                    .map_err(|e| WsError::SendFailed(e.to_string()))?;
                waiting_for_pong = true;
            }
        }
    }
}
