//! Websocket client for the Gemini Live bidirectional endpoint
//!
//! Each session runs on its own thread with a private tokio runtime. The
//! writer task drains the outbound queue; the reader decodes frames into
//! [`LiveEvent`]s for the session dispatcher. Dropping every
//! [`OutboundSender`](crate::live::OutboundSender) closes the socket.

use crate::live::protocol::{ClientMessage, ServerMessage, SetupPayload};
use crate::live::transport::{LiveConnection, LiveEvent, LiveTransport, OutboundSender};
use crate::{Result, SumyError};
use crossbeam_channel::{unbounded, Sender};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

pub const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct GeminiLiveClient {
    endpoint: String,
    setup_timeout: Duration,
}

impl GeminiLiveClient {
    pub fn new(endpoint: impl Into<String>, setup_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            setup_timeout,
        }
    }

    fn session_url(&self, api_key: &str) -> String {
        format!("{}?key={}", self.endpoint, api_key)
    }
}

impl Default for GeminiLiveClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, Duration::from_secs(15))
    }
}

impl LiveTransport for GeminiLiveClient {
    fn open(&self, api_key: &str, setup: SetupPayload) -> Result<LiveConnection> {
        if api_key.trim().is_empty() {
            return Err(SumyError::CredentialsMissing("API key is empty".into()));
        }

        let setup_json = ClientMessage::Setup(setup).to_json()?;
        let url = self.session_url(api_key);
        let setup_timeout = self.setup_timeout;

        let (outbound_tx, outbound_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded();

        let runtime = Runtime::new()
            .map_err(|e| SumyError::ConnectionError(format!("Runtime creation failed: {}", e)))?;

        let worker = std::thread::Builder::new()
            .name("live-transport".into())
            .spawn(move || {
                runtime.block_on(run_session(url, setup_json, setup_timeout, outbound_rx, event_tx));
                debug!("Live transport thread exiting");
            })?;

        Ok(LiveConnection::new(OutboundSender::new(outbound_tx), event_rx).with_worker(worker))
    }
}

async fn run_session(
    url: String,
    setup_json: String,
    setup_timeout: Duration,
    mut outbound_rx: UnboundedReceiver<ClientMessage>,
    events: Sender<LiveEvent>,
) {
    let mut held = Vec::new();

    let ws = tokio::select! {
        result = handshake(&url, setup_json, setup_timeout) => match result {
            Ok(ws) => ws,
            Err(e) => {
                error!("Live session failed to start: {}", e);
                let _ = events.send(LiveEvent::Error(e.to_string()));
                return;
            }
        },
        _ = hold_until_closed(&mut outbound_rx, &mut held) => {
            debug!("Session released during handshake");
            return;
        }
    };

    let (sink, stream) = ws.split();
    let mut writer = tokio::spawn(write_loop(sink, held, outbound_rx));

    tokio::select! {
        _ = read_loop(stream, setup_timeout, events) => {}
        _ = &mut writer => {
            debug!("Outbound queue closed, ending live session");
        }
    }

    writer.abort();
}

async fn handshake(url: &str, setup_json: String, setup_timeout: Duration) -> Result<WsStream> {
    info!("Connecting to live endpoint");

    let (mut ws, _response) = tokio::time::timeout(setup_timeout, connect_async(url))
        .await
        .map_err(|_| SumyError::ConnectionError("Connection timed out".into()))?
        .map_err(|e| SumyError::ConnectionError(format!("WebSocket connect failed: {}", e)))?;

    ws.send(WsMessage::text(setup_json))
        .await
        .map_err(|e| SumyError::ConnectionError(format!("Failed to send setup: {}", e)))?;

    debug!("Setup sent, awaiting acknowledgement");
    Ok(ws)
}

/// Queue anything sent before the socket is up; resolves once every sender is gone
async fn hold_until_closed(outbound_rx: &mut UnboundedReceiver<ClientMessage>, held: &mut Vec<ClientMessage>) {
    while let Some(message) = outbound_rx.recv().await {
        held.push(message);
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, WsMessage>,
    held: Vec<ClientMessage>,
    mut outbound_rx: UnboundedReceiver<ClientMessage>,
) {
    let mut held = held.into_iter();
    loop {
        let message = match held.next() {
            Some(message) => message,
            None => match outbound_rx.recv().await {
                Some(message) => message,
                None => break,
            },
        };

        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Skipping outbound message: {}", e);
                continue;
            }
        };

        if let Err(e) = sink.send(WsMessage::text(json)).await {
            warn!("Live socket send failed: {}", e);
            return;
        }
    }

    let _ = sink.send(WsMessage::Close(None)).await;
    let _ = sink.close().await;
}

async fn read_loop(mut stream: SplitStream<WsStream>, setup_timeout: Duration, events: Sender<LiveEvent>) {
    let mut opened = false;

    loop {
        let next = if opened {
            stream.next().await
        } else {
            match tokio::time::timeout(setup_timeout, stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    let _ = events.send(LiveEvent::Error("Setup acknowledgement timed out".into()));
                    return;
                }
            }
        };

        let parsed = match next {
            Some(Ok(WsMessage::Text(text))) => ServerMessage::parse(text.as_str()),
            Some(Ok(WsMessage::Binary(data))) => ServerMessage::parse_bytes(&data),
            Some(Ok(WsMessage::Close(frame))) => {
                let reason = frame
                    .map(|f| f.reason.as_str().to_string())
                    .unwrap_or_default();
                info!("Live session closed by server: {}", reason);
                let _ = events.send(LiveEvent::Closed { reason });
                return;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                error!("Live socket error: {}", e);
                let _ = events.send(LiveEvent::Error(e.to_string()));
                return;
            }
            None => {
                let _ = events.send(LiveEvent::Closed {
                    reason: "stream ended".into(),
                });
                return;
            }
        };

        let message = match parsed {
            Ok(message) => message,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if message.is_setup_complete() && !opened {
            opened = true;
            info!("Live session established");
            if events.send(LiveEvent::Opened).is_err() {
                return;
            }
        }

        if message.has_payload() && events.send(LiveEvent::Message(message)).is_err() {
            debug!("Event receiver dropped, stopping reader");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_url() {
        let client = GeminiLiveClient::new("wss://example.test/live", Duration::from_secs(1));
        assert_eq!(client.session_url("k"), "wss://example.test/live?key=k");
    }

    #[test]
    fn test_open_rejects_empty_key() {
        let client = GeminiLiveClient::default();
        let setup = SetupPayload::new("m", "Fenrir", "", false);
        assert!(matches!(
            client.open("  ", setup),
            Err(SumyError::CredentialsMissing(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_reports_error() {
        let client = GeminiLiveClient::new("ws://127.0.0.1:9/live", Duration::from_secs(2));
        let setup = SetupPayload::new("m", "Fenrir", "", false);
        let connection = client.open("key", setup).unwrap();

        let event = connection
            .events
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(event, LiveEvent::Error(_)));
    }

    #[test]
    fn test_close_during_stalled_handshake_joins_worker() {
        // Accepts TCP but never answers the websocket upgrade
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = std::thread::spawn(move || {
            let held: Vec<_> = listener.incoming().take(1).collect();
            std::thread::sleep(Duration::from_secs(10));
            drop(held);
        });

        let client = GeminiLiveClient::new(format!("ws://127.0.0.1:{}/live", port), Duration::from_secs(30));
        let setup = SetupPayload::new("m", "Fenrir", "", false);
        let connection = client.open("key", setup).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert!(!connection.is_worker_finished());

        let started = std::time::Instant::now();
        connection.close();
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
