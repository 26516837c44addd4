//! Bidirectional Live API session over WebSocket

use super::audio::{decode_base64, encode_base64, INPUT_MIME_TYPE};
use crate::error::{GeminiError, GeminiResult};
use crate::providers::{Content, Part};
use common::AppConfig;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// `wss://.../BidiGenerateContent` without the key
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub system_instruction: String,
    /// How long to wait for `setupComplete`
    pub setup_timeout: Duration,
}

impl LiveConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            url: config.gemini.live_url.clone(),
            api_key: config.gemini.api_key.clone(),
            model: config.gemini.live_model.clone(),
            system_instruction: "You are a professional industrial assistant for AIdentify."
                .to_string(),
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    /// 24 kHz s16le PCM
    Audio(Vec<u8>),
    Text(String),
    TurnComplete,
    /// The model stopped talking because new input arrived
    Interrupted,
    Closed(Option<String>),
}

enum Incoming {
    SetupComplete,
    Event(LiveEvent),
    /// Closed before or during setup
    Rejected { code: u16, reason: String },
}

type Writer = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

pub struct LiveSession {
    writer: Arc<Mutex<Writer>>,
    events: mpsc::Receiver<Incoming>,
    reader: JoinHandle<()>,
    closed: bool,
}

/// rustls needs a process-wide provider before the first `wss://` handshake
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Err means another caller installed one first
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

impl LiveSession {
    /// Open the socket, send `setup` and wait for `setupComplete`
    pub async fn connect(config: LiveConfig) -> GeminiResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let mut url = Url::parse(&config.url)
            .map_err(|e| GeminiError::Live(format!("invalid live URL '{}': {e}", config.url)))?;
        url.query_pairs_mut().append_pair("key", api_key);

        if url.scheme() == "wss" {
            install_crypto_provider();
        }
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| GeminiError::Live(format!("connect failed: {e}")))?;
        let (sink, mut stream) = stream.split();
        let writer = Arc::new(Mutex::new(sink));
        let writer_clone = writer.clone();

        let (tx, rx) = mpsc::channel::<Incoming>(64);

        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let payload = match frame {
                    Ok(WsMessage::Text(text)) => text.as_str().as_bytes().to_vec(),
                    Ok(WsMessage::Binary(bytes)) => bytes.to_vec(),
                    Ok(WsMessage::Ping(payload)) => {
                        if let Err(e) = writer_clone
                            .lock()
                            .await
                            .send(WsMessage::Pong(payload))
                            .await
                        {
                            error!(error = %e, "Failed to answer ping");
                            break;
                        }
                        continue;
                    }
                    Ok(WsMessage::Close(frame)) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1000, String::new()));
                        debug!(code, reason = %reason, "Live socket closed by server");
                        let _ = tx.send(Incoming::Rejected { code, reason }).await;
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        error!(error = %e, "Live socket read error");
                        break;
                    }
                };

                match parse_server_message(&payload) {
                    Ok(items) => {
                        for item in items {
                            if tx.send(item).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "Ignoring undecodable live frame"),
                }
            }
        });

        let mut session = Self {
            writer,
            events: rx,
            reader,
            closed: false,
        };

        session
            .send_json(&SetupMessage {
                setup: Setup {
                    model: format!("models/{}", config.model),
                    generation_config: LiveGenerationConfig {
                        response_modalities: vec!["AUDIO".to_string()],
                    },
                    system_instruction: Content {
                        role: None,
                        parts: vec![Part::text(config.system_instruction)],
                    },
                },
            })
            .await?;

        session.await_setup(config.setup_timeout).await?;
        info!(model = %config.model, "Live session established");
        Ok(session)
    }

    async fn await_setup(&mut self, timeout: Duration) -> GeminiResult<()> {
        let wait = async {
            loop {
                match self.events.recv().await {
                    Some(Incoming::SetupComplete) => return Ok(()),
                    Some(Incoming::Event(_)) => continue,
                    Some(Incoming::Rejected { code, reason }) => {
                        return Err(rejection_error(code, reason));
                    }
                    None => {
                        return Err(GeminiError::Live(
                            "socket closed before setup completed".to_string(),
                        ))
                    }
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| GeminiError::Live("timed out waiting for setupComplete".to_string()))?
    }

    async fn send_json<T: Serialize>(&self, message: &T) -> GeminiResult<()> {
        let text = serde_json::to_string(message)
            .map_err(|e| GeminiError::Live(format!("failed to encode message: {e}")))?;
        self.writer
            .lock()
            .await
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| GeminiError::Live(format!("send failed: {e}")))
    }

    /// Stream one chunk of 16 kHz s16le PCM
    pub async fn send_audio(&self, pcm: &[u8]) -> GeminiResult<()> {
        self.send_json(&RealtimeInputMessage {
            realtime_input: RealtimeInput {
                audio: Some(Blob {
                    mime_type: INPUT_MIME_TYPE.to_string(),
                    data: encode_base64(pcm),
                }),
                audio_stream_end: None,
            },
        })
        .await
    }

    /// Signal that the microphone stream has ended
    pub async fn end_audio(&self) -> GeminiResult<()> {
        self.send_json(&RealtimeInputMessage {
            realtime_input: RealtimeInput {
                audio: None,
                audio_stream_end: Some(true),
            },
        })
        .await
    }

    pub async fn next_event(&mut self) -> GeminiResult<LiveEvent> {
        loop {
            if self.closed {
                return Ok(LiveEvent::Closed(None));
            }
            match self.events.recv().await {
                Some(Incoming::Event(event)) => return Ok(event),
                Some(Incoming::SetupComplete) => continue,
                Some(Incoming::Rejected { code, reason }) => {
                    self.closed = true;
                    if code == 1000 {
                        return Ok(LiveEvent::Closed((!reason.is_empty()).then_some(reason)));
                    }
                    return Err(rejection_error(code, reason));
                }
                None => {
                    self.closed = true;
                    return Ok(LiveEvent::Closed(None));
                }
            }
        }
    }

    pub async fn close(&mut self) -> GeminiResult<()> {
        self.closed = true;
        self.writer
            .lock()
            .await
            .send(WsMessage::Close(None))
            .await
            .map_err(|e| GeminiError::Live(format!("close failed: {e}")))
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn rejection_error(code: u16, reason: String) -> GeminiError {
    let lowered = reason.to_lowercase();
    if lowered.contains("api key") || lowered.contains("entity was not found") {
        GeminiError::InvalidCredential {
            status: code,
            message: reason,
        }
    } else {
        GeminiError::Live(format!("session closed ({code}): {reason}"))
    }
}

#[derive(Serialize)]
struct SetupMessage {
    setup: Setup,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Setup {
    model: String,
    generation_config: LiveGenerationConfig,
    system_instruction: Content,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveGenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeInputMessage {
    realtime_input: RealtimeInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_stream_end: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<serde_json::Value>,
    server_content: Option<ServerContent>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<Content>,
    #[serde(default)]
    turn_complete: bool,
    #[serde(default)]
    interrupted: bool,
}

/// Decode one server frame (text or binary JSON) into session events
fn parse_server_message(payload: &[u8]) -> Result<Vec<Incoming>, String> {
    let message: ServerMessage = serde_json::from_slice(payload).map_err(|e| e.to_string())?;
    let mut items = Vec::new();

    if message.setup_complete.is_some() {
        items.push(Incoming::SetupComplete);
    }

    if let Some(content) = message.server_content {
        if content.interrupted {
            items.push(Incoming::Event(LiveEvent::Interrupted));
        }
        for part in content.model_turn.map(|t| t.parts).unwrap_or_default() {
            if let Some(inline) = part.inline_data {
                if inline.mime_type.starts_with("audio/") {
                    let audio = decode_base64(&inline.data).map_err(|e| e.to_string())?;
                    items.push(Incoming::Event(LiveEvent::Audio(audio)));
                }
            } else if let Some(text) = part.text {
                items.push(Incoming::Event(LiveEvent::Text(text)));
            }
        }
        if content.turn_complete {
            items.push(Incoming::Event(LiveEvent::TurnComplete));
        }
    }

    Ok(items)
}
