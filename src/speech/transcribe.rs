//! Streaming transcription over a presigned websocket.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use super::event_stream::{EventStreamError, Message};
use crate::aws::sigv4::{SigV4Signer, EMPTY_PAYLOAD_SHA256};
use crate::aws::AwsCredentials;
use crate::config::{AwsConfig, DictationConfig};

const SERVICE: &str = "transcribe";
const STREAM_PORT: u16 = 8443;
const STREAM_PATH: &str = "/stream-transcription-websocket";
const PRESIGN_EXPIRES_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscribeError {
    #[error("Missing AWS credentials: {0}")]
    Credentials(String),

    #[error("Could not connect to transcription service: {0}")]
    Connect(String),

    #[error(transparent)]
    Frame(#[from] EventStreamError),

    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("Unreadable transcript event: {0}")]
    InvalidEvent(String),
}

/// One recognized segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    pub text: String,
    pub is_partial: bool,
}

pub type TranscriptReceiver = mpsc::UnboundedReceiver<Result<TranscriptResult, TranscribeError>>;

/// A streaming speech-to-text service.
///
/// `audio` carries 16-bit PCM chunks; closing it ends the stream. The
/// returned channel yields results until the service closes the stream.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn start_stream(
        &self,
        audio: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Result<TranscriptReceiver, TranscribeError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranscriptEvent {
    transcript: Transcript,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Transcript {
    #[serde(default)]
    results: Vec<ResultRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultRecord {
    #[serde(default)]
    alternatives: Vec<Alternative>,
    #[serde(default)]
    is_partial: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Alternative {
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    transcript: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Item {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ExceptionBody {
    #[serde(alias = "message", rename = "Message", default)]
    message: String,
}

/// Results carried by one `TranscriptEvent` payload.
///
/// Text is the first alternative's items joined by single spaces; results
/// without any text are skipped.
pub fn parse_transcript_event(payload: &[u8]) -> Result<Vec<TranscriptResult>, TranscribeError> {
    let event: TranscriptEvent =
        serde_json::from_slice(payload).map_err(|e| TranscribeError::InvalidEvent(e.to_string()))?;

    Ok(event
        .transcript
        .results
        .into_iter()
        .filter_map(|result| {
            let alternative = result.alternatives.into_iter().next()?;
            let text = if alternative.items.is_empty() {
                alternative.transcript.trim().to_string()
            } else {
                alternative
                    .items
                    .iter()
                    .map(|item| item.content.trim())
                    .filter(|content| !content.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            (!text.is_empty()).then_some(TranscriptResult {
                text,
                is_partial: result.is_partial,
            })
        })
        .collect())
}

/// Interpret one decoded frame from the service
fn interpret(message: &Message) -> Result<Vec<TranscriptResult>, TranscribeError> {
    if message.is_exception() {
        let code = message
            .header_str(":exception-type")
            .or_else(|| message.header_str(":error-code"))
            .unwrap_or("Exception")
            .to_string();
        let body: ExceptionBody = serde_json::from_slice(&message.payload).unwrap_or(ExceptionBody {
            message: String::from_utf8_lossy(&message.payload).into_owned(),
        });
        return Err(TranscribeError::Service {
            code,
            message: body.message,
        });
    }

    match message.header_str(":event-type") {
        Some("TranscriptEvent") => parse_transcript_event(&message.payload),
        other => {
            debug!("Ignoring stream event {:?}", other);
            Ok(Vec::new())
        }
    }
}

/// Amazon Transcribe streaming over websocket
pub struct TranscribeStreamingClient {
    signer: SigV4Signer,
    endpoint: Url,
    language_code: String,
    sample_rate: u32,
}

impl TranscribeStreamingClient {
    pub fn new(signer: SigV4Signer, language_code: impl Into<String>, sample_rate: u32) -> Result<Self, TranscribeError> {
        let endpoint = format!(
            "wss://transcribestreaming.{}.amazonaws.com:{}{}",
            signer.region(),
            STREAM_PORT,
            STREAM_PATH
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| TranscribeError::Connect(e.to_string()))?;
        Ok(Self {
            signer,
            endpoint,
            language_code: language_code.into(),
            sample_rate,
        })
    }

    pub fn from_config(config: &DictationConfig, aws: &AwsConfig) -> Result<Self, TranscribeError> {
        let credentials = AwsCredentials::from_env(aws).map_err(|e| TranscribeError::Credentials(e.to_string()))?;
        let signer = SigV4Signer::new(credentials, &config.region, SERVICE);
        Self::new(signer, &config.language_code, config.sample_rate)
    }

    /// Point at another websocket endpoint; the path and port are kept as given
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Signed URL for a new stream
    pub fn presigned_url(&self) -> Result<Url, TranscribeError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("language-code", &self.language_code)
            .append_pair("media-encoding", "pcm")
            .append_pair("sample-rate", &self.sample_rate.to_string())
            .append_pair("session-id", &uuid::Uuid::new_v4().to_string());

        self.signer
            .presign_url("GET", &url, PRESIGN_EXPIRES_SECS, EMPTY_PAYLOAD_SHA256, Utc::now())
            .map_err(|e| TranscribeError::Connect(e.to_string()))
    }
}

#[async_trait]
impl TranscriptionService for TranscribeStreamingClient {
    async fn start_stream(
        &self,
        mut audio: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Result<TranscriptReceiver, TranscribeError> {
        let url = self.presigned_url()?;
        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TranscribeError::Connect(e.to_string()))?;
        info!("🎙️  Transcription stream opened ({} Hz)", self.sample_rate);

        let (mut write, mut read) = ws_stream.split();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut audio_open = true;
            loop {
                tokio::select! {
                    chunk = audio.recv(), if audio_open => {
                        let message = match chunk {
                            Some(chunk) => Message::audio_event(&chunk),
                            None => {
                                // Ask the service to finish; keep reading the last results
                                audio_open = false;
                                Message::end_of_stream()
                            }
                        };
                        let frame = match message.encode() {
                            Ok(frame) => frame,
                            Err(e) => {
                                let _ = result_tx.send(Err(e.into()));
                                break;
                            }
                        };
                        if write.send(WsMessage::Binary(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    incoming = read.next() => {
                        match incoming {
                            Some(Ok(WsMessage::Binary(data))) => {
                                let outcome = Message::decode(&data)
                                    .map_err(TranscribeError::from)
                                    .and_then(|message| interpret(&message));
                                match outcome {
                                    Ok(results) => {
                                        for result in results {
                                            if result_tx.send(Ok(result)).is_err() {
                                                break;
                                            }
                                        }
                                    }
                                    Err(e) => {
                                        warn!("Transcription stream error: {}", e);
                                        let _ = result_tx.send(Err(e));
                                        let _ = write.send(WsMessage::Close(None)).await;
                                        break;
                                    }
                                }
                            }
                            Some(Ok(WsMessage::Close(_))) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                let _ = result_tx.send(Err(TranscribeError::Connect(e.to_string())));
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }
            debug!("Transcription stream closed");
        });

        Ok(result_rx)
    }
}
