//! Speech-to-text dictation.
//!
//! A [`DictationSession`] wires the pieces together:
//!
//! ```text
//! AudioSource -> FrameAccumulator -> pcm_encode -> TranscriptionService
//! ```
//!
//! Partial results are forwarded as previews, final results as text to merge
//! into the focused form field with [`merge_transcript`].

pub mod audio;
pub mod event_stream;
pub mod pcm;
pub mod transcribe;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub use audio::{AudioSource, CommandAudioSource, FrameAccumulator};
pub use pcm::pcm_encode;
pub use transcribe::{TranscribeError, TranscribeStreamingClient, TranscriptResult, TranscriptionService};

use crate::config::{AwsConfig, DictationConfig};

/// What a running session reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// Text that may still change
    Partial(String),
    /// Final text to merge into the field
    Text(String),
    Error(String),
    /// The session ended; no further events follow
    Stopped,
}

/// Append recognized text to a field value.
///
/// The addition is trimmed and joined with a single space; an empty field
/// takes the addition as is.
pub fn merge_transcript(current: &str, addition: &str) -> String {
    let addition = addition.trim();
    let current = current.trim_end();
    match (current.is_empty(), addition.is_empty()) {
        (_, true) => current.to_string(),
        (true, false) => addition.to_string(),
        (false, false) => format!("{} {}", current, addition),
    }
}

pub struct DictationSession {
    source: Box<dyn AudioSource>,
    service: Arc<dyn TranscriptionService>,
}

/// Control over a running session
pub struct DictationHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl DictationHandle {
    /// Stop capture; remaining results still arrive before [`DictationEvent::Stopped`]
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for DictationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DictationSession {
    pub fn new(source: Box<dyn AudioSource>, service: Arc<dyn TranscriptionService>) -> Self {
        Self { source, service }
    }

    /// Recorder command plus Transcribe streaming, from the config
    pub fn from_config(config: &DictationConfig, aws: &AwsConfig) -> Result<Self> {
        let source = CommandAudioSource::new(&config.recorder_command, config.sample_rate)?;
        let service =
            TranscribeStreamingClient::from_config(config, aws).context("Failed to set up transcription")?;
        Ok(Self::new(Box::new(source), Arc::new(service)))
    }

    /// Begin capturing and streaming; events are sent to `events`
    pub async fn start(mut self, events: mpsc::UnboundedSender<DictationEvent>) -> Result<DictationHandle> {
        let mut samples = self.source.start().await.context("Failed to start audio capture")?;
        let (audio_tx, audio_rx) = mpsc::unbounded_channel();

        let mut results = match self.service.start_stream(audio_rx).await {
            Ok(results) => results,
            Err(e) => {
                self.source.stop().await;
                return Err(e).context("Failed to open transcription stream");
            }
        };

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let mut frames = FrameAccumulator::new(self.source.sample_rate());
        let mut source = self.source;
        info!("🎙️  Dictation started");

        let task = tokio::spawn(async move {
            let mut stream_open = true;

            // Capture until stopped, the device ends, or the stream goes away
            'capture: loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    chunk = samples.recv() => match chunk {
                        Some(chunk) => {
                            for frame in frames.push(&chunk) {
                                if audio_tx.send(pcm_encode(&frame)).is_err() {
                                    debug!("Transcription stream stopped taking audio");
                                    break 'capture;
                                }
                            }
                        }
                        None => break,
                    },
                    result = results.recv() => match result {
                        Some(result) => forward(&events, result),
                        None => {
                            stream_open = false;
                            break;
                        }
                    },
                }
            }

            source.stop().await;
            if let Some(rest) = frames.flush() {
                let _ = audio_tx.send(pcm_encode(&rest));
            }
            // Closing the audio channel ends the stream
            drop(audio_tx);

            if stream_open {
                while let Some(result) = results.recv().await {
                    forward(&events, result);
                }
            }

            debug!("Dictation finished");
            let _ = events.send(DictationEvent::Stopped);
        });

        Ok(DictationHandle {
            stop_tx: Some(stop_tx),
            task,
        })
    }
}

fn forward(events: &mpsc::UnboundedSender<DictationEvent>, result: Result<TranscriptResult, TranscribeError>) {
    let event = match result {
        Ok(result) if result.is_partial => DictationEvent::Partial(result.text),
        Ok(result) => DictationEvent::Text(result.text),
        Err(e) => {
            warn!("Dictation error: {}", e);
            DictationEvent::Error(e.to_string())
        }
    };
    let _ = events.send(event);
}
