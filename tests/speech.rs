use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use taskdeck::speech::event_stream::{EventStreamError, Header, HeaderValue, Message};
use taskdeck::speech::pcm::f32_le_samples;
use taskdeck::speech::transcribe::TranscriptReceiver;
use taskdeck::speech::{
    merge_transcript, pcm_encode, AudioSource, DictationEvent, DictationSession, FrameAccumulator, TranscribeError,
    TranscriptResult, TranscriptionService,
};

#[test]
fn test_pcm_encode_scales_and_clamps() {
    let bytes = pcm_encode(&[0.0, 1.0, -1.0, 2.0, -3.0, 0.5]);
    let values: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    assert_eq!(values, vec![0, 32767, -32768, 32767, -32768, 16383]);
}

#[test]
fn test_f32_samples_keep_partial_tail() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0.25f32.to_le_bytes());
    bytes.extend_from_slice(&(-0.5f32).to_le_bytes());
    bytes.extend_from_slice(&[1, 2]);

    let (samples, rest) = f32_le_samples(&bytes);
    assert_eq!(samples, vec![0.25, -0.5]);
    assert_eq!(rest, &[1, 2]);
}

#[test]
fn test_frames_are_a_tenth_of_a_second() {
    let mut frames = FrameAccumulator::new(16000);
    assert_eq!(frames.frame_len(), 1600);

    assert!(frames.push(&[0.0; 1000]).is_empty());
    let completed = frames.push(&[0.0; 2500]);
    assert_eq!(completed.len(), 2);
    assert!(completed.iter().all(|frame| frame.len() == 1600));

    assert_eq!(frames.flush().map(|rest| rest.len()), Some(300));
    assert_eq!(frames.flush(), None);
}

#[test]
fn test_merge_transcript_joins_with_single_space() {
    assert_eq!(merge_transcript("", "  Buy milk "), "Buy milk");
    assert_eq!(merge_transcript("Buy milk ", "and eggs"), "Buy milk and eggs");
    assert_eq!(merge_transcript("Buy milk", "   "), "Buy milk");
}

#[test]
fn test_event_stream_frame_round_trip() {
    let message = Message {
        headers: vec![
            Header::string(":event-type", "TranscriptEvent"),
            Header {
                name: "flag".to_string(),
                value: HeaderValue::Bool(true),
            },
            Header {
                name: "count".to_string(),
                value: HeaderValue::Int(-7),
            },
        ],
        payload: br#"{"Transcript":{"Results":[]}}"#.to_vec(),
    };

    let frame = message.encode().unwrap();
    assert_eq!(u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize, frame.len());

    let decoded = Message::decode(&frame).unwrap();
    assert_eq!(decoded, message);
    assert_eq!(decoded.header_str(":event-type"), Some("TranscriptEvent"));
}

#[test]
fn test_event_stream_rejects_corruption() {
    let mut frame = Message::audio_event(&[1, 2, 3, 4]).encode().unwrap();

    let last = frame.len() - 5;
    frame[last] ^= 0xFF;
    assert_eq!(Message::decode(&frame), Err(EventStreamError::MessageChecksum));

    frame[5] ^= 0xFF;
    assert_eq!(Message::decode(&frame), Err(EventStreamError::PreludeChecksum));

    assert_eq!(Message::decode(&frame[..8]), Err(EventStreamError::Truncated(8)));
}

#[test]
fn test_end_of_stream_is_empty_audio_event() {
    let message = Message::end_of_stream();
    assert!(message.payload.is_empty());
    assert_eq!(message.header_str(":event-type"), Some("AudioEvent"));
    assert!(!message.is_exception());
}

/// Plays back fixed chunks, then ends like a device that was unplugged
struct ScriptedSource {
    chunks: Vec<Vec<f32>>,
}

#[async_trait]
impl AudioSource for ScriptedSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<f32>>> {
        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in self.chunks.drain(..) {
            tx.send(chunk)?;
        }
        Ok(rx)
    }

    async fn stop(&mut self) {
        self.chunks.clear();
    }

    fn sample_rate(&self) -> u32 {
        100
    }
}

/// Counts the audio it receives and reports the total once the stream closes
struct CountingService;

#[async_trait]
impl TranscriptionService for CountingService {
    async fn start_stream(
        &self,
        mut audio: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Result<TranscriptReceiver, TranscribeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut bytes = 0;
            while let Some(chunk) = audio.recv().await {
                bytes += chunk.len();
            }
            let _ = tx.send(Ok(TranscriptResult {
                text: "buy".to_string(),
                is_partial: true,
            }));
            let _ = tx.send(Ok(TranscriptResult {
                text: format!("{} bytes", bytes),
                is_partial: false,
            }));
        });
        Ok(rx)
    }
}

struct RefusingService;

#[async_trait]
impl TranscriptionService for RefusingService {
    async fn start_stream(&self, _audio: mpsc::UnboundedReceiver<Vec<u8>>) -> Result<TranscriptReceiver, TranscribeError> {
        Err(TranscribeError::Credentials("AWS_ACCESS_KEY_ID is not set".to_string()))
    }
}

#[tokio::test]
async fn test_session_streams_all_audio_then_stops() {
    let source = ScriptedSource {
        chunks: vec![vec![0.1; 15], vec![-0.1; 10]],
    };
    let session = DictationSession::new(Box::new(source), Arc::new(CountingService));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let _handle = session.start(events_tx).await.unwrap();

    let mut events = Vec::new();
    while let Some(event) = events_rx.recv().await {
        let done = event == DictationEvent::Stopped;
        events.push(event);
        if done {
            break;
        }
    }

    // 25 samples: two full frames plus the flushed remainder, two bytes each
    assert_eq!(
        events,
        vec![
            DictationEvent::Partial("buy".to_string()),
            DictationEvent::Text("50 bytes".to_string()),
            DictationEvent::Stopped,
        ]
    );
}

#[tokio::test]
async fn test_session_fails_when_stream_cannot_open() {
    let source = ScriptedSource {
        chunks: Vec::new(),
    };
    let session = DictationSession::new(Box::new(source), Arc::new(RefusingService));
    let (events_tx, _events_rx) = mpsc::unbounded_channel();

    assert!(session.start(events_tx).await.is_err());
}

/// A device that keeps delivering until stopped
struct LiveSource {
    samples: Option<mpsc::UnboundedReceiver<Vec<f32>>>,
    stopped: Arc<AtomicBool>,
}

#[async_trait]
impl AudioSource for LiveSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<f32>>> {
        self.samples.take().ok_or_else(|| anyhow!("already started"))
    }

    async fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn sample_rate(&self) -> u32 {
        100
    }
}

/// Drops the audio channel at once; results stay open until released
struct DeafService {
    release: Arc<Notify>,
}

#[async_trait]
impl TranscriptionService for DeafService {
    async fn start_stream(&self, audio: mpsc::UnboundedReceiver<Vec<u8>>) -> Result<TranscriptReceiver, TranscribeError> {
        drop(audio);
        let (tx, rx) = mpsc::unbounded_channel();
        let release = self.release.clone();
        tokio::spawn(async move {
            release.notified().await;
            drop(tx);
        });
        Ok(rx)
    }
}

#[tokio::test]
async fn test_capture_stops_when_stream_drops_audio() {
    let (samples_tx, samples_rx) = mpsc::unbounded_channel();
    let stopped = Arc::new(AtomicBool::new(false));
    let release = Arc::new(Notify::new());
    let source = LiveSource {
        samples: Some(samples_rx),
        stopped: stopped.clone(),
    };
    let session = DictationSession::new(Box::new(source), Arc::new(DeafService { release: release.clone() }));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let _handle = session.start(events_tx).await.unwrap();
    samples_tx.send(vec![0.2; 10]).unwrap();

    let capture_stopped = tokio::time::timeout(Duration::from_secs(2), async {
        while !stopped.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(capture_stopped.is_ok());

    release.notify_one();
    assert_eq!(events_rx.recv().await, Some(DictationEvent::Stopped));
}
