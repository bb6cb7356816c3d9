//! Microphone capture.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::pcm::f32_le_samples;

/// A source of mono f32 samples.
///
/// Samples arrive on the channel returned by [`start`](AudioSource::start)
/// until [`stop`](AudioSource::stop) is called or the device ends; the
/// channel closes in both cases.
#[async_trait]
pub trait AudioSource: Send {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<f32>>>;

    async fn stop(&mut self);

    fn sample_rate(&self) -> u32;
}

/// Capture through an external recorder writing raw little-endian f32 to stdout
pub struct CommandAudioSource {
    program: String,
    args: Vec<String>,
    sample_rate: u32,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
}

impl CommandAudioSource {
    /// `command[0]` is the program; `{sample_rate}` in any argument is substituted
    pub fn new(command: &[String], sample_rate: u32) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("Recorder command is empty");
        };
        let rate = sample_rate.to_string();
        Ok(Self {
            program: program.clone(),
            args: args.iter().map(|arg| arg.replace("{sample_rate}", &rate)).collect(),
            sample_rate,
            child: None,
            reader: None,
        })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl AudioSource for CommandAudioSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<f32>>> {
        if self.child.is_some() {
            bail!("Recorder is already running");
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start recorder '{}'", self.command_line()))?;

        let mut stdout = child.stdout.take().context("Recorder has no stdout")?;
        let (tx, rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(async move {
            let mut buffer = vec![0u8; 8192];
            let mut carry: Vec<u8> = Vec::new();
            loop {
                match stdout.read(&mut buffer).await {
                    Ok(0) => break,
                    Ok(n) => {
                        carry.extend_from_slice(&buffer[..n]);
                        let (samples, rest) = f32_le_samples(&carry);
                        let rest = rest.to_vec();
                        carry = rest;
                        if !samples.is_empty() && tx.send(samples).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Recorder read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Recorder stream closed");
        });

        self.child = Some(child);
        self.reader = Some(reader);
        Ok(rx)
    }

    async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                debug!("Recorder already exited: {}", e);
            }
        }
        if let Some(reader) = self.reader.take() {
            // The reader ends on EOF once the child is gone
            if reader.await.is_err() {
                debug!("Recorder reader task was cancelled");
            }
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Groups samples into fixed-size frames of a tenth of a second
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    frame_len: usize,
    buffer: Vec<f32>,
}

impl FrameAccumulator {
    pub fn new(sample_rate: u32) -> Self {
        let frame_len = (sample_rate as usize / 10).max(1);
        Self {
            frame_len,
            buffer: Vec::with_capacity(frame_len),
        }
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Add samples; returns every frame completed by them
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        let mut frames = Vec::new();
        for &sample in samples {
            self.buffer.push(sample);
            if self.buffer.len() == self.frame_len {
                frames.push(std::mem::replace(&mut self.buffer, Vec::with_capacity(self.frame_len)));
            }
        }
        frames
    }

    /// The partial frame left when capture stops
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}
