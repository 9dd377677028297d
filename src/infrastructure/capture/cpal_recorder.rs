//! Cross-platform chunked recorder using cpal
//!
//! Speech-optimized capture: mono, 16 kHz (or resampled from the device
//! rate). The capture callback accumulates frames into one-second batches;
//! an encoder worker turns batches into 100 ms container chunks for the
//! negotiated encoding.
//!
//! The stream lives on a dedicated thread because cpal::Stream is not Send;
//! the callback talks to the worker only through the bounded frame channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::Receiver;

use crate::application::ports::{CaptureError, ChunkRecorder, EncodingSupport};
use crate::domain::audio::{AudioMimeType, EncodedAudio, EncodedChunk};
use crate::domain::capture::{AudioFrame, CaptureMessage, CaptureParams, FrameCollector};

use crate::infrastructure::codec::{CodecRegistry, TARGET_SAMPLE_RATE};

use super::resampler::StreamResampler;
use super::transport::{frame_channel, ChannelSink, FrameSink};

type SessionResult = Result<EncodedAudio, CaptureError>;

/// Chunked recorder backed by the default cpal input device
pub struct CpalChunkRecorder {
    registry: CodecRegistry,
    is_recording: Arc<AtomicBool>,
    result_rx: StdMutex<Option<Receiver<SessionResult>>>,
}

impl CpalChunkRecorder {
    /// Create a new recorder over the default codec registry
    pub fn new() -> Self {
        Self {
            registry: CodecRegistry::new(),
            is_recording: Arc::new(AtomicBool::new(false)),
            result_rx: StdMutex::new(None),
        }
    }

    /// Get a suitable input configuration.
    /// Prefers mono and a range that includes the requested sample rate.
    fn input_config(
        device: &cpal::Device,
        params: &CaptureParams,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let target_rate = params.sample_rate;
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::AccessDenied(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            // Only consider i16 or f32 formats
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= target_rate
                && config.max_sample_rate().0 >= target_rate;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > target_rate;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(CaptureError::StartFailed(
            "No suitable input config found".into(),
        ))?;

        let sample_rate = if config_range.min_sample_rate().0 <= target_rate
            && config_range.max_sample_rate().0 >= target_rate
        {
            SampleRate(target_rate)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Mix an interleaved callback buffer down to one mono frame
    fn downmix(samples: &[f32], channels: u16) -> AudioFrame {
        match channels {
            0 => Vec::new(),
            1 => samples.to_vec(),
            n => samples
                .chunks(n as usize)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect(),
        }
    }
}

impl Default for CpalChunkRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn map_build_error(error: cpal::BuildStreamError) -> CaptureError {
    match error {
        cpal::BuildStreamError::DeviceNotAvailable => {
            CaptureError::AccessDenied("input device not available".into())
        }
        other => CaptureError::StartFailed(other.to_string()),
    }
}

fn stream_error(error: cpal::StreamError) {
    tracing::warn!(%error, "audio stream error");
}

/// Runs on a dedicated thread for the lifetime of one capture session.
/// Owns the cpal stream; reports readiness once the stream is live and
/// releases the hardware track before flushing the collector tail.
fn capture_thread(
    params: CaptureParams,
    mut sink: ChannelSink,
    ready_tx: crossbeam_channel::Sender<Result<u32, CaptureError>>,
    is_recording: Arc<AtomicBool>,
) {
    let abort = |error: CaptureError,
                 ready_tx: &crossbeam_channel::Sender<Result<u32, CaptureError>>,
                 is_recording: &AtomicBool| {
        let _ = ready_tx.send(Err(error));
        is_recording.store(false, Ordering::SeqCst);
    };

    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            abort(CaptureError::NoAudioDevice, &ready_tx, &is_recording);
            return;
        }
    };

    let (config, sample_format) = match CpalChunkRecorder::input_config(&device, &params) {
        Ok(found) => found,
        Err(e) => {
            abort(e, &ready_tx, &is_recording);
            return;
        }
    };
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    let collector = Arc::new(StdMutex::new(FrameCollector::new()));
    collector.lock().unwrap().start();

    let stream_result = match sample_format {
        SampleFormat::F32 => {
            let collector = Arc::clone(&collector);
            let mut cb_sink = sink.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let frame = CpalChunkRecorder::downmix(data, channels);
                    if let Some(batch) = collector.lock().unwrap().push(frame) {
                        cb_sink.send(CaptureMessage::Data(batch));
                    }
                },
                stream_error,
                None,
            )
        }

        SampleFormat::I16 => {
            let collector = Arc::clone(&collector);
            let mut cb_sink = sink.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let as_f32: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    let frame = CpalChunkRecorder::downmix(&as_f32, channels);
                    if let Some(batch) = collector.lock().unwrap().push(frame) {
                        cb_sink.send(CaptureMessage::Data(batch));
                    }
                },
                stream_error,
                None,
            )
        }

        _ => {
            abort(
                CaptureError::StartFailed("Unsupported sample format".into()),
                &ready_tx,
                &is_recording,
            );
            return;
        }
    };

    let stream = match stream_result {
        Ok(stream) => stream,
        Err(e) => {
            abort(map_build_error(e), &ready_tx, &is_recording);
            return;
        }
    };

    sink.send(CaptureMessage::Started { sample_rate });

    if let Err(e) = stream.play() {
        abort(
            CaptureError::StartFailed(e.to_string()),
            &ready_tx,
            &is_recording,
        );
        return;
    }
    let _ = ready_tx.send(Ok(sample_rate));

    while is_recording.load(Ordering::SeqCst) {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    // Release the hardware track before the session is considered over
    drop(stream);

    if let Some(batch) = collector.lock().unwrap().finish() {
        sink.send(CaptureMessage::Data(batch));
    }
    sink.send(CaptureMessage::Stopped);

    let dropped = sink.dropped();
    if dropped > 0 {
        tracing::warn!(dropped, "frame batches dropped under backpressure");
    }
}

/// Drains the frame channel, resamples to the target rate when the device
/// rate differs, and drives the streaming encoder until the stop signal.
fn encode_worker(
    registry: CodecRegistry,
    encoding: AudioMimeType,
    rx: Receiver<CaptureMessage>,
) -> SessionResult {
    let sample_rate = match rx.recv() {
        Ok(CaptureMessage::Started { sample_rate }) => sample_rate,
        Ok(_) => {
            return Err(CaptureError::CaptureFailed(
                "capture messages arrived out of order".into(),
            ))
        }
        Err(_) => {
            return Err(CaptureError::CaptureFailed(
                "capture ended before it started".into(),
            ))
        }
    };

    let mut encoder = registry
        .create_encoder(encoding)
        .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;

    let mut resampler = if sample_rate != TARGET_SAMPLE_RATE {
        tracing::debug!(
            device_rate = sample_rate,
            target_rate = TARGET_SAMPLE_RATE,
            "device cannot capture at the target rate, resampling"
        );
        Some(StreamResampler::new(sample_rate, TARGET_SAMPLE_RATE)?)
    } else {
        None
    };

    let mut chunks: Vec<EncodedChunk> = Vec::new();
    let mut total_samples: u64 = 0;

    loop {
        match rx.recv() {
            Ok(CaptureMessage::Data(batch)) => {
                total_samples += batch.sample_count() as u64;
                let samples = batch.into_samples();
                let samples = match resampler.as_mut() {
                    Some(resampler) => resampler.push(&samples)?,
                    None => samples,
                };
                chunks.extend(
                    encoder
                        .push(&samples)
                        .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?,
                );
            }
            Ok(CaptureMessage::Stopped) => break,
            Ok(CaptureMessage::Started { .. }) => {
                return Err(CaptureError::CaptureFailed(
                    "capture messages arrived out of order".into(),
                ))
            }
            Err(_) => {
                return Err(CaptureError::CaptureFailed(
                    "capture channel closed unexpectedly".into(),
                ))
            }
        }
    }

    if let Some(resampler) = resampler.as_mut() {
        let tail = resampler.finish()?;
        if !tail.is_empty() {
            chunks.extend(
                encoder
                    .push(&tail)
                    .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?,
            );
        }
    }
    chunks.extend(
        encoder
            .finish()
            .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?,
    );

    tracing::debug!(
        chunks = chunks.len(),
        samples = total_samples,
        "capture session encoded"
    );
    Ok(EncodedAudio::from_chunks(chunks, encoding))
}

#[async_trait]
impl ChunkRecorder for CpalChunkRecorder {
    async fn start(
        &self,
        encoding: AudioMimeType,
        params: CaptureParams,
    ) -> Result<(), CaptureError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        if params.echo_cancellation || params.noise_suppression {
            tracing::debug!("voice processing is delegated to the OS capture stack");
        }

        let (sink, msg_rx) = frame_channel();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);

        let registry = self.registry;
        std::thread::spawn(move || {
            let _ = result_tx.send(encode_worker(registry, encoding, msg_rx));
        });

        self.is_recording.store(true, Ordering::SeqCst);
        let is_recording = Arc::clone(&self.is_recording);
        std::thread::spawn(move || capture_thread(params, sink, ready_tx, is_recording));

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| CaptureError::StartFailed(format!("Task join error: {}", e)))?;

        match ready {
            Ok(Ok(sample_rate)) => {
                tracing::debug!(sample_rate, %encoding, "capture session started");
                *self.result_rx.lock().unwrap() = Some(result_rx);
                Ok(())
            }
            Ok(Err(e)) => {
                self.is_recording.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.is_recording.store(false, Ordering::SeqCst);
                Err(CaptureError::StartFailed(
                    "capture thread terminated before reporting readiness".into(),
                ))
            }
        }
    }

    async fn stop(&self) -> Result<EncodedAudio, CaptureError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::NotRecording);
        }

        let result_rx = self
            .result_rx
            .lock()
            .unwrap()
            .take()
            .ok_or(CaptureError::NotRecording)?;

        // Signals the capture thread to drop the stream and flush
        self.is_recording.store(false, Ordering::SeqCst);

        let result = tokio::task::spawn_blocking(move || result_rx.recv())
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("Task join error: {}", e)))?;

        match result {
            Ok(session_result) => session_result,
            Err(_) => Err(CaptureError::CaptureFailed(
                "encoder worker terminated unexpectedly".into(),
            )),
        }
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}

impl EncodingSupport for CpalChunkRecorder {
    fn is_encoding_supported(&self, encoding: AudioMimeType) -> bool {
        self.registry.is_encoding_supported(encoding)
    }
}
