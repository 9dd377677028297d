//! Opus-in-Ogg streaming codec
//!
//! Encoder settings are speech-optimized:
//! - Sample rate: 16kHz
//! - Channels: Mono
//! - Application: VOIP
//! - Bitrate: 16kbps
//!
//! The encoder is chunked: container bytes produced so far are drained every
//! 100 ms of audio, and concatenating every drained chunk in order yields a
//! single valid Ogg stream. The decoder reads the same container back into
//! raw per-channel samples.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use ogg::reading::PacketReader;
use ogg::writing::{PacketWriteEndInfo, PacketWriter};

use crate::application::ports::{ChunkEncoder, DecodeError, EncodeError};
use crate::domain::audio::{AudioMimeType, DecodedAudio, EncodedChunk};

/// Target sample rate for speech-optimized encoding
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Opus frame size in samples (20ms at 16kHz)
pub const OPUS_FRAME_SAMPLES: usize = 320;

/// Chunk cadence in samples (100ms at 16kHz)
pub const CHUNK_INTERVAL_SAMPLES: usize = 1_600;

/// Target bitrate in bits per second
const TARGET_BITRATE: i32 = 16_000;

/// Max Opus packet size
const MAX_PACKET_LEN: usize = 4_000;

/// Shared byte sink the Ogg writer streams into, drained at chunk cadence
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn drain(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streaming Opus encoder producing Ogg container chunks
pub struct OggOpusChunkEncoder {
    encoder: opus::Encoder,
    writer: PacketWriter<'static, SharedSink>,
    sink: SharedSink,
    pending: Vec<i16>,
    since_chunk: usize,
    granule_pos: u64,
    serial: u32,
    finished: bool,
}

impl std::fmt::Debug for OggOpusChunkEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OggOpusChunkEncoder")
            .field("serial", &self.serial)
            .field("granule_pos", &self.granule_pos)
            .field("since_chunk", &self.since_chunk)
            .field("pending", &self.pending.len())
            .field("finished", &self.finished)
            .finish()
    }
}

impl OggOpusChunkEncoder {
    /// Create an encoder with speech settings and write the Opus headers
    pub fn new() -> Result<Self, EncodeError> {
        let mut encoder = opus::Encoder::new(
            TARGET_SAMPLE_RATE,
            opus::Channels::Mono,
            opus::Application::Voip,
        )
        .map_err(|e| EncodeError::Init(e.to_string()))?;

        encoder
            .set_bitrate(opus::Bitrate::Bits(TARGET_BITRATE))
            .map_err(|e| EncodeError::Init(e.to_string()))?;
        encoder
            .set_vbr(true)
            .map_err(|e| EncodeError::Init(e.to_string()))?;
        encoder
            .set_inband_fec(true)
            .map_err(|e| EncodeError::Init(e.to_string()))?;

        let sink = SharedSink::default();
        let mut writer = PacketWriter::new(sink.clone());
        let serial = stream_serial();

        write_opus_headers(&mut writer, serial)?;

        Ok(Self {
            encoder,
            writer,
            sink,
            pending: Vec::with_capacity(OPUS_FRAME_SAMPLES),
            since_chunk: 0,
            granule_pos: 0,
            serial,
            finished: false,
        })
    }

    fn write_frame(&mut self, frame: &[i16], end: PacketWriteEndInfo) -> Result<(), EncodeError> {
        let mut packet = vec![0u8; MAX_PACKET_LEN];
        let len = self
            .encoder
            .encode(frame, &mut packet)
            .map_err(|e| EncodeError::Encode(e.to_string()))?;
        packet.truncate(len);

        self.granule_pos += frame.len() as u64;
        self.writer
            .write_packet(packet, self.serial, end, self.granule_pos)
            .map_err(|e| EncodeError::Container(e.to_string()))?;
        Ok(())
    }

    fn drain_chunk(&mut self, chunks: &mut Vec<EncodedChunk>) {
        let data = self.sink.drain();
        if !data.is_empty() {
            chunks.push(EncodedChunk::new(data, AudioMimeType::Ogg));
        }
    }
}

impl ChunkEncoder for OggOpusChunkEncoder {
    fn mime_type(&self) -> AudioMimeType {
        AudioMimeType::Ogg
    }

    fn push(&mut self, samples: &[f32]) -> Result<Vec<EncodedChunk>, EncodeError> {
        let mut chunks = Vec::new();
        let mut rest = samples;

        while !rest.is_empty() {
            let take = (CHUNK_INTERVAL_SAMPLES - self.since_chunk).min(rest.len());
            let (head, tail) = rest.split_at(take);
            rest = tail;

            for &sample in head {
                self.pending
                    .push((sample.clamp(-1.0, 1.0) * 32767.0) as i16);
            }
            while self.pending.len() >= OPUS_FRAME_SAMPLES {
                let frame: Vec<i16> = self.pending.drain(..OPUS_FRAME_SAMPLES).collect();
                self.write_frame(&frame, PacketWriteEndInfo::NormalPacket)?;
            }

            self.since_chunk += take;
            if self.since_chunk >= CHUNK_INTERVAL_SAMPLES {
                self.since_chunk = 0;
                self.drain_chunk(&mut chunks);
            }
        }

        Ok(chunks)
    }

    fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncodeError> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.finished = true;

        // Pad the last partial frame and close the stream
        let mut frame = std::mem::take(&mut self.pending);
        frame.resize(OPUS_FRAME_SAMPLES, 0);
        self.write_frame(&frame, PacketWriteEndInfo::EndStream)?;

        let mut chunks = Vec::new();
        self.drain_chunk(&mut chunks);
        Ok(chunks)
    }
}

/// Write Opus identification and comment headers
fn write_opus_headers(
    writer: &mut PacketWriter<'static, SharedSink>,
    serial: u32,
) -> Result<(), EncodeError> {
    // Opus identification header (required by spec)
    let mut id_header = Vec::with_capacity(19);
    id_header.extend_from_slice(b"OpusHead"); // Magic signature
    id_header.push(1); // Version
    id_header.push(1); // Channel count (mono)
    id_header.extend_from_slice(&0u16.to_le_bytes()); // Pre-skip
    id_header.extend_from_slice(&TARGET_SAMPLE_RATE.to_le_bytes()); // Original sample rate
    id_header.extend_from_slice(&0i16.to_le_bytes()); // Output gain
    id_header.push(0); // Channel mapping family

    writer
        .write_packet(id_header, serial, PacketWriteEndInfo::EndPage, 0)
        .map_err(|e| EncodeError::Container(e.to_string()))?;

    // Opus comment header (required by spec)
    let mut comment_header = Vec::new();
    comment_header.extend_from_slice(b"OpusTags"); // Magic signature
    let vendor = b"voice-relay";
    comment_header.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    comment_header.extend_from_slice(vendor);
    comment_header.extend_from_slice(&0u32.to_le_bytes()); // No user comments

    writer
        .write_packet(comment_header, serial, PacketWriteEndInfo::EndPage, 0)
        .map_err(|e| EncodeError::Container(e.to_string()))?;

    Ok(())
}

/// Generate a pseudo-random serial number for the Ogg stream
fn stream_serial() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (duration.as_secs() as u32) ^ duration.subsec_nanos()
}

/// Decode an Opus-in-Ogg blob into raw per-channel samples
pub fn decode(data: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut reader = PacketReader::new(Cursor::new(data));

    let head = reader
        .read_packet()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?
        .ok_or_else(|| DecodeError::Malformed("empty Ogg stream".to_string()))?;
    let (channels, pre_skip, input_rate) = parse_opus_head(&head.data)?;

    // The comment header carries no audio
    reader
        .read_packet()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?
        .ok_or_else(|| DecodeError::Malformed("missing OpusTags header".to_string()))?;

    let opus_channels = match channels {
        1 => opus::Channels::Mono,
        2 => opus::Channels::Stereo,
        n => {
            return Err(DecodeError::Malformed(format!(
                "unsupported channel count: {}",
                n
            )))
        }
    };
    let sample_rate = decode_rate(input_rate);
    let mut decoder = opus::Decoder::new(sample_rate, opus_channels)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    // 120 ms is the longest frame Opus allows
    let max_frame = (sample_rate as usize / 1000) * 120;
    let mut buf = vec![0i16; max_frame * channels as usize];
    let mut interleaved: Vec<i16> = Vec::new();

    while let Some(packet) = reader
        .read_packet()
        .map_err(|e| DecodeError::Malformed(e.to_string()))?
    {
        if packet.data.is_empty() {
            continue;
        }
        let frames = decoder
            .decode(&packet.data, &mut buf, false)
            .map_err(|e| DecodeError::Malformed(format!("Opus decode failed: {}", e)))?;
        interleaved.extend_from_slice(&buf[..frames * channels as usize]);
    }

    let skip = pre_skip as usize * channels as usize;
    let interleaved = if interleaved.len() > skip {
        &interleaved[skip..]
    } else {
        &[][..]
    };

    let frames = interleaved.len() / channels as usize;
    let mut per_channel = vec![Vec::with_capacity(frames); channels as usize];
    for frame in interleaved.chunks_exact(channels as usize) {
        for (channel, &sample) in frame.iter().enumerate() {
            per_channel[channel].push(sample as f32 / 32768.0);
        }
    }

    Ok(DecodedAudio::new(sample_rate, per_channel))
}

fn parse_opus_head(data: &[u8]) -> Result<(u8, u16, u32), DecodeError> {
    if data.len() < 19 || &data[..8] != b"OpusHead" {
        return Err(DecodeError::Malformed(
            "missing OpusHead header".to_string(),
        ));
    }
    let channels = data[9];
    let pre_skip = u16::from_le_bytes([data[10], data[11]]);
    let input_rate = u32::from_le_bytes([data[12], data[13], data[14], data[15]]);
    Ok((channels, pre_skip, input_rate))
}

/// Opus only decodes at a fixed set of rates; fall back to 48kHz for
/// anything else the header might claim.
fn decode_rate(input_rate: u32) -> u32 {
    match input_rate {
        8_000 | 12_000 | 16_000 | 24_000 | 48_000 => input_rate,
        _ => 48_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(samples: &[f32]) -> Vec<u8> {
        let mut encoder = OggOpusChunkEncoder::new().unwrap();
        let mut chunks = encoder.push(samples).unwrap();
        chunks.extend(encoder.finish().unwrap());
        chunks.into_iter().flat_map(|c| c.data().to_vec()).collect()
    }

    #[test]
    fn encoder_creates_successfully() {
        assert!(OggOpusChunkEncoder::new().is_ok());
    }

    #[test]
    fn encoded_stream_is_ogg_with_opus_headers() {
        // 1 second of silence at 16kHz
        let data = encode_all(&vec![0.0; TARGET_SAMPLE_RATE as usize]);

        assert!(data.len() > 50);
        assert!(data.starts_with(b"OggS"));
        assert!(data.windows(8).any(|w| w == b"OpusHead"));
        assert!(data.windows(8).any(|w| w == b"OpusTags"));
    }

    #[test]
    fn one_second_yields_multiple_chunks() {
        let mut encoder = OggOpusChunkEncoder::new().unwrap();
        let mut chunks = encoder.push(&vec![0.0; TARGET_SAMPLE_RATE as usize]).unwrap();
        chunks.extend(encoder.finish().unwrap());

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.mime_type() == AudioMimeType::Ogg));
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn short_audio_still_produces_a_stream() {
        // 50ms, less than one chunk interval and less than one Opus frame
        let data = encode_all(&vec![0.0; 800]);
        assert!(data.starts_with(b"OggS"));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut encoder = OggOpusChunkEncoder::new().unwrap();
        encoder.push(&vec![0.0; 1_000]).unwrap();
        let first = encoder.finish().unwrap();
        let second = encoder.finish().unwrap();

        assert!(!first.is_empty());
        assert!(second.is_empty());
    }

    #[test]
    fn round_trip_preserves_duration_and_silence() {
        let samples = vec![0.0f32; TARGET_SAMPLE_RATE as usize];
        let data = encode_all(&samples);

        let decoded = decode(&data).unwrap();
        assert_eq!(decoded.sample_rate(), TARGET_SAMPLE_RATE);
        assert_eq!(decoded.num_channels(), 1);

        // Final frame padding may add up to one frame of trailing silence
        let frames = decoded.num_frames();
        assert!(frames >= samples.len());
        assert!(frames <= samples.len() + OPUS_FRAME_SAMPLES);
        assert!(decoded.channels()[0].iter().all(|s| s.abs() < 0.05));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"definitely not an ogg stream").is_err());
    }

    #[test]
    fn decode_rejects_truncated_head() {
        let err = parse_opus_head(b"OpusHead").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn opus_frame_is_20ms() {
        assert_eq!(OPUS_FRAME_SAMPLES, 320);
        assert_eq!(
            OPUS_FRAME_SAMPLES as f32 / TARGET_SAMPLE_RATE as f32 * 1000.0,
            20.0
        );
    }

    #[test]
    fn chunk_interval_is_100ms() {
        assert_eq!(CHUNK_INTERVAL_SAMPLES, 1_600);
        assert_eq!(
            CHUNK_INTERVAL_SAMPLES as f32 / TARGET_SAMPLE_RATE as f32 * 1000.0,
            100.0
        );
    }

    #[test]
    fn decode_rate_falls_back_to_48k() {
        assert_eq!(decode_rate(16_000), 16_000);
        assert_eq!(decode_rate(44_100), 48_000);
    }
}
