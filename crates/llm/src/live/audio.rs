//! PCM framing for the Live audio bridge

use base64::Engine;

/// Microphone side
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Model voice
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;
/// Samples per capture chunk
pub const CHUNK_SAMPLES: usize = 4096;
pub const INPUT_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// f32 samples in `[-1, 1]` to signed 16-bit little-endian PCM
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32);
        bytes.extend_from_slice(&(scaled as i16).to_le_bytes());
    }
    bytes
}

/// Signed 16-bit little-endian PCM to f32; a trailing odd byte is dropped
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(data)
}

/// Playback length of mono 16-bit PCM
pub fn pcm16_duration_secs(byte_len: usize, sample_rate: u32) -> f64 {
    (byte_len / 2) as f64 / sample_rate as f64
}

/// Bytes of a reply segment already heard at `now`, given the segment's
/// first scheduled start and how much of it was written. Whole samples only.
pub fn played_pcm16_bytes(written: usize, first_start: f64, now: f64, sample_rate: u32) -> usize {
    let elapsed = (now - first_start).max(0.0);
    let samples = (elapsed * sample_rate as f64).floor() as usize;
    (samples * 2).min(written - written % 2)
}

/// Gapless scheduling of reply chunks on a playback clock.
///
/// Each chunk starts when the previous one ends, or now if playback has
/// already caught up.
#[derive(Debug, Default, Clone)]
pub struct PlaybackScheduler {
    next_start: f64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the start time for a chunk of `duration` seconds
    pub fn schedule(&mut self, now: f64, duration: f64) -> f64 {
        let start = self.next_start.max(now);
        self.next_start = start + duration;
        start
    }

    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    /// Drop queued audio, e.g. when the model is interrupted
    pub fn reset(&mut self, now: f64) {
        self.next_start = now;
    }
}
