//! Realtime voice bridge to the Gemini Live API

pub mod audio;
pub mod session;

pub use audio::{
    f32_to_pcm16, pcm16_duration_secs, pcm16_to_f32, played_pcm16_bytes, PlaybackScheduler,
    CHUNK_SAMPLES, INPUT_MIME_TYPE, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE,
};
pub use session::{LiveConfig, LiveEvent, LiveSession, DEFAULT_SETUP_TIMEOUT};
