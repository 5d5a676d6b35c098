//! Audio Subsystem
//!
//! Core audio types and processing:
//! - Interleaved integer PCM buffers
//! - WAV codec boundary (load/export)
//! - Silence trimming and rejoining

pub mod buffer;
pub mod codec;
pub mod silence;

pub use buffer::{channel_description, PcmBuffer};
pub use codec::{AudioCodec, WavCodec};
pub use silence::{rejoin, split_on_silence, trim_silence};
