//! WAV codec boundary
//!
//! The assembler never touches the WAV container directly; it goes through
//! the [`AudioCodec`] trait. [`WavCodec`] is the production implementation
//! backed by hound; tests substitute an in-memory codec.
//!
//! Only integer PCM is handled (8/16/24/32 bit). IEEE-float WAVs are
//! rejected: trimming and concatenation are bit-exact in the integer
//! domain and the merged file keeps the source bit depth.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::audio::buffer::PcmBuffer;
use crate::error::{KitError, Result};

/// Decode and encode boundary for the kit pipeline
///
/// Implementations must be callable from any thread.
pub trait AudioCodec {
    /// Load a source file into a PCM buffer
    fn load(&self, path: &Path) -> Result<PcmBuffer>;

    /// Write a PCM buffer out as a standard WAV file
    fn export(&self, buffer: &PcmBuffer, path: &Path) -> Result<()>;
}

/// Production codec backed by hound
#[derive(Debug, Default)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        WavCodec
    }
}

impl AudioCodec for WavCodec {
    fn load(&self, path: &Path) -> Result<PcmBuffer> {
        let mut reader = WavReader::open(path).map_err(|e| KitError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let spec = reader.spec();
        if spec.sample_format == SampleFormat::Float {
            return Err(KitError::UnsupportedFormat {
                format: "32-bit float WAV (integer PCM only)".to_string(),
            });
        }

        let samples: std::result::Result<Vec<i32>, _> = match spec.bits_per_sample {
            8 => reader.samples::<i8>().map(|s| s.map(i32::from)).collect(),
            16 => reader.samples::<i16>().map(|s| s.map(i32::from)).collect(),
            24 | 32 => reader.samples::<i32>().collect(),
            other => {
                return Err(KitError::UnsupportedFormat {
                    format: format!("{}-bit integer audio", other),
                });
            }
        };
        let samples = samples.map_err(|e| KitError::Load {
            path: path.display().to_string(),
            reason: format!("failed to read samples: {}", e),
        })?;

        debug!(
            "loaded {}: {} ch, {} Hz, {} bit, {} samples",
            path.display(),
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            samples.len()
        );

        PcmBuffer::from_interleaved(samples, spec.channels, spec.sample_rate, spec.bits_per_sample)
    }

    fn export(&self, buffer: &PcmBuffer, path: &Path) -> Result<()> {
        let spec = WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: buffer.bits_per_sample(),
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec).map_err(|e| KitError::Export {
            path: path.display().to_string(),
            stage: "wav create".to_string(),
            reason: e.to_string(),
        })?;

        let write_err = |e: hound::Error| KitError::Export {
            path: path.display().to_string(),
            stage: "wav write".to_string(),
            reason: e.to_string(),
        };

        match buffer.bits_per_sample() {
            8 => {
                for &sample in buffer.samples() {
                    writer.write_sample(sample as i8).map_err(write_err)?;
                }
            }
            16 => {
                for &sample in buffer.samples() {
                    writer.write_sample(sample as i16).map_err(write_err)?;
                }
            }
            _ => {
                for &sample in buffer.samples() {
                    writer.write_sample(sample).map_err(write_err)?;
                }
            }
        }

        writer.finalize().map_err(|e| KitError::Export {
            path: path.display().to_string(),
            stage: "wav finalize".to_string(),
            reason: e.to_string(),
        })?;

        debug!(
            "exported {}: {} frames, {} ch",
            path.display(),
            buffer.frames(),
            buffer.channels()
        );
        Ok(())
    }
}
