//! Kit Export
//!
//! Writes an assembled kit to disk:
//! - merged WAV through the codec
//! - RIFF `cue ` chunk (M8)
//! - sibling `.ot` metadata file (Octatrack)
//!
//! Which metadata gets written is decided by the config's output format.
//! Failures are reported per stage, so a caller can tell that the WAV
//! succeeded even when the `.ot` file did not.

pub mod cue;
pub mod octatrack;

use std::path::Path;

use log::info;

use crate::audio::codec::AudioCodec;
use crate::config::ProcessingConfig;
use crate::error::{KitError, Result};
use crate::kit::Kit;

pub use cue::{append_cue_chunk, read_cue_chunk};
pub use octatrack::{
    slices_from_cues, LoopType, OtSettings, OtWriter, Slice, StretchMode, MAX_SLICES,
    OT_FILE_SIZE,
};

/// Write the kit's WAV and the metadata selected by the config
///
/// The `.ot` file, when requested, is written next to the WAV with the
/// same stem (`kit.wav` -> `kit.ot`).
pub fn write_outputs(
    codec: &dyn AudioCodec,
    kit: &Kit,
    wav_path: &Path,
    config: &ProcessingConfig,
    ot_settings: &OtSettings,
) -> Result<()> {
    codec.export(&kit.buffer, wav_path)?;

    if config.output_format.wants_cue_chunk() {
        append_cue_chunk(wav_path, &kit.cue_positions)?;
    }

    if config.output_format.wants_ot_file() {
        let ot_path = wav_path.with_extension("ot");
        let total_frames =
            u32::try_from(kit.buffer.frames()).map_err(|_| KitError::Octatrack {
                path: ot_path.display().to_string(),
                reason: "kit exceeds the 32-bit frame range".to_string(),
            })?;

        let mut writer = OtWriter::new(kit.buffer.sample_rate(), total_frames, *ot_settings);
        writer.add_slices(slices_from_cues(&kit.cue_positions)?)?;
        writer.write(&ot_path)?;
    }

    info!("kit written to {}", wav_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PcmBuffer, WavCodec};
    use crate::config::OutputFormat;
    use crate::kit::CuePosition;
    use tempfile::tempdir;

    fn test_kit() -> Kit {
        let buffer =
            PcmBuffer::from_interleaved(vec![1000; 2000], 1, 44100, 16).unwrap();
        Kit {
            buffer,
            cue_positions: vec![
                CuePosition { id: 1, frame_offset: 44 },
                CuePosition { id: 2, frame_offset: 1000 },
            ],
            channels: 1,
        }
    }

    #[test]
    fn test_m8_writes_cue_chunk_only() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("kit.wav");
        let config = ProcessingConfig::default();

        write_outputs(
            &WavCodec::new(),
            &test_kit(),
            &wav,
            &config,
            &OtSettings::default(),
        )
        .unwrap();

        assert!(wav.exists());
        assert_eq!(read_cue_chunk(&wav).unwrap().len(), 2);
        assert!(!dir.path().join("kit.ot").exists());
    }

    #[test]
    fn test_octatrack_writes_ot_only() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("kit.wav");
        let config = ProcessingConfig {
            output_format: OutputFormat::Octatrack,
            ..Default::default()
        };

        write_outputs(
            &WavCodec::new(),
            &test_kit(),
            &wav,
            &config,
            &OtSettings::default(),
        )
        .unwrap();

        assert!(wav.exists());
        assert!(read_cue_chunk(&wav).is_err());

        let ot = dir.path().join("kit.ot");
        assert_eq!(std::fs::metadata(&ot).unwrap().len(), OT_FILE_SIZE as u64);
    }

    #[test]
    fn test_both_writes_both() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("kit.wav");
        let config = ProcessingConfig {
            output_format: OutputFormat::Both,
            ..Default::default()
        };

        write_outputs(
            &WavCodec::new(),
            &test_kit(),
            &wav,
            &config,
            &OtSettings::default(),
        )
        .unwrap();

        assert_eq!(read_cue_chunk(&wav).unwrap().len(), 2);
        assert!(dir.path().join("kit.ot").exists());
    }

    #[test]
    fn test_too_many_slices_leaves_wav_intact() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("kit.wav");
        let config = ProcessingConfig {
            output_format: OutputFormat::Octatrack,
            ..Default::default()
        };

        // 66 cue points derive 65 slices, one past the format limit
        let mut kit = test_kit();
        kit.cue_positions = (0..66)
            .map(|i| CuePosition {
                id: i + 1,
                frame_offset: (i as u64 + 1) * 10,
            })
            .collect();

        let err = write_outputs(
            &WavCodec::new(),
            &kit,
            &wav,
            &config,
            &OtSettings::default(),
        )
        .unwrap_err();

        assert_eq!(err.error_code(), "TOO_MANY_SLICES");
        // The WAV stage had already succeeded; no .ot file was produced
        assert!(wav.exists());
        assert!(!dir.path().join("kit.ot").exists());
    }
}
