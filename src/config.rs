//! Processing configuration
//!
//! Holds the parameters for one assembly run and the validation limits for
//! source files. A config is immutable once a run starts; the CLI builds
//! one from flags or loads it from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KitError, Result};

// ============================================================================
// Default processing parameters
// ============================================================================

/// Duration of the silent marker inserted between samples (ms)
pub const DEFAULT_MARKER_DURATION_MS: u32 = 1;

/// Silence detection threshold in dBFS
pub const DEFAULT_SILENCE_THRESHOLD_DBFS: f32 = -50.0;

/// Minimum silence run length to qualify for trimming (ms)
pub const DEFAULT_MIN_SILENCE_LEN_MS: u32 = 10;

/// Silence retained between trimmed chunks when rejoining (ms)
pub const DEFAULT_RETAINED_SILENCE_MS: u32 = 1;

// ============================================================================
// Source file validation limits
// ============================================================================

pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;
pub const MIN_CHANNELS: u16 = 1;
pub const MAX_CHANNELS: u16 = 8;
pub const MIN_SAMPLE_WIDTH_BYTES: u16 = 1;
pub const MAX_SAMPLE_WIDTH_BYTES: u16 = 4;

/// Which slice metadata to emit alongside the merged WAV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// RIFF `cue ` chunk appended to the WAV (Dirtywave M8)
    M8,
    /// Sibling `.ot` metadata file (Elektron Octatrack)
    Octatrack,
    /// Both cue chunk and `.ot` file
    Both,
}

impl OutputFormat {
    /// Whether this format wants cue points embedded in the WAV
    pub fn wants_cue_chunk(&self) -> bool {
        matches!(self, OutputFormat::M8 | OutputFormat::Both)
    }

    /// Whether this format wants an `.ot` sidecar file
    pub fn wants_ot_file(&self) -> bool {
        matches!(self, OutputFormat::Octatrack | OutputFormat::Both)
    }
}

/// Parameters for one assembly run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Duration of silent markers between samples (ms)
    pub marker_duration_ms: u32,
    /// Silence detection threshold in dBFS
    pub silence_threshold_dbfs: f32,
    /// Minimum silence duration to detect (ms)
    pub min_silence_len_ms: u32,
    /// Amount of silence to keep between chunks (ms)
    pub retained_silence_ms: u32,
    /// Convert all audio to mono
    pub force_mono: bool,
    /// Slice metadata format(s) to emit
    pub output_format: OutputFormat,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            marker_duration_ms: DEFAULT_MARKER_DURATION_MS,
            silence_threshold_dbfs: DEFAULT_SILENCE_THRESHOLD_DBFS,
            min_silence_len_ms: DEFAULT_MIN_SILENCE_LEN_MS,
            retained_silence_ms: DEFAULT_RETAINED_SILENCE_MS,
            force_mono: false,
            output_format: OutputFormat::M8,
        }
    }
}

impl ProcessingConfig {
    /// Validate that the parameters are usable
    pub fn validate(&self) -> Result<()> {
        if self.marker_duration_ms == 0 {
            return Err(KitError::InvalidParameter {
                param: "marker_duration_ms".to_string(),
                value: self.marker_duration_ms.to_string(),
                expected: "at least 1 ms".to_string(),
            });
        }
        if self.min_silence_len_ms == 0 {
            return Err(KitError::InvalidParameter {
                param: "min_silence_len_ms".to_string(),
                value: self.min_silence_len_ms.to_string(),
                expected: "at least 1 ms".to_string(),
            });
        }
        if self.silence_threshold_dbfs >= 0.0 {
            return Err(KitError::InvalidParameter {
                param: "silence_threshold_dbfs".to_string(),
                value: self.silence_threshold_dbfs.to_string(),
                expected: "below 0 dBFS".to_string(),
            });
        }
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// Missing fields fall back to their defaults, so a partial file like
    /// `{"force_mono": true}` is valid.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ProcessingConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
