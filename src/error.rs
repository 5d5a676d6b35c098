//! Error handling for slicekit
//!
//! A single crate-wide error enum covers the three failure domains of the
//! pipeline: loading source audio, exporting the merged WAV (including the
//! cue chunk), and writing Octatrack metadata. Validation of user-selected
//! files happens in the CLI layer and is reported there, not through this
//! enum.

use thiserror::Error;

/// Result type alias for slicekit operations
pub type Result<T> = std::result::Result<T, KitError>;

/// Main error type for slicekit operations
#[derive(Error, Debug)]
pub enum KitError {
    // Source loading errors
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Sample rate mismatch in {path}: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio data: {reason}")]
    InvalidAudio { reason: String },

    // Parameter errors
    #[error("Invalid parameter {param}: {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // WAV export / cue chunk errors
    #[error("Export failed at {stage} for {path}: {reason}")]
    Export {
        path: String,
        stage: String,
        reason: String,
    },

    // Octatrack metadata errors
    #[error("Too many slices: {count} (maximum 64)")]
    TooManySlices { count: usize },

    #[error("Failed to write .ot file {path}: {reason}")]
    Octatrack { path: String, reason: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KitError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            KitError::Load { .. } => "LOAD_ERROR",
            KitError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            KitError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            KitError::InvalidAudio { .. } => "INVALID_AUDIO",
            KitError::InvalidParameter { .. } => "INVALID_PARAMETER",
            KitError::Export { .. } => "EXPORT_ERROR",
            KitError::TooManySlices { .. } => "TOO_MANY_SLICES",
            KitError::Octatrack { .. } => "OCTATRACK_ERROR",
            KitError::Io(_) => "IO_ERROR",
            KitError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error concerns the source-loading stage
    ///
    /// Load-stage failures abort an assembly run before any file is
    /// written; export-stage failures may leave a WAV on disk without its
    /// cue chunk or `.ot` sibling.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            KitError::Load { .. }
                | KitError::SampleRateMismatch { .. }
                | KitError::UnsupportedFormat { .. }
                | KitError::InvalidAudio { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = KitError::Load {
            path: "kick.wav".to_string(),
            reason: "not a wav".to_string(),
        };
        assert_eq!(err.error_code(), "LOAD_ERROR");

        let err = KitError::TooManySlices { count: 65 };
        assert_eq!(err.error_code(), "TOO_MANY_SLICES");
    }

    #[test]
    fn test_load_error_classification() {
        let err = KitError::SampleRateMismatch {
            path: "snare.wav".to_string(),
            expected: 44100,
            actual: 48000,
        };
        assert!(err.is_load_error());

        let err = KitError::Octatrack {
            path: "kit.ot".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_display_includes_context() {
        let err = KitError::Export {
            path: "kit.wav".to_string(),
            stage: "cue chunk".to_string(),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("kit.wav"));
        assert!(msg.contains("cue chunk"));
    }
}
