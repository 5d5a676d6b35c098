//! Source file validation
//!
//! Pre-flight checks on user-selected files, run before the core pipeline
//! ever sees them. Failures here are user input problems, not pipeline
//! errors, so they are reported as plain per-file messages rather than
//! through the crate error type.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::config::{
    MAX_CHANNELS, MAX_SAMPLE_RATE, MAX_SAMPLE_WIDTH_BYTES, MIN_CHANNELS, MIN_SAMPLE_RATE,
    MIN_SAMPLE_WIDTH_BYTES,
};

/// Validate that a file is a readable WAV source
///
/// Checks the extension, readability, and that the header's channel
/// count, sample width and sample rate fall inside the supported ranges.
pub fn validate_wav_file(path: &Path) -> Result<(), String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => {}
        _ => return Err("not a WAV file (wrong extension)".to_string()),
    }

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return Err("file does not exist".to_string()),
    };
    if !metadata.is_file() {
        return Err("not a regular file".to_string());
    }
    if metadata.len() == 0 {
        return Err("file is empty".to_string());
    }

    let reader = match WavReader::open(path) {
        Ok(r) => r,
        Err(e) => return Err(format!("invalid WAV file: {}", e)),
    };
    let spec = reader.spec();

    if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&spec.channels) {
        return Err(format!("unsupported channel count: {}", spec.channels));
    }

    let width_bytes = spec.bits_per_sample / 8;
    if spec.bits_per_sample % 8 != 0
        || !(MIN_SAMPLE_WIDTH_BYTES..=MAX_SAMPLE_WIDTH_BYTES).contains(&width_bytes)
    {
        return Err(format!(
            "unsupported sample width: {} bits",
            spec.bits_per_sample
        ));
    }

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&spec.sample_rate) {
        return Err(format!("unsupported sample rate: {} Hz", spec.sample_rate));
    }

    if spec.sample_format == SampleFormat::Float {
        return Err("unsupported sample format: 32-bit float".to_string());
    }

    Ok(())
}

/// Validate every source file, collecting all failures
pub fn validate_sources(paths: &[std::path::PathBuf]) -> Result<(), Vec<(String, String)>> {
    let invalid: Vec<(String, String)> = paths
        .iter()
        .filter_map(|path| {
            validate_wav_file(path)
                .err()
                .map(|msg| (path.display().to_string(), msg))
        })
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCodec, PcmBuffer, WavCodec};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_valid_wav(path: &Path) {
        let buffer = PcmBuffer::from_interleaved(vec![100; 400], 1, 44100, 16).unwrap();
        WavCodec::new().export(&buffer, path).unwrap();
    }

    #[test]
    fn test_valid_file_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("good.wav");
        write_valid_wav(&path);
        assert!(validate_wav_file(&path).is_ok());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loud.WAV");
        write_valid_wav(&path);
        assert!(validate_wav_file(&path).is_ok());
    }

    #[test]
    fn test_wrong_extension_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let msg = validate_wav_file(&path).unwrap_err();
        assert!(msg.contains("extension"));
    }

    #[test]
    fn test_missing_file_fails() {
        let msg = validate_wav_file(Path::new("/nonexistent/x.wav")).unwrap_err();
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn test_empty_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        std::fs::write(&path, b"").unwrap();
        let msg = validate_wav_file(&path).unwrap_err();
        assert!(msg.contains("empty"));
    }

    #[test]
    fn test_garbage_header_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"RIFFnope").unwrap();
        let msg = validate_wav_file(&path).unwrap_err();
        assert!(msg.contains("invalid WAV"));
    }

    #[test]
    fn test_validate_sources_collects_all_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.wav");
        write_valid_wav(&good);
        let bad_a = dir.path().join("missing.wav");
        let bad_b = dir.path().join("wrong.txt");
        std::fs::write(&bad_b, b"x").unwrap();

        let paths: Vec<PathBuf> = vec![good, bad_a.clone(), bad_b.clone()];
        let failures = validate_sources(&paths).unwrap_err();

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, bad_a.display().to_string());
        assert_eq!(failures[1].0, bad_b.display().to_string());
    }
}
