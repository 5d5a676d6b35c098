//! Integration Tests
//!
//! End-to-end tests for the slicekit assembly pipeline: real WAV files on
//! disk, through assembly, to the exported kit with cue chunk and .ot
//! metadata.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use slicekit::audio::{AudioCodec, PcmBuffer, WavCodec};
use slicekit::config::{OutputFormat, ProcessingConfig};
use slicekit::export::{read_cue_chunk, write_outputs, OtSettings};
use slicekit::kit::{assemble, SourceFile};

const RATE: u32 = 44100;

/// Write a 1-second mono source with a silent lead-in
///
/// 0.3 s of silence followed by 0.7 s of constant half-scale signal.
fn write_silent_leading_source(path: &Path) {
    let mut samples = vec![0i32; 13230];
    samples.extend(vec![16384i32; 44100 - 13230]);
    let buffer = PcmBuffer::from_interleaved(samples, 1, RATE, 16).unwrap();
    WavCodec::new().export(&buffer, path).unwrap();
}

fn get_u32_be(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap())
}

fn get_u16_be(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes(data[offset..offset + 2].try_into().unwrap())
}

#[test]
fn test_end_to_end_two_file_kit_with_both_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![dir.path().join("hit1.wav"), dir.path().join("hit2.wav")];
    for path in &sources {
        write_silent_leading_source(path);
    }

    let config = ProcessingConfig {
        output_format: OutputFormat::Both,
        ..Default::default()
    };
    let codec = WavCodec::new();

    let kit = assemble(&codec, &SourceFile::list(&sources), &config, None).unwrap();

    // The 0.3 s lead-in is trimmed at 1 ms block granularity: each source
    // keeps 30900 of its 44100 frames. A 1 ms marker at 44100 Hz is 44
    // frames, and one marker precedes and follows every file.
    let trimmed = 30900;
    let marker = 44;
    assert_eq!(kit.buffer.frames(), 2 * trimmed + 3 * marker);

    assert_eq!(kit.cue_positions.len(), 3);
    let offsets: Vec<u64> = kit.cue_positions.iter().map(|c| c.frame_offset).collect();
    assert_eq!(offsets, vec![44, 30944, 61888]);

    let wav_path = dir.path().join("kit.wav");
    write_outputs(&codec, &kit, &wav_path, &config, &OtSettings::default()).unwrap();

    // The merged audio survives the cue chunk append
    let reloaded = codec.load(&wav_path).unwrap();
    assert_eq!(reloaded, kit.buffer);

    // Cue chunk round-trip preserves ids and positions
    let cues = read_cue_chunk(&wav_path).unwrap();
    assert_eq!(cues, kit.cue_positions);

    // The .ot sidecar has two adjacent slices covering the kit
    let ot_path = dir.path().join("kit.ot");
    let ot = std::fs::read(&ot_path).unwrap();
    assert_eq!(ot.len(), 832);
    assert_eq!(&ot[0..16], b"FORM\x00\x00\x03,DPS1SMPA");

    assert_eq!(get_u32_be(&ot, 0x34), 2); // slice count
    let slice0 = (get_u32_be(&ot, 0x38), get_u32_be(&ot, 0x3C));
    let slice1 = (get_u32_be(&ot, 0x44), get_u32_be(&ot, 0x48));
    assert_eq!(slice0, (44, 30944));
    assert_eq!(slice1, (30944, 61888));
    assert_eq!(slice0.1, slice1.0);

    // Defaults: 120 BPM and unity gain
    assert_eq!(get_u32_be(&ot, 0x10), 720);
    assert_eq!(get_u16_be(&ot, 0x24), 48);

    // Trim end covers the whole kit, checksum matches the byte sum
    assert_eq!(get_u32_be(&ot, 0x2C), kit.buffer.frames() as u32);
    let sum: u64 = ot[0x10..0x33E].iter().map(|&b| b as u64).sum();
    assert_eq!(get_u16_be(&ot, 0x33E), (sum & 0xFFFF) as u16);
}

#[test]
fn test_m8_only_kit_has_no_ot_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![dir.path().join("hit1.wav")];
    write_silent_leading_source(&sources[0]);

    let config = ProcessingConfig::default();
    let codec = WavCodec::new();

    let kit = assemble(&codec, &SourceFile::list(&sources), &config, None).unwrap();
    let wav_path = dir.path().join("kit.wav");
    write_outputs(&codec, &kit, &wav_path, &config, &OtSettings::default()).unwrap();

    assert_eq!(read_cue_chunk(&wav_path).unwrap().len(), 2);
    assert!(!dir.path().join("kit.ot").exists());
}

#[test]
fn test_force_mono_merges_stereo_sources() {
    let dir = tempfile::tempdir().unwrap();
    let codec = WavCodec::new();

    // Stereo source: left/right differ so the mono average is distinct
    let mut samples = Vec::new();
    for _ in 0..8820 {
        samples.push(12000i32);
        samples.push(4000i32);
    }
    let stereo = PcmBuffer::from_interleaved(samples, 2, RATE, 16).unwrap();
    let source = dir.path().join("stereo.wav");
    codec.export(&stereo, &source).unwrap();

    let config = ProcessingConfig {
        force_mono: true,
        ..Default::default()
    };
    let sources = vec![source];
    let kit = assemble(&codec, &SourceFile::list(&sources), &config, None).unwrap();

    assert_eq!(kit.channels, 1);
    assert_eq!(kit.buffer.channels(), 1);
    // Constant signal, nothing trimmed: marker + 8820 frames + marker
    assert_eq!(kit.buffer.frames(), 44 + 8820 + 44);
    // Averaged samples appear between the markers
    assert_eq!(kit.buffer.samples()[44], 8000);
}

#[test]
fn test_progress_reports_through_real_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<PathBuf> = (0..3)
        .map(|i| {
            let path = dir.path().join(format!("hit{}.wav", i));
            write_silent_leading_source(&path);
            path
        })
        .collect();

    let mut calls = Vec::new();
    let mut record = |current: usize, total: usize| calls.push((current, total));

    assemble(
        &WavCodec::new(),
        &SourceFile::list(&sources),
        &ProcessingConfig::default(),
        Some(&mut record),
    )
    .unwrap();

    assert_eq!(calls, vec![(0, 3), (1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_unwritable_output_is_export_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hit.wav");
    write_silent_leading_source(&source);

    let config = ProcessingConfig::default();
    let codec = WavCodec::new();
    let sources = vec![source];
    let kit = assemble(&codec, &SourceFile::list(&sources), &config, None).unwrap();

    let bad_path = dir.path().join("no_such_dir").join("kit.wav");
    let err = write_outputs(&codec, &kit, &bad_path, &config, &OtSettings::default()).unwrap_err();
    assert_eq!(err.error_code(), "EXPORT_ERROR");
}
