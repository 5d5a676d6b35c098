//! Kit assembly
//!
//! Orchestrates the merge of an ordered list of source files into one
//! multi-segment buffer: per-file loading, channel normalization, silence
//! trimming, marker insertion and frame-position bookkeeping. The result
//! is a [`Kit`] holding the merged buffer and the cue positions the
//! export writers consume.
//!
//! Assembly is single-threaded and synchronous. It holds no shared state,
//! so callers may run it on a worker thread and observe progress through
//! the callback alone. Once started, a run continues until it completes
//! or fails; there is no mid-run cancellation.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::audio::buffer::channel_description;
use crate::audio::codec::AudioCodec;
use crate::audio::silence::trim_silence;
use crate::audio::PcmBuffer;
use crate::config::ProcessingConfig;
use crate::error::{KitError, Result};

/// One entry in the ordered source list
///
/// Order is significant: it is the playback/slice order in the output.
/// Callers reorder the list before assembly, never during.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub index: usize,
}

impl SourceFile {
    /// Build an ordered source list from paths, assigning indices
    pub fn list(paths: &[PathBuf]) -> Vec<SourceFile> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| SourceFile {
                path: path.clone(),
                index,
            })
            .collect()
    }
}

/// A cue point in the merged stream
///
/// `frame_offset` counts frames, not samples: stereo and mono streams use
/// the same addressing unit (`sample_offset / channel_count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePosition {
    /// 1-based sequence number
    pub id: u32,
    /// Offset in frames from the start of the merged stream
    pub frame_offset: u64,
}

/// Result of one assembly run
///
/// Transient: built fresh per run, discarded after export.
#[derive(Debug)]
pub struct Kit {
    /// The merged audio
    pub buffer: PcmBuffer,
    /// Cue positions in ascending id order; one more entry than there
    /// were source files
    pub cue_positions: Vec<CuePosition>,
    /// Channel count of the merged stream
    pub channels: u16,
}

/// Progress notification hook: `(files_done, total_files)`
///
/// Invoked synchronously before each file and once more at completion
/// with `current == total`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

/// Assemble a kit from the given source files
///
/// The first file fixes the target channel count (1 when `force_mono`,
/// its own channel count otherwise) and the marker/pad buffers, which are
/// built at that file's sample rate and reused for the whole run. Every
/// subsequent file must match the first file's sample rate and bit depth;
/// mismatches are rejected rather than silently resampled.
///
/// The merged stream starts with one marker, and one marker follows each
/// file's trimmed audio, including the last.
///
/// # Errors
/// * `Load` - a source file cannot be decoded, or its bit depth differs
///   from the first file's
/// * `SampleRateMismatch` - a file's sample rate differs from the first
///   file's
/// * `UnsupportedFormat` - a channel conversion is not representable
pub fn assemble(
    codec: &dyn AudioCodec,
    files: &[SourceFile],
    config: &ProcessingConfig,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<Kit> {
    config.validate()?;
    if files.is_empty() {
        return Err(KitError::InvalidParameter {
            param: "files".to_string(),
            value: "empty list".to_string(),
            expected: "at least one source file".to_string(),
        });
    }

    let total = files.len();
    info!("assembling kit from {} source files", total);

    let mut merged: Option<PcmBuffer> = None;
    let mut marker: Option<PcmBuffer> = None;
    let mut pad: Option<PcmBuffer> = None;
    let mut target_channels = 0u16;
    let mut cue_positions: Vec<CuePosition> = Vec::with_capacity(total + 1);

    for file in files {
        if let Some(cb) = progress.as_mut() {
            cb(file.index, total);
        }

        let audio = codec.load(&file.path)?;

        if let Some(first) = merged.as_ref() {
            check_stream_compat(&file.path, &audio, first)?;
        } else {
            // First file fixes the stream parameters for the whole run
            target_channels = if config.force_mono {
                1
            } else {
                audio.channels()
            };
            let m = PcmBuffer::silent(
                config.marker_duration_ms,
                target_channels,
                audio.sample_rate(),
                audio.bits_per_sample(),
            );
            let p = PcmBuffer::silent(
                config.retained_silence_ms,
                target_channels,
                audio.sample_rate(),
                audio.bits_per_sample(),
            );

            let mut out = PcmBuffer::new(
                target_channels,
                audio.sample_rate(),
                audio.bits_per_sample(),
            );
            out.append(&m)?;
            cue_positions.push(CuePosition {
                id: 1,
                frame_offset: m.frames() as u64,
            });

            debug!(
                "target stream: {}, {} Hz, {} bit; marker {} frames",
                channel_description(target_channels),
                audio.sample_rate(),
                audio.bits_per_sample(),
                m.frames()
            );

            merged = Some(out);
            marker = Some(m);
            pad = Some(p);
        }

        let merged = merged.as_mut().expect("initialized on first file");
        let marker = marker.as_ref().expect("initialized on first file");
        let pad = pad.as_ref().expect("initialized on first file");

        let audio = if audio.channels() != target_channels {
            audio.into_channels(target_channels)?
        } else {
            audio
        };

        let processed = trim_silence(
            &audio,
            config.silence_threshold_dbfs,
            config.min_silence_len_ms,
            pad,
        )?;
        debug!(
            "{}: {} frames after trimming",
            file.path.display(),
            processed.frames()
        );

        merged.append(&processed)?;
        cue_positions.push(CuePosition {
            id: cue_positions.len() as u32 + 1,
            frame_offset: (merged.total_samples() / target_channels as usize) as u64,
        });
        merged.append(marker)?;
    }

    if let Some(cb) = progress.as_mut() {
        cb(total, total);
    }

    let buffer = merged.expect("at least one file was processed");
    info!(
        "kit assembled: {} frames, {} cue points, {}",
        buffer.frames(),
        cue_positions.len(),
        channel_description(target_channels)
    );

    Ok(Kit {
        buffer,
        cue_positions,
        channels: target_channels,
    })
}

/// Reject files that cannot be appended onto the run's merged stream
fn check_stream_compat(path: &Path, audio: &PcmBuffer, first: &PcmBuffer) -> Result<()> {
    if audio.sample_rate() != first.sample_rate() {
        return Err(KitError::SampleRateMismatch {
            path: path.display().to_string(),
            expected: first.sample_rate(),
            actual: audio.sample_rate(),
        });
    }
    if audio.bits_per_sample() != first.bits_per_sample() {
        return Err(KitError::Load {
            path: path.display().to_string(),
            reason: format!(
                "bit depth {} does not match first file ({})",
                audio.bits_per_sample(),
                first.bits_per_sample()
            ),
        });
    }
    Ok(())
}
