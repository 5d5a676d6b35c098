//! Silence trimming
//!
//! Splits a buffer on runs of silence and rejoins the non-silent chunks
//! with a short retained-silence pad. Detection works on 1 ms analysis
//! blocks: a block is silent when its RMS level, in dBFS against the
//! buffer's integer full scale, is at or below the threshold, and a run of
//! at least `min_silence_len_ms` consecutive silent blocks separates two
//! chunks.
//!
//! All ms-to-frame conversions use the buffer's own sample rate and
//! channel count, which vary per source file.

use crate::audio::buffer::{rms_dbfs_of, PcmBuffer};
use crate::error::Result;

/// Split a buffer into non-silent chunks
///
/// If no silence run meets the threshold and minimum length, the original
/// buffer is returned as a single chunk. This also covers buffers that are
/// silent from start to end: nothing non-silent remains to split on, so
/// the buffer passes through unchanged.
pub fn split_on_silence(
    buffer: &PcmBuffer,
    threshold_dbfs: f32,
    min_silence_len_ms: u32,
) -> Vec<PcmBuffer> {
    let block_frames = (buffer.sample_rate() / 1000) as usize;
    if buffer.is_empty() || block_frames == 0 {
        return vec![buffer.clone()];
    }

    let num_blocks = buffer.frames() / block_frames;
    let ch = buffer.channels() as usize;
    let full_scale = buffer.full_scale();
    let samples = buffer.samples();

    // One flag per 1 ms block
    let silent: Vec<bool> = (0..num_blocks)
        .map(|b| {
            let start = b * block_frames * ch;
            let end = start + block_frames * ch;
            rms_dbfs_of(&samples[start..end], full_scale) <= threshold_dbfs as f64
        })
        .collect();

    // Qualifying silence runs, as frame ranges. A run reaching the last
    // block absorbs the trailing sub-ms remainder.
    let min_run = min_silence_len_ms as usize;
    let mut silence_ranges: Vec<(usize, usize)> = Vec::new();
    let mut run_start: Option<usize> = None;
    for b in 0..=num_blocks {
        let is_silent = b < num_blocks && silent[b];
        match (run_start, is_silent) {
            (None, true) => run_start = Some(b),
            (Some(start), false) => {
                if b - start >= min_run {
                    let end_frame = if b == num_blocks {
                        buffer.frames()
                    } else {
                        b * block_frames
                    };
                    silence_ranges.push((start * block_frames, end_frame));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if silence_ranges.is_empty() {
        return vec![buffer.clone()];
    }

    // Invert to non-silent chunks; the final chunk runs to the true end of
    // the buffer, including any unclassified remainder frames.
    let mut chunks = Vec::new();
    let mut cursor = 0;
    for &(start, end) in &silence_ranges {
        if start > cursor {
            chunks.push(buffer.frame_range(cursor, start));
        }
        cursor = end;
    }
    if cursor < buffer.frames() {
        chunks.push(buffer.frame_range(cursor, buffer.frames()));
    }

    if chunks.is_empty() {
        // Entirely silent: keep the source audio as-is
        return vec![buffer.clone()];
    }

    chunks
}

/// Rejoin chunks, inserting `pad` between consecutive chunks
///
/// Concatenates `chunk + pad` for every chunk, then removes the one
/// trailing pad. An empty chunk list yields an empty buffer with the
/// pad's stream parameters.
pub fn rejoin(chunks: &[PcmBuffer], pad: &PcmBuffer) -> Result<PcmBuffer> {
    let mut out = match chunks.first() {
        Some(first) => PcmBuffer::new(
            first.channels(),
            first.sample_rate(),
            first.bits_per_sample(),
        ),
        None => {
            return Ok(PcmBuffer::new(
                pad.channels(),
                pad.sample_rate(),
                pad.bits_per_sample(),
            ))
        }
    };

    for chunk in chunks {
        out.append(chunk)?;
        out.append(pad)?;
    }
    out.truncate_frames(out.frames() - pad.frames());
    Ok(out)
}

/// Trim silence from a buffer and rejoin the remaining chunks
pub fn trim_silence(
    buffer: &PcmBuffer,
    threshold_dbfs: f32,
    min_silence_len_ms: u32,
    pad: &PcmBuffer,
) -> Result<PcmBuffer> {
    let chunks = split_on_silence(buffer, threshold_dbfs, min_silence_len_ms);
    rejoin(&chunks, pad)
}
