//! RIFF `cue ` chunk writer
//!
//! Appends a standard cue-point chunk to an already exported WAV file so
//! hardware samplers can address each segment of the merged kit. The file
//! is read back whole, the chunk is appended after the existing content,
//! and the RIFF master size is patched to cover it.
//!
//! Chunk layout (all fields little-endian):
//!
//! ```text
//! "cue "              4 bytes ASCII tag
//! chunk_size          u32 = 4 + 24 * N
//! num_cue_points      u32 = N
//! per cue point, ascending id order:
//!   cue_id            u32 (1-based)
//!   position          u32 = frame offset
//!   data_chunk_id     4 bytes ASCII "data"
//!   chunk_start       u32 = 0
//!   block_start       u32 = 0
//!   sample_offset     u32 = frame offset (duplicate of position)
//! ```

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{KitError, Result};
use crate::kit::CuePosition;

/// Bytes per serialized cue point
const CUE_POINT_SIZE: usize = 24;

fn export_err(path: &Path, stage: &str, reason: impl ToString) -> KitError {
    KitError::Export {
        path: path.display().to_string(),
        stage: stage.to_string(),
        reason: reason.to_string(),
    }
}

/// Append a `cue ` chunk to an existing WAV file
///
/// The file at `path` must already be a complete RIFF/WAVE file; its
/// `fmt ` and `data` content is preserved unchanged.
pub fn append_cue_chunk(path: &Path, cues: &[CuePosition]) -> Result<()> {
    let mut bytes = fs::read(path).map_err(|e| export_err(path, "cue chunk read", e))?;

    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(export_err(
            path,
            "cue chunk read",
            "not a RIFF/WAVE file",
        ));
    }

    let chunk = build_cue_chunk(path, cues)?;
    bytes.extend_from_slice(&chunk);

    let riff_size = u32::try_from(bytes.len() - 8)
        .map_err(|_| export_err(path, "cue chunk write", "file exceeds RIFF size limit"))?;
    bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());

    fs::write(path, &bytes).map_err(|e| export_err(path, "cue chunk write", e))?;

    info!("added {} cue points to {}", cues.len(), path.display());
    Ok(())
}

/// Serialize the cue chunk bytes
fn build_cue_chunk(path: &Path, cues: &[CuePosition]) -> Result<Vec<u8>> {
    let count = u32::try_from(cues.len())
        .map_err(|_| export_err(path, "cue chunk write", "too many cue points"))?;

    let body_size = 4 + CUE_POINT_SIZE * cues.len();
    let mut chunk = Vec::with_capacity(8 + body_size);
    chunk.extend_from_slice(b"cue ");
    chunk.extend_from_slice(&(body_size as u32).to_le_bytes());
    chunk.extend_from_slice(&count.to_le_bytes());

    for cue in cues {
        let position = u32::try_from(cue.frame_offset).map_err(|_| {
            export_err(
                path,
                "cue chunk write",
                format!("cue {} exceeds the 32-bit frame range", cue.id),
            )
        })?;
        chunk.extend_from_slice(&cue.id.to_le_bytes());
        chunk.extend_from_slice(&position.to_le_bytes());
        chunk.extend_from_slice(b"data");
        chunk.extend_from_slice(&0u32.to_le_bytes());
        chunk.extend_from_slice(&0u32.to_le_bytes());
        chunk.extend_from_slice(&position.to_le_bytes());
    }

    Ok(chunk)
}

/// Read the cue points back out of a WAV file
///
/// Walks the RIFF chunk list and parses the first `cue ` chunk found.
pub fn read_cue_chunk(path: &Path) -> Result<Vec<CuePosition>> {
    let bytes = fs::read(path).map_err(|e| export_err(path, "cue chunk read", e))?;

    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(export_err(path, "cue chunk read", "not a RIFF/WAVE file"));
    }

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let tag = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let body = pos + 8;

        if tag == b"cue " {
            if body + size > bytes.len() || size < 4 {
                return Err(export_err(path, "cue chunk read", "truncated cue chunk"));
            }
            let count =
                u32::from_le_bytes(bytes[body..body + 4].try_into().unwrap()) as usize;
            if size < 4 + count * CUE_POINT_SIZE {
                return Err(export_err(path, "cue chunk read", "truncated cue chunk"));
            }

            let mut cues = Vec::with_capacity(count);
            for i in 0..count {
                let entry = body + 4 + i * CUE_POINT_SIZE;
                let id = u32::from_le_bytes(bytes[entry..entry + 4].try_into().unwrap());
                let position =
                    u32::from_le_bytes(bytes[entry + 4..entry + 8].try_into().unwrap());
                cues.push(CuePosition {
                    id,
                    frame_offset: position as u64,
                });
            }
            return Ok(cues);
        }

        // Chunks are word-aligned; odd sizes carry one padding byte
        pos = body + size + (size & 1);
    }

    Err(export_err(path, "cue chunk read", "no cue chunk found"))
}
