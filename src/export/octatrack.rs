//! Octatrack `.ot` metadata writer
//!
//! Serializes slice metadata for the Elektron Octatrack into its fixed
//! 832-byte sidecar format, as reverse-engineered by the OctaChainer
//! project. Multi-byte fields are big-endian.
//!
//! ```text
//! 0x000  16  header magic "FORM\0\0\x03,DPS1SMPA"
//! 0x010   4  tempo             round(bpm * 6)
//! 0x014   4  trim length       round(bars * 384)
//! 0x018   4  loop length       mirrors trim length
//! 0x01C   4  stretch mode      0=off 1=normal 2=beat
//! 0x020   4  loop type         0=off 1=on 2=ping-pong
//! 0x024   2  gain              gain_db + 48
//! 0x026   1  quantize
//! 0x028   4  trim start        always 0
//! 0x02C   4  trim end          total frames
//! 0x030   4  loop point        always 0
//! 0x034   4  slice count       N, at most 64
//! 0x038  12N slice table       start, end, loop (0xFFFFFFFF = no loop)
//! 0x33E   2  checksum          sum of bytes [0x10, 0x33E) mod 65536
//! ```

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{KitError, Result};
use crate::kit::CuePosition;

/// Size of every `.ot` file in bytes
pub const OT_FILE_SIZE: usize = 832;

/// Hard format limit on the slice table
pub const MAX_SLICES: usize = 64;

const HEADER_MAGIC: [u8; 16] = *b"FORM\x00\x00\x03,DPS1SMPA";
const SLICE_TABLE_OFFSET: usize = 0x38;
const CHECKSUM_OFFSET: usize = 0x33E;
const NO_LOOP: u32 = 0xFFFF_FFFF;

/// Loop playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum LoopType {
    #[default]
    Off = 0,
    On = 1,
    PingPong = 2,
}

/// Time-stretch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum StretchMode {
    #[default]
    Off = 0,
    Normal = 1,
    Beat = 2,
}

impl LoopType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(LoopType::Off),
            1 => Some(LoopType::On),
            2 => Some(LoopType::PingPong),
            _ => None,
        }
    }
}

impl StretchMode {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(StretchMode::Off),
            1 => Some(StretchMode::Normal),
            2 => Some(StretchMode::Beat),
            _ => None,
        }
    }
}

/// Sample-level playback settings stored in the `.ot` file
#[derive(Debug, Clone, Copy)]
pub struct OtSettings {
    /// Tempo in BPM
    pub tempo_bpm: f64,
    /// Gain in dB, -24 to +24
    pub gain_db: i16,
    pub loop_type: LoopType,
    pub stretch_mode: StretchMode,
    /// Trigger quantization
    pub quantize: u8,
}

impl Default for OtSettings {
    fn default() -> Self {
        Self {
            tempo_bpm: 120.0,
            gain_db: 0,
            loop_type: LoopType::Off,
            stretch_mode: StretchMode::Off,
            quantize: 0,
        }
    }
}

/// One slice in the table
///
/// Frame offsets are relative to the start of the sample; `loop_frame` is
/// `None` for a non-looping slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start_frame: u32,
    pub end_frame: u32,
    pub loop_frame: Option<u32>,
}

/// Derive the slice table from consecutive cue positions
///
/// Slice *i* spans `[cue[i], cue[i+1])`, so K+1 cue points yield K
/// slices. Slices default to non-looping.
pub fn slices_from_cues(cues: &[CuePosition]) -> Result<Vec<Slice>> {
    cues.windows(2)
        .map(|pair| {
            let start_frame = u32::try_from(pair[0].frame_offset);
            let end_frame = u32::try_from(pair[1].frame_offset);
            match (start_frame, end_frame) {
                (Ok(start_frame), Ok(end_frame)) => Ok(Slice {
                    start_frame,
                    end_frame,
                    loop_frame: None,
                }),
                _ => Err(KitError::InvalidAudio {
                    reason: format!(
                        "cue {} exceeds the 32-bit frame range",
                        pair[1].id
                    ),
                }),
            }
        })
        .collect()
}

/// Builder for one `.ot` file
#[derive(Debug)]
pub struct OtWriter {
    sample_rate: u32,
    total_frames: u32,
    settings: OtSettings,
    slices: Vec<Slice>,
}

impl OtWriter {
    pub fn new(sample_rate: u32, total_frames: u32, settings: OtSettings) -> Self {
        Self {
            sample_rate,
            total_frames,
            settings,
            slices: Vec::new(),
        }
    }

    /// Number of slices added so far
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Add one slice to the table
    ///
    /// Fails with `TooManySlices` when the table is full; the writer's
    /// existing slices are left untouched.
    pub fn add_slice(&mut self, slice: Slice) -> Result<()> {
        if self.slices.len() >= MAX_SLICES {
            return Err(KitError::TooManySlices {
                count: self.slices.len() + 1,
            });
        }
        self.slices.push(slice);
        Ok(())
    }

    /// Add every slice from an iterator, stopping at the first failure
    pub fn add_slices(&mut self, slices: impl IntoIterator<Item = Slice>) -> Result<()> {
        for slice in slices {
            self.add_slice(slice)?;
        }
        Ok(())
    }

    /// Serialize the complete 832-byte file image
    pub fn render(&self) -> Result<Vec<u8>> {
        if !(-24..=24).contains(&self.settings.gain_db) {
            return Err(KitError::InvalidParameter {
                param: "gain_db".to_string(),
                value: self.settings.gain_db.to_string(),
                expected: "-24 to +24 dB".to_string(),
            });
        }

        let mut data = vec![0u8; OT_FILE_SIZE];
        data[0..16].copy_from_slice(&HEADER_MAGIC);

        let tempo = (self.settings.tempo_bpm * 6.0).round() as u32;
        let bars = self.bars_length();
        let trim_length = (bars * 384.0).round() as u32;

        put_u32(&mut data, 0x10, tempo);
        put_u32(&mut data, 0x14, trim_length);
        put_u32(&mut data, 0x18, trim_length);
        put_u32(&mut data, 0x1C, self.settings.stretch_mode as u32);
        put_u32(&mut data, 0x20, self.settings.loop_type as u32);
        put_u16(&mut data, 0x24, (self.settings.gain_db + 48) as u16);
        data[0x26] = self.settings.quantize;
        put_u32(&mut data, 0x28, 0); // trim start
        put_u32(&mut data, 0x2C, self.total_frames);
        put_u32(&mut data, 0x30, 0); // loop point
        put_u32(&mut data, 0x34, self.slices.len() as u32);

        for (i, slice) in self.slices.iter().enumerate() {
            let offset = SLICE_TABLE_OFFSET + i * 12;
            put_u32(&mut data, offset, slice.start_frame);
            put_u32(&mut data, offset + 4, slice.end_frame);
            put_u32(&mut data, offset + 8, slice.loop_frame.unwrap_or(NO_LOOP));
        }

        let checksum = checksum_of(&data);
        put_u16(&mut data, CHECKSUM_OFFSET, checksum);

        Ok(data)
    }

    /// Write the `.ot` file to disk
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = self.render()?;
        fs::write(path, &data).map_err(|e| KitError::Octatrack {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!(
            ".ot file written: {} ({} slices, {} BPM)",
            path.display(),
            self.slices.len(),
            self.settings.tempo_bpm
        );
        Ok(())
    }

    /// Sample length in bars at the configured tempo
    ///
    /// Rounded to the nearest 0.25 bars, floored at 0.25. An empty sample
    /// falls back to one bar.
    fn bars_length(&self) -> f64 {
        if self.total_frames == 0 || self.sample_rate == 0 {
            return 1.0;
        }
        let duration_secs = self.total_frames as f64 / self.sample_rate as f64;
        let beats = duration_secs * (self.settings.tempo_bpm / 60.0);
        let bars = beats / 4.0;
        ((bars * 4.0).round() / 4.0).max(0.25)
    }
}

/// Checksum over everything after the header and before the checksum field
fn checksum_of(data: &[u8]) -> u16 {
    let sum: u64 = data[0x10..CHECKSUM_OFFSET].iter().map(|&b| b as u64).sum();
    (sum & 0xFFFF) as u16
}

#[inline]
fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

#[inline]
fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
