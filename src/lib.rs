//! slicekit - Sliced Sample-Kit Assembler
//!
//! slicekit merges a list of WAV recordings into one multi-segment sample
//! ("kit") that hardware samplers can slice back into the original
//! recordings:
//! 1. Each source is trimmed of silence and appended to a merged stream,
//!    separated by short silent markers.
//! 2. Frame-accurate cue positions are recorded at every segment boundary.
//! 3. The cue positions are persisted as a RIFF `cue ` chunk in the WAV
//!    (Dirtywave M8) and/or a sibling `.ot` metadata file (Elektron
//!    Octatrack).
//!
//! # Architecture
//!
//! - `audio`: PCM buffers, the WAV codec boundary, silence trimming
//! - `kit`: the assembly pipeline producing buffer + cue positions
//! - `export`: cue chunk and `.ot` serializers, output orchestration
//! - `cli`: command-line front-end and source validation

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod kit;

pub use audio::{AudioCodec, PcmBuffer, WavCodec};
pub use config::{OutputFormat, ProcessingConfig};
pub use error::{KitError, Result};
pub use export::{write_outputs, OtSettings, OtWriter, Slice};
pub use kit::{assemble, CuePosition, Kit, SourceFile};
