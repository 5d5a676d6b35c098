//! CLI Module
//!
//! Command-line interface for the slicekit kit assembler.

pub mod commands;
pub mod validate;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::OutputFormat;

/// slicekit - sliced sample-kit assembler for hardware samplers
#[derive(Parser, Debug)]
#[command(name = "slicekit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge WAV files into a sliced kit
    #[command(name = "merge")]
    Merge(MergeArgs),
}

/// CLI spelling of the metadata format selection
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    M8,
    Octatrack,
    Both,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::M8 => OutputFormat::M8,
            FormatArg::Octatrack => OutputFormat::Octatrack,
            FormatArg::Both => OutputFormat::Both,
        }
    }
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Source WAV files, in playback order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Path for the merged WAV output
    #[arg(short, long)]
    pub output: PathBuf,

    /// Slice metadata format to emit
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Load processing parameters from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Convert all audio to mono
    #[arg(long)]
    pub force_mono: bool,

    /// Marker duration between samples (ms)
    #[arg(long)]
    pub marker_ms: Option<u32>,

    /// Silence detection threshold (dBFS)
    #[arg(long, allow_negative_numbers = true)]
    pub silence_threshold: Option<f32>,

    /// Minimum silence duration to trim (ms)
    #[arg(long)]
    pub min_silence_ms: Option<u32>,

    /// Silence retained between trimmed chunks (ms)
    #[arg(long)]
    pub retained_silence_ms: Option<u32>,

    /// Tempo stored in the .ot file (BPM)
    #[arg(long)]
    pub tempo: Option<f64>,

    /// Gain stored in the .ot file (dB, -24 to +24)
    #[arg(long, allow_negative_numbers = true)]
    pub gain: Option<i16>,

    /// .ot loop type: 0=off, 1=on, 2=ping-pong
    #[arg(long)]
    pub loop_type: Option<u32>,

    /// .ot time-stretch mode: 0=off, 1=normal, 2=beat
    #[arg(long)]
    pub stretch: Option<u32>,

    /// .ot trigger quantization
    #[arg(long)]
    pub quantize: Option<u8>,
}
