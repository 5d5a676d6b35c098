//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use log::info;

use crate::audio::buffer::channel_description;
use crate::audio::WavCodec;
use crate::cli::validate::validate_sources;
use crate::cli::MergeArgs;
use crate::config::ProcessingConfig;
use crate::error::{KitError, Result};
use crate::export::{write_outputs, LoopType, OtSettings, StretchMode};
use crate::kit::{assemble, SourceFile};

/// Merge source files into a sliced kit on disk.
pub fn merge(args: &MergeArgs) -> Result<()> {
    if let Err(failures) = validate_sources(&args.files) {
        for (path, msg) in &failures {
            eprintln!("  {}: {}", path, msg);
        }
        return Err(KitError::InvalidParameter {
            param: "files".to_string(),
            value: format!("{} invalid file(s)", failures.len()),
            expected: "readable WAV files".to_string(),
        });
    }

    let config = build_config(args)?;
    let ot_settings = build_ot_settings(args)?;

    info!(
        "merging {} files into {}",
        args.files.len(),
        args.output.display()
    );

    let codec = WavCodec::new();
    let files = SourceFile::list(&args.files);

    let mut report = |current: usize, total: usize| {
        if current < total {
            println!("Processing file {} of {}...", current + 1, total);
        }
    };
    let kit = assemble(&codec, &files, &config, Some(&mut report))?;

    println!("Exporting audio...");
    write_outputs(&codec, &kit, &args.output, &config, &ot_settings)?;

    println!("Files merged successfully!");
    println!(
        "  Output: {} ({})",
        args.output.display(),
        channel_description(kit.channels)
    );
    println!("  Cue points: {}", kit.cue_positions.len());
    println!("  Files merged: {}", files.len());

    Ok(())
}

/// Resolve the processing config: JSON file first, then flag overrides.
fn build_config(args: &MergeArgs) -> Result<ProcessingConfig> {
    let mut config = match &args.config {
        Some(path) => ProcessingConfig::from_json_file(path)?,
        None => ProcessingConfig::default(),
    };

    if let Some(marker_ms) = args.marker_ms {
        config.marker_duration_ms = marker_ms;
    }
    if let Some(threshold) = args.silence_threshold {
        config.silence_threshold_dbfs = threshold;
    }
    if let Some(min_silence_ms) = args.min_silence_ms {
        config.min_silence_len_ms = min_silence_ms;
    }
    if let Some(retained_ms) = args.retained_silence_ms {
        config.retained_silence_ms = retained_ms;
    }
    if args.force_mono {
        config.force_mono = true;
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }

    config.validate()?;
    Ok(config)
}

/// Resolve the .ot settings from their flags.
fn build_ot_settings(args: &MergeArgs) -> Result<OtSettings> {
    let mut settings = OtSettings::default();

    if let Some(tempo) = args.tempo {
        settings.tempo_bpm = tempo;
    }
    if let Some(gain) = args.gain {
        settings.gain_db = gain;
    }
    if let Some(raw) = args.loop_type {
        settings.loop_type = LoopType::from_raw(raw).ok_or_else(|| KitError::InvalidParameter {
            param: "loop_type".to_string(),
            value: raw.to_string(),
            expected: "0, 1 or 2".to_string(),
        })?;
    }
    if let Some(raw) = args.stretch {
        settings.stretch_mode =
            StretchMode::from_raw(raw).ok_or_else(|| KitError::InvalidParameter {
                param: "stretch".to_string(),
                value: raw.to_string(),
                expected: "0, 1 or 2".to_string(),
            })?;
    }
    if let Some(quantize) = args.quantize {
        settings.quantize = quantize;
    }

    Ok(settings)
}
