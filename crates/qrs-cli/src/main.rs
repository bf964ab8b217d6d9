use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use qrs_lib::{
    classify::{BeatClassifier, RandomClassifier},
    detectors::ecg::{
        detect_r_peaks, detect_r_peaks_ms, run_beat_pipeline, DetectorConfig,
    },
    io::{csv as csv_io, text as text_io},
    segment::extract_segments,
    signal::TimeSeries,
};
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "qrs",
    version,
    about = "QRS: ECG R-peak detection and beat segmentation tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect R-peaks from newline-delimited samples read from stdin or --input
    DetectRpeaks {
        #[arg(long, default_value_t = 250.0)]
        fs: f64,
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
        /// Sliding window size in samples
        #[arg(long, default_value_t = 500)]
        window_samples: usize,
        /// Sliding window size in milliseconds; overrides --window-samples
        #[arg(long)]
        window_ms: Option<f64>,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Read this column of a delimited file instead of plain text
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
    /// Extract fixed-length beat segments around known R-peak indices
    ExtractSegments {
        /// File of newline-delimited peak indices
        #[arg(long)]
        peaks: PathBuf,
        #[arg(long, default_value_t = 360)]
        segment_length: usize,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
    /// Classify beat segments around known R-peak indices (random stub model)
    Classify {
        #[arg(long)]
        peaks: PathBuf,
        #[arg(long, default_value_t = 360)]
        segment_length: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
    /// Run detection, segment extraction and classification in one shot
    BeatPipeline {
        #[arg(long, default_value_t = 250.0)]
        fs: f64,
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
        #[arg(long, default_value_t = 500)]
        window_samples: usize,
        #[arg(long)]
        window_ms: Option<f64>,
        #[arg(long, default_value_t = 360)]
        segment_length: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        csv_column: Option<String>,
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::DetectRpeaks {
            fs,
            threshold,
            window_samples,
            window_ms,
            input,
            csv_column,
            delimiter,
        } => cmd_detect_rpeaks(
            fs,
            threshold,
            window_samples,
            window_ms,
            input.as_deref(),
            csv_column.as_deref(),
            delimiter,
        )?,
        Commands::ExtractSegments {
            peaks,
            segment_length,
            input,
            csv_column,
            delimiter,
        } => cmd_extract_segments(
            &peaks,
            segment_length,
            input.as_deref(),
            csv_column.as_deref(),
            delimiter,
        )?,
        Commands::Classify {
            peaks,
            segment_length,
            seed,
            input,
            csv_column,
            delimiter,
        } => cmd_classify(
            &peaks,
            segment_length,
            seed,
            input.as_deref(),
            csv_column.as_deref(),
            delimiter,
        )?,
        Commands::BeatPipeline {
            fs,
            threshold,
            window_samples,
            window_ms,
            segment_length,
            seed,
            input,
            csv_column,
            delimiter,
        } => cmd_beat_pipeline(
            fs,
            threshold,
            window_samples,
            window_ms,
            segment_length,
            seed,
            input.as_deref(),
            csv_column.as_deref(),
            delimiter,
        )?,
    }
    Ok(())
}

fn read_signal(
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<Vec<f64>> {
    match (input, csv_column) {
        (Some(path), Some(column)) => {
            if !delimiter.is_ascii() {
                bail!("--delimiter must be a single ASCII character, got {:?}", delimiter);
            }
            csv_io::read_signal_column(path, column, delimiter as u8)
        }
        (Some(path), None) => text_io::read_samples(path),
        (None, Some(_)) => bail!("--csv-column requires --input"),
        (None, None) => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading samples from stdin")?;
            text_io::parse_samples(&buf)
        }
    }
}

fn load_time_series(
    fs: f64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<TimeSeries> {
    let data = read_signal(input, csv_column, delimiter)?;
    Ok(TimeSeries { fs, data })
}

fn cmd_detect_rpeaks(
    fs: f64,
    threshold: f64,
    window_samples: usize,
    window_ms: Option<f64>,
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<()> {
    let ts = load_time_series(fs, input, csv_column, delimiter)?;
    let events = match window_ms {
        Some(ms) => detect_r_peaks_ms(&ts, threshold, ms)?,
        None => detect_r_peaks(&ts, window_samples, threshold)?,
    };
    log::info!("detected {} R-peaks in {} samples", events.len(), ts.len());
    println!("{}", serde_json::to_string(&events)?);
    Ok(())
}

fn cmd_extract_segments(
    peaks: &Path,
    segment_length: usize,
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<()> {
    let signal = read_signal(input, csv_column, delimiter)?;
    let indices = text_io::read_peak_indices(peaks)?;
    let segments = extract_segments(&signal, &indices, segment_length)?;
    println!("{}", serde_json::to_string(&segments)?);
    Ok(())
}

fn cmd_classify(
    peaks: &Path,
    segment_length: usize,
    seed: u64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<()> {
    let signal = read_signal(input, csv_column, delimiter)?;
    let indices = text_io::read_peak_indices(peaks)?;
    let segments = extract_segments(&signal, &indices, segment_length)?;
    let classifier = RandomClassifier::new(seed);
    let classifications = classifier.classify(&segments)?;
    println!("{}", serde_json::to_string(&classifications)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_beat_pipeline(
    fs: f64,
    threshold: f64,
    window_samples: usize,
    window_ms: Option<f64>,
    segment_length: usize,
    seed: u64,
    input: Option<&Path>,
    csv_column: Option<&str>,
    delimiter: char,
) -> Result<()> {
    let ts = load_time_series(fs, input, csv_column, delimiter)?;
    let chunk_samples = match window_ms {
        Some(ms) => ((ms / 1000.0 * fs).round() as usize).max(1),
        None => window_samples,
    };
    let cfg = DetectorConfig {
        chunk_samples,
        threshold,
        ..DetectorConfig::default()
    };
    let classifier = RandomClassifier::new(seed);
    let result = run_beat_pipeline(&ts, &cfg, segment_length, &classifier)?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
