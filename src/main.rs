//! MotionLogger to Condor CLI
//!
//! Condenses MotionLogger actigraphy exports into fixed-epoch Condor
//! reports. This binary is only the boundary: it supplies a file path and
//! an epoch duration to the conversion core and displays the outcome.

use clap::{Parser, Subcommand};
use motionlog_condor::{
    config::Config,
    core::OutputMode,
    document::split_document,
    pipeline::{convert_bytes, ConvertOptions},
    VERSION,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "motionlog-condor")]
#[command(version = VERSION)]
#[command(about = "Condense MotionLogger exports into fixed-epoch Condor reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export into a fixed-epoch Condor report
    Convert {
        /// MotionLogger/Condor TXT export to convert
        file: PathBuf,

        /// Epoch duration in seconds to condense the file to
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        epoch: Option<u32>,

        /// Output mode: reconstruct (canonical header) or preserve
        #[arg(long, short)]
        mode: Option<String>,

        /// Output path (defaults to <name>_Condor_<epoch>s.<ext> next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also write the conversion report as JSON next to the output
        #[arg(long)]
        report: bool,
    },

    /// Show the structure of an export without converting it
    Inspect {
        /// Export file to inspect
        file: PathBuf,

        /// Print the inspection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            file,
            epoch,
            mode,
            output,
            report,
        } => {
            cmd_convert(&file, epoch, mode.as_deref(), output, report);
        }
        Commands::Inspect { file, json } => {
            cmd_inspect(&file, json);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_convert(
    file: &Path,
    epoch: Option<u32>,
    mode: Option<&str>,
    output: Option<PathBuf>,
    write_report: bool,
) {
    let config = Config::load().unwrap_or_default();

    let epoch_seconds = epoch.unwrap_or(config.default_epoch_seconds);
    if epoch_seconds == 0 {
        eprintln!("Error: epoch duration must be a positive number of seconds");
        std::process::exit(1);
    }

    let mode = match mode {
        Some(name) => match OutputMode::from_name(name) {
            Some(mode) => mode,
            None => {
                eprintln!("Error: unknown mode '{name}' (expected 'reconstruct' or 'preserve')");
                std::process::exit(1);
            }
        },
        None => config.default_mode,
    };

    let bytes = match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", file.display());
            std::process::exit(1);
        }
    };

    let subject = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    let options = ConvertOptions::new(epoch_seconds, mode, subject);

    let conversion = match convert_bytes(&bytes, &options) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let out_path = output.unwrap_or_else(|| build_output_path(file, epoch_seconds));
    if let Err(e) = std::fs::write(&out_path, &conversion.output) {
        eprintln!("Error writing {}: {e}", out_path.display());
        std::process::exit(1);
    }

    println!("Saved Condor file: {}", out_path.display());
    println!();
    println!("{}", conversion.report.summary());

    if write_report {
        let report_path = out_path.with_extension("report.json");
        match serde_json::to_string_pretty(&conversion.report) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&report_path, json) {
                    eprintln!("Warning: could not write report: {e}");
                } else {
                    println!();
                    println!("Report written to {}", report_path.display());
                }
            }
            Err(e) => {
                eprintln!("Warning: could not serialize report: {e}");
            }
        }
    }
}

fn cmd_inspect(file: &Path, as_json: bool) {
    let bytes = match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", file.display());
            std::process::exit(1);
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();

    let document = match split_document(&lines) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let (series, stats) =
        match motionlog_condor::load_series(&document.header, &document.data_lines) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        };

    let first = series.samples.first().map(|s| s.timestamp);
    let last = series.samples.last().map(|s| s.timestamp);

    if as_json {
        let inspection = serde_json::json!({
            "file": file.display().to_string(),
            "preamble_lines": document.preamble.len(),
            "columns": document.header,
            "rows_read": stats.rows_read,
            "rows_dropped": stats.rows_dropped,
            "short_rows": stats.short_rows,
            "samples": series.samples.len(),
            "first_sample": first.map(motionlog_condor::core::format_timestamp),
            "last_sample": last.map(motionlog_condor::core::format_timestamp),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&inspection).unwrap_or_else(|_| "{}".to_string())
        );
        return;
    }

    println!("Export structure: {}", file.display());
    println!("==================");
    println!();
    println!("Preamble lines: {}", document.preamble.len());
    println!("Columns: {}", document.header.join(", "));
    println!(
        "Data rows: {} ({} dropped, {} short)",
        stats.rows_read, stats.rows_dropped, stats.short_rows
    );
    match (first, last) {
        (Some(first), Some(last)) => {
            println!(
                "Sample span: {} to {}",
                motionlog_condor::core::format_timestamp(first),
                motionlog_condor::core::format_timestamp(last)
            );
        }
        _ => println!("Sample span: no valid samples"),
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", Config::config_path().display());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Derive the conventional output path: `file.txt -> file_Condor_60s.txt`.
fn build_output_path(input: &Path, epoch_seconds: u32) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_Condor_{epoch_seconds}s{suffix}"))
}
