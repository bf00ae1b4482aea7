//! cs1 command-line tool
//!
//! Checks and converts PPM images and appends to files under the course
//! byte limit.

use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use cs1_support::ppm;
use cs1_support::quota::{open_limited, QuotaConfig};
use cs1_support::{logging, Cs1Config};

/// Course support tools
#[derive(Parser)]
#[command(name = "cs1")]
#[command(about = "Check PPM images and write files under the course byte limit")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to <config dir>/cs1/config.toml)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strictly validate a PPM file
    Check {
        /// PPM file to check
        file: PathBuf,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },

    /// Convert a PPM file to PNG
    Convert {
        /// Input PPM file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,

        /// Validate before decoding
        #[arg(long)]
        strict: bool,
    },

    /// Append stdin to a file without exceeding the byte limit
    Append {
        /// File to append to (created if missing)
        file: PathBuf,

        /// Byte limit including existing content (0 disables)
        #[arg(long, value_name = "BYTES")]
        limit: Option<i64>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    file: String,
    valid: bool,
    width: Option<u32>,
    height: Option<u32>,
    error_kind: Option<&'static str>,
    error: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let config_path = cli.config.clone().or_else(default_config_path);
    debug!(path = ?config_path, "loading configuration");
    let config =
        Cs1Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Check { file, json } => check(&file, json),
        Commands::Convert {
            input,
            output,
            strict,
        } => convert(&input, &output, strict),
        Commands::Append { file, limit } => {
            let quota = limit.map(QuotaConfig::new).unwrap_or(config.quota);
            append(&file, &quota)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cs1").join("config.toml"))
}

fn check(file: &Path, json: bool) -> Result<()> {
    let result = ppm::validate_file(file);
    let report = match &result {
        Ok(header) => CheckReport {
            file: file.display().to_string(),
            valid: true,
            width: Some(header.width),
            height: Some(header.height),
            error_kind: None,
            error: None,
        },
        Err(err) => CheckReport {
            file: file.display().to_string(),
            valid: false,
            width: None,
            height: None,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &result {
            Ok(header) => println!(
                "{} {} ({}x{})",
                "OK".green().bold(),
                report.file,
                header.width,
                header.height
            ),
            Err(err) => eprintln!("{} {}: {}", "INVALID".red().bold(), report.file, err),
        }
    }

    if !report.valid {
        process::exit(1);
    }
    Ok(())
}

fn convert(input: &Path, output: &Path, strict: bool) -> Result<()> {
    let grid = if strict {
        ppm::read_ppm_strict(input)
    } else {
        ppm::read_ppm(input)
    }
    .with_context(|| format!("Failed to decode {}", input.display()))?;

    ppm::save_png(&grid, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} -> {} ({}x{})",
        "Converted".green(),
        input.display(),
        output.display(),
        grid.width(),
        grid.height()
    );
    Ok(())
}

fn append(file: &Path, quota: &QuotaConfig) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin as text")?;

    let mut options = OpenOptions::new();
    options.append(true).create(true);
    let mut writer = open_limited(file, &options, quota)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    writer
        .write_str(&input)
        .with_context(|| format!("Failed to append to {}", file.display()))?;
    let total = writer.bytes_written();
    writer.close()?;

    if quota.is_enabled() {
        println!(
            "Wrote {} bytes to {} ({} of {} bytes used)",
            input.len(),
            file.display(),
            total,
            quota.byte_limit
        );
    } else {
        println!("Wrote {} bytes to {}", input.len(), file.display());
    }
    Ok(())
}
