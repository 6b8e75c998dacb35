// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Papermill — plain text to PDF/DOCX/CSV, and size-targeted JPEG re-encoding.
//
// Entry point. Initialises logging, resolves configuration, and runs one
// conversion or resize per invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use papermill_core::error::Result;
use papermill_core::human_errors::{Severity, humanize_error};
use papermill_core::{ConvertConfig, OutputFormat, SizeConstraint};
use papermill_document::{JpegCodec, TextConverter, encode_to_size, resolve_text};

#[derive(Debug, Parser)]
#[command(name = "papermill", version)]
#[command(about = "Convert plain text to PDF, DOCX or CSV, and shrink images to a size budget")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out text and write it as a document
    Convert {
        /// Text file to convert; takes precedence over --paste
        input: Option<PathBuf>,

        /// Text to convert when no file is given
        #[arg(long)]
        paste: Option<String>,

        /// pdf, docx or csv (defaults to the configured format)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output path (defaults to converted.<ext>)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// TrueType font to measure and embed
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Re-encode an image as JPEG under a size budget
    Resize {
        /// Image file (any format the decoder understands)
        input: PathBuf,

        /// Target size in kilobytes, clamped to 20-100
        #[arg(long)]
        target_kb: Option<u32>,

        /// Output path (defaults to resized.jpg)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "Papermill starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            match human.severity {
                Severity::ActionRequired => ExitCode::from(2),
                Severity::Permanent => ExitCode::FAILURE,
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    match path {
        Some(path) => ConvertConfig::load(path),
        None => Ok(ConvertConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert {
            input,
            paste,
            format,
            out,
            font,
        } => {
            if font.is_some() {
                config.font_path = font;
            }
            let upload = input.map(fs::read).transpose()?;
            let text = resolve_text(upload.as_deref(), paste.as_deref())?;

            let converter = TextConverter::from_config(&config)?;
            let format = format.unwrap_or(converter.default_format());
            let document = converter.convert(&text, format)?;

            let out = out.unwrap_or_else(|| PathBuf::from(document.download_name()));
            fs::write(&out, &document.bytes)?;
            tracing::info!(
                path = %out.display(),
                bytes = document.bytes.len(),
                pages = document.pages,
                "Document written"
            );
        }
        Command::Resize {
            input,
            target_kb,
            out,
        } => {
            let image = fs::read(&input)?;
            let constraint = SizeConstraint::from_target_kb(target_kb.unwrap_or(config.target_kb));
            let sized = encode_to_size(&image, &constraint, &JpegCodec)?;
            if !sized.within_target {
                tracing::warn!(
                    bytes = sized.bytes.len(),
                    max_bytes = constraint.max_bytes,
                    "Could not reach the target size; writing the smallest result"
                );
            }

            let out = out.unwrap_or_else(|| PathBuf::from(sized.download_name()));
            fs::write(&out, &sized.bytes)?;
            tracing::info!(
                path = %out.display(),
                bytes = sized.bytes.len(),
                attempt = ?sized.attempt,
                "Image written"
            );
        }
    }
    Ok(())
}
