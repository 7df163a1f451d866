// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use audiopull::{
    FetchOptions, FetchOutcome, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient,
    SharedProgressReporter, collect_urls, ensure_dest_dir, fetch_url, logging,
};

// Emoji with fallback for terminals without Unicode support
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[SKIP] ");
static EXISTS: Emoji<'_, '_> = Emoji("📄 ", "[EXIST] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");

/// Download audio files from a list of URLs
#[derive(Parser, Debug)]
#[command(name = "audiopull")]
#[command(about = "Download audio files from a list of URLs into a local directory")]
#[command(version)]
struct Args {
    /// Audio file URLs to download
    urls: Vec<String>,

    /// Text file with one URL per line (lines starting with # are ignored)
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Destination directory, created if missing
    #[arg(short, long, value_name = "PATH", default_value = "assets/audio")]
    dest: PathBuf,

    /// Replace files that already exist
    #[arg(long)]
    overwrite: bool,

    /// Accept responses whose Content-Type is not audio/*
    #[arg(long)]
    no_validate_mime: bool,

    /// Quiet mode - suppress progress bars
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            overwrite: self.overwrite,
            validate_mime: !self.no_validate_mime,
        }
    }
}

/// Progress reporter drawing one indicatif bar per download
struct IndicatifReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifReporter {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn create_bar(total_bytes: Option<u64>, filename: &str) -> ProgressBar {
        let bar = match total_bytes {
            Some(total) => {
                let style = ProgressStyle::default_bar()
                    .template(&format!(
                        "  {DOWNLOAD}[{{bar:30.cyan/blue}}] {{bytes}}/{{total_bytes}} {{wide_msg}}"
                    ))
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓░");
                let bar = ProgressBar::new(total);
                bar.set_style(style);
                bar
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template(&format!("  {DOWNLOAD}{{spinner:.green}} {{wide_msg}}"))
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                let bar = ProgressBar::new_spinner();
                bar.set_style(style);
                bar.enable_steady_tick(std::time::Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(format!("Downloading {}", filename.cyan()));
        bar
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        match event {
            ProgressEvent::DownloadStarting {
                filename,
                total_bytes,
                ..
            } => {
                if let Some(previous) = slot.take() {
                    previous.finish_and_clear();
                }
                *slot = Some(Self::create_bar(total_bytes, &filename));
            }

            ProgressEvent::ChunkWritten { bytes } => {
                if let Some(bar) = slot.as_ref() {
                    bar.inc(bytes);
                }
            }

            ProgressEvent::DownloadFinished { .. } | ProgressEvent::DownloadAborted { .. } => {
                if let Some(bar) = slot.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }
}

fn print_outcome(url: &str, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Skipped { content_type } => {
            let shown = if content_type.is_empty() {
                "none"
            } else {
                content_type.as_str()
            };
            println!(
                "{SKIP}{} ({}) {}",
                "Not audio".yellow(),
                shown.yellow(),
                url.dimmed()
            );
        }

        FetchOutcome::AlreadyExists { path } => {
            println!("{EXISTS}{}", path.display().to_string().dimmed());
        }

        FetchOutcome::Succeeded {
            path, small_file, ..
        } => {
            if *small_file {
                println!(
                    "{WARNING}{} {}",
                    "Very small file (<10KB):".yellow(),
                    path.display().to_string().yellow()
                );
            }
            println!("{SUCCESS}{}", path.display().to_string().green());
        }

        FetchOutcome::Failed(error) => {
            println!(
                "{FAILURE}{} {}: {}",
                "Download failed".red().bold(),
                url,
                error.to_string().red()
            );
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let urls = collect_urls(args.input.as_deref(), &args.urls)
        .context("Failed to collect URLs")?;

    if urls.is_empty() {
        println!(
            "{}",
            "No URLs given. Pass URLs as arguments or a list file with --input.".yellow()
        );
        return Ok(());
    }

    ensure_dest_dir(&args.dest).context("Failed to prepare destination directory")?;

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            HEADPHONES,
            "audiopull".bold().magenta(),
            "- Audio Downloader".dimmed()
        );
    }

    let shown_dest = std::fs::canonicalize(&args.dest).unwrap_or_else(|_| args.dest.clone());
    println!(
        "{FOLDER}Destination: {}",
        shown_dest.display().to_string().cyan()
    );

    let client = ReqwestClient::new().context("Failed to build HTTP client")?;
    let options = args.fetch_options();

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    for url in &urls {
        let outcome = fetch_url(&client, url, &args.dest, &options, &reporter).await;
        print_outcome(url, &outcome);
    }

    Ok(())
}
