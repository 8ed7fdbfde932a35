use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use vod_highlighter::config::Config;
use vod_highlighter::pipeline::{Highlighter, PipelineParams, SessionReport};
use vod_highlighter::sources::{OverrustleArchive, TwitchApi};

#[derive(Parser)]
#[command(name = "vod-highlighter")]
#[command(about = "Chat-activity based highlight detection for archived Twitch broadcasts")]
#[command(version)]
struct Cli {
    /// Streamer login to analyze
    #[arg(short, long)]
    streamer: String,

    /// Broadcast date to analyze (YYYY-MM-DD)
    #[arg(short, long)]
    date: NaiveDate,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session gap threshold in seconds (overrides config)
    #[arg(long)]
    gap: Option<i64>,

    /// Minimum separation between peaks in seconds (overrides config)
    #[arg(long)]
    distance: Option<usize>,

    /// Minimum peak prominence (overrides config)
    #[arg(long)]
    prominence: Option<f64>,

    /// Lead-in subtracted from each highlight start (overrides config)
    #[arg(long)]
    lead_in: Option<usize>,

    /// Write the full report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "vod_highlighter=debug,info"
    } else {
        "vod_highlighter=info,warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(gap) = cli.gap {
        config.analysis.max_inter_stream_secs = gap;
    }
    if let Some(distance) = cli.distance {
        config.analysis.peak_distance = distance;
    }
    if let Some(prominence) = cli.prominence {
        config.analysis.peak_prominence = prominence;
    }
    if let Some(lead_in) = cli.lead_in {
        config.analysis.lead_in_seconds = lead_in;
    }
    config.validate()?;

    info!("🚀 VOD Highlighter starting...");
    info!("📺 Streamer: {}", cli.streamer);
    info!("📅 Date: {}", cli.date);
    info!("{}", config.summary());

    let twitch = TwitchApi::new(
        config.twitch.api_base.clone(),
        config.twitch.client_id.clone(),
        config.twitch.request_timeout_seconds,
    );
    let archive = OverrustleArchive::new(
        config.archive.base_url.clone(),
        config.archive.request_timeout_seconds,
    );
    let params = PipelineParams {
        max_inter_stream_secs: config.analysis.max_inter_stream_secs,
        vod_limit: config.twitch.vod_limit,
        rank: config.analysis.rank_params(),
    };

    let mut highlighter = Highlighter::new(cli.streamer.clone(), twitch, archive, params);

    let start_time = std::time::Instant::now();
    let reports = highlighter.run(cli.date).await?;
    let duration = start_time.elapsed();

    print_reports(&reports);

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&reports)?;
        tokio::fs::write(path, json).await?;
        info!("💾 Report written to {}", path.display());
    }

    info!("🎉 Analysis completed in {:.2}s", duration.as_secs_f64());
    Ok(())
}

fn print_reports(reports: &[SessionReport]) {
    if reports.is_empty() {
        println!("No sessions cover the requested date.");
        return;
    }

    for report in reports {
        println!("{}", report.session);
        for vod in &report.vods {
            if vod.markers.is_empty() {
                println!("VOD {}: no highlight candidates", vod.vod_id);
                continue;
            }
            println!("VOD {}:", vod.vod_id);
            for marker in &vod.markers {
                println!(" - {}", marker.url);
            }
        }
    }
}
