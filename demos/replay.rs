//! Replay a recorded detection log through a counting session.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example replay -- demos/data/walkthrough.json
//! cargo run --example replay -- demos/data/walkthrough.json --capacity 2 --report-dir data/reports
//! ```
//!
//! The log is JSON:
//!
//! ```json
//! {"config": {"capacity": 2}, "frames": [{"minute": "09:00", "detections": [[380.0, 100.0]]}]}
//! ```

use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use peopleflow_rs::{Boundary, CountingSession, Detection, SessionConfig};

/// Command-line arguments for the replay demo.
#[derive(Parser, Debug)]
#[command(name = "replay", version, about = "Replay a detection log through a people counter")]
struct Args {
    /// Path to the JSON detection log.
    #[arg(value_name = "FILE")]
    log: PathBuf,

    /// Session configuration file; overrides the config embedded in the log.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the capacity.
    #[arg(long)]
    capacity: Option<u32>,

    /// Override the x position of the vertical counting line.
    #[arg(long)]
    line_x: Option<f64>,

    /// Write the per-minute CSV report into this directory.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct DetectionLog {
    #[serde(default)]
    config: Option<SessionConfig>,
    frames: Vec<LoggedFrame>,
}

#[derive(Debug, Deserialize)]
struct LoggedFrame {
    /// Wall-clock minute of the frame, `HH:MM`.
    minute: Option<String>,
    detections: Vec<[f64; 2]>,
}

fn frame_time(minute: Option<&str>, fallback: NaiveDateTime) -> NaiveDateTime {
    minute
        .and_then(|m| NaiveTime::parse_from_str(m, "%H:%M").ok())
        .map(|time| fallback.date().and_time(time))
        .unwrap_or(fallback)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(&args.log)?;
    let log: DetectionLog = serde_json::from_str(&content)?;

    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SessionConfig::from_json_file(path)?
        }
        None => log.config.unwrap_or_default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = Some(capacity);
    }
    if let Some(x) = args.line_x {
        config.boundary = Boundary::vertical(x);
    }

    let mut session = CountingSession::new(config)?;
    let started = Local::now().naive_local();

    for frame in &log.frames {
        let detections = frame
            .detections
            .iter()
            .map(|[x, y]| Detection::new(*x, *y))
            .collect::<peopleflow_rs::Result<Vec<_>>>()?;

        let at = frame_time(frame.minute.as_deref(), started);
        let report = session.process_frame_at(&detections, at);

        let marker = if report.capacity_reached { " [FULL]" } else { "" };
        println!("frame {:>4} | {}{}", report.frame_index, report.summary(), marker);
        for record in &report.events {
            println!("           id {} -> {}", record.id, record.event);
        }
    }

    let report = session.stop();
    let (entries, exits) = report.totals();
    println!("session stopped: {} in, {} out over {} minute(s)", entries, exits, report.rows.len());

    if let Some(dir) = args.report_dir {
        match report.write_csv(&dir)? {
            Some(path) => println!("report written to {}", path.display()),
            None => println!("no crossings recorded, report skipped"),
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        error!("Replay failed: {e}");
        std::process::exit(1);
    }
}
