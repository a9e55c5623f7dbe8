//! overspeed - run zone-to-zone speed estimation over a directory of frames

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use overspeed_rs::zone::Polygon;
use overspeed_rs::{ReplayDetector, SessionConfig, process_video};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of decoded frames, processed in file name order.
    #[arg(long)]
    frames: PathBuf,
    /// JSON-lines file with one array of detections per frame.
    #[arg(long)]
    detections: PathBuf,
    /// TOML session config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Entry zone as JSON, e.g. '[[92,646],[1057,652],[658,249],[334,254]]'.
    #[arg(long)]
    entry_zone: Option<String>,
    /// Exit zone as JSON.
    #[arg(long)]
    exit_zone: Option<String>,
    /// Speed limit in km/h.
    #[arg(long)]
    speed_limit: Option<f64>,
    /// Distance between the zones in meters.
    #[arg(long)]
    distance: Option<f64>,
    /// Max centroid movement in pixels between frames.
    #[arg(long)]
    sensitivity: Option<f64>,
    /// Where snapshots are written.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
    /// Use the video timeline at this frame rate instead of the wall clock.
    #[arg(long)]
    fps: Option<f64>,
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut cfg = match (&args.config, &args.entry_zone, &args.exit_zone) {
        (Some(path), _, _) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(entry), Some(exit)) => SessionConfig::from_zone_json(entry, exit)?,
        _ => {
            return Err(anyhow!(
                "either --config or both --entry-zone and --exit-zone are required"
            ));
        }
    };

    if let Some(entry) = &args.entry_zone {
        cfg.entry_zone = Polygon::from_json(entry).context("--entry-zone")?;
    }
    if let Some(exit) = &args.exit_zone {
        cfg.exit_zone = Polygon::from_json(exit).context("--exit-zone")?;
    }
    if let Some(limit) = args.speed_limit {
        cfg.speed_limit_kmph = limit;
    }
    if let Some(distance) = args.distance {
        cfg.zone_distance_m = distance;
    }
    if let Some(sensitivity) = args.sensitivity {
        cfg.tracker.sensitivity = sensitivity;
    }
    if let Some(dir) = &args.snapshot_dir {
        cfg.snapshot_dir = dir.clone();
    }
    if args.fps.is_some() {
        cfg.frame_rate = args.fps;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = load_config(&args)?;
    let detector = ReplayDetector::open(&args.detections)
        .with_context(|| format!("opening {}", args.detections.display()))?;

    let report = process_video(&args.frames, &cfg, detector)?;
    println!("{}", report.to_json_pretty()?);
    Ok(())
}
