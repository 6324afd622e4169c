//! distanced - social distance monitor
//!
//! This binary:
//! 1. Loads the monitor config (file, env, then CLI flags)
//! 2. Loads the detector model before touching the video source
//! 3. Reads frames until the source ends or Ctrl-C is pressed
//! 4. Resizes each frame, detects people and classifies violations
//! 5. Optionally writes annotated frames as JPEG files

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use distance_monitor::{
    detect::open_engine, ui::Ui, DetectError, FileConfig, FileSource, FrameSource, JpegSink,
    Monitor, MonitorConfig, Renderer,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON or TOML). Falls back to SOCIAL_DISTANCE_CONFIG.
    #[arg(long, env = "SOCIAL_DISTANCE_CONFIG")]
    config: Option<PathBuf>,
    /// Input video path, or stub://<name> for synthetic frames.
    #[arg(short, long)]
    input: Option<String>,
    /// Directory for annotated JPEG frames.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Font used for the violation counter overlay.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Detector model path (ONNX).
    #[arg(long)]
    model: Option<PathBuf>,
    /// Minimum safe distance in pixels.
    #[arg(long)]
    min_distance: Option<f64>,
    /// Minimum detection confidence.
    #[arg(long)]
    min_conf: Option<f32>,
    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Output style: auto, plain or pretty.
    #[arg(long)]
    ui: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ui = Ui::from_args(args.ui.as_deref(), std::io::stderr().is_terminal());
    let cfg = load_config(&args)?;

    let engine = {
        let _stage = ui.stage("load detector model");
        open_engine(&cfg)?
    };

    let mut source = FileSource::new(FileConfig {
        path: cfg.io.input.clone(),
        max_frames: args.max_frames,
        ..FileConfig::default()
    })?;
    source.connect()?;

    let renderer = Renderer::new(cfg.io.font_path.as_deref())?;
    let mut sink = match &cfg.io.output_dir {
        Some(dir) => Some(JpegSink::create(dir)?),
        None => None,
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })
        .expect("error setting Ctrl-C handler");
    }

    let mut monitor = Monitor::new(engine, cfg);
    let progress = ui.frame_progress();
    let mut last_health_log = Instant::now();

    log::info!("distanced running. input={}", monitor.config().io.input);

    while running.load(Ordering::SeqCst) {
        let Some(frame) = source.next_frame()? else {
            log::info!("end of stream");
            break;
        };
        let (frame, report) = match monitor.process_captured(&frame) {
            Ok(processed) => processed,
            Err(e @ DetectError::InvalidFrame { .. }) => {
                log::warn!("skipping frame: {}", e);
                continue;
            }
            Err(e @ DetectError::InferenceFailure(_)) => {
                log::error!("skipping frame: {}", e);
                continue;
            }
        };

        progress.update(
            report.frame_index + 1,
            report.detections.len(),
            report.violation_count(),
        );
        log::debug!(
            "frame #{}: people={} violations={:?}",
            report.frame_index,
            report.detections.len(),
            report.violations.iter().collect::<Vec<_>>()
        );

        if let Some(sink) = sink.as_mut() {
            let annotated = renderer.annotate(&frame, &report)?;
            sink.write(&annotated)?;
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} path={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.path
            );
            last_health_log = Instant::now();
        }
    }

    let stats = monitor.stats();
    progress.finish(stats.frames_processed);
    log::info!(
        "done: frames={} failed={} people={} violations={}",
        stats.frames_processed,
        stats.frames_failed,
        stats.people_seen,
        stats.violations_seen
    );
    if let Some(sink) = &sink {
        log::info!("wrote {} annotated frames", sink.written());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<MonitorConfig> {
    let mut cfg = match &args.config {
        Some(path) => MonitorConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MonitorConfig::load()?,
    };
    if let Some(input) = &args.input {
        cfg.io.input = input.clone();
    }
    if let Some(output) = &args.output {
        cfg.io.output_dir = Some(output.clone());
    }
    if let Some(font) = &args.font {
        cfg.io.font_path = Some(font.clone());
    }
    if let Some(model) = &args.model {
        cfg.model_path = model.clone();
    }
    if let Some(min_distance) = args.min_distance {
        cfg.min_distance = min_distance;
    }
    if let Some(min_conf) = args.min_conf {
        cfg.min_confidence = min_conf;
    }
    cfg.validate()?;
    Ok(cfg)
}
