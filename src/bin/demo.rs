//! demo - end-to-end synthetic run of the social distance monitor
//!
//! Uses the scripted stub engine with a randomly walking crowd, so no model
//! file or video is needed.

use anyhow::{anyhow, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::IsTerminal;
use std::path::PathBuf;

use distance_monitor::{
    detect::SSD_ROW_LEN, ui::Ui, FileConfig, FileSource, FrameSource, JpegSink, Monitor,
    MonitorConfig, RawOutput, Renderer, StubEngine,
};

/// Half-size of a synthetic person box, as a fraction of the frame.
const HALF_W: f32 = 0.03;
const HALF_H: f32 = 0.08;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of synthetic frames.
    #[arg(long, default_value_t = 50)]
    frames: u64,
    /// People in the synthetic crowd.
    #[arg(long, default_value_t = 8)]
    people: usize,
    /// Minimum safe distance in pixels.
    #[arg(long, default_value_t = 50.0)]
    min_distance: f64,
    /// Output directory for annotated frames.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Font for the violation counter overlay.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Optional deterministic seed.
    #[arg(long)]
    seed: Option<u64>,
}

/// A synthetic person drifting across the frame in normalized coordinates.
struct Walker {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

impl Walker {
    fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        if !(HALF_W..=1.0 - HALF_W).contains(&self.x) {
            self.dx = -self.dx;
            self.x = self.x.clamp(HALF_W, 1.0 - HALF_W);
        }
        if !(HALF_H..=1.0 - HALF_H).contains(&self.y) {
            self.dy = -self.dy;
            self.y = self.y.clamp(HALF_H, 1.0 - HALF_H);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if args.frames == 0 {
        return Err(anyhow!("frames must be >= 1"));
    }
    let ui = Ui::from_args(None, std::io::stderr().is_terminal());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let config = MonitorConfig {
        min_distance: args.min_distance,
        ..MonitorConfig::default()
    };
    config.validate()?;

    let stage = ui.stage("script synthetic crowd");
    let mut walkers: Vec<Walker> = (0..args.people)
        .map(|_| Walker {
            x: rng.gen_range(HALF_W..1.0 - HALF_W),
            y: rng.gen_range(HALF_H..1.0 - HALF_H),
            dx: rng.gen_range(-0.01..0.01),
            dy: rng.gen_range(-0.005..0.005),
        })
        .collect();
    let mut engine = StubEngine::new();
    for _ in 0..args.frames {
        let mut rows: Vec<[f32; SSD_ROW_LEN]> = walkers
            .iter()
            .map(|w| {
                let confidence = rng.gen_range(0.1..1.0);
                [0.0, 15.0, confidence, w.x - HALF_W, w.y - HALF_H, w.x + HALF_W, w.y + HALF_H]
            })
            .collect();
        // A confident non-person row the class filter must drop.
        rows.push([0.0, 7.0, 0.95, 0.4, 0.4, 0.6, 0.6]);
        engine.push(RawOutput::from_rows(&rows));
        walkers.iter_mut().for_each(Walker::step);
    }
    drop(stage);

    let mut source = FileSource::new(FileConfig {
        path: "stub://demo".to_string(),
        width: 1280,
        height: 720,
        max_frames: Some(args.frames),
    })?;
    source.connect()?;

    let renderer = Renderer::new(args.font.as_deref())?;
    let mut sink = match &args.out {
        Some(dir) => Some(JpegSink::create(dir)?),
        None => None,
    };

    let mut monitor = Monitor::new(engine, config);
    let mut peak_violations = 0usize;
    {
        let _stage = ui.stage("process frames");
        while let Some(frame) = source.next_frame()? {
            let (frame, report) = match monitor.process_captured(&frame) {
                Ok(processed) => processed,
                Err(e) => {
                    log::warn!("skipping frame: {}", e);
                    continue;
                }
            };
            peak_violations = peak_violations.max(report.violation_count());
            if let Some(sink) = sink.as_mut() {
                sink.write(&renderer.annotate(&frame, &report)?)?;
            }
        }
    }

    let stats = monitor.stats();
    println!("demo summary:");
    println!("  frames processed: {}", stats.frames_processed);
    println!("  frames skipped: {}", stats.frames_failed);
    println!("  engine calls: {}", monitor.engine().calls());
    println!("  people detected: {}", stats.people_seen);
    println!("  violations flagged: {}", stats.violations_seen);
    println!("  peak violations in one frame: {}", peak_violations);
    if let Some(sink) = &sink {
        println!("  annotated frames written: {}", sink.written());
    }
    Ok(())
}
