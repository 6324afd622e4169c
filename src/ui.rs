use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Terminal reporting for the binaries: stage spinners on a TTY, plain
/// `==>` lines otherwise.
#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && self.mode != UiMode::Plain
    }

    pub fn stage(&self, name: &str) -> StageGuard {
        let line = if self.use_pretty() {
            let spinner = spinner();
            spinner.set_message(format!("{name}…"));
            StatusLine::Spinner(spinner)
        } else {
            eprintln!("==> {}", name);
            StatusLine::Plain
        };
        StageGuard {
            name: name.to_string(),
            start: Instant::now(),
            line,
        }
    }

    /// Live frame counter for the processing loop. Plain mode prints one
    /// line every `PLAIN_PROGRESS_EVERY` frames instead of redrawing.
    pub fn frame_progress(&self) -> FrameProgress {
        let line = if self.use_pretty() {
            StatusLine::Spinner(spinner())
        } else {
            StatusLine::Plain
        };
        FrameProgress {
            line,
            start: Instant::now(),
        }
    }
}

const PLAIN_PROGRESS_EVERY: u64 = 100;

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner
}

enum StatusLine {
    Spinner(ProgressBar),
    Plain,
}

impl StatusLine {
    fn done(&self, message: String) {
        match self {
            StatusLine::Spinner(spinner) => spinner.finish_with_message(message),
            StatusLine::Plain => eprintln!("{message}"),
        }
    }
}

/// Prints `✔ <stage> (<elapsed>)` when dropped.
pub struct StageGuard {
    name: String,
    start: Instant,
    line: StatusLine,
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        self.line.done(format!(
            "✔ {} ({})",
            self.name,
            format_duration(self.start.elapsed())
        ));
    }
}

pub struct FrameProgress {
    line: StatusLine,
    start: Instant,
}

impl FrameProgress {
    pub fn update(&self, frames: u64, people: usize, violations: usize) {
        let message = format!("frame {frames}: {people} people, {violations} violating");
        match &self.line {
            StatusLine::Spinner(spinner) => spinner.set_message(message),
            StatusLine::Plain if frames % PLAIN_PROGRESS_EVERY == 0 => eprintln!("    {message}"),
            StatusLine::Plain => {}
        }
    }

    pub fn finish(self, frames: u64) {
        self.line.done(format!(
            "✔ processed {} frames ({})",
            frames,
            format_duration(self.start.elapsed())
        ));
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
