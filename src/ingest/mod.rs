//! Frame sources.
//!
//! - Synthetic `stub://` scenes (tests, demos)
//! - Local video files (feature: ingest-file-ffmpeg)
//!
//! Every source normalizes to RGB24 `Frame`s and signals end-of-stream by
//! returning `Ok(None)`. Sources know nothing about detection.

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
mod file_ffmpeg;
mod synthetic;

use anyhow::Result;

use crate::frame::Frame;

pub use file::{FileConfig, FileSource, FileStats, InputKind};

/// A producer of decoded frames.
pub trait FrameSource {
    /// Prepare the source for reading.
    fn connect(&mut self) -> Result<()>;

    /// Decode the next frame; `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    fn is_healthy(&self) -> bool;

    /// Frames handed out so far.
    fn frames_read(&self) -> u64;
}
