//! Input selection.
//!
//! `FileSource` opens whatever `io.input` names: a `stub://<name>` synthetic
//! scene or a local video file decoded in memory. Network URLs are refused.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::synthetic::SyntheticScene;
use super::FrameSource;
use crate::frame::Frame;

const STUB_SCHEME: &str = "stub://";
const DEFAULT_SYNTHETIC_FRAMES: u64 = 100;

#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path (e.g. "videos/pedestrians.mp4") or `stub://<name>`.
    pub path: String,
    /// Synthetic frame width. Decoded files keep their own size.
    pub width: u32,
    /// Synthetic frame height.
    pub height: u32,
    /// Stop after this many frames. Synthetic scenes default to 100.
    pub max_frames: Option<u64>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            width: 1280,
            height: 720,
            max_frames: None,
        }
    }
}

/// What an input string refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    Synthetic { name: String },
    LocalFile(PathBuf),
}

impl InputKind {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(anyhow!("input must not be empty"));
        }
        if let Some(name) = input.strip_prefix(STUB_SCHEME) {
            return Ok(Self::Synthetic {
                name: name.to_string(),
            });
        }
        if input.contains("://") {
            return Err(anyhow!(
                "only local files and {}<name> inputs are supported, got {}",
                STUB_SCHEME,
                input
            ));
        }
        Ok(Self::LocalFile(PathBuf::from(input)))
    }
}

#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_captured: u64,
    pub path: String,
}

/// The frame source selected by `FileConfig::path`.
pub struct FileSource {
    path: String,
    inner: Box<dyn FrameSource>,
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        let inner: Box<dyn FrameSource> = match InputKind::parse(&config.path)? {
            InputKind::Synthetic { name } => Box::new(SyntheticScene::new(
                &name,
                config.width,
                config.height,
                config.max_frames.unwrap_or(DEFAULT_SYNTHETIC_FRAMES),
            )?),
            InputKind::LocalFile(path) => open_video_file(path, config.max_frames)?,
        };
        Ok(Self {
            path: config.path,
            inner,
        })
    }

    pub fn stats(&self) -> FileStats {
        FileStats {
            frames_captured: self.inner.frames_read(),
            path: self.path.clone(),
        }
    }
}

impl FrameSource for FileSource {
    fn connect(&mut self) -> Result<()> {
        self.inner.connect()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.inner.next_frame()
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }

    fn frames_read(&self) -> u64 {
        self.inner.frames_read()
    }
}

#[cfg(feature = "ingest-file-ffmpeg")]
fn open_video_file(path: PathBuf, max_frames: Option<u64>) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(super::file_ffmpeg::FfmpegDecoder::open(
        path, max_frames,
    )?))
}

#[cfg(not(feature = "ingest-file-ffmpeg"))]
fn open_video_file(path: PathBuf, _max_frames: Option<u64>) -> Result<Box<dyn FrameSource>> {
    Err(anyhow!(
        "cannot decode {}: rebuild with the ingest-file-ffmpeg feature",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_source_ends_after_limit() {
        let mut source = FileSource::new(FileConfig {
            path: "stub://test".to_string(),
            width: 8,
            height: 4,
            max_frames: Some(3),
        })
        .unwrap();
        source.connect().unwrap();

        for _ in 0..3 {
            let frame = source.next_frame().unwrap().expect("frame");
            assert_eq!((frame.width(), frame.height()), (8, 4));
            assert!(frame.validate().is_ok());
        }
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.stats().frames_captured, 3);
        assert_eq!(source.stats().path, "stub://test");
    }

    #[test]
    fn input_kinds() {
        assert_eq!(
            InputKind::parse("stub://lobby").unwrap(),
            InputKind::Synthetic {
                name: "lobby".to_string()
            }
        );
        assert_eq!(
            InputKind::parse("videos/walk.mp4").unwrap(),
            InputKind::LocalFile(PathBuf::from("videos/walk.mp4"))
        );
        assert!(InputKind::parse("  ").is_err());
        assert!(InputKind::parse("rtsp://camera/stream").is_err());
    }

    #[test]
    fn remote_urls_are_rejected() {
        let result = FileSource::new(FileConfig {
            path: "https://example.com/walk.mp4".to_string(),
            ..FileConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn synthetic_source_rejects_zero_size() {
        let result = FileSource::new(FileConfig {
            path: "stub://empty".to_string(),
            width: 0,
            ..FileConfig::default()
        });
        assert!(result.is_err());
    }
}
