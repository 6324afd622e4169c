//! Local video decoding with FFmpeg.
//!
//! Picks the best video stream, decodes it packet by packet and converts
//! each picture to tightly packed RGB24.

use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::FrameSource;
use crate::frame::{Frame, CHANNELS};

/// A freshly opened decoder that has produced nothing yet is considered
/// healthy for this long.
const STARTUP_GRACE: Duration = Duration::from_secs(5);

pub(crate) struct FfmpegDecoder {
    path: PathBuf,
    max_frames: Option<u64>,
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    decoded: u64,
    state: DecodeState,
    started_at: Option<Instant>,
    failed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Reading,
    Flushing,
    Done,
}

impl FfmpegDecoder {
    pub(crate) fn open(path: PathBuf, max_frames: Option<u64>) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("failed to open video {}", path.display()))?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("{} has no video stream", path.display()))?;
        let stream_index = stream.index();
        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .context("load video decoder parameters")?
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;
        let scaler = rgb_scaler(&decoder)?;

        Ok(Self {
            path,
            max_frames,
            input,
            stream_index,
            decoder,
            scaler,
            decoded: 0,
            state: DecodeState::Reading,
            started_at: None,
            failed: false,
        })
    }

    /// Next decoded picture in stream order, feeding packets and finally the
    /// end-of-stream flush as needed.
    fn pull_picture(&mut self) -> Result<Option<ffmpeg::frame::Video>> {
        let mut picture = ffmpeg::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut picture).is_ok() {
                return Ok(Some(picture));
            }
            match self.state {
                DecodeState::Reading => match self.input.packets().next() {
                    Some((stream, packet)) => {
                        if stream.index() == self.stream_index {
                            self.decoder
                                .send_packet(&packet)
                                .context("send packet to ffmpeg decoder")?;
                        }
                    }
                    None => {
                        self.decoder.send_eof().context("flush ffmpeg decoder")?;
                        self.state = DecodeState::Flushing;
                    }
                },
                DecodeState::Flushing => {
                    self.state = DecodeState::Done;
                    return Ok(None);
                }
                DecodeState::Done => return Ok(None),
            }
        }
    }

    fn to_frame(&mut self, picture: &ffmpeg::frame::Video) -> Result<Frame> {
        let mut rgb = ffmpeg::frame::Video::empty();
        self.scaler
            .run(picture, &mut rgb)
            .context("convert picture to RGB24")?;
        let pixels = packed_rgb(&rgb)?;
        Ok(Frame::from_rgb(pixels, rgb.width(), rgb.height()))
    }
}

impl FrameSource for FfmpegDecoder {
    fn connect(&mut self) -> Result<()> {
        self.started_at = Some(Instant::now());
        log::info!(
            "decoding {} ({}x{})",
            self.path.display(),
            self.decoder.width(),
            self.decoder.height()
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.max_frames.is_some_and(|limit| self.decoded >= limit) {
            return Ok(None);
        }
        let picture = match self.pull_picture() {
            Ok(Some(picture)) => picture,
            Ok(None) => {
                log::info!("{} ended after {} frames", self.path.display(), self.decoded);
                return Ok(None);
            }
            Err(e) => {
                self.failed = true;
                return Err(e);
            }
        };
        let frame = self.to_frame(&picture)?;
        self.decoded += 1;
        Ok(Some(frame))
    }

    fn is_healthy(&self) -> bool {
        if self.failed {
            return false;
        }
        self.started_at
            .is_some_and(|at| self.decoded > 0 || at.elapsed() <= STARTUP_GRACE)
    }

    fn frames_read(&self) -> u64 {
        self.decoded
    }
}

fn rgb_scaler(decoder: &ffmpeg::codec::decoder::Video) -> Result<ffmpeg::software::scaling::Context> {
    ffmpeg::software::scaling::context::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        ffmpeg::util::format::pixel::Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        ffmpeg::software::scaling::flag::Flags::BILINEAR,
    )
    .context("create ffmpeg scaler")
}

/// Copy plane 0 row by row, dropping any stride padding.
fn packed_rgb(picture: &ffmpeg::frame::Video) -> Result<Vec<u8>> {
    let row_len = picture.width() as usize * CHANNELS;
    let rows = picture.height() as usize;
    let stride = picture.stride(0);
    let plane = picture.data(0);

    let mut pixels = Vec::with_capacity(row_len * rows);
    for row in plane.chunks(stride).take(rows) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| anyhow!("decoded row shorter than {} bytes", row_len))?;
        pixels.extend_from_slice(row);
    }
    if pixels.len() != row_len * rows {
        return Err(anyhow!("decoded picture is missing rows"));
    }
    Ok(pixels)
}
