//! Overlay rendering and annotated-frame output.
//!
//! Draws each detection's box and centroid (green when safe, red when in
//! violation) plus a violation counter, then optionally writes the frame as a
//! numbered JPEG.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::frame::Frame;
use crate::pipeline::FrameReport;

pub const SAFE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const VIOLATION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const BOX_THICKNESS: i32 = 2;
const CENTROID_RADIUS: i32 = 5;
const TEXT_SCALE: f32 = 24.0;
const TEXT_MARGIN_LEFT: i32 = 10;
/// Distance of the counter's baseline from the bottom edge.
const TEXT_BASELINE_FROM_BOTTOM: i32 = 25;

pub struct Renderer {
    font: Option<FontVec>,
}

impl Renderer {
    /// Without a font the counter text is skipped; boxes are always drawn.
    pub fn new(font_path: Option<&Path>) -> Result<Self> {
        let font = match font_path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read font {}", path.display()))?;
                let font = FontVec::try_from_vec(bytes)
                    .map_err(|_| anyhow!("invalid font file {}", path.display()))?;
                Some(font)
            }
            None => None,
        };
        Ok(Self { font })
    }

    pub fn annotate(&self, frame: &Frame, report: &FrameReport) -> Result<RgbImage> {
        let mut canvas = frame.to_image()?;

        for (_, detection, violating) in report.classified() {
            let color = if violating { VIOLATION_COLOR } else { SAFE_COLOR };
            let bbox = detection.bbox();
            for inset in 0..BOX_THICKNESS {
                let width = (bbox.width() - 2 * inset).max(1) as u32;
                let height = (bbox.height() - 2 * inset).max(1) as u32;
                let rect = Rect::at(bbox.start_x + inset, bbox.start_y + inset).of_size(width, height);
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
            let centroid = detection.centroid();
            draw_hollow_circle_mut(&mut canvas, (centroid.x, centroid.y), CENTROID_RADIUS, color);
        }

        if let Some(font) = &self.font {
            let text = format!("Social Distancing Violations: {}", report.violation_count());
            let scale = PxScale::from(TEXT_SCALE);
            let ascent = font.as_scaled(scale).ascent();
            let top = text_top(canvas.height(), ascent);
            draw_text_mut(
                &mut canvas,
                VIOLATION_COLOR,
                TEXT_MARGIN_LEFT,
                top,
                scale,
                font,
                &text,
            );
        }

        Ok(canvas)
    }
}

/// `draw_text_mut` positions the glyphs' top edge; lift it by the ascent so
/// the baseline lands `TEXT_BASELINE_FROM_BOTTOM` pixels above the bottom.
fn text_top(canvas_height: u32, ascent: f32) -> i32 {
    canvas_height as i32 - TEXT_BASELINE_FROM_BOTTOM - ascent.round() as i32
}

/// Writes annotated frames as `frame_000000.jpg`, `frame_000001.jpg`, ...
pub struct JpegSink {
    dir: PathBuf,
    written: u64,
}

impl JpegSink {
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, image: &RgbImage) -> Result<PathBuf> {
        let path = self.dir.join(format!("frame_{:06}.jpg", self.written));
        image
            .save_with_format(&path, ImageFormat::Jpeg)
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.written += 1;
        Ok(path)
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}
