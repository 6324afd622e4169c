//! Synthetic `stub://` scenes.

use anyhow::{anyhow, Result};

use super::FrameSource;
use crate::frame::{Frame, CHANNELS};

/// A flat grey backdrop with a bright band that sweeps one column per frame.
/// The content is irrelevant to detection; it only has to vary between frames
/// so encoded output is visibly a sequence.
pub(crate) struct SyntheticScene {
    name: String,
    width: u32,
    height: u32,
    limit: u64,
    produced: u64,
}

const BACKDROP: u8 = 96;
const BAND: u8 = 224;
const BAND_WIDTH: u32 = 16;

impl SyntheticScene {
    pub(crate) fn new(name: &str, width: u32, height: u32, limit: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!(
                "synthetic frame size {}x{} must be non-zero",
                width,
                height
            ));
        }
        Ok(Self {
            name: name.to_string(),
            width,
            height,
            limit,
            produced: 0,
        })
    }

    fn render(&self) -> Vec<u8> {
        let band_start = (self.produced % u64::from(self.width)) as u32;
        let row: Vec<u8> = (0..self.width)
            .flat_map(|x| {
                let in_band = x.wrapping_sub(band_start) < BAND_WIDTH;
                let value = if in_band { BAND } else { BACKDROP };
                [value; CHANNELS]
            })
            .collect();
        row.repeat(self.height as usize)
    }
}

impl FrameSource for SyntheticScene {
    fn connect(&mut self) -> Result<()> {
        log::info!(
            "synthetic scene '{}' ready: {}x{}, {} frames",
            self.name,
            self.width,
            self.height,
            self.limit
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.produced >= self.limit {
            return Ok(None);
        }
        let pixels = self.render();
        self.produced += 1;
        Ok(Some(Frame::from_rgb(pixels, self.width, self.height)))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn frames_read(&self) -> u64 {
        self.produced
    }
}
