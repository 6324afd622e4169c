//! Decoded video frames.
//!
//! - `Frame`: owned RGB24 pixel buffer with known dimensions.
//!
//! Frames are produced by the ingestion layer and consumed read-only by the
//! detector. Nothing in the core keeps a frame beyond one pipeline pass.

use anyhow::{anyhow, Result};
use image::{imageops::FilterType, RgbImage};

use crate::detect::DetectError;

/// Bytes per pixel for the RGB24 layout every source normalizes to.
pub const CHANNELS: usize = 3;

/// One decoded frame in packed RGB24 layout.
///
/// Pixels and dimensions are private; callers read them through accessors and
/// cannot mutate a frame after construction.
#[derive(Clone)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Frame {
    /// Wrap an RGB24 buffer. Dimensions are checked lazily by `validate`, so a
    /// source can hand over whatever its decoder produced.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_rgb(image.into_raw(), width, height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Expected buffer length for the frame's dimensions, `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(CHANNELS))
    }

    /// Reject empty buffers, zero dimensions and buffers whose length does not
    /// match `width * height * 3`.
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.width == 0 || self.height == 0 {
            return Err(DetectError::invalid_frame(format!(
                "zero frame dimension {}x{}",
                self.width, self.height
            )));
        }
        if self.data.is_empty() {
            return Err(DetectError::invalid_frame("empty pixel buffer"));
        }
        let expected = self
            .expected_len()
            .ok_or_else(|| DetectError::invalid_frame("frame dimensions overflow"))?;
        if self.data.len() != expected {
            return Err(DetectError::invalid_frame(format!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Copy into an `image` buffer for resampling or drawing.
    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            anyhow!(
                "frame buffer of {} bytes does not fit {}x{}",
                self.data.len(),
                self.width,
                self.height
            )
        })
    }

    /// Resize to `width` keeping the aspect ratio. The new height is truncated,
    /// never below one row. A frame already at `width` is returned unchanged.
    ///
    /// The frame is validated first, so a malformed buffer surfaces as
    /// `InvalidFrame` instead of being resampled into a plausible picture.
    pub fn resize_to_width(&self, width: u32) -> Result<Frame, DetectError> {
        self.validate()?;
        if width == 0 {
            return Err(DetectError::invalid_frame("target width must be greater than zero"));
        }
        if width == self.width {
            return Ok(self.clone());
        }
        let ratio = width as f64 / self.width as f64;
        let height = ((self.height as f64 * ratio) as u32).max(1);
        let image = self
            .to_image()
            .map_err(|e| DetectError::invalid_frame(e.to_string()))?;
        let resized = image::imageops::resize(&image, width, height, FilterType::Triangle);
        Ok(Frame::from_image(resized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_matching_buffer() {
        let frame = Frame::from_rgb(vec![0u8; 4 * 2 * 3], 4, 2);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_and_mismatched_buffers() {
        let empty = Frame::from_rgb(Vec::new(), 4, 2);
        assert!(matches!(
            empty.validate(),
            Err(DetectError::InvalidFrame { .. })
        ));

        let short = Frame::from_rgb(vec![0u8; 10], 4, 2);
        assert!(matches!(
            short.validate(),
            Err(DetectError::InvalidFrame { .. })
        ));

        let zero = Frame::from_rgb(vec![0u8; 3], 0, 1);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn resize_keeps_aspect_ratio() {
        let frame = Frame::from_rgb(vec![128u8; 1400 * 1000 * 3], 1400, 1000);
        let resized = frame.resize_to_width(700).unwrap();
        assert_eq!(resized.width(), 700);
        assert_eq!(resized.height(), 500);
        assert!(resized.validate().is_ok());
    }

    #[test]
    fn resize_truncates_height() {
        let frame = Frame::from_rgb(vec![0u8; 10 * 7 * 3], 10, 7);
        let resized = frame.resize_to_width(5).unwrap();
        assert_eq!((resized.width(), resized.height()), (5, 3));
    }

    #[test]
    fn resize_rejects_malformed_buffers() {
        // Trailing bytes still satisfy `RgbImage::from_raw`.
        let oversized = Frame::from_rgb(vec![0u8; 4 * 4 * 3 + 5], 4, 4);
        assert!(matches!(
            oversized.resize_to_width(8),
            Err(DetectError::InvalidFrame { .. })
        ));

        let short = Frame::from_rgb(vec![0u8; 5], 4, 4);
        assert!(matches!(
            short.resize_to_width(8),
            Err(DetectError::InvalidFrame { .. })
        ));

        // Same width takes the clone path, which must not skip validation.
        assert!(matches!(
            oversized.resize_to_width(4),
            Err(DetectError::InvalidFrame { .. })
        ));
    }
}
