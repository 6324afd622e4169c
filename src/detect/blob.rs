use image::imageops::FilterType;

use crate::detect::DetectError;
use crate::frame::{Frame, CHANNELS};

/// Preprocessing contract between the adapter and the loaded model.
///
/// Defaults match the MobileNet-SSD deployment: 300x300 input, mean 127.5,
/// scale 1/127.5, BGR plane order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobParams {
    pub scale: f32,
    pub size: u32,
    pub mean: f32,
    /// Write the RGB frame's channels as B, G, R planes. The Caffe
    /// MobileNet-SSD weights expect BGR input.
    pub swap_rb: bool,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            scale: 0.007843,
            size: 300,
            mean: 127.5,
            swap_rb: true,
        }
    }
}

/// Engine input tensor in NCHW layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl Blob {
    /// Resize the frame to `size x size` and normalize every channel as
    /// `(pixel - mean) * scale`. Planes follow the frame's RGB order unless
    /// `swap_rb` is set, in which case plane 0 is blue.
    pub fn from_frame(frame: &Frame, params: &BlobParams) -> Result<Self, DetectError> {
        frame.validate()?;
        if params.size == 0 {
            return Err(DetectError::InferenceFailure(
                "blob size must be greater than zero".to_string(),
            ));
        }

        let size = params.size as usize;
        let resized;
        let pixels = if frame.width() == params.size && frame.height() == params.size {
            frame.pixels()
        } else {
            let image = frame
                .to_image()
                .map_err(|e| DetectError::invalid_frame(e.to_string()))?;
            resized = image::imageops::resize(&image, params.size, params.size, FilterType::Triangle);
            resized.as_raw().as_slice()
        };

        let plane = size * size;
        let mut data = vec![0f32; CHANNELS * plane];
        for (idx, px) in pixels.chunks_exact(CHANNELS).enumerate() {
            for (channel, value) in px.iter().enumerate() {
                let target = if params.swap_rb { CHANNELS - 1 - channel } else { channel };
                data[target * plane + idx] = (*value as f32 - params.mean) * params.scale;
            }
        }

        Ok(Self {
            shape: [1, CHANNELS, size, size],
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_is_nchw_and_normalized() {
        let params = BlobParams {
            scale: 0.5,
            size: 2,
            mean: 10.0,
            swap_rb: false,
        };
        // 2x2 frame, pixel i has channels (i, 20 + i, 40 + i).
        let mut pixels = Vec::new();
        for i in 0..4u8 {
            pixels.extend_from_slice(&[i, 20 + i, 40 + i]);
        }
        let frame = Frame::from_rgb(pixels, 2, 2);

        let blob = Blob::from_frame(&frame, &params).unwrap();
        assert_eq!(blob.shape, [1, 3, 2, 2]);
        assert_eq!(&blob.data[0..4], &[-5.0, -4.5, -4.0, -3.5]);
        assert_eq!(&blob.data[4..8], &[5.0, 5.5, 6.0, 6.5]);
        assert_eq!(&blob.data[8..12], &[15.0, 15.5, 16.0, 16.5]);
    }

    #[test]
    fn swap_rb_puts_red_in_the_last_plane() {
        let frame = Frame::from_rgb(vec![255, 0, 0], 1, 1);
        let params = BlobParams {
            size: 1,
            ..BlobParams::default()
        };
        let high: f32 = (255.0 - 127.5) * 0.007843;
        let low: f32 = (0.0 - 127.5) * 0.007843;

        let bgr = Blob::from_frame(&frame, &params).unwrap();
        assert_eq!(bgr.data, vec![low, low, high]);

        let rgb = Blob::from_frame(
            &frame,
            &BlobParams {
                swap_rb: false,
                ..params
            },
        )
        .unwrap();
        assert_eq!(rgb.data, vec![high, low, low]);
    }

    #[test]
    fn blob_resizes_to_model_input() {
        let frame = Frame::from_rgb(vec![255u8; 40 * 30 * 3], 40, 30);
        let params = BlobParams {
            size: 8,
            ..BlobParams::default()
        };
        let blob = Blob::from_frame(&frame, &params).unwrap();
        assert_eq!(blob.shape, [1, 3, 8, 8]);
        assert_eq!(blob.data.len(), 3 * 8 * 8);
        let expected = (255.0 - 127.5) * 0.007843;
        assert!(blob.data.iter().all(|v| (v - expected).abs() < 1e-4));
    }

    #[test]
    fn blob_rejects_invalid_frame() {
        let frame = Frame::from_rgb(vec![1, 2], 4, 4);
        assert!(matches!(
            Blob::from_frame(&frame, &BlobParams::default()),
            Err(DetectError::InvalidFrame { .. })
        ));
    }
}
