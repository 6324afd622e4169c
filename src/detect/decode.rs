use crate::detect::result::RawDetection;
use crate::detect::DetectError;

/// Values per SSD detection row: `[image_id, class, confidence, x1, y1, x2, y2]`.
pub const SSD_ROW_LEN: usize = 7;

const CLASS_OFFSET: usize = 1;
const CONFIDENCE_OFFSET: usize = 2;
const BOX_OFFSET: usize = 3;

/// Raw engine output: one flat `f32` tensor plus its shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl RawOutput {
    /// Build a `[1, 1, N, 7]` SSD output from rows.
    pub fn from_rows(rows: &[[f32; SSD_ROW_LEN]]) -> Self {
        Self {
            shape: vec![1, 1, rows.len(), SSD_ROW_LEN],
            data: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::from_rows(&[])
    }
}

/// Decode a `[1, 1, N, 7]` detection-output tensor into named fields.
///
/// Only the first batch/channel plane is read. This is the single place that
/// knows the positional layout of a row.
pub fn decode_ssd_output(output: &RawOutput) -> Result<Vec<RawDetection>, DetectError> {
    let shape = &output.shape;
    if shape.len() != 4 || shape[3] != SSD_ROW_LEN {
        return Err(DetectError::InferenceFailure(format!(
            "unexpected detection output shape {:?}, expected [1, 1, N, {}]",
            shape, SSD_ROW_LEN
        )));
    }
    let expected_len = shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
        .ok_or_else(|| DetectError::InferenceFailure("detection output shape overflows".into()))?;
    if output.data.len() != expected_len {
        return Err(DetectError::InferenceFailure(format!(
            "detection output holds {} values, shape {:?} needs {}",
            output.data.len(),
            shape,
            expected_len
        )));
    }
    if shape[0] == 0 || shape[1] == 0 {
        return Ok(Vec::new());
    }

    let rows = shape[2];
    let detections = output.data[..rows * SSD_ROW_LEN]
        .chunks_exact(SSD_ROW_LEN)
        .map(|row| RawDetection {
            class_index: row[CLASS_OFFSET] as i64,
            confidence: row[CONFIDENCE_OFFSET],
            normalized_box: [
                row[BOX_OFFSET],
                row[BOX_OFFSET + 1],
                row[BOX_OFFSET + 2],
                row[BOX_OFFSET + 3],
            ],
        })
        .collect();
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rows_in_order() {
        let output = RawOutput::from_rows(&[
            [0.0, 15.0, 0.9, 0.1, 0.2, 0.3, 0.4],
            [0.0, 7.0, 0.5, 0.5, 0.6, 0.7, 0.8],
        ]);
        let decoded = decode_ssd_output(&output).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].class_index, 15);
        assert_eq!(decoded[0].confidence, 0.9);
        assert_eq!(decoded[0].normalized_box, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(decoded[1].class_index, 7);
    }

    #[test]
    fn empty_output_decodes_to_nothing() {
        assert!(decode_ssd_output(&RawOutput::empty()).unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_row_width() {
        let output = RawOutput {
            shape: vec![1, 1, 2, 6],
            data: vec![0.0; 12],
        };
        assert!(matches!(
            decode_ssd_output(&output),
            Err(DetectError::InferenceFailure(_))
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let output = RawOutput {
            shape: vec![1, 1, 3, 7],
            data: vec![0.0; 14],
        };
        assert!(decode_ssd_output(&output).is_err());
    }

    #[test]
    fn reads_only_first_plane() {
        let mut data = vec![0.0f32; 2 * 7];
        data[1] = 15.0;
        data[2] = 0.8;
        data[8] = 3.0;
        let output = RawOutput {
            shape: vec![2, 1, 1, 7],
            data,
        };
        let decoded = decode_ssd_output(&output).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].class_index, 15);
    }
}
