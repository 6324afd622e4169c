use crate::config::MonitorConfig;
use crate::detect::backend::InferenceEngine;
use crate::detect::blob::{Blob, BlobParams};
use crate::detect::decode::decode_ssd_output;
use crate::detect::result::{BoundingBox, Detection, DetectionList, RawDetection};
use crate::detect::DetectError;
use crate::frame::Frame;

/// MobileNet-SSD (VOC) label index for "person".
pub const DEFAULT_PERSON_CLASS_INDEX: i64 = 15;

/// Thresholds and preprocessing the detector adapter needs from the config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorSettings {
    pub min_confidence: f32,
    pub person_class_index: i64,
    pub blob: BlobParams,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.2,
            person_class_index: DEFAULT_PERSON_CLASS_INDEX,
            blob: BlobParams::default(),
        }
    }
}

impl From<&MonitorConfig> for DetectorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            person_class_index: config.person_class_index,
            blob: config.blob,
        }
    }
}

/// Run the engine on one frame and keep the confident person detections.
///
/// Output order follows the engine's raw order. Overlapping boxes of the same
/// person are not merged.
pub fn detect_people<E: InferenceEngine + ?Sized>(
    frame: &Frame,
    engine: &mut E,
    settings: &DetectorSettings,
) -> Result<DetectionList, DetectError> {
    let blob = Blob::from_frame(frame, &settings.blob)?;
    let output = engine.forward(&blob).map_err(DetectError::inference)?;
    let raw = decode_ssd_output(&output)?;
    let people = filter_people(&raw, frame.width(), frame.height(), settings);
    log::debug!(
        "{}: {} raw detections, {} people kept",
        engine.name(),
        raw.len(),
        people.len()
    );
    Ok(people)
}

/// Apply the confidence and class filters, then map to pixel space.
///
/// A row is kept only when `confidence > min_confidence` (strict) and its
/// class equals the person class.
pub fn filter_people(
    raw: &[RawDetection],
    width: u32,
    height: u32,
    settings: &DetectorSettings,
) -> DetectionList {
    raw.iter()
        .filter(|det| det.confidence > settings.min_confidence)
        .filter(|det| det.class_index == settings.person_class_index)
        .map(|det| {
            let bbox = BoundingBox::from_normalized(det.normalized_box, width, height);
            Detection::new(det.confidence, bbox)
        })
        .collect()
}
