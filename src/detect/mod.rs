//! Detector adapter.
//!
//! Turns one frame into a list of person detections:
//! frame → blob → engine forward pass → SSD row decoding → confidence/class
//! filtering → pixel boxes and centroids.

mod adapter;
mod backend;
pub mod backends;
mod blob;
mod decode;
mod error;
mod result;

pub use adapter::{detect_people, filter_people, DetectorSettings, DEFAULT_PERSON_CLASS_INDEX};
pub use backend::{ExecutionTarget, InferenceEngine};
pub use backends::{open_engine, StubEngine};
pub use blob::{Blob, BlobParams};
pub use decode::{decode_ssd_output, RawOutput, SSD_ROW_LEN};
pub use error::DetectError;
pub use result::{BoundingBox, Centroid, Detection, DetectionList, RawDetection};
