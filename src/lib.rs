//! Social distance monitor
//!
//! Processes a video stream one frame at a time, finds people with an
//! object-detection model and flags every person standing closer than a
//! minimum distance to someone else.
//!
//! # Architecture
//!
//! Per frame, two stateless stages run in sequence:
//!
//! 1. **Detector adapter** (`detect`): frame → blob → inference engine → SSD
//!    rows → confidence/class filter → `DetectionList` with pixel boxes and
//!    integer centroids.
//! 2. **Proximity classifier** (`proximity`): pairwise centroid distances →
//!    `ViolationSet` of indices into the `DetectionList`.
//!
//! Nothing persists across frames; the index of a detection only identifies it
//! within its own frame.
//!
//! # Module Structure
//!
//! - `config`: immutable `MonitorConfig` (file + env)
//! - `frame`: RGB24 frames, validation, resize
//! - `detect`: detector adapter and inference engines
//! - `proximity`: distance matrix and violation classification
//! - `pipeline`: `Monitor`, per-frame orchestration and counters
//! - `ingest`: frame sources (synthetic, local files)
//! - `render`: overlay drawing and JPEG output
//! - `ui`: terminal progress for the binaries

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod pipeline;
pub mod proximity;
pub mod render;
pub mod ui;

pub use config::{IoSettings, MonitorConfig};
pub use detect::{
    detect_people, BlobParams, BoundingBox, Centroid, DetectError, Detection, DetectionList,
    DetectorSettings, ExecutionTarget, InferenceEngine, RawDetection, RawOutput, StubEngine,
};
pub use frame::Frame;
pub use ingest::{FileConfig, FileSource, FrameSource, InputKind};
pub use pipeline::{FrameReport, Monitor, MonitorStats};
pub use proximity::{classify_violations, pairwise_distances, DistanceMatrix, ViolationSet};
pub use render::{JpegSink, Renderer};
