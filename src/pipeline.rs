//! Per-frame pipeline: detector adapter followed by the proximity classifier.

use crate::config::MonitorConfig;
use crate::detect::{detect_people, DetectError, DetectionList, DetectorSettings, InferenceEngine};
use crate::frame::Frame;
use crate::proximity::{classify_violations, ViolationSet};

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub detections: DetectionList,
    pub violations: ViolationSet,
}

impl FrameReport {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Detections paired with whether each one is in violation.
    pub fn classified(&self) -> impl Iterator<Item = (usize, &crate::detect::Detection, bool)> + '_ {
        self.detections
            .iter()
            .enumerate()
            .map(|(i, det)| (i, det, self.violations.contains(i)))
    }
}

/// Running counters across processed frames. Only used for reporting; no
/// detection state crosses frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub frames_processed: u64,
    pub frames_failed: u64,
    pub people_seen: u64,
    pub violations_seen: u64,
}

/// Owns the inference engine and the immutable configuration.
pub struct Monitor<E: InferenceEngine> {
    engine: E,
    config: MonitorConfig,
    settings: DetectorSettings,
    next_index: u64,
    stats: MonitorStats,
}

impl<E: InferenceEngine> Monitor<E> {
    pub fn new(engine: E, config: MonitorConfig) -> Self {
        let settings = DetectorSettings::from(&config);
        log::debug!(
            "monitor: engine={} min_confidence={} min_distance={} person_class={} nms_threshold={} (unused)",
            engine.name(),
            config.min_confidence,
            config.min_distance,
            config.person_class_index,
            config.nms_threshold
        );
        Self {
            engine,
            config,
            settings,
            next_index: 0,
            stats: MonitorStats::default(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Detect people in `frame` and classify them. A failed frame still
    /// consumes a frame index.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport, DetectError> {
        let frame_index = self.claim_index();
        self.run(frame, frame_index)
    }

    /// Resize a frame straight from the source to `frame_width`, then process
    /// it. The resized frame is returned for rendering. A malformed source
    /// frame fails as `InvalidFrame` and is counted like any other failure.
    pub fn process_captured(&mut self, frame: &Frame) -> Result<(Frame, FrameReport), DetectError> {
        let frame_index = self.claim_index();
        let resized = match frame.resize_to_width(self.config.frame_width) {
            Ok(resized) => resized,
            Err(e) => {
                self.stats.frames_failed += 1;
                return Err(e);
            }
        };
        let report = self.run(&resized, frame_index)?;
        Ok((resized, report))
    }

    fn claim_index(&mut self) -> u64 {
        let frame_index = self.next_index;
        self.next_index += 1;
        frame_index
    }

    fn run(&mut self, frame: &Frame, frame_index: u64) -> Result<FrameReport, DetectError> {
        let detections = match detect_people(frame, &mut self.engine, &self.settings) {
            Ok(detections) => detections,
            Err(e) => {
                self.stats.frames_failed += 1;
                return Err(e);
            }
        };
        let violations = classify_violations(&detections, self.config.min_distance);

        self.stats.frames_processed += 1;
        self.stats.people_seen += detections.len() as u64;
        self.stats.violations_seen += violations.len() as u64;

        Ok(FrameReport {
            frame_index,
            detections,
            violations,
        })
    }
}
