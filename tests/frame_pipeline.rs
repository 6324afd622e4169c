//! End-to-end frame pipeline tests: synthetic source → stub engine →
//! detector adapter → proximity classifier → renderer.

use distance_monitor::{
    classify_violations, BoundingBox, DetectError, Detection, FileConfig, FileSource, Frame,
    FrameSource, Monitor, MonitorConfig, RawOutput, Renderer, StubEngine,
};
use distance_monitor::render::{SAFE_COLOR, VIOLATION_COLOR};
use std::collections::VecDeque;

const W: u32 = 1000;
const H: u32 = 1000;

/// SSD row for a degenerate box whose centroid lands on `(x, y)` in a
/// 1000x1000 frame.
fn person_at(x: f32, y: f32, confidence: f32) -> [f32; 7] {
    [0.0, 15.0, confidence, x / 1000.0, y / 1000.0, x / 1000.0, y / 1000.0]
}

fn blank_frame() -> Frame {
    Frame::from_rgb(vec![0u8; (W * H * 3) as usize], W, H)
}

fn config() -> MonitorConfig {
    let mut cfg = MonitorConfig::default();
    cfg.blob.size = 16;
    cfg
}

#[test]
fn close_pair_is_flagged_and_distant_person_is_safe() {
    let engine = StubEngine::repeating(RawOutput::from_rows(&[
        person_at(0.0, 0.0, 0.9),
        person_at(30.0, 0.0, 0.9),
        person_at(1000.0, 1000.0, 0.9),
    ]));
    let mut monitor = Monitor::new(engine, config());
    let report = monitor.process_frame(&blank_frame()).expect("process frame");

    assert_eq!(report.detections.len(), 3);
    assert_eq!(report.violations.iter().collect::<Vec<_>>(), vec![0, 1]);
    let flags: Vec<bool> = report.classified().map(|(_, _, v)| v).collect();
    assert_eq!(flags, vec![true, true, false]);
}

#[test]
fn classifier_accepts_hand_built_detections() {
    let detections: Vec<Detection> = [(0, 0), (500, 0), (500, 500)]
        .iter()
        .map(|&(x, y)| Detection::new(0.9, BoundingBox::new(x, y, x, y)))
        .collect();
    assert!(classify_violations(&detections, 50.0).is_empty());
    assert_eq!(classify_violations(&detections, 501.0).len(), 3);
}

#[test]
fn filters_apply_before_classification() {
    // The close neighbour is below the confidence threshold, and the second
    // close box is a different class, so nobody violates.
    let engine = StubEngine::repeating(RawOutput::from_rows(&[
        person_at(100.0, 100.0, 0.9),
        person_at(110.0, 100.0, 0.2),
        [0.0, 12.0, 0.99, 0.1, 0.1, 0.1, 0.1],
        person_at(900.0, 900.0, 0.5),
    ]));
    let mut monitor = Monitor::new(engine, config());
    let report = monitor.process_frame(&blank_frame()).expect("process frame");

    assert_eq!(report.detections.len(), 2);
    assert!(report.violations.is_empty());
}

#[test]
fn each_frame_is_classified_independently() {
    let mut engine = StubEngine::new();
    engine.push(RawOutput::from_rows(&[
        person_at(100.0, 100.0, 0.9),
        person_at(120.0, 100.0, 0.9),
    ]));
    engine.push(RawOutput::from_rows(&[person_at(100.0, 100.0, 0.9)]));
    engine.push(RawOutput::empty());

    let mut monitor = Monitor::new(engine, config());
    let frame = blank_frame();

    let first = monitor.process_frame(&frame).unwrap();
    assert_eq!(first.violation_count(), 2);
    let second = monitor.process_frame(&frame).unwrap();
    assert_eq!(second.detections.len(), 1);
    assert!(second.violations.is_empty());
    let third = monitor.process_frame(&frame).unwrap();
    assert!(third.detections.is_empty());
    assert!(third.violations.is_empty());

    assert_eq!(monitor.stats().frames_processed, 3);
    assert_eq!(monitor.engine().calls(), 3);
}

#[test]
fn malformed_engine_output_is_an_inference_failure() {
    let engine = StubEngine::repeating(RawOutput {
        shape: vec![1, 100],
        data: vec![0.0; 100],
    });
    let mut monitor = Monitor::new(engine, config());
    let err = monitor.process_frame(&blank_frame()).unwrap_err();
    assert!(matches!(err, DetectError::InferenceFailure(_)));
}

#[test]
fn synthetic_stream_through_renderer() {
    let mut source = FileSource::new(FileConfig {
        path: "stub://walkway".to_string(),
        width: 1400,
        height: 1000,
        max_frames: Some(2),
    })
    .expect("source");
    source.connect().expect("connect");
    let source: &mut dyn FrameSource = &mut source;

    let engine = StubEngine::repeating(RawOutput::from_rows(&[
        [0.0, 15.0, 0.9, 0.1, 0.1, 0.2, 0.4],
        [0.0, 15.0, 0.9, 0.12, 0.1, 0.22, 0.4],
        [0.0, 15.0, 0.9, 0.7, 0.5, 0.8, 0.9],
    ]));
    let mut monitor = Monitor::new(engine, config());
    let renderer = Renderer::new(None).expect("renderer");

    let mut frames = 0;
    while let Some(frame) = source.next_frame().expect("next frame") {
        let (frame, report) = monitor.process_captured(&frame).expect("process frame");
        assert_eq!((frame.width(), frame.height()), (700, 500));

        assert_eq!(report.violations.iter().collect::<Vec<_>>(), vec![0, 1]);

        let image = renderer.annotate(&frame, &report).expect("annotate");
        let first = report.detections[0].bbox();
        let last = report.detections[2].bbox();
        assert_eq!(
            *image.get_pixel(first.start_x as u32, first.start_y as u32),
            VIOLATION_COLOR
        );
        assert_eq!(
            *image.get_pixel(last.start_x as u32, last.start_y as u32),
            SAFE_COLOR
        );
        frames += 1;
    }
    assert_eq!(frames, 2);
}

/// Replays a fixed list of frames, including malformed ones a broken decoder
/// might hand over.
struct ScriptedSource {
    frames: VecDeque<Frame>,
    read: u64,
}

impl FrameSource for ScriptedSource {
    fn connect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> anyhow::Result<Option<Frame>> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.read += 1;
        }
        Ok(frame)
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn frames_read(&self) -> u64 {
        self.read
    }
}

#[test]
fn malformed_source_frames_are_skipped_and_the_stream_continues() {
    let good = || Frame::from_rgb(vec![0u8; 1400 * 1000 * 3], 1400, 1000);
    let mut source = ScriptedSource {
        frames: VecDeque::from(vec![
            good(),
            Frame::from_rgb(vec![0u8; 1400 * 1000 * 3 + 7], 1400, 1000),
            Frame::from_rgb(vec![0u8; 5], 1400, 1000),
            good(),
        ]),
        read: 0,
    };
    source.connect().unwrap();

    let engine = StubEngine::repeating(RawOutput::from_rows(&[
        person_at(100.0, 100.0, 0.9),
        person_at(120.0, 100.0, 0.9),
    ]));
    let mut monitor = Monitor::new(engine, config());

    let mut reports = Vec::new();
    let mut skipped = 0;
    while let Some(frame) = source.next_frame().unwrap() {
        match monitor.process_captured(&frame) {
            Ok((_, report)) => reports.push(report),
            Err(DetectError::InvalidFrame { .. }) => skipped += 1,
            Err(e) => panic!("unexpected failure: {e}"),
        }
    }

    assert_eq!(skipped, 2);
    assert_eq!(
        reports.iter().map(|r| r.frame_index).collect::<Vec<_>>(),
        vec![0, 3]
    );
    assert!(reports.iter().all(|r| r.violation_count() == 2));
    let stats = monitor.stats();
    assert_eq!(stats.frames_failed, 2);
    assert_eq!(stats.frames_processed, 2);
    assert_eq!(monitor.engine().calls(), 2);
    assert_eq!(source.frames_read(), 4);
}
