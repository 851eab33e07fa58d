extern crate ard_detect;

use std::io::Write;
use image::RgbImage;
use ard_detect::common::{ArdImage, ModelConfig, ModelShape, FAILED_INFERENCE_MS};
use ard_detect::data::X;
use ard_detect::detection_runners::ArdDetector;

mod fake_backend;
use fake_backend::*;

fn frame(width: u32, height: u32) -> ArdImage {
    ArdImage::from(RgbImage::new(width, height))
}

fn detector(backend: ScriptedBackend) -> ArdDetector<ScriptedBackend> {
    ArdDetector::new(backend, &ModelConfig::default()).unwrap()
}

#[test]
fn boxes_scale_with_the_source_frame() {
    let output = standard_output(&[row(160., 160., 64., 32., 5, 0.9)], 32);
    let mut detector = detector(ScriptedBackend::fixed(320, 320, output));

    let same = detector.detect(&frame(320, 320));
    assert_eq!(same.len(), 1);
    assert_eq!(same.detections[0].bbox.as_x1y1_x2y2_i32(), (128, 144, 192, 176));
    assert_eq!(same.detections[0].class_name, "Golden_retriever");
    assert_eq!(same.detections[0].display_name(), "Golden retriever");

    let wide = detector.detect(&frame(640, 480));
    assert_eq!(wide.len(), 1);
    assert_eq!(wide.detections[0].bbox.as_x1y1_x2y2_i32(), (256, 216, 384, 264));
    assert_eq!(wide.detections[0].confidence, same.detections[0].confidence);
}

#[test]
fn both_output_layouts_give_the_same_detections() {
    let rows = [
        row(100., 100., 40., 40., 0, 0.8),
        row(102., 100., 40., 40., 0, 0.9),
        row(250., 250., 20., 20., 3, 0.7),
        row(30., 200., 16., 24., 14, 0.55),
        row(200., 40., 30., 30., 9, 0.2),
    ];
    let mut standard = detector(ScriptedBackend::fixed(320, 320, standard_output(&rows, 40)));
    let mut transposed = detector(ScriptedBackend::fixed(320, 320, transposed_output(&rows, 40)));

    let image = frame(640, 640);
    let a = standard.detect(&image);
    let b = transposed.detect(&image);
    assert_eq!(a.len(), 3);
    assert_eq!(a.detections, b.detections);
}

#[test]
fn overlapping_duplicates_are_suppressed() {
    // IoU of the first two is 1520 / 1680.
    let rows = [
        row(100., 100., 40., 40., 0, 0.8),
        row(102., 100., 40., 40., 0, 0.9),
        row(250., 250., 20., 20., 3, 0.7),
    ];
    let mut detector = detector(ScriptedBackend::fixed(320, 320, standard_output(&rows, 32)));
    let result = detector.detect(&frame(320, 320));

    let kept: Vec<(f32, &str)> = result.detections.iter()
        .map(|d| (d.confidence, d.class_name.as_str()))
        .collect();
    assert_eq!(kept, vec![(0.9, "Beagle"), (0.7, "French_bulldog")]);
    assert_eq!(result.top_detection().map(|d| d.confidence), Some(0.9));
    assert!(!result.inference_failed());
}

#[test]
fn results_are_sorted_by_confidence() {
    let rows = [
        row(20., 20., 10., 10., 1, 0.4),
        row(80., 80., 10., 10., 2, 0.95),
        row(140., 140., 10., 10., 3, 0.6),
        row(200., 200., 10., 10., 4, 0.81),
    ];
    let mut detector = detector(ScriptedBackend::fixed(320, 320, standard_output(&rows, 32)));
    let confs: Vec<f32> = detector.detect(&frame(320, 320)).detections.iter().map(|d| d.confidence).collect();
    assert_eq!(confs, vec![0.95, 0.81, 0.6, 0.4]);
}

#[test]
fn confidence_at_threshold_is_dropped() {
    let rows = [
        row(50., 50., 10., 10., 0, 0.35),
        row(200., 200., 10., 10., 1, 0.36),
    ];
    let mut detector = detector(ScriptedBackend::fixed(320, 320, standard_output(&rows, 32)));
    let result = detector.detect(&frame(320, 320));
    assert_eq!(result.len(), 1);
    assert_eq!(result.detections[0].confidence, 0.36);
}

#[test]
fn boxes_covering_most_of_the_frame_are_dropped() {
    let rows = [
        row(50., 50., 85., 100., 0, 0.9),
        row(50., 50., 90., 100., 1, 0.95),
    ];
    let mut detector = detector(ScriptedBackend::fixed(100, 100, standard_output(&rows, 32)));
    let result = detector.detect(&frame(100, 100));
    assert_eq!(result.len(), 1);
    assert_eq!(result.detections[0].confidence, 0.9);
}

#[test]
fn metadata_labels_and_synthesized_names() {
    let rows = [
        row(50., 50., 10., 10., 0, 0.9),
        row(200., 200., 10., 10., 4, 0.8),
    ];
    let backend = ScriptedBackend::fixed(320, 320, standard_output(&rows, 32))
        .with_names(&["Akita", "Basenji"]);
    let mut detector = detector(backend);
    assert_eq!(detector.class_names().len(), 2);

    let names: Vec<String> = detector.detect(&frame(320, 320)).detections.into_iter().map(|d| d.class_name).collect();
    assert_eq!(names, vec!["Akita".to_string(), "Dog_4".to_string()]);
}

#[test]
fn labels_file_overrides_model_metadata() {
    let path = std::env::temp_dir().join(format!("ard_detect_labels_{}.txt", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Collie\n\n  Whippet  ").unwrap();

    let mut config = ModelConfig::default();
    config.labels_path = Some(path.to_string_lossy().to_string());
    let backend = ScriptedBackend::fixed(320, 320, standard_output(&[row(50., 50., 10., 10., 1, 0.9)], 32))
        .with_names(&["Akita", "Basenji"]);
    let mut detector = ArdDetector::new(backend, &config).unwrap();
    let result = detector.detect(&frame(320, 320));
    std::fs::remove_file(&path).ok();

    assert_eq!(result.detections[0].class_name, "Whippet");
}

#[test]
fn missing_labels_file_is_a_construction_error() {
    let mut config = ModelConfig::default();
    config.labels_path = Some("/nonexistent/labels.txt".to_string());
    let backend = ScriptedBackend::fixed(320, 320, standard_output(&[], 32));
    assert!(ArdDetector::new(backend, &config).is_err());
}

#[test]
fn inference_failure_yields_empty_sentinel_result() {
    let backend = ScriptedBackend::failing("CUDA failure 2: out of memory");
    let calls = backend.call_log();
    let mut detector = detector(backend);

    let result = detector.detect(&frame(640, 480));
    assert!(result.detections.is_empty());
    assert_eq!(result.inference_time_ms, FAILED_INFERENCE_MS);
    assert_eq!(result.postprocess_time_ms, 0.);
    assert!(result.preprocess_time_ms >= 0.);
    assert!(result.inference_failed());
    // Not a size complaint, so no retry.
    assert_eq!(calls.lock().len(), 1);
    assert_eq!(detector.model_shape(), ModelShape::Discovered { height: 320, width: 320 });
}

#[test]
fn malformed_output_is_a_failed_call() {
    let backend = ScriptedBackend::fixed(320, 320, X::from(vec![0.5f32; 19]));
    let mut detector = detector(backend);
    let result = detector.detect(&frame(320, 320));
    assert!(result.is_empty());
    assert!(result.inference_failed());
    assert_eq!(result.postprocess_time_ms, 0.);
}

#[test]
fn empty_frame_runs_but_detects_nothing() {
    let output = standard_output(&[row(160., 160., 64., 32., 5, 0.9)], 32);
    let mut detector = detector(ScriptedBackend::fixed(320, 320, output));
    let result = detector.detect(&ArdImage::default());
    assert!(result.is_empty());
    assert!(!result.inference_failed());
}

#[test]
fn timings_are_reported() {
    let output = standard_output(&[row(160., 160., 64., 32., 5, 0.9)], 32);
    let mut detector = detector(ScriptedBackend::fixed(320, 320, output));
    let result = detector.detect(&frame(1280, 720));
    assert!(result.inference_time_ms >= 0.);
    assert!(result.preprocess_time_ms >= 0.);
    assert!(result.postprocess_time_ms >= 0.);
    assert!(result.total_time_ms() >= result.inference_time_ms);
}
