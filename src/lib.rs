mod utils;
pub mod error;
pub mod common;
pub mod data;
pub mod detection_runners;

use std::time::Instant;
use crate::common::{ArdImage, DetectionResult, ModelConfig};
use crate::detection_runners::{ArdDetector, OrtEngine};

pub use crate::error::{DetectError, Result};

/// Builds an ONNX Runtime detector and runs one warm-up frame.
///
/// The warm-up also settles the model input size when the model declares
/// dynamic dimensions, so the first real frame doesn't pay for the retry.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<ArdDetector<OrtEngine>> {
    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    let mut detector = ArdDetector::from_config(model_details)?;

    let (height, width) = detector.input_size();
    let warmup = detector.detect(&ArdImage::new(image::RgbImage::new(width, height)));
    if warmup.inference_failed() {
        log::warn!("Warm-up inference failed; detections will be empty until the model runs");
    }
    log::info!("Detector ready, model input {:?}", detector.model_shape());
    Ok(detector)
}

pub fn run_detection(detector: &mut ArdDetector<OrtEngine>, ard_image: &ArdImage) -> DetectionResult {
    let now = Instant::now();
    let result = detector.detect(ard_image);
    log::debug!("Processing time: {:?}", now.elapsed());
    result
}
