use serde::{Deserialize, Serialize};
use crate::common::ArdDetection;

/// `inference_time_ms` value reported when the native call failed.
pub const FAILED_INFERENCE_MS: f64 = -1.;

/// Output of a single `detect()` call.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Kept detections, highest confidence first.
    pub detections: Vec<ArdDetection>,
    pub inference_time_ms: f64,
    pub preprocess_time_ms: f64,
    pub postprocess_time_ms: f64,
}

impl DetectionResult {
    pub fn new(detections: Vec<ArdDetection>, inference_time_ms: f64,
               preprocess_time_ms: f64, postprocess_time_ms: f64) -> Self {
        Self {
            detections,
            inference_time_ms,
            preprocess_time_ms,
            postprocess_time_ms,
        }
    }

    /// Result returned when inference could not produce an output tensor.
    pub fn empty_failed(preprocess_time_ms: f64) -> Self {
        Self {
            detections: Vec::new(),
            inference_time_ms: FAILED_INFERENCE_MS,
            preprocess_time_ms,
            postprocess_time_ms: 0.,
        }
    }

    pub fn inference_failed(&self) -> bool {
        self.inference_time_ms < 0.
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn top_detection(&self) -> Option<&ArdDetection> {
        self.detections
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    pub fn total_time_ms(&self) -> f64 {
        self.preprocess_time_ms + self.inference_time_ms.max(0.) + self.postprocess_time_ms
    }
}
