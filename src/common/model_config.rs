use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::common::inference_device::InferenceDevice;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.35;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_MAX_AREA_RATIO: f32 = 0.85;
pub const DEFAULT_INPUT_SIZE: u32 = 320;

/// Everything the detector needs besides the model bytes themselves.
///
/// Loaded from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights_path: String,
    /// Path to the ONNX Runtime shared library. Empty means `ORT_DYLIB_PATH` or the system default.
    pub ort_lib_path: String,
    /// Newline separated class labels. When unset the model metadata or the built-in breed table is used.
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_area_ratio: f32,
    /// Input size used while the model's own input size is unknown.
    pub default_width: u32,
    pub default_height: u32,
    /// Box shrink factors applied around the box center. 1.0 leaves boxes untouched.
    pub bbox_tightening_width: f32,
    pub bbox_tightening_height: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: String::new(),
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_area_ratio: DEFAULT_MAX_AREA_RATIO,
            default_width: DEFAULT_INPUT_SIZE,
            default_height: DEFAULT_INPUT_SIZE,
            bbox_tightening_width: 1.,
            bbox_tightening_height: 1.,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: &str) -> Self {
        Self {
            weights_path: weights_path.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid detector configuration")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// `(height, width)` used while the model's input size is unknown.
    pub fn default_input(&self) -> (u32, u32) {
        (self.default_height, self.default_width)
    }

    pub fn set_device_type(&mut self, device_type: InferenceDevice) {
        self.inference_device = device_type;
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Fallback Input Resolution: {}x{}\n\
        Detection Threshold: {} | IoU Threshold: {} | Max Area Ratio: {}",
               self.weights_path, self.labels_path.as_deref().unwrap_or("<built-in>"),
               self.ort_lib_path, self.inference_device,
               self.default_width, self.default_height,
               self.conf_threshold, self.iou_threshold, self.max_area_ratio)
    }
}
