//! Options for building the ONNX Runtime engine.

use crate::common::{InferenceDevice, ModelConfig};

/// Where the model bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    File(String),
    Memory(Vec<u8>),
}

impl Default for ModelSource {
    fn default() -> Self {
        ModelSource::File(String::new())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub model: ModelSource,
    pub ort_lib_path: String,
    pub device: InferenceDevice,
    pub optimize: bool,
    pub intra_threads: Option<usize>,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            model: ModelSource::default(),
            ort_lib_path: String::new(),
            device: InferenceDevice::CPU,
            optimize: true,
            intra_threads: None,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_model_config(config: &ModelConfig) -> Self {
        Self::new()
            .with_model(&config.weights_path)
            .with_ort_lib_path(&config.ort_lib_path)
            .with_device(config.inference_device)
    }

    pub fn with_model(mut self, onnx_path: &str) -> Self {
        self.model = ModelSource::File(onnx_path.to_string());
        self
    }

    pub fn with_model_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.model = ModelSource::Memory(bytes);
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = ort_lib_path.to_string();
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_optimize(mut self, x: bool) -> Self {
        self.optimize = x;
        self
    }

    pub fn with_intra_threads(mut self, n: usize) -> Self {
        self.intra_threads = Some(n);
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }

    pub fn with_trt_engine_cache(mut self, x: bool) -> Self {
        self.trt_engine_cache_enable = x;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_model_config() {
        let mut config = ModelConfig::new("models/yolo11n_best.onnx");
        config.ort_lib_path = "/opt/ort/libonnxruntime.so".to_string();
        config.inference_device = InferenceDevice::CoreML(0);

        let ort = ConfigOrt::from_model_config(&config).with_intra_threads(2);
        assert_eq!(ort.model, ModelSource::File("models/yolo11n_best.onnx".to_string()));
        assert_eq!(ort.ort_lib_path, "/opt/ort/libonnxruntime.so");
        assert_eq!(ort.device, InferenceDevice::CoreML(0));
        assert_eq!(ort.intra_threads, Some(2));
        assert!(ort.optimize);
    }
}
