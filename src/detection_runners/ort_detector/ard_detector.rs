use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use parking_lot::Mutex;
use crate::common::{ArdImage, DetectionResult, ModelConfig, ModelShape};
use crate::data::{ClassNames, ConfigOrt};
use crate::detection_runners::inference_backend::InferenceBackend;
use crate::detection_runners::ort_detector::inference_adapter::InferenceAdapter;
use crate::detection_runners::ort_detector::nms::nms;
use crate::detection_runners::ort_detector::ort_engine::OrtEngine;
use crate::detection_runners::ort_detector::output_decoder::{FrameGeometry, OutputDecoder};
use crate::utils;

/// Frame in, labeled boxes out.
///
/// Runs preprocessing, inference, decoding and NMS in sequence. A failed
/// inference never escapes `detect`; it shows up as an empty result with
/// `inference_time_ms == -1`.
#[derive(Debug)]
pub struct ArdDetector<B: InferenceBackend> {
    adapter: InferenceAdapter<B>,
    decoder: OutputDecoder,
    iou_threshold: f32,
}

impl ArdDetector<OrtEngine> {
    /// Loads the ONNX model named in `config`.
    pub fn from_config(config: &ModelConfig) -> anyhow::Result<Self> {
        let engine = OrtEngine::new(&ConfigOrt::from_model_config(config))?;
        Self::new(engine, config)
    }
}

impl<B: InferenceBackend> ArdDetector<B> {
    /// Class labels come from `config.labels_path`, then the model's metadata,
    /// then the built-in breed table.
    pub fn new(backend: B, config: &ModelConfig) -> anyhow::Result<Self> {
        let names = match &config.labels_path {
            Some(path) => {
                let names = utils::file_to_vec(path)
                    .with_context(|| format!("Failed to read labels file {}", path))?;
                log::info!("Loaded {} class labels from {}", names.len(), path);
                ClassNames::from(names)
            }
            None => match backend.class_names() {
                Some(names) => {
                    log::info!("Using {} class labels from model metadata", names.len());
                    ClassNames::from(names)
                }
                None => ClassNames::default(),
            },
        };
        Ok(Self::with_class_names(backend, config, names))
    }

    pub fn with_class_names(backend: B, config: &ModelConfig, names: ClassNames) -> Self {
        Self {
            adapter: InferenceAdapter::new(backend, config.default_input()),
            decoder: OutputDecoder::new(config, names),
            iou_threshold: config.iou_threshold,
        }
    }

    pub fn detect(&mut self, image: &ArdImage) -> DetectionResult {
        let detect_time = Instant::now();

        let raw = match self.adapter.run(image) {
            Ok(raw) => raw,
            Err(failure) => {
                log::warn!("Inference failed, returning empty result: {}", failure.error);
                return DetectionResult::empty_failed(utils::as_millis_f64(failure.preprocess_time));
            }
        };
        let _detect_elapsed = utils::trace("TIME", "Preprocess + inference", detect_time, Default::default());

        let postprocess_start = Instant::now();
        let (model_h, model_w) = raw.input_size;
        let frame = FrameGeometry::new(image.width(), image.height(), model_w, model_h);
        let mut detections = match self.decoder.decode(&raw.output, frame) {
            Ok(detections) => detections,
            Err(err) => {
                log::error!("{}", err);
                return DetectionResult::empty_failed(utils::as_millis_f64(raw.preprocess_time));
            }
        };
        nms(&mut detections, self.iou_threshold);
        let postprocess_time = postprocess_start.elapsed();

        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);
        log::debug!("Detections: {} | Preprocess: {:.2?} | Inference: {:.2?} | Postprocess: {:.2?}",
            detections.len(), raw.preprocess_time, raw.inference_time, postprocess_time);

        DetectionResult::new(
            detections,
            utils::as_millis_f64(raw.inference_time),
            utils::as_millis_f64(raw.preprocess_time),
            utils::as_millis_f64(postprocess_time),
        )
    }

    pub fn model_shape(&self) -> ModelShape {
        self.adapter.model_shape()
    }

    /// `(height, width)` the next frame will be resized to.
    pub fn input_size(&self) -> (u32, u32) {
        self.adapter.input_size()
    }

    pub fn class_names(&self) -> &ClassNames {
        self.decoder.names()
    }

    pub fn backend(&self) -> &B {
        self.adapter.backend()
    }
}

/// A detector several threads can call; calls are served one at a time.
#[derive(Debug)]
pub struct SharedDetector<B: InferenceBackend> {
    inner: Arc<Mutex<ArdDetector<B>>>,
}

impl<B: InferenceBackend> Clone for SharedDetector<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: InferenceBackend> From<ArdDetector<B>> for SharedDetector<B> {
    fn from(detector: ArdDetector<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }
}

impl<B: InferenceBackend> SharedDetector<B> {
    pub fn detect(&self, image: &ArdImage) -> DetectionResult {
        self.inner.lock().detect(image)
    }

    pub fn model_shape(&self) -> ModelShape {
        self.inner.lock().model_shape()
    }
}
