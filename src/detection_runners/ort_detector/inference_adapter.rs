//! Owns the backend and the model input size, and recovers once from a wrong size guess.
//!
//! Models exported with dynamic height/width don't say what they want until
//! the runtime has already rejected an input. ONNX Runtime reports it as
//!
//! ```text
//! Got invalid dimensions for input: images for the following indices
//!  index: 2 Got: 320 Expected: 416
//!  index: 3 Got: 320 Expected: 416
//! ```
//!
//! The expected height (index 2) and width (index 3) are parsed out, kept for
//! every following call, and the frame is fed again exactly once.

use std::time::{Duration, Instant};
use regex::Regex;
use crate::common::{ArdImage, ModelShape};
use crate::data::X;
use crate::detection_runners::inference_backend::InferenceBackend;
use crate::detection_runners::ort_detector::image_ops;
use crate::error::DetectError;

const SHAPE_MISMATCH_PATTERN: &str =
    r"(?s)index:\s*2\s*Got:\s*(\d+)\s*Expected:\s*(\d+).*index:\s*3\s*Got:\s*(\d+)\s*Expected:\s*(\d+)";

/// Raw model output for one frame.
#[derive(Debug, Clone)]
pub struct RawInference {
    pub output: X,
    /// Input size the output was produced at, `(height, width)`.
    pub input_size: (u32, u32),
    pub preprocess_time: Duration,
    pub inference_time: Duration,
}

/// A call that produced no output.
#[derive(Debug)]
pub struct InferenceFailure {
    pub error: DetectError,
    pub preprocess_time: Duration,
}

#[derive(Debug)]
pub struct InferenceAdapter<B: InferenceBackend> {
    backend: B,
    shape: ModelShape,
    fallback: (u32, u32),
}

impl<B: InferenceBackend> InferenceAdapter<B> {
    /// `fallback` is the `(height, width)` fed while the model's input size is unknown.
    pub fn new(backend: B, fallback: (u32, u32)) -> Self {
        let shape = match backend.input_dims() {
            Some(dims) => {
                log::debug!("Raw model input shape: {:?}", dims);
                let shape = ModelShape::from_declared(&dims);
                if !shape.is_known() {
                    log::warn!("Model has dynamic input dimensions; using defaults {}x{}", fallback.1, fallback.0);
                }
                shape
            }
            None => {
                log::warn!("Cannot read model input shape; using defaults {}x{}", fallback.1, fallback.0);
                ModelShape::Unknown
            }
        };
        log::info!("Model input size: {:?} (fallback {}x{})", shape, fallback.1, fallback.0);

        Self {
            backend,
            shape,
            fallback,
        }
    }

    pub fn model_shape(&self) -> ModelShape {
        self.shape
    }

    /// `(height, width)` the next frame will be resized to.
    pub fn input_size(&self) -> (u32, u32) {
        self.shape.resolve(self.fallback)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Preprocesses `image` at the current input size and runs the model.
    ///
    /// A size mismatch reported by the runtime updates the stored shape and is
    /// retried once at the reported size. Any other failure, or a failed retry,
    /// is returned as is.
    pub fn run(&mut self, image: &ArdImage) -> Result<RawInference, InferenceFailure> {
        let preprocess_start = Instant::now();
        let (height, width) = self.input_size();
        log::debug!("Resizing frame from {}x{} to {}x{}", image.width(), image.height(), width, height);
        let first = Self::build_input(image, height, width);
        let preprocess_time = preprocess_start.elapsed();

        let error = match first.and_then(|x| self.timed_run(x)) {
            Ok((output, inference_time)) => {
                return Ok(RawInference {
                    output,
                    input_size: (height, width),
                    preprocess_time,
                    inference_time,
                });
            }
            Err(err) => classify(err),
        };

        let (height, width) = match error {
            DetectError::ShapeMismatch { height, width } => (height, width),
            error => {
                log::error!("Inference failed: {}", error);
                return Err(InferenceFailure { error, preprocess_time });
            }
        };

        log::warn!("Runtime expects {}x{} input, retrying once", width, height);
        self.shape = ModelShape::corrected(height, width);

        let retry = Self::build_input(image, height, width);
        // Covers both attempts.
        let preprocess_time = preprocess_start.elapsed();

        match retry.and_then(|x| self.timed_run(x)) {
            Ok((output, inference_time)) => {
                log::debug!("Retry inference succeeded at {}x{}", width, height);
                Ok(RawInference {
                    output,
                    input_size: (height, width),
                    preprocess_time,
                    inference_time,
                })
            }
            Err(error) => {
                log::error!("Retry failed: {}", error);
                Err(InferenceFailure { error, preprocess_time })
            }
        }
    }

    fn build_input(image: &ArdImage, height: u32, width: u32) -> Result<X, DetectError> {
        X::nchw(height, width, image_ops::preprocess(image, height, width))
    }

    fn timed_run(&mut self, x: X) -> Result<(X, Duration), DetectError> {
        let start = Instant::now();
        let output = self.backend.run(x)?;
        Ok((output, start.elapsed()))
    }
}

/// Promotes a runtime failure to [`DetectError::ShapeMismatch`] when its message
/// names the expected height and width.
pub fn classify(error: DetectError) -> DetectError {
    match error {
        DetectError::Inference(msg) => match parse_expected_dims(&msg) {
            Some((height, width)) => DetectError::ShapeMismatch { height, width },
            None => DetectError::Inference(msg),
        },
        other => other,
    }
}

/// Expected `(height, width)` from an input dimension mismatch message.
pub fn parse_expected_dims(msg: &str) -> Option<(u32, u32)> {
    let re = Regex::new(SHAPE_MISMATCH_PATTERN).ok()?;
    let caps = re.captures(msg)?;
    let height: u32 = caps.get(2)?.as_str().parse().ok()?;
    let width: u32 = caps.get(4)?.as_str().parse().ok()?;
    if height == 0 || width == 0 {
        return None;
    }
    Some((height, width))
}
