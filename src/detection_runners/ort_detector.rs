mod ort_engine;
pub mod ard_detector;
pub mod image_ops;
pub mod inference_adapter;
pub mod input_wrapper;
pub mod nms;
pub mod output_decoder;

pub use ard_detector::{ArdDetector, SharedDetector};
pub use inference_adapter::{InferenceAdapter, InferenceFailure, RawInference};
pub use ort_engine::*;
pub use output_decoder::{FrameGeometry, OutputDecoder, OutputLayout};
