pub mod detection_worker;
pub mod inference_backend;
pub mod ort_detector;

pub use detection_worker::{DetectionWorker, WorkerOptions};
pub use inference_backend::InferenceBackend;
pub use ort_detector::*;
