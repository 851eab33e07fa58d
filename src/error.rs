use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    /// The model could not be loaded. Only raised while building a detector.
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    /// The runtime rejected the input size and told us the one it wants.
    #[error("Input shape mismatch: model expects {height}x{width}")]
    ShapeMismatch { height: u32, width: u32 },
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Unexpected output tensor: {0}")]
    MalformedOutput(String),
}

pub type Result<T, E = DetectError> = std::result::Result<T, E>;
