use crate::data::X;
use crate::error::Result;

/// The native model call.
///
/// Implementations are not expected to be safe for concurrent use, which is
/// why `run` takes `&mut self`: one caller at a time per backend.
pub trait InferenceBackend {
    /// Declared input dims, `[batch, channels, height, width]`.
    /// Dynamic dims are reported as zero or negative.
    fn input_dims(&self) -> Option<Vec<i64>>;

    /// Runs the model on a `[1, 3, height, width]` input and returns the first output.
    ///
    /// Any native failure comes back as [`DetectError::Inference`] holding the
    /// runtime's own message.
    ///
    /// [`DetectError::Inference`]: crate::error::DetectError::Inference
    fn run(&mut self, x: X) -> Result<X>;

    /// Class labels stored alongside the model, if any.
    fn class_names(&self) -> Option<Vec<String>> {
        None
    }
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn input_dims(&self) -> Option<Vec<i64>> {
        (**self).input_dims()
    }

    fn run(&mut self, x: X) -> Result<X> {
        (**self).run(x)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        (**self).class_names()
    }
}
