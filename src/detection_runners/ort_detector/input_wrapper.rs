use ndarray::{Array, IxDyn};
use crate::error::{DetectError, Result};

/// Tensor passed across the native boundary, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Array::from_shape_vec(IxDyn(shape), xs)
            .map(Self::from)
            .map_err(|e| DetectError::Inference(format!("Cannot shape input as {:?}: {}", shape, e)))
    }

    /// `[1, 3, height, width]` input built from a CHW buffer.
    pub fn nchw(height: u32, width: u32, xs: Vec<f32>) -> Result<Self> {
        Self::from_shape_vec(&[1, 3, height as usize, width as usize], xs)
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    pub fn into_inner(self) -> Array<f32, IxDyn> {
        self.0
    }
}
