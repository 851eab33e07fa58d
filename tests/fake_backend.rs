#![allow(dead_code)]

use std::sync::Arc;
use ndarray::Array3;
use parking_lot::Mutex;
use ard_detect::data::X;
use ard_detect::detection_runners::InferenceBackend;
use ard_detect::DetectError;

pub const NUM_CLASSES: usize = 15;
pub const FIELDS: usize = 4 + NUM_CLASSES;

type Responder = Box<dyn FnMut(u32, u32) -> ard_detect::Result<X> + Send>;

/// Stands in for ONNX Runtime. Every call records the `(height, width)` it was
/// fed and hands it to the responder.
pub struct ScriptedBackend {
    declared: Option<Vec<i64>>,
    names: Option<Vec<String>>,
    pub calls: Arc<Mutex<Vec<(u32, u32)>>>,
    respond: Responder,
}

impl ScriptedBackend {
    pub fn new<F>(declared: Option<Vec<i64>>, respond: F) -> Self
    where
        F: FnMut(u32, u32) -> ard_detect::Result<X> + Send + 'static,
    {
        Self {
            declared,
            names: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Box::new(respond),
        }
    }

    /// Static `[1, 3, h, w]` model always returning `output`.
    pub fn fixed(height: i64, width: i64, output: X) -> Self {
        Self::new(Some(vec![1, 3, height, width]), move |_, _| Ok(output.clone()))
    }

    /// Dynamic model that only accepts `expected` and returns `output` for it.
    pub fn expecting(expected: (u32, u32), output: X) -> Self {
        Self::new(Some(vec![1, 3, -1, -1]), move |h, w| {
            if (h, w) == expected {
                Ok(output.clone())
            } else {
                Err(mismatch(h, w, expected))
            }
        })
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(Some(vec![1, 3, 320, 320]), move |_, _| Err(DetectError::Inference(message.clone())))
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect());
        self
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<(u32, u32)>>> {
        Arc::clone(&self.calls)
    }
}

impl InferenceBackend for ScriptedBackend {
    fn input_dims(&self) -> Option<Vec<i64>> {
        self.declared.clone()
    }

    fn run(&mut self, x: X) -> ard_detect::Result<X> {
        let shape = x.shape().to_vec();
        assert_eq!(shape.len(), 4);
        assert_eq!(&shape[..2], &[1, 3]);
        let (h, w) = (shape[2] as u32, shape[3] as u32);
        self.calls.lock().push((h, w));
        (self.respond)(h, w)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        self.names.clone()
    }
}

/// The message ONNX Runtime produces for a wrong input height/width.
pub fn mismatch(h: u32, w: u32, expected: (u32, u32)) -> DetectError {
    DetectError::Inference(format!(
        "Got invalid dimensions for input: images for the following indices\n index: 2 Got: {} Expected: {}\n index: 3 Got: {} Expected: {}\n Please fix either the inputs/outputs or the model.",
        h, expected.0, w, expected.1
    ))
}

/// One prediction in model input pixels.
pub fn row(cx: f32, cy: f32, w: f32, h: f32, class_id: usize, score: f32) -> [f32; FIELDS] {
    let mut r = [0f32; FIELDS];
    r[0] = cx;
    r[1] = cy;
    r[2] = w;
    r[3] = h;
    r[4 + class_id] = score;
    r
}

/// `[1, predictions, fields]` output, padded with empty predictions up to `min_predictions`.
pub fn standard_output(rows: &[[f32; FIELDS]], min_predictions: usize) -> X {
    let n = rows.len().max(min_predictions);
    let mut out = Array3::<f32>::zeros((1, n, FIELDS));
    for (i, r) in rows.iter().enumerate() {
        for (k, v) in r.iter().enumerate() {
            out[[0, i, k]] = *v;
        }
    }
    X::from(out.into_dyn())
}

/// Same predictions as [`standard_output`], laid out `[1, fields, predictions]`.
pub fn transposed_output(rows: &[[f32; FIELDS]], min_predictions: usize) -> X {
    let standard = standard_output(rows, min_predictions);
    X::from(standard.view().permuted_axes(vec![0, 2, 1]).to_owned())
}
