//! Turns the raw `[1, A, B]` output into candidate detections.
//!
//! YOLO exports disagree on axis order. `{A, B}` is `{predictions, 4 + classes}`
//! in either order, e.g. `[1, 19, 2100]` or `[1, 2100, 19]`. The layout is
//! guessed per call from the axis sizes: the field axis is assumed to be the
//! shorter one. This goes wrong when a model has about as many classes as
//! predictions; equal sizes are read as the standard layout.

use ndarray::{ArrayView2, Axis, Ix3};
use rayon::prelude::*;
use crate::common::{ArdDetection, ModelConfig};
use crate::data::{ClassNames, X};
use crate::error::{DetectError, Result};

/// Fields before the class scores: `cx, cy, w, h`.
const BOX_FIELDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[1, predictions, fields]`, prediction `i` field `k` at `[0][i][k]`.
    Standard,
    /// `[1, fields, predictions]`, prediction `i` field `k` at `[0][k][i]`.
    Transposed,
}

impl OutputLayout {
    /// Layout, prediction count and class count for a `[1, A, B]` output shape.
    pub fn resolve(shape: &[usize]) -> Result<(Self, usize, usize)> {
        if shape.len() != 3 {
            return Err(DetectError::MalformedOutput(format!("expected rank 3, got shape {:?}", shape)));
        }
        if shape[0] == 0 {
            return Err(DetectError::MalformedOutput(format!("empty batch in shape {:?}", shape)));
        }
        let (a, b) = (shape[1], shape[2]);
        let (layout, num_predictions, fields) = if a < b {
            (OutputLayout::Transposed, b, a)
        } else {
            (OutputLayout::Standard, a, b)
        };
        if fields < BOX_FIELDS {
            return Err(DetectError::MalformedOutput(format!(
                "{} fields per prediction, need at least {} in shape {:?}", fields, BOX_FIELDS, shape
            )));
        }
        Ok((layout, num_predictions, fields - BOX_FIELDS))
    }
}

/// Source frame size plus the per-axis `source / model input` factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub src_width: u32,
    pub src_height: u32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl FrameGeometry {
    pub fn new(src_width: u32, src_height: u32, model_width: u32, model_height: u32) -> Self {
        Self {
            src_width,
            src_height,
            scale_x: src_width as f32 / model_width as f32,
            scale_y: src_height as f32 / model_height as f32,
        }
    }

    pub fn area(&self) -> f32 {
        self.src_width as f32 * self.src_height as f32
    }
}

#[derive(Debug, Clone)]
pub struct OutputDecoder {
    conf_threshold: f32,
    max_area_ratio: f32,
    tightening_width: f32,
    tightening_height: f32,
    names: ClassNames,
}

impl OutputDecoder {
    pub fn new(config: &ModelConfig, names: ClassNames) -> Self {
        Self {
            conf_threshold: config.conf_threshold,
            max_area_ratio: config.max_area_ratio,
            tightening_width: config.bbox_tightening_width,
            tightening_height: config.bbox_tightening_height,
            names,
        }
    }

    pub fn names(&self) -> &ClassNames {
        &self.names
    }

    /// Decodes every prediction that clears the confidence and area filters.
    ///
    /// Boxes come back in source frame pixels, in prediction order. Nearby
    /// duplicates are expected and left for NMS.
    pub fn decode(&self, output: &X, frame: FrameGeometry) -> Result<Vec<ArdDetection>> {
        let (layout, num_predictions, num_classes) = OutputLayout::resolve(output.shape())?;
        log::debug!("Output shape {:?}: {:?} layout, {} predictions, {} classes",
            output.shape(), layout, num_predictions, num_classes);

        let view = output
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|e| DetectError::MalformedOutput(e.to_string()))?;
        let preds = view.index_axis_move(Axis(0), 0);
        // Always index as [prediction, field].
        let preds: ArrayView2<f32> = match layout {
            OutputLayout::Standard => preds,
            OutputLayout::Transposed => preds.reversed_axes(),
        };

        let image_area = frame.area();
        let detections = (0..num_predictions)
            .into_par_iter()
            .filter_map(|i| {
                let row = preds.row(i);

                // First maximum wins on ties.
                let (class_id, max_prob) = row
                    .iter()
                    .skip(BOX_FIELDS)
                    .enumerate()
                    .fold((0usize, 0f32), |(best_id, best), (c, &p)| {
                        if p > best { (c, p) } else { (best_id, best) }
                    });

                if !(max_prob > self.conf_threshold) {
                    return None;
                }

                let cx = row[0] * frame.scale_x;
                let cy = row[1] * frame.scale_y;
                let w = row[2] * frame.scale_x * self.tightening_width;
                let h = row[3] * frame.scale_y * self.tightening_height;

                let area_ratio = w * h / image_area;
                if image_area <= 0. || area_ratio > self.max_area_ratio {
                    log::trace!("Prediction {} rejected: box covers {:.1}% of the frame", i, area_ratio * 100.);
                    return None;
                }

                Some(
                    ArdDetection::default()
                        .with_cxcy_wh(cx, cy, w, h)
                        .with_confidence(max_prob)
                        .with_class_id(class_id)
                        .with_class_name(&self.names.name(class_id)),
                )
            })
            .collect::<Vec<_>>();

        log::debug!("{} candidates before NMS", detections.len());
        Ok(detections)
    }
}
