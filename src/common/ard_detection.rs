use serde::{Deserialize, Serialize};
use crate::common::ArdBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// A labeled box in source image pixel space.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ArdDetection {
    pub bbox: ArdBox,
    pub confidence: f32,
    pub class_id: usize,
    pub class_name: String,
}

impl Nms for ArdDetection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl ArdDetection {
    pub fn new(class_id: usize, bbox: ArdBox, class_name: &str, confidence: f32) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
            class_name: class_name.to_string(),
        }
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    ///
    /// # Returns
    ///
    /// An `ArdDetection` instance with updated coordinates.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = ArdBox::from_cxcy_wh(cx, cy, w, h);
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    /// Class name as shown to people, `Golden_retriever` becomes `Golden retriever`.
    pub fn display_name(&self) -> String {
        self.class_name.replace('_', " ")
    }
}
