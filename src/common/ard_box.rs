use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in floating point pixel coordinates.
///
/// A box carries no record of which coordinate space it lives in (model input
/// space or source image space). Moving between the two always goes through
/// [`ArdBox::scaled`].
///
/// `right >= left` and `bottom >= top` are not enforced. Degenerate boxes report
/// a zero width, height and area.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct ArdBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ArdBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a box from its center and size.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    pub fn from_cxcy_wh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            left: cx - w / 2.,
            top: cy - h / 2.,
            right: cx + w / 2.,
            bottom: cy + h / 2.,
        }
    }

    /// Returns the width of the bounding box, zero when inverted.
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.)
    }

    /// Returns the height of the bounding box, zero when inverted.
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.)
    }

    /// Returns the center x-coordinate of the bounding box.
    pub fn cx(&self) -> f32 {
        (self.left + self.right) / 2.
    }

    /// Returns the center y-coordinate of the bounding box.
    pub fn cy(&self) -> f32 {
        (self.top + self.bottom) / 2.
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &ArdBox) -> f32 {
        let left = self.left.max(other.left);
        let right = self.right.min(other.right);
        let top = self.top.max(other.top);
        let bottom = self.bottom.min(other.bottom);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &ArdBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Computes the intersection over union (IoU) between this bounding box and another.
    pub fn iou(&self, other: &ArdBox) -> f32 {
        let union = self.union(other);
        if union > 0. {
            self.intersect(other) / union
        } else {
            0.
        }
    }

    /// Maps the box into another pixel space by per-axis factors.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            left: self.left * sx,
            top: self.top * sy,
            right: self.right * sx,
            bottom: self.bottom * sy,
        }
    }

    pub fn as_x1y1_x2y2_i32(&self) -> (i32, i32, i32, i32) {
        (self.left.round() as i32,
         self.top.round() as i32,
         self.right.round() as i32,
         self.bottom.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = ArdBox::new(10., 10., 50., 50.);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou() {
        let a = ArdBox::new(0., 0., 10., 10.);
        let b = ArdBox::new(20., 20., 30., 30.);
        assert_eq!(a.intersect(&b), 0.);
        assert_eq!(a.iou(&b), 0.);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = ArdBox::new(0., 0., 10., 10.);
        let b = ArdBox::new(10., 0., 20., 10.);
        assert_eq!(a.iou(&b), 0.);
    }

    #[test]
    fn inverted_box_has_zero_area() {
        let a = ArdBox::new(10., 10., 0., 0.);
        assert_eq!(a.width(), 0.);
        assert_eq!(a.area(), 0.);
        assert_eq!(a.iou(&a), 0.);
    }

    #[test]
    fn half_overlap() {
        let a = ArdBox::new(0., 0., 10., 10.);
        let b = ArdBox::new(5., 0., 15., 10.);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1. / 3.).abs() < 1e-6);
    }

    #[test]
    fn center_size_round_trip() {
        let a = ArdBox::from_cxcy_wh(50., 40., 20., 10.);
        assert_eq!(a, ArdBox::new(40., 35., 60., 45.));
        assert_eq!(a.cx(), 50.);
        assert_eq!(a.cy(), 40.);
    }

    #[test]
    fn scaling_maps_each_axis() {
        let a = ArdBox::new(10., 20., 30., 40.).scaled(2., 0.5);
        assert_eq!(a, ArdBox::new(20., 10., 60., 20.));
        assert_eq!(a.as_x1y1_x2y2_i32(), (20, 10, 60, 20));
    }
}
