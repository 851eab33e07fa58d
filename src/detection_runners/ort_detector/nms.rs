pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

/// Greedy non-maximum suppression, class agnostic.
///
/// Boxes are ordered by descending confidence (stable, so equal confidences keep
/// their input order). Walking that order, a box is kept unless its IoU with an
/// already kept box exceeds `iou_threshold`. Kept boxes stay in confidence order.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    if boxes.is_empty() {
        return;
    }

    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}
