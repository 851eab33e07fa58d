use crate::common::{ArdImage, DetectionResult};

/// Worker side of a detection thread.
#[derive(Debug)]
pub struct DetectionState {
    pub opt_rx: crossbeam_channel::Receiver<Box<ArdImage>>,
    pub det_tx: crossbeam_channel::Sender<Box<DetectionResult>>,
}

/// Caller side of a detection thread.
#[derive(Debug)]
pub struct SendState {
    pub opt_tx: crossbeam_channel::Sender<Box<ArdImage>>,
    pub det_rx: crossbeam_channel::Receiver<Box<DetectionResult>>,
}

/// Bounded frame queue and unbounded result queue.
pub fn detection_channels(frame_capacity: usize) -> (SendState, DetectionState) {
    let (opt_tx, opt_rx) = crossbeam_channel::bounded(frame_capacity.max(1));
    let (det_tx, det_rx) = crossbeam_channel::unbounded();
    (SendState { opt_tx, det_rx }, DetectionState { opt_rx, det_tx })
}
