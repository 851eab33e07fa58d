use std::collections::VecDeque;
use std::time::Duration;
use crate::common::DetectionResult;

pub const TIMING_WINDOW: usize = 30;

/// Rolling frame/inference timings over the last few detections.
///
/// Owned by whoever drives the detector; the detector itself keeps no history.
#[derive(Debug, Clone)]
pub struct TimeCalc {
    window: usize,
    frame_ms: VecDeque<f64>,
    inference_ms: VecDeque<f64>,
}

impl Default for TimeCalc {
    fn default() -> Self {
        Self::with_window(TIMING_WINDOW)
    }
}

impl TimeCalc {
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            frame_ms: VecDeque::with_capacity(window + 1),
            inference_ms: VecDeque::with_capacity(window + 1),
        }
    }

    /// Records one frame. Failed inferences count toward frame time only.
    pub fn push(&mut self, frame_time: Duration, result: &DetectionResult) {
        self.frame_ms.push_back(frame_time.as_secs_f64() * 1000.);
        if self.frame_ms.len() > self.window {
            self.frame_ms.pop_front();
        }

        if !result.inference_failed() {
            self.inference_ms.push_back(result.inference_time_ms);
            if self.inference_ms.len() > self.window {
                self.inference_ms.pop_front();
            }
        }
    }

    pub fn n(&self) -> usize {
        self.frame_ms.len()
    }

    pub fn avg_frame_ms(&self) -> f64 {
        Self::mean(&self.frame_ms)
    }

    pub fn avg_inference_ms(&self) -> f64 {
        Self::mean(&self.inference_ms)
    }

    pub fn fps(&self) -> f64 {
        let avg = self.avg_frame_ms();
        if avg > 0. { 1000. / avg } else { 0. }
    }

    pub fn clear(&mut self) {
        self.frame_ms.clear();
        self.inference_ms.clear();
    }

    fn mean(xs: &VecDeque<f64>) -> f64 {
        if xs.is_empty() {
            return 0.;
        }
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}
