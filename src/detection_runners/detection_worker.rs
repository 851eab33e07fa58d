use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use anyhow::Context;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use crate::common::{ArdImage, DetectionResult};
use crate::data::send_channels::{detection_channels, DetectionState};
use crate::data::TimeCalc;
use crate::detection_runners::inference_backend::InferenceBackend;
use crate::detection_runners::ort_detector::ard_detector::ArdDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Frames waiting for the worker before `try_send` starts refusing them.
    pub frame_capacity: usize,
    /// Run detection on every n-th received frame, the others are dropped.
    pub process_every_n_frames: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            frame_capacity: 2,
            process_every_n_frames: 1,
        }
    }
}

/// A detector running on its own thread.
///
/// Frames go in through [`send`](Self::send), results come out of
/// [`recv`](Self::recv) in frame order. Dropping the worker closes the frame
/// channel and joins the thread.
#[derive(Debug)]
pub struct DetectionWorker {
    opt_tx: Option<Sender<Box<ArdImage>>>,
    det_rx: Receiver<Box<DetectionResult>>,
    handle: Option<JoinHandle<TimeCalc>>,
}

impl DetectionWorker {
    pub fn spawn<B>(detector: ArdDetector<B>, options: WorkerOptions) -> anyhow::Result<Self>
    where
        B: InferenceBackend + Send + 'static,
    {
        let (send_state, detection_state) = detection_channels(options.frame_capacity);
        let every_n = options.process_every_n_frames.max(1);
        let handle = std::thread::Builder::new()
            .name("ard-detect".to_string())
            .spawn(move || detection_loop(detector, detection_state, every_n))
            .context("Failed to spawn detection thread")?;

        Ok(Self {
            opt_tx: Some(send_state.opt_tx),
            det_rx: send_state.det_rx,
            handle: Some(handle),
        })
    }

    /// Queues a frame, blocking while the queue is full.
    pub fn send(&self, image: ArdImage) -> anyhow::Result<()> {
        let tx = self.opt_tx.as_ref().context("Detection worker is shut down")?;
        tx.send(Box::new(image))
            .map_err(|_| anyhow::anyhow!("Detection thread has exited"))
    }

    /// Queues a frame unless the queue is full. Returns whether it was queued.
    pub fn try_send(&self, image: ArdImage) -> anyhow::Result<bool> {
        let tx = self.opt_tx.as_ref().context("Detection worker is shut down")?;
        match tx.try_send(Box::new(image)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(anyhow::anyhow!("Detection thread has exited")),
        }
    }

    /// Next result, or `None` once the thread has exited and every result was read.
    pub fn recv(&self) -> Option<DetectionResult> {
        self.det_rx.recv().ok().map(|result| *result)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<DetectionResult> {
        match self.det_rx.recv_timeout(timeout) {
            Ok(result) => Some(*result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_recv(&self) -> Option<DetectionResult> {
        self.det_rx.try_recv().ok().map(|result| *result)
    }

    /// Closes the frame channel, waits for queued frames to be processed and
    /// returns the thread's timing history.
    pub fn shutdown(mut self) -> anyhow::Result<TimeCalc> {
        self.opt_tx.take();
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("Detection thread panicked")),
            None => Ok(TimeCalc::default()),
        }
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        self.opt_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detection thread panicked");
            }
        }
    }
}

fn detection_loop<B: InferenceBackend>(
    mut detector: ArdDetector<B>,
    detection_state: DetectionState,
    every_n: usize,
) -> TimeCalc {
    let mut timings = TimeCalc::default();
    let mut received: usize = 0;
    log::info!("Detection thread started, processing every {} frame(s)", every_n);

    loop {
        let ard_image = match detection_state.opt_rx.recv() {
            Ok(msg) => msg,
            Err(_) => {
                log::info!("Frame channel closed, stopping detection thread");
                break;
            }
        };
        received += 1;
        if (received - 1) % every_n != 0 {
            log::trace!("Skipping frame {}", received);
            continue;
        }

        let frame_start = Instant::now();
        let result = detector.detect(&ard_image);
        timings.push(frame_start.elapsed(), &result);

        if timings.n() % crate::data::TIMING_WINDOW == 0 {
            log::debug!("Avg frame {:.2} ms | avg inference {:.2} ms | {:.1} FPS over {} frames",
                timings.avg_frame_ms(), timings.avg_inference_ms(), timings.fps(), timings.n());
        }

        if detection_state.det_tx.send(Box::new(result)).is_err() {
            log::warn!("Result receiver dropped, stopping detection thread");
            break;
        }
    }

    timings
}
