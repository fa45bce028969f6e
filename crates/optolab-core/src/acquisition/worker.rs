use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::acquisition::camera::SharedCamera;
use crate::acquisition::error::HardwareError;
use crate::acquisition::frame::FrameSlot;
use crate::event::{AcquisitionEvent, AppEvent, EventSender, Generation, StopReason};

/// How long `stop` waits for the grab loop to acknowledge
pub const STOP_TIMEOUT: Duration = Duration::from_millis(500);

const GRAB_PAUSE: Duration = Duration::from_millis(1);

/// Background thread running the blocking grab loop of one camera.
///
/// `start_grab` is issued on the calling thread before the loop is spawned so
/// that a failure surfaces to the controller directly. The loop stores every
/// frame in the shared [`FrameSlot`] and announces it on the event bus; it
/// never touches widgets. When it leaves (cancelled or on a hardware error) it
/// calls `stop_grab`, acknowledges to [`LiveWorker::stop`], then posts
/// [`AcquisitionEvent::Stopped`].
pub struct LiveWorker {
    generation: Generation,
    cancel: Arc<AtomicBool>,
    ack_rx: mpsc::Receiver<StopReason>,
    handle: Option<JoinHandle<()>>,
    stopped: Option<StopReason>,
    /// Set once a stop timed out; the thread is left to finish on its own
    abandoned: bool,
}

impl LiveWorker {
    pub fn start(
        camera: SharedCamera,
        frames: FrameSlot,
        events: EventSender,
        generation: Generation,
    ) -> Result<Self, HardwareError> {
        camera.lock().start_grab()?;

        let cancel = Arc::new(AtomicBool::new(false));
        let (ack_tx, ack_rx) = mpsc::channel();
        let loop_cancel = Arc::clone(&cancel);
        let loop_camera = Arc::clone(&camera);

        let spawned = thread::Builder::new()
            .name(format!("optolab-live-{}", generation))
            .spawn(move || {
                let reason = grab_loop(&loop_camera, &frames, &events, generation, &loop_cancel);
                if let Err(e) = loop_camera.lock().stop_grab() {
                    log::warn!("stop_grab failed while leaving acquisition loop: {}", e);
                }
                let _ = ack_tx.send(reason.clone());
                let stopped = AppEvent::Acquisition {
                    generation,
                    event: AcquisitionEvent::Stopped { reason },
                };
                if let Err(e) = events.send(stopped) {
                    log::debug!("Acquisition stop not delivered: {}", e);
                }
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                if let Err(stop_err) = camera.lock().stop_grab() {
                    log::warn!("stop_grab failed after spawn error: {}", stop_err);
                }
                return Err(HardwareError::WorkerSpawn(e.to_string()));
            }
        };

        log::debug!("Live worker started (generation {})", generation);
        Ok(Self { generation, cancel, ack_rx, handle: Some(handle), stopped: None, abandoned: false })
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the grab loop is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Reason the loop ended, if it already has. Does not request cancellation.
    ///
    /// The loop acknowledges before posting `Stopped`, so a controller
    /// handling that event can tell whether it came from this worker.
    pub fn poll_stopped(&mut self) -> Option<StopReason> {
        if let Some(reason) = &self.stopped {
            return Some(reason.clone());
        }
        let reason = match self.ack_rx.try_recv() {
            Ok(reason) => reason,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => {
                StopReason::Error("acquisition thread terminated unexpectedly".into())
            }
        };
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Live worker thread panicked after acknowledging stop");
            }
        }
        self.stopped = Some(reason.clone());
        Some(reason)
    }

    /// Request cancellation and wait up to [`STOP_TIMEOUT`] for the acknowledgement.
    ///
    /// The caller must not hold the camera lock. Once this returns `Ok` the
    /// camera has left grabbing mode and may be closed or reconfigured. After
    /// a timeout the worker is abandoned: later calls and the drop only check
    /// for a late acknowledgement and never wait again.
    pub fn stop(&mut self) -> Result<StopReason, HardwareError> {
        self.stop_with_timeout(STOP_TIMEOUT)
    }

    pub fn stop_with_timeout(&mut self, timeout: Duration) -> Result<StopReason, HardwareError> {
        if let Some(reason) = &self.stopped {
            return Ok(reason.clone());
        }
        if self.abandoned {
            return self.poll_stopped().ok_or(HardwareError::StopTimeout(timeout));
        }
        self.cancel.store(true, Ordering::Release);

        match self.ack_rx.recv_timeout(timeout) {
            Ok(reason) => {
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        log::error!("Live worker thread panicked after acknowledging stop");
                    }
                }
                log::debug!("Live worker stopped (generation {}): {}", self.generation, reason);
                self.stopped = Some(reason.clone());
                Ok(reason)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // Thread died without acknowledging (panic inside the binding)
                self.handle.take();
                let reason = StopReason::Error("acquisition thread terminated unexpectedly".into());
                self.stopped = Some(reason.clone());
                Ok(reason)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("Live worker did not stop within {:?}, abandoning it", timeout);
                self.abandoned = true;
                Err(HardwareError::StopTimeout(timeout))
            }
        }
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        if self.stopped.is_some() {
            return;
        }
        if self.abandoned {
            // Detach: the loop sees the cancel flag once its grab returns
            if self.poll_stopped().is_none() {
                log::warn!("Leaving live worker (generation {}) to finish in the background", self.generation);
            }
            return;
        }
        if let Err(e) = self.stop() {
            log::warn!("Dropping live worker that is still running: {}", e);
        }
    }
}

impl std::fmt::Debug for LiveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveWorker")
            .field("generation", &self.generation)
            .field("running", &self.is_running())
            .field("stopped", &self.stopped)
            .field("abandoned", &self.abandoned)
            .finish()
    }
}

fn grab_loop(
    camera: &SharedCamera,
    frames: &FrameSlot,
    events: &EventSender,
    generation: Generation,
    cancel: &AtomicBool,
) -> StopReason {
    loop {
        if cancel.load(Ordering::Acquire) {
            return StopReason::ByUser;
        }
        let grabbed = camera.lock().get_frame();
        match grabbed {
            Ok(frame) => {
                let sequence = frames.store(frame);
                let ready = AppEvent::Acquisition {
                    generation,
                    event: AcquisitionEvent::FrameReady { sequence },
                };
                if events.send(ready).is_err() {
                    // UI loop is gone, nobody left to show frames to
                    return StopReason::ByUser;
                }
            }
            Err(e) => {
                log::error!("Acquisition error: {}", e);
                return StopReason::Error(e.to_string());
            }
        }
        thread::sleep(GRAB_PAUSE);
    }
}
