use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::camera::{Camera, CameraError};
use crate::frame_buffer::{Frame, FrameBuffer};

/// Single cancellation signal shared by the capture thread and the main loop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Pull frames until shutdown is requested. Returns the number of frames pushed.
pub fn acquisition_loop<C: Camera + ?Sized>(
    camera: &mut C,
    buffer: &FrameBuffer<Frame>,
    shutdown: &ShutdownFlag,
    throttle: Duration,
) -> u64 {
    let mut seq = 0u64;

    while !shutdown.is_requested() {
        match camera.read() {
            Ok(image) => {
                if buffer.push(Frame::new(seq, image)).is_some() {
                    debug!("frame buffer full, dropped oldest frame");
                }
                seq += 1;
            }
            Err(e) => debug!("skipping frame: {e}"),
        }

        // Throttle to keep the producer from spinning
        thread::sleep(throttle);
    }

    seq
}

/// Owns the producer thread. The camera lives on that thread and is
/// released when the loop exits.
pub struct CaptureWorker {
    handle: Option<JoinHandle<u64>>,
    shutdown: ShutdownFlag,
}

impl CaptureWorker {
    /// Open the camera on a new thread and start pushing frames into `buffer`.
    ///
    /// Blocks until the camera is open; an open failure is returned here and
    /// no loop is started.
    pub fn spawn<C, F>(
        open: F,
        buffer: Arc<FrameBuffer<Frame>>,
        shutdown: ShutdownFlag,
        throttle: Duration,
    ) -> Result<Self, CameraError>
    where
        C: Camera + 'static,
        F: FnOnce() -> Result<C, CameraError> + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::channel();
        let thread_shutdown = shutdown.clone();

        let handle = thread::Builder::new()
            .name("frame-capture".to_string())
            .spawn(move || {
                let mut camera = match open() {
                    Ok(camera) => {
                        let _ = ready_tx.send(Ok(camera.name()));
                        camera
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return 0;
                    }
                };

                let frames = acquisition_loop(&mut camera, &buffer, &thread_shutdown, throttle);
                drop(camera);
                frames
            })
            .map_err(|e| CameraError::Unavailable(format!("failed to spawn capture thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(name)) => {
                info!("capturing from {name}");
                Ok(Self {
                    handle: Some(handle),
                    shutdown,
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CameraError::Unavailable(
                    "capture thread exited before opening the camera".to_string(),
                ))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal shutdown and wait for the capture thread to release the camera
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.request();
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(frames) => info!("capture stopped after {frames} frames"),
                Err(_) => error!("capture thread panicked"),
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
