use anyhow::Result;
use image::imageops;
use image::RgbImage;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraError};
use crate::capture::{CaptureWorker, ShutdownFlag};
use crate::config::PipelineConfig;
use crate::debounce::{DebounceState, Debouncer};
use crate::dispatch::{ActionEvent, Dispatcher};
use crate::fingers::{self, FingerState};
use crate::frame_buffer::{Frame, FrameBuffer};
use crate::gesture::{self, GestureLabel};
use crate::landmarks::LandmarkSource;
use crate::overlay;
use crate::preview::Display;

/// What happened to one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub fingers: Option<FingerState>,
    pub label: GestureLabel,
    pub event: Option<ActionEvent>,
}

/// Per-run state of the consumer side: debounce latch, dispatcher, a key
/// waiting out the dispatcher's pause and the action shown on screen.
pub struct GestureController {
    debouncer: Debouncer,
    dispatcher: Dispatcher,
    mirror: bool,
    pending: Option<ActionEvent>,
    shown_action: GestureLabel,
}

impl GestureController {
    pub fn new(dispatcher: Dispatcher, mirror: bool) -> Self {
        Self {
            debouncer: Debouncer::new(),
            dispatcher,
            mirror,
            pending: None,
            shown_action: GestureLabel::None,
        }
    }

    /// Run one frame through detection, classification, debounce and
    /// dispatch, drawing the overlay into `image`.
    pub fn process(
        &mut self,
        image: &mut RgbImage,
        source: &mut dyn LandmarkSource,
        now: Instant,
    ) -> FrameReport {
        if self.mirror {
            imageops::flip_horizontal_in_place(image);
        }

        let hand = match source.detect(image) {
            Ok(hand) => hand,
            Err(e) => {
                warn!("landmark detection failed: {e:#}");
                None
            }
        };

        let state = hand.as_ref().map(fingers::extract);
        let label = state.map_or(GestureLabel::None, gesture::classify);
        let event = self.observe(label, now);

        if let (Some(hand), Some(state)) = (&hand, state) {
            overlay::draw_hand(image, hand);
            overlay::draw_finger_state(image, state);
        }
        let caption = self.caption();
        if !caption.is_empty() {
            overlay::draw_label(image, &format!("Gesture: {caption}"));
        }

        FrameReport {
            fingers: state,
            label,
            event,
        }
    }

    /// Feed the debouncer every frame; the key press alone waits for the
    /// dispatcher's pause. Returns the event pressed on this frame.
    fn observe(&mut self, label: GestureLabel, now: Instant) -> Option<ActionEvent> {
        if let Some(event) = self.debouncer.update(label) {
            info!("gesture {} -> {}", event.label.as_str(), event.key.as_str());
            if let Some(dropped) = self.pending.replace(event) {
                debug!("{} superseded before its key was sent", dropped.label.as_str());
            }
        }

        if !self.dispatcher.is_ready(now) {
            return None;
        }

        let event = self.pending.take()?;
        if let Err(e) = self.dispatcher.dispatch(&event, now) {
            warn!("{e}, continuing");
        }
        self.shown_action = event.label;
        Some(event)
    }

    /// Name of the last emitted action, empty before the first one
    pub fn caption(&self) -> &'static str {
        self.shown_action.display_name()
    }

    /// Gesture currently held by the debouncer, `None` when idle
    pub fn latched(&self) -> GestureLabel {
        self.debouncer.last_emitted()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debouncer.state()
    }
}

/// Counters for one run of the main loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub hands: u64,
    pub events: Vec<ActionEvent>,
}

impl RunSummary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.fingers.is_some() {
            self.hands += 1;
        }
        if let Some(event) = report.event {
            self.events.push(event);
        }
    }
}

/// The running capture side plus the buffer the main loop drains.
pub struct Pipeline {
    buffer: Arc<FrameBuffer<Frame>>,
    shutdown: ShutdownFlag,
    worker: CaptureWorker,
    idle_sleep: Duration,
}

impl Pipeline {
    /// Open the camera and start the capture thread. Fails without starting
    /// anything if the camera cannot be opened.
    pub fn start<C, F>(open_camera: F, config: &PipelineConfig) -> crate::Result<Self>
    where
        C: Camera + 'static,
        F: FnOnce() -> Result<C, CameraError> + Send + 'static,
    {
        let buffer = Arc::new(FrameBuffer::new());
        let shutdown = ShutdownFlag::new();
        let worker = CaptureWorker::spawn(
            open_camera,
            Arc::clone(&buffer),
            shutdown.clone(),
            config.capture_throttle(),
        )?;

        Ok(Self {
            buffer,
            shutdown,
            worker,
            idle_sleep: config.idle_sleep(),
        })
    }

    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Drain frames until quit or shutdown, then stop the capture thread.
    pub fn run(
        self,
        controller: &mut GestureController,
        source: &mut dyn LandmarkSource,
        display: &mut dyn Display,
    ) -> Result<RunSummary> {
        let result = self.consume(controller, source, display);
        if result.is_err() {
            self.shutdown.request();
        }
        self.worker.stop();
        result
    }

    fn consume(
        &self,
        controller: &mut GestureController,
        source: &mut dyn LandmarkSource,
        display: &mut dyn Display,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        while !self.shutdown.is_requested() {
            if display.quit_requested() {
                info!("quit requested");
                self.shutdown.request();
                break;
            }

            match self.buffer.pop() {
                Some(mut frame) => {
                    let report = controller.process(&mut frame.image, source, Instant::now());
                    debug!(
                        "frame {}: fingers {:?}, label {}, latched {}",
                        frame.seq,
                        report.fingers.map(|f| f.to_string()),
                        report.label.as_str(),
                        controller.latched().as_str()
                    );
                    summary.record(&report);
                    display.show(&frame.image)?;
                }
                None => {
                    display.poll()?;
                    thread::sleep(self.idle_sleep);
                }
            }
        }

        Ok(summary)
    }
}
