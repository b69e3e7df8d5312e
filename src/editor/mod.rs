//! Interactive photo crop editor, without a UI toolkit.
//!
//! A host UI owns one [`CropEditor`] per editing session and forwards to it:
//!
//! - viewport size changes ([`CropEditor::set_viewport`]),
//! - pointer, touch and wheel input ([`CropEditor::handle`]),
//! - animation-frame callbacks ([`CropEditor::tick`]), which return the
//!   transform to apply to the preview at most once per frame,
//! - button presses: reset, auto-center on a face, save, cancel.
//!
//! ```text
//! Uninitialized ──layout ready──▶ Ready ◀──gesture / reset / auto-center──┐
//!                                   │  └──────────────────────────────────┘
//!                                   ├──save──▶ Rasterized
//!                                   └──close─▶ Discarded
//! ```
//!
//! `close` is also accepted before the editor is ready. Both terminal states
//! are final: later input, ticks and saves are ignored.
//!
//! ## Face requests
//!
//! Auto-centering is single-flight. [`CropEditor::request_auto_center`] runs
//! the locator on its own thread and the result is picked up by the next
//! `tick`; [`CropEditor::auto_center`] runs it inline. A request made while
//! another one is outstanding is ignored. Closing the editor drops the
//! receiving end, so a late result is never applied.

pub mod face;
pub mod gesture;
pub mod scheduler;
pub mod transform;

pub use face::{FaceLocator, FaceLocatorError, FacePosition, FixedFaceLocator, NoFaceLocator};
pub use gesture::{Gesture, GestureTracker, InputEvent, MouseButton, Point, WheelSteps};
pub use scheduler::FrameScheduler;
pub use transform::{CropTransform, MAX_ZOOM, PreviewTransform};

use crate::imaging::{
    BackendError, Dimensions, EncodedImage, ImageBackend, OutputSettings, rasterize_crop,
};
use image::DynamicImage;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Rasterization failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Tunables of the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub max_zoom: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    /// Zoom on top of the cover scale when centering a face.
    pub face_zoom_bias: f64,
    /// Frames to wait for a usable viewport before giving up.
    pub layout_retry_limit: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_zoom: MAX_ZOOM,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            face_zoom_bias: 1.2,
            layout_retry_limit: 120,
        }
    }
}

impl EditorSettings {
    fn wheel(&self) -> WheelSteps {
        WheelSteps {
            zoom_in: self.wheel_zoom_in,
            zoom_out: self.wheel_zoom_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Uninitialized,
    Ready,
    Rasterized,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Uninitialized { attempts: u32, gave_up: bool },
    Ready(CropTransform),
    Rasterized,
    Discarded,
}

/// What one animation frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// The editor reached a terminal state.
    Closed,
    /// The viewport has no size yet; retry next frame.
    AwaitingLayout,
    /// The retry limit was reached; waits for [`CropEditor::set_viewport`].
    LayoutUnavailable,
    /// Nothing changed since the last render.
    Idle,
    /// Apply this transform to the preview.
    Rendered(PreviewTransform),
}

/// Outcome of an inline auto-center.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoCenter {
    Applied(PreviewTransform),
    NotFound,
    Failed(String),
    /// Not ready, already closed, or another request is outstanding.
    Skipped,
}

type FaceResult = Result<Option<FacePosition>, FaceLocatorError>;

/// One editing session over one source image.
pub struct CropEditor {
    image: Arc<DynamicImage>,
    source: Dimensions,
    settings: EditorSettings,
    viewport: f64,
    state: State,
    gestures: GestureTracker,
    frames: FrameScheduler,
    face_request: Option<Receiver<FaceResult>>,
    face_requests_started: u64,
    last_render: Option<PreviewTransform>,
    renders: u64,
}

impl CropEditor {
    pub fn new(image: DynamicImage, settings: EditorSettings) -> Self {
        Self::from_shared(Arc::new(image), settings)
    }

    /// Start a session on an image that is shared with other owners.
    pub fn from_shared(image: Arc<DynamicImage>, settings: EditorSettings) -> Self {
        let source = Dimensions::of(&image);
        Self {
            image,
            source,
            settings,
            viewport: 0.0,
            state: State::Uninitialized {
                attempts: 0,
                gave_up: false,
            },
            gestures: GestureTracker::new(),
            frames: FrameScheduler::new(),
            face_request: None,
            face_requests_started: 0,
            last_render: None,
            renders: 0,
        }
    }

    pub fn phase(&self) -> EditorPhase {
        match self.state {
            State::Uninitialized { .. } => EditorPhase::Uninitialized,
            State::Ready(_) => EditorPhase::Ready,
            State::Rasterized => EditorPhase::Rasterized,
            State::Discarded => EditorPhase::Discarded,
        }
    }

    pub fn source(&self) -> Dimensions {
        self.source
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The live transform, once the editor is ready.
    pub fn transform(&self) -> Option<&CropTransform> {
        match &self.state {
            State::Ready(transform) => Some(transform),
            _ => None,
        }
    }

    /// Transform applied by the most recent render.
    pub fn last_render(&self) -> Option<PreviewTransform> {
        self.last_render
    }

    /// Number of renders applied so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn render_pending(&self) -> bool {
        self.frames.is_pending()
    }

    /// Busy indicator for the auto-center button.
    pub fn is_locating_face(&self) -> bool {
        self.face_request.is_some()
    }

    /// Number of face locator invocations started.
    pub fn face_requests_started(&self) -> u64 {
        self.face_requests_started
    }

    fn is_terminal(&self) -> bool {
        matches!(self.state, State::Rasterized | State::Discarded)
    }

    /// Report the laid-out viewport side.
    ///
    /// Before initialization a usable size initializes the editor right away
    /// and restarts the retry budget. Afterwards the cover scale is
    /// recomputed and the transform re-clamped.
    pub fn set_viewport(&mut self, viewport: f64) -> Option<PreviewTransform> {
        self.viewport = viewport;
        if let State::Ready(transform) = &mut self.state {
            transform.set_viewport(viewport);
            self.frames.schedule();
            return None;
        }
        if self.is_terminal() {
            return None;
        }
        self.state = State::Uninitialized {
            attempts: 0,
            gave_up: false,
        };
        self.try_initialize()
    }

    fn try_initialize(&mut self) -> Option<PreviewTransform> {
        let transform = CropTransform::new(self.source, self.viewport, self.settings.max_zoom)?;
        debug!(
            "editor ready: {}x{} source, {}px viewport, min scale {:.4}",
            self.source.width,
            self.source.height,
            self.viewport,
            transform.min_scale()
        );
        self.state = State::Ready(transform);
        self.render_now()
    }

    fn render_now(&mut self) -> Option<PreviewTransform> {
        let State::Ready(transform) = &mut self.state else {
            return None;
        };
        let preview = transform.preview();
        self.last_render = Some(preview);
        self.renders += 1;
        Some(preview)
    }

    /// Feed one input event. Returns `true` if it changed the transform.
    ///
    /// Input is ignored until the editor is ready and after it is closed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        let wheel = self.settings.wheel();
        let State::Ready(transform) = &mut self.state else {
            return false;
        };
        let Some(gesture) = self.gestures.interpret(event, wheel) else {
            return false;
        };
        match gesture {
            Gesture::Pan { dx, dy } => transform.pan_by(dx, dy),
            Gesture::Zoom { factor } => transform.zoom_by(factor),
        }
        self.frames.schedule();
        true
    }

    /// Back to cover scale, centered, rendered immediately.
    pub fn reset(&mut self) -> Option<PreviewTransform> {
        let State::Ready(transform) = &mut self.state else {
            return None;
        };
        transform.reset();
        self.render_now()
    }

    /// Animation-frame callback.
    pub fn tick(&mut self) -> Frame {
        match self.state {
            State::Rasterized | State::Discarded => Frame::Closed,
            State::Uninitialized { gave_up: true, .. } => Frame::LayoutUnavailable,
            State::Uninitialized { attempts, .. } => {
                if let Some(preview) = self.try_initialize() {
                    return Frame::Rendered(preview);
                }
                let attempts = attempts + 1;
                let gave_up = attempts >= self.settings.layout_retry_limit;
                self.state = State::Uninitialized { attempts, gave_up };
                if gave_up {
                    warn!("viewport still has no size after {attempts} frames; waiting for a resize");
                    Frame::LayoutUnavailable
                } else {
                    if attempts == 1 {
                        debug!("viewport not laid out yet; retrying every frame");
                    }
                    Frame::AwaitingLayout
                }
            }
            State::Ready(_) => {
                let face_applied = matches!(self.poll_face_request(), Some(AutoCenter::Applied(_)));
                let pending = self.frames.take();
                if face_applied || pending {
                    self.render_now().map_or(Frame::Idle, Frame::Rendered)
                } else {
                    Frame::Idle
                }
            }
        }
    }

    /// Start a background face lookup.
    ///
    /// Returns `false` without calling the locator when the editor is not
    /// ready or a lookup is already outstanding.
    pub fn request_auto_center(&mut self, locator: Arc<dyn FaceLocator>) -> bool {
        if !matches!(self.state, State::Ready(_)) || self.face_request.is_some() {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        let image = Arc::clone(&self.image);
        std::thread::spawn(move || {
            let result = locator.locate(&image);
            if tx.send(result).is_err() {
                debug!("face lookup finished after the editor closed; result discarded");
            }
        });
        self.face_request = Some(rx);
        self.face_requests_started += 1;
        true
    }

    /// Apply a finished background lookup, if there is one.
    fn poll_face_request(&mut self) -> Option<AutoCenter> {
        let received = match self.face_request.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(FaceLocatorError::Failed(
                "locator thread ended without a result".into(),
            )),
        };
        self.face_request = None;
        Some(self.apply_face_result(received))
    }

    /// Look up a face inline and center on it.
    pub fn auto_center(&mut self, locator: &dyn FaceLocator) -> AutoCenter {
        if !matches!(self.state, State::Ready(_)) || self.face_request.is_some() {
            return AutoCenter::Skipped;
        }
        self.face_requests_started += 1;
        let result = locator.locate(&self.image);
        match self.apply_face_result(result) {
            AutoCenter::Applied(_) => self
                .render_now()
                .map_or(AutoCenter::Skipped, AutoCenter::Applied),
            other => other,
        }
    }

    /// Center on a located face. Anything but a found face leaves the
    /// transform untouched. Does not render.
    fn apply_face_result(&mut self, result: FaceResult) -> AutoCenter {
        let bias = self.settings.face_zoom_bias;
        let State::Ready(transform) = &mut self.state else {
            return AutoCenter::Skipped;
        };
        match result {
            Ok(Some(face)) if !face.is_finite() => {
                warn!("locator returned face at {},{}; transform unchanged", face.x, face.y);
                AutoCenter::Failed(format!(
                    "face position {},{} is not a finite percentage",
                    face.x, face.y
                ))
            }
            Ok(Some(face)) => {
                let face = face.clamped();
                transform.center_on(face.as_tuple(), bias);
                debug!(
                    "centered on face at {:.1}%,{:.1}% (scale {:.4})",
                    face.x,
                    face.y,
                    transform.scale()
                );
                AutoCenter::Applied(transform.preview())
            }
            Ok(None) => {
                debug!("no face found; transform unchanged");
                AutoCenter::NotFound
            }
            Err(e) => {
                warn!("{e}; transform unchanged");
                AutoCenter::Failed(e.to_string())
            }
        }
    }

    /// Cancel the session. Pending frames and face lookups are dropped.
    pub fn close(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.finish(State::Discarded);
    }

    fn finish(&mut self, state: State) {
        self.state = state;
        self.frames.cancel();
        self.face_request = None;
        self.gestures.clear();
    }

    /// Rasterize the visible square and end the session.
    ///
    /// Returns `Ok(None)` when there is nothing to save (not ready yet, or
    /// already closed). On an imaging error the session stays open so the
    /// caller can retry.
    pub fn save(
        &mut self,
        backend: &impl ImageBackend,
        output: &OutputSettings,
    ) -> Result<Option<EncodedImage>, EditorError> {
        let State::Ready(transform) = &mut self.state else {
            debug!("save ignored in {:?} phase", self.phase());
            return Ok(None);
        };
        transform.clamp_offset();
        let rect = transform.source_rect();
        let encoded = rasterize_crop(backend, &self.image, rect, output)?;
        debug!(
            "saved {}x{} {} ({} bytes) from source square {:.1},{:.1} size {:.1}",
            encoded.width,
            encoded.height,
            encoded.format.extension(),
            encoded.bytes.len(),
            rect.x,
            rect.y,
            rect.size
        );
        self.finish(State::Rasterized);
        Ok(Some(encoded))
    }
}
