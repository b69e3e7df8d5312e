//! Scripted editing sessions.
//!
//! A session is a JSON file describing what a user did in the editor, so a
//! crop can be reproduced headlessly (`cardcrop crop --session`):
//!
//! ```json
//! {
//!   "viewport": 320,
//!   "steps": [
//!     { "step": "gesture", "events": [
//!         { "type": "touch_start", "touches": [{ "x": 10, "y": 10 }] },
//!         { "type": "touch_move",  "touches": [{ "x": 40, "y": 12 }] },
//!         { "type": "touch_end" }
//!     ] },
//!     { "step": "auto_center" },
//!     { "step": "resize", "viewport": 400 },
//!     { "step": "frame" }
//!   ]
//! }
//! ```
//!
//! Each `gesture` and `resize` step is followed by one animation frame, the
//! way a browser would render between input batches.

use crate::editor::{AutoCenter, CropEditor, FaceLocator, Frame, InputEvent, PreviewTransform};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid session file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    /// Viewport side to lay out before the first step.
    #[serde(default)]
    pub viewport: Option<f64>,
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SessionStep {
    Gesture { events: Vec<InputEvent> },
    Frame,
    Reset,
    Resize { viewport: f64 },
    AutoCenter,
}

/// What happened while replaying.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub steps: usize,
    pub events: usize,
    /// Events that changed the transform.
    pub gestures: usize,
    pub frames_rendered: usize,
    pub auto_center: Vec<AutoCenter>,
    pub last_render: Option<PreviewTransform>,
}

impl ReplayReport {
    fn record_frame(&mut self, frame: Frame) {
        if let Frame::Rendered(preview) = frame {
            self.frames_rendered += 1;
            self.last_render = Some(preview);
        }
    }
}

pub fn load_session(path: &Path) -> Result<Session, SessionError> {
    let content = std::fs::read_to_string(path)?;
    parse_session(&content)
}

pub fn parse_session(content: &str) -> Result<Session, SessionError> {
    Ok(serde_json::from_str(content)?)
}

/// Apply a session to an editor.
///
/// `auto_center` steps run the locator inline; without a locator they are
/// recorded as [`AutoCenter::Skipped`].
pub fn replay(
    editor: &mut CropEditor,
    session: &Session,
    locator: Option<&dyn FaceLocator>,
) -> ReplayReport {
    let mut report = ReplayReport::default();

    if let Some(viewport) = session.viewport {
        if let Some(preview) = editor.set_viewport(viewport) {
            report.frames_rendered += 1;
            report.last_render = Some(preview);
        }
    }

    for step in &session.steps {
        report.steps += 1;
        match step {
            SessionStep::Gesture { events } => {
                for event in events {
                    report.events += 1;
                    if editor.handle(event) {
                        report.gestures += 1;
                    }
                }
                report.record_frame(editor.tick());
            }
            SessionStep::Frame => report.record_frame(editor.tick()),
            SessionStep::Reset => {
                if let Some(preview) = editor.reset() {
                    report.frames_rendered += 1;
                    report.last_render = Some(preview);
                }
            }
            SessionStep::Resize { viewport } => {
                if let Some(preview) = editor.set_viewport(*viewport) {
                    report.frames_rendered += 1;
                    report.last_render = Some(preview);
                }
                report.record_frame(editor.tick());
            }
            SessionStep::AutoCenter => {
                let outcome = match locator {
                    Some(locator) => editor.auto_center(locator),
                    None => AutoCenter::Skipped,
                };
                if let AutoCenter::Applied(preview) = &outcome {
                    report.frames_rendered += 1;
                    report.last_render = Some(*preview);
                }
                report.auto_center.push(outcome);
            }
        }
    }

    debug!(
        "replayed {} steps ({} events, {} renders)",
        report.steps, report.events, report.frames_rendered
    );
    report
}
