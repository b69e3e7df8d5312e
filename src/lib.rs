//! # cardcrop
//!
//! Square photo cropping for profile pictures and business cards. A user pans
//! and zooms a photo inside a square viewport; the visible square is then cut
//! out of the full-resolution source and encoded at a fixed output size.
//!
//! The crate is the engine behind such an editor, with no UI toolkit attached:
//! the host forwards input and animation frames, and gets back the transform
//! to apply to its preview plus, on save, the encoded image.
//!
//! # Architecture
//!
//! ```text
//! input events ──▶ GestureTracker ──▶ CropTransform ──▶ FrameScheduler ──▶ preview
//!                                          ▲                  (once per frame)
//!          FaceLocator (background) ───────┘
//!                                          │ save
//!                                          ▼
//!                       visible_source_rect ──▶ ImageBackend ──▶ encoded bytes
//! ```
//!
//! All geometry lives in [`imaging::calculations`] as pure functions, so the
//! editor, the headless CLI and the tests agree on exactly the same numbers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | The crop editor: transform state, gestures, frame coalescing, face auto-centering, save/cancel |
//! | [`imaging`] | Crop geometry, the `ImageBackend` trait and its pure-Rust implementation, size-targeted encoding |
//! | [`session`] | JSON scripts of editor input, replayed headlessly |
//! | [`batch`] | Parallel profile-photo optimization over files and directories |
//! | [`config`] | `cardcrop.toml` loading, validation and stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Cover, Never Letterbox
//!
//! The scale never drops below the cover scale `max(V/W, V/H)`, and the pan
//! is clamped so the scaled image always covers the viewport. The saved square
//! therefore never contains anything outside the photo. Every mutation clamps,
//! and the offset is clamped once more right before each render and before
//! rasterizing.
//!
//! ## One Render Per Frame
//!
//! Touch and mouse devices can fire many move events per frame. Mutations only
//! set a pending flag; the host's frame callback renders the final state once.
//!
//! ## Face Detection Is Best-Effort
//!
//! Face detection is behind the [`editor::FaceLocator`] trait. A lookup that
//! finds nothing, or fails, leaves the transform exactly as it was.

pub mod batch;
pub mod config;
pub mod editor;
pub mod imaging;
pub mod output;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
