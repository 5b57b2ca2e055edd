//! Mimic Recording Model
//!
//! The data model shared by capture and playback: typed input events with
//! monotonic timestamps, resolution-independent virtual-screen geometry,
//! and the serialized recording container.
//!
//! All pointer coordinates are fractional, normalized to `[0.0, 1.0]`
//! relative to the full multi-monitor virtual-screen bounds.

pub mod event;
pub mod geometry;
pub mod recording;

pub use event::{normalize_key, InputEvent, MouseButton, Seconds};
pub use geometry::{Point2D, VirtualScreen};
pub use recording::Recording;
