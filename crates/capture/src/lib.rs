//! Mimic Capture
//!
//! Records mouse and keyboard input as a normalized event stream. Raw
//! device readings flow from a pluggable [`InputSource`] through the
//! [`Recorder`], which converts pointer positions to fractional
//! virtual-screen coordinates, stamps monotonic timestamps, drops
//! sub-threshold pointer noise, and tracks key hold durations.

pub mod recorder;
pub mod session;
pub mod source;

pub use recorder::Recorder;
pub use session::CaptureSession;
pub use source::{detect_best_source, InputSource, RawInput, ScriptedSource};
