//! Mimic Playback
//!
//! Replays a recording through an [`InputInjector`], reconstructing
//! inter-event timing and rendering pointer moves as synthesized
//! human-like motion. Cancellation is cooperative: a
//! [`PlaybackController`] handle can stop a running replay from another
//! thread, and held keys are always released on the way out.
//!
//! The real OS injector is behind the `enigo` feature; tests and
//! headless builds use [`ScriptedInjector`].

pub mod engine;
pub mod injector;
pub mod tuning;

pub use engine::{PlaybackController, PlaybackRun, Player};
pub use injector::{InjectedCall, InputInjector, ScriptedInjector};
#[cfg(feature = "enigo")]
pub use injector::EnigoInjector;
pub use tuning::{PlaybackTuning, RepeatOptions};
