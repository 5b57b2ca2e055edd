//! Mimic Motion Synthesis
//!
//! Turns a straight start→end displacement into motion that reads as
//! human: a curved path, eased per-segment timing, and bounded decaying
//! jitter. This crate is pure computation — no I/O, no platform
//! dependencies, and all randomness flows through a caller-supplied
//! [`rand::Rng`] so tests can pin a seed.

pub mod jitter;
pub mod path;
pub mod profile;
pub mod timing;

pub use jitter::jitter_path;
pub use path::synthesize_path;
pub use profile::MotionProfile;
pub use timing::synthesize_timing;
