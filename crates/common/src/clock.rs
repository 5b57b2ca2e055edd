//! Clock and precision-wait utilities.
//!
//! All Mimic recordings are anchored to a monotonic clock epoch captured
//! at recording start. Playback reconstructs inter-event delays from those
//! timestamps, and many of them fall below ordinary scheduler sleep
//! granularity (~10 ms on a loaded system), so this module also provides
//! a sub-millisecond precision wait.

use std::time::{Duration, Instant};

/// Margin before the deadline at which `precise_sleep` stops relying on
/// the OS scheduler and starts spinning.
const SPIN_MARGIN: Duration = Duration::from_millis(3);

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since recording start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

/// Sleep for `duration` with sub-millisecond accuracy.
///
/// Coarse-sleeps until shortly before the deadline, then spins on the
/// monotonic clock. The spin window is bounded by [`SPIN_MARGIN`], so CPU
/// burn stays small even for long waits.
pub fn precise_sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let deadline = Instant::now() + duration;
    if duration > SPIN_MARGIN {
        std::thread::sleep(duration - SPIN_MARGIN);
    }

    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}

/// [`precise_sleep`] taking fractional seconds; negative and zero values
/// return immediately.
pub fn precise_sleep_secs(secs: f64) {
    if secs > 0.0 {
        precise_sleep(Duration::from_secs_f64(secs));
    }
}
