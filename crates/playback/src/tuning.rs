//! Playback tuning derived from user settings.

use mimic_common::config::{RepeatSettings, Settings};

/// The settings slice the playback engine consumes, validated and with
/// gaming-mode overrides applied per recording.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackTuning {
    /// Speed multiplier for reconstructed delays, 0.5 to 2.0.
    pub speed: f64,

    /// 0 disables the small random offsets on direct moves and waits.
    pub jitter_amount: u8,

    /// Base pause between positioning on a target and pressing (seconds).
    pub hover_delay: f64,

    /// Render moves as synthesized motion instead of direct warps.
    pub human_like_mouse: bool,

    /// Ease blend for synthesized timing, 0 linear to 1 full ease.
    pub mouse_acceleration: f64,

    /// Path jitter setting, scaled into an amplitude by the profile.
    pub micro_jitter: f64,

    /// Arc scale for synthesized paths, 0.5 neutral.
    pub path_smoothing: f64,
}

impl PlaybackTuning {
    pub fn from_settings(settings: &Settings) -> Self {
        let settings = settings.clone().validated();
        Self {
            speed: settings.playback_speed,
            jitter_amount: settings.jitter_amount,
            hover_delay: settings.hover_delay,
            human_like_mouse: settings.human_like_mouse,
            mouse_acceleration: settings.mouse_acceleration,
            micro_jitter: settings.micro_jitter,
            path_smoothing: settings.path_smoothing,
        }
    }

    /// Overrides applied when the recording was made in gaming mode:
    /// tighter hover and jitter, capped acceleration, and a smoothing
    /// floor so paths stay renderable at gaming arc factors.
    pub fn with_gaming_overrides(mut self) -> Self {
        self.path_smoothing = self.path_smoothing.max(0.3);
        self.mouse_acceleration = self.mouse_acceleration.min(0.6);
        self.micro_jitter = self.micro_jitter.min(0.05);
        self.hover_delay = self.hover_delay.min(0.05);
        self
    }

    /// Tuning tailored to a recording's mode flag.
    pub fn for_recording(settings: &Settings, gaming_mode: bool) -> Self {
        let tuning = Self::from_settings(settings);
        if gaming_mode {
            tuning.with_gaming_overrides()
        } else {
            tuning
        }
    }
}

impl Default for PlaybackTuning {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// How many times to run a recording.
#[derive(Debug, Clone, Copy)]
pub struct RepeatOptions {
    pub enabled: bool,
    pub infinite: bool,
    pub count: u32,
}

impl RepeatOptions {
    /// A single pass, no repetition.
    pub fn once() -> Self {
        Self {
            enabled: false,
            infinite: false,
            count: 1,
        }
    }

    pub fn times(count: u32) -> Self {
        Self {
            enabled: true,
            infinite: false,
            count,
        }
    }

    pub fn infinite() -> Self {
        Self {
            enabled: true,
            infinite: true,
            count: 0,
        }
    }

    /// Number of passes, `None` for unbounded.
    pub fn passes(&self) -> Option<u32> {
        if !self.enabled {
            Some(1)
        } else if self.infinite {
            None
        } else {
            Some(self.count.max(1))
        }
    }
}

impl From<&RepeatSettings> for RepeatOptions {
    fn from(settings: &RepeatSettings) -> Self {
        Self {
            enabled: settings.enabled,
            infinite: settings.infinite,
            count: settings.count,
        }
    }
}
