//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application settings.
///
/// This is the recognized option set of the playback/capture core. The
/// core reads these at engine construction; it never writes them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playback speed multiplier, clamped to [0.5, 2.0].
    pub playback_speed: f64,

    /// Direct-move jitter level, 0 disables, clamped to [0, 5].
    pub jitter_amount: u8,

    /// Delay before issuing a button press after arriving at the click
    /// position (seconds).
    pub hover_delay: f64,

    /// Replay moves through the Bezier path pipeline instead of jumping.
    pub human_like_mouse: bool,

    /// Blend between linear (0.0) and fully eased (1.0) motion timing.
    pub mouse_acceleration: f64,

    /// Path perturbation intensity; 0 disables the jitter model.
    pub micro_jitter: f64,

    /// Scales the Bezier arc deviation, clamped to [0.0, 1.0].
    /// 0.5 is the neutral tuning.
    pub path_smoothing: f64,

    /// Faster, straighter, lower-jitter motion profile.
    pub gaming_mode: bool,

    /// Symbolic key bound to start/stop-recording by the hotkey layer.
    pub start_key: String,

    /// Symbolic key bound to play/stop-playback by the hotkey layer.
    pub stop_key: String,

    /// Repeat-playback settings.
    pub repeat: RepeatSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Repeated-playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatSettings {
    /// Whether playback repeats at all.
    pub enabled: bool,

    /// Repeat until stopped rather than `count` times.
    pub infinite: bool,

    /// Number of passes when not infinite.
    pub count: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mimic=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playback_speed: 1.0,
            jitter_amount: 1,
            hover_delay: 0.3,
            human_like_mouse: true,
            mouse_acceleration: 0.5,
            micro_jitter: 0.5,
            path_smoothing: 0.5,
            gaming_mode: false,
            start_key: "[".to_string(),
            stop_key: "]".to_string(),
            repeat: RepeatSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RepeatSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            infinite: true,
            count: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl Settings {
    /// Load settings from the standard location, falling back to defaults.
    ///
    /// Out-of-range values are clamped rather than rejected.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str::<Settings>(&content) {
                    Ok(settings) => return settings.validated(),
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save settings to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Clamp every numeric option to its documented range.
    pub fn validated(mut self) -> Self {
        self.playback_speed = self.playback_speed.clamp(0.5, 2.0);
        self.jitter_amount = self.jitter_amount.min(5);
        self.hover_delay = self.hover_delay.clamp(0.0, 2.0);
        self.mouse_acceleration = self.mouse_acceleration.clamp(0.0, 1.0);
        self.micro_jitter = self.micro_jitter.clamp(0.0, 2.0);
        self.path_smoothing = self.path_smoothing.clamp(0.0, 1.0);
        self
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("mimic").join("config.json")
}
