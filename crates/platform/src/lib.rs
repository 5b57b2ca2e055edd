//! Mimic platform contracts.
//!
//! Cross-platform display data structures and the virtual-screen query
//! used by capture and playback, without coupling either to a concrete
//! OS backend. Playback deliberately re-queries geometry at start rather
//! than trusting the geometry stored in a recording, so recordings made
//! on one monitor layout replay correctly on another.

use serde::{Deserialize, Serialize};

use mimic_common::error::MimicResult;
use mimic_recording_model::VirtualScreen;

/// Information about a connected monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorInfo {
    /// Monitor name/identifier.
    pub name: String,
    /// Resolution in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Position in the virtual desktop (pixels).
    pub x: i32,
    pub y: i32,
    /// Scale factor (for example 1.0, 1.25, 2.0).
    pub scale_factor: f64,
    /// Whether this monitor is primary.
    pub primary: bool,
}

/// Display server / platform family used for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayServer {
    Wayland,
    X11,
    Windows,
    MacOS,
    #[default]
    Unknown,
}

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    if cfg!(target_os = "windows") {
        DisplayServer::Windows
    } else if cfg!(target_os = "macos") {
        DisplayServer::MacOS
    } else if std::env::var("WAYLAND_DISPLAY").is_ok() {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").is_ok() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

/// Detect connected monitors.
pub fn detect_monitors() -> MimicResult<Vec<MonitorInfo>> {
    tracing::debug!("Detecting monitors");

    // TODO: query xrandr/the compositor instead of assuming a single
    // 1080p monitor.
    Ok(vec![MonitorInfo {
        name: "default".to_string(),
        width: 1920,
        height: 1080,
        x: 0,
        y: 0,
        scale_factor: 1.0,
        primary: true,
    }])
}

/// Compute the virtual screen spanning all connected monitors.
pub fn virtual_screen_bounds(monitors: &[MonitorInfo]) -> VirtualScreen {
    if monitors.is_empty() {
        return VirtualScreen::default();
    }

    let min_x = monitors.iter().map(|m| m.x).min().unwrap_or(0);
    let min_y = monitors.iter().map(|m| m.y).min().unwrap_or(0);
    let max_x = monitors
        .iter()
        .map(|m| m.x + m.width as i32)
        .max()
        .unwrap_or(1920);
    let max_y = monitors
        .iter()
        .map(|m| m.y + m.height as i32)
        .max()
        .unwrap_or(1080);

    VirtualScreen::new(
        (max_x - min_x).max(1) as u32,
        (max_y - min_y).max(1) as u32,
        min_x,
        min_y,
    )
}

/// Query the current virtual screen.
pub fn current_virtual_screen() -> MimicResult<VirtualScreen> {
    Ok(virtual_screen_bounds(&detect_monitors()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, width: u32, height: u32, x: i32, y: i32) -> MonitorInfo {
        MonitorInfo {
            name: name.to_string(),
            width,
            height,
            x,
            y,
            scale_factor: 1.0,
            primary: x == 0 && y == 0,
        }
    }

    #[test]
    fn test_single_monitor_bounds() {
        let screen = virtual_screen_bounds(&[monitor("a", 1920, 1080, 0, 0)]);
        assert_eq!(screen, VirtualScreen::new(1920, 1080, 0, 0));
    }

    #[test]
    fn test_side_by_side_monitors() {
        let screen = virtual_screen_bounds(&[
            monitor("a", 1920, 1080, 0, 0),
            monitor("b", 2560, 1440, 1920, 0),
        ]);
        assert_eq!(screen, VirtualScreen::new(4480, 1440, 0, 0));
    }

    #[test]
    fn test_monitor_left_of_primary_gives_negative_origin() {
        let screen = virtual_screen_bounds(&[
            monitor("a", 1920, 1080, 0, 0),
            monitor("b", 1920, 1080, -1920, 0),
        ]);
        assert_eq!(screen, VirtualScreen::new(3840, 1080, -1920, 0));
    }

    #[test]
    fn test_empty_monitor_list_falls_back() {
        let screen = virtual_screen_bounds(&[]);
        assert_eq!(screen, VirtualScreen::default());
    }
}
