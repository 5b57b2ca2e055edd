//! Virtual-screen geometry and fractional coordinates.
//!
//! The virtual screen is the bounding rectangle spanning all connected
//! monitors. Recorded positions are stored as fractions of it, so a
//! recording replays correctly on a different resolution or monitor
//! layout: fractional coordinates are re-anchored against the *current*
//! geometry at playback time.

use serde::{Deserialize, Serialize};

/// The bounding rectangle of the full multi-monitor desktop, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualScreen {
    /// Total width in pixels.
    pub width: u32,
    /// Total height in pixels.
    pub height: u32,
    /// Left edge in the desktop coordinate system (may be negative).
    pub left: i32,
    /// Top edge in the desktop coordinate system (may be negative).
    pub top: i32,
}

impl VirtualScreen {
    /// Create a virtual screen; zero dimensions are bumped to one pixel.
    pub fn new(width: u32, height: u32, left: i32, top: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            left,
            top,
        }
    }

    /// Map absolute pixel coordinates to fractional `[0.0, 1.0]²`.
    pub fn to_fractional(&self, x: i32, y: i32) -> (f64, f64) {
        let fx = (x - self.left) as f64 / self.width as f64;
        let fy = (y - self.top) as f64 / self.height as f64;
        (fx.clamp(0.0, 1.0), fy.clamp(0.0, 1.0))
    }

    /// Map fractional coordinates back to absolute pixels, clamped to
    /// the screen bounds so injection never lands off-screen.
    pub fn to_absolute(&self, fx: f64, fy: f64) -> (i32, i32) {
        let fx = fx.clamp(0.0, 1.0);
        let fy = fy.clamp(0.0, 1.0);
        let x = self.left + (fx * self.width as f64).round() as i32;
        let y = self.top + (fy * self.height as f64).round() as i32;
        (
            x.clamp(self.left, self.left + self.width as i32 - 1),
            y.clamp(self.top, self.top + self.height as i32 - 1),
        )
    }

    /// Whether an absolute pixel position lies within the screen.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left
            && x < self.left + self.width as i32
            && y >= self.top
            && y < self.top + self.height as i32
    }
}

impl Default for VirtualScreen {
    fn default() -> Self {
        Self::new(1920, 1080, 0, 0)
    }
}

/// A 2D fractional point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in fractional units.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }

    /// The point clamped into `[0.0, 1.0]²`.
    pub fn clamped(&self) -> Point2D {
        Point2D {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_fractional_is_clamped() {
        let screen = VirtualScreen::new(1920, 1080, 0, 0);
        assert_eq!(screen.to_fractional(-500, -500), (0.0, 0.0));
        assert_eq!(screen.to_fractional(5000, 5000), (1.0, 1.0));

        let (fx, fy) = screen.to_fractional(960, 540);
        assert!((fx - 0.5).abs() < 1e-9);
        assert!((fy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_origin_multi_monitor() {
        // Secondary monitor left of primary: virtual screen starts at -1920.
        let screen = VirtualScreen::new(3840, 1080, -1920, 0);
        let (fx, fy) = screen.to_fractional(-1920, 0);
        assert_eq!((fx, fy), (0.0, 0.0));

        let (x, y) = screen.to_absolute(0.0, 0.0);
        assert_eq!((x, y), (-1920, 0));
    }

    #[test]
    fn test_to_absolute_stays_on_screen() {
        let screen = VirtualScreen::new(1920, 1080, 0, 0);
        assert_eq!(screen.to_absolute(1.0, 1.0), (1919, 1079));
        assert_eq!(screen.to_absolute(2.0, -3.0), (1919, 0));
    }

    #[test]
    fn test_zero_size_screen_is_bumped() {
        let screen = VirtualScreen::new(0, 0, 0, 0);
        assert_eq!(screen.width, 1);
        let (fx, fy) = screen.to_fractional(0, 0);
        assert!(fx.is_finite() && fy.is_finite());
    }

    #[test]
    fn test_point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_fractional_always_in_unit_square(x in -10_000i32..10_000, y in -10_000i32..10_000) {
            let screen = VirtualScreen::new(2560, 1440, -640, -200);
            let (fx, fy) = screen.to_fractional(x, y);
            prop_assert!((0.0..=1.0).contains(&fx));
            prop_assert!((0.0..=1.0).contains(&fy));
        }

        #[test]
        fn prop_roundtrip_within_one_pixel(x in 0i32..2560, y in 0i32..1440) {
            let screen = VirtualScreen::new(2560, 1440, 0, 0);
            let (fx, fy) = screen.to_fractional(x, y);
            let (rx, ry) = screen.to_absolute(fx, fy);
            prop_assert!((rx - x).abs() <= 1);
            prop_assert!((ry - y).abs() <= 1);
        }
    }
}
