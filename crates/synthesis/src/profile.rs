//! Motion tuning profiles.
//!
//! Two base profiles exist: the normal profile arcs and eases like a
//! relaxed hand, the gaming profile is faster, straighter, and lower
//! jitter for latency-sensitive targets. Config-derived knobs
//! (`path_smoothing`, `mouse_acceleration`, `micro_jitter`) are layered
//! on top via the builder methods.

/// Tuning constants for path, timing, and jitter synthesis.
#[derive(Debug, Clone, Copy)]
pub struct MotionProfile {
    /// Gaming profile: straighter, faster, linear timing.
    pub gaming: bool,

    /// Control-point deviation per unit of travel distance.
    pub arc_factor: f64,

    /// Absolute cap on control-point deviation (fraction of screen).
    pub max_arc: f64,

    /// Path sample count per unit of travel distance.
    pub points_per_unit: f64,

    /// Travel time per unit of fractional distance (seconds).
    pub secs_per_unit: f64,

    /// Minimum total travel time (seconds).
    pub min_travel_secs: f64,

    /// Hard floor for a single segment delay (seconds).
    pub segment_floor_secs: f64,

    /// Multiplicative per-segment timing jitter (±fraction).
    pub timing_jitter: f64,

    /// Blend between linear (0.0) and cubic ease-in/out (1.0) timing.
    pub ease_blend: f64,

    /// Base path-jitter amplitude; 0 disables the jitter model.
    pub jitter_intensity: f64,

    /// Below this distance, skip curve generation and move directly.
    pub direct_threshold: f64,
}

const MIN_POINTS: usize = 3;
const MAX_POINTS: usize = 25;

impl MotionProfile {
    /// The relaxed default profile.
    pub fn normal() -> Self {
        Self {
            gaming: false,
            arc_factor: 0.15,
            max_arc: 0.2,
            points_per_unit: 30.0,
            secs_per_unit: 0.8,
            min_travel_secs: 0.03,
            segment_floor_secs: 0.005,
            timing_jitter: 0.03,
            ease_blend: 1.0,
            jitter_intensity: 0.05,
            direct_threshold: 0.01,
        }
    }

    /// Faster, straighter profile for gaming targets: 40% shorter travel
    /// time, a fifth of the arc, linear timing.
    pub fn gaming() -> Self {
        Self {
            gaming: true,
            arc_factor: 0.05,
            secs_per_unit: 0.8 * 0.6,
            segment_floor_secs: 0.003,
            timing_jitter: 0.01,
            ease_blend: 0.0,
            jitter_intensity: 0.025,
            ..Self::normal()
        }
    }

    pub fn for_mode(gaming: bool) -> Self {
        if gaming {
            Self::gaming()
        } else {
            Self::normal()
        }
    }

    /// Scale the arc by a `path_smoothing` setting in `[0.0, 1.0]`;
    /// 0.5 is the neutral tuning.
    pub fn with_path_smoothing(mut self, smoothing: f64) -> Self {
        self.arc_factor *= smoothing.clamp(0.0, 1.0) * 2.0;
        self
    }

    /// Apply a `mouse_acceleration` setting in `[0.0, 1.0]`. Gaming mode
    /// keeps its linear profile regardless.
    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        if !self.gaming {
            self.ease_blend = acceleration.clamp(0.0, 1.0);
        }
        self
    }

    /// Derive the jitter amplitude from a `micro_jitter` setting.
    pub fn with_micro_jitter(mut self, micro_jitter: f64) -> Self {
        let scale = if self.gaming { 0.05 } else { 0.1 };
        self.jitter_intensity = micro_jitter.max(0.0) * scale;
        self
    }

    /// Number of path samples for a travel distance, bounded to `[3, 25]`.
    pub fn point_count(&self, distance: f64) -> usize {
        ((distance * self.points_per_unit).round() as usize).clamp(MIN_POINTS, MAX_POINTS)
    }

    /// Total travel time for a distance, before per-segment shaping.
    pub fn travel_time(&self, distance: f64) -> f64 {
        (distance * self.secs_per_unit).max(self.min_travel_secs)
    }

    /// Cumulative timing ease at path progress `t` in `[0.0, 1.0]`.
    ///
    /// Blends the linear profile into a cubic ease-in/out:
    /// `t < 0.5 → 4t³`, `t ≥ 0.5 → 4(t−1)³ + 1`.
    pub fn ease(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let cubic = if t < 0.5 {
            4.0 * t * t * t
        } else {
            let u = t - 1.0;
            4.0 * u * u * u + 1.0
        };
        self.ease_blend * cubic + (1.0 - self.ease_blend) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count_bounds() {
        let profile = MotionProfile::normal();
        assert_eq!(profile.point_count(0.0), 3);
        assert_eq!(profile.point_count(0.001), 3);
        assert_eq!(profile.point_count(1.0), 25);
        assert_eq!(profile.point_count(100.0), 25);
    }

    #[test]
    fn test_point_count_monotonic_in_distance() {
        let profile = MotionProfile::normal();
        let mut prev = 0;
        for i in 0..=100 {
            let d = i as f64 / 100.0;
            let n = profile.point_count(d);
            assert!(n >= prev, "point count decreased at distance {d}");
            prev = n;
        }
    }

    #[test]
    fn test_gaming_is_faster_and_straighter() {
        let normal = MotionProfile::normal();
        let gaming = MotionProfile::gaming();
        assert!(gaming.travel_time(0.5) < normal.travel_time(0.5));
        assert!(gaming.arc_factor < normal.arc_factor);
        assert_eq!(gaming.ease_blend, 0.0);
    }

    #[test]
    fn test_travel_time_floor() {
        let profile = MotionProfile::normal();
        assert_eq!(profile.travel_time(0.0), profile.min_travel_secs);
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        let profile = MotionProfile::normal();
        assert!(profile.ease(0.0).abs() < 1e-12);
        assert!((profile.ease(1.0) - 1.0).abs() < 1e-12);
        assert!((profile.ease(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ease_is_monotonic() {
        for blend in [0.0, 0.3, 0.7, 1.0] {
            let profile = MotionProfile {
                ease_blend: blend,
                ..MotionProfile::normal()
            };
            let mut prev = 0.0;
            for i in 1..=50 {
                let value = profile.ease(i as f64 / 50.0);
                assert!(value >= prev);
                prev = value;
            }
        }
    }

    #[test]
    fn test_builders() {
        let profile = MotionProfile::normal()
            .with_path_smoothing(0.5)
            .with_acceleration(0.25)
            .with_micro_jitter(0.0);
        assert!((profile.arc_factor - 0.15).abs() < 1e-12);
        assert_eq!(profile.ease_blend, 0.25);
        assert_eq!(profile.jitter_intensity, 0.0);

        // Gaming keeps linear timing regardless of acceleration.
        let gaming = MotionProfile::gaming().with_acceleration(1.0);
        assert_eq!(gaming.ease_blend, 0.0);
    }
}
