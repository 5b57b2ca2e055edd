//! Per-segment delay synthesis.
//!
//! Distributes a distance-derived total travel time across path segments
//! following the profile's ease curve, then roughens each share with a
//! small multiplicative jitter. A hard floor keeps any single segment
//! from collapsing to zero, which would fold the motion into a discrete
//! jump.

use rand::Rng;

use crate::profile::MotionProfile;

/// Produce `point_count - 1` per-segment delays in seconds.
///
/// Returns an empty vec for degenerate paths of fewer than two points.
pub fn synthesize_timing(
    point_count: usize,
    distance: f64,
    profile: &MotionProfile,
    rng: &mut impl Rng,
) -> Vec<f64> {
    if point_count < 2 {
        return Vec::new();
    }

    let total = profile.travel_time(distance);
    let segments = point_count - 1;
    let mut delays = Vec::with_capacity(segments);

    let mut shaped_prev = 0.0;
    for i in 1..=segments {
        let t = i as f64 / segments as f64;
        let shaped = profile.ease(t);
        let mut segment = total * (shaped - shaped_prev);
        shaped_prev = shaped;

        if profile.timing_jitter > 0.0 {
            segment *= 1.0 + rng.gen_range(-profile.timing_jitter..=profile.timing_jitter);
        }

        delays.push(segment.max(profile.segment_floor_secs));
    }

    delays
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_length_is_point_count_minus_one() {
        let profile = MotionProfile::normal();
        let delays = synthesize_timing(12, 0.4, &profile, &mut rng());
        assert_eq!(delays.len(), 11);
    }

    #[test]
    fn test_degenerate_paths_yield_no_delays() {
        let profile = MotionProfile::normal();
        assert!(synthesize_timing(0, 0.5, &profile, &mut rng()).is_empty());
        assert!(synthesize_timing(1, 0.5, &profile, &mut rng()).is_empty());
    }

    #[test]
    fn test_every_delay_respects_floor() {
        for profile in [MotionProfile::normal(), MotionProfile::gaming()] {
            let delays = synthesize_timing(25, 0.02, &profile, &mut rng());
            for delay in delays {
                assert!(delay >= profile.segment_floor_secs);
            }
        }
    }

    #[test]
    fn test_sum_tracks_total_travel_time() {
        let profile = MotionProfile::normal();
        let distance = 0.5;
        let total = profile.travel_time(distance);
        let count = profile.point_count(distance);

        let sum: f64 = synthesize_timing(count, distance, &profile, &mut rng())
            .iter()
            .sum();
        assert!(
            (sum - total).abs() <= total * 0.1,
            "sum {sum} strays more than 10% from {total}"
        );
    }

    #[test]
    fn test_ease_in_out_is_slow_at_the_edges() {
        let profile = MotionProfile {
            timing_jitter: 0.0,
            ..MotionProfile::normal()
        };
        let delays = synthesize_timing(21, 0.8, &profile, &mut rng());

        let mid = delays[delays.len() / 2];
        assert!(delays[0] < mid, "ease-in should start slower than midpath");
        assert!(
            *delays.last().unwrap() < mid,
            "ease-out should end slower than midpath"
        );
    }

    #[test]
    fn test_linear_profile_is_uniform_without_jitter() {
        let profile = MotionProfile {
            timing_jitter: 0.0,
            ..MotionProfile::gaming()
        };
        let delays = synthesize_timing(11, 0.5, &profile, &mut rng());
        let first = delays[0];
        for delay in &delays {
            assert!((delay - first).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gaming_total_is_shorter() {
        let normal: f64 = synthesize_timing(20, 0.6, &MotionProfile::normal(), &mut rng())
            .iter()
            .sum();
        let gaming: f64 = synthesize_timing(20, 0.6, &MotionProfile::gaming(), &mut rng())
            .iter()
            .sum();
        assert!(gaming < normal);
    }
}
