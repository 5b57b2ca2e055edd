//! Bounded, decaying path perturbation.
//!
//! Interior path points are nudged by uniform noise whose amplitude
//! decays with progress toward the destination, modeling the precision a
//! hand gains on approach. The amplitude is additionally capped to 30%
//! of the local inter-point spacing so a nudge can never read as a
//! backward jump, and the endpoints are left untouched.

use rand::Rng;

use mimic_recording_model::Point2D;

use crate::profile::MotionProfile;

/// Amplitude decays to this fraction of itself at the destination.
const DECAY: f64 = 0.7;

/// Cap relative to the local inter-point spacing.
const SPACING_CAP: f64 = 0.3;

/// Perturb a path's interior points. An intensity of zero (or a path too
/// short to have an interior) returns the path unchanged.
pub fn jitter_path(
    path: &[Point2D],
    distance: f64,
    profile: &MotionProfile,
    rng: &mut impl Rng,
) -> Vec<Point2D> {
    let intensity = profile.jitter_intensity;
    if intensity <= 0.0 || path.len() < 3 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut result = Vec::with_capacity(path.len());
    result.push(path[0]);

    for i in 1..last {
        let progress = i as f64 / last as f64;
        let spacing = result[i - 1].distance_to(&path[i]);

        let amplitude = (intensity * (1.0 - DECAY * progress))
            .min(spacing * SPACING_CAP)
            .min(distance);

        result.push(
            Point2D::new(
                path[i].x + rng.gen_range(-amplitude..=amplitude),
                path[i].y + rng.gen_range(-amplitude..=amplitude),
            )
            .clamped(),
        );
    }

    result.push(path[last]);
    result
}
