//! Curved path synthesis.
//!
//! A move is rendered as a single quadratic Bezier whose control point
//! is pushed off the segment midpoint along the perpendicular, by a
//! random magnitude bounded by the profile's arc settings. The bend
//! direction and magnitude are drawn per invocation, so replays of the
//! same recording take visually different paths each run.

use std::f64::consts::FRAC_PI_2;

use rand::Rng;

use mimic_recording_model::Point2D;

use crate::profile::MotionProfile;

/// Produce an ordered point sequence from `start` to `end` inclusive.
///
/// Distances below the profile's direct threshold skip curve generation
/// entirely and return the two-point direct path; near-zero-length
/// curves are numerically unstable and read as tremor.
pub fn synthesize_path(
    start: Point2D,
    end: Point2D,
    profile: &MotionProfile,
    rng: &mut impl Rng,
) -> Vec<Point2D> {
    let distance = start.distance_to(&end);
    if distance < profile.direct_threshold {
        return vec![start, end];
    }

    let count = profile.point_count(distance);
    let control = control_point(start, end, distance, profile, rng);

    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            bezier(start, control, end, t)
        })
        .collect()
}

/// Midpoint pushed along the perpendicular of the travel direction.
fn control_point(
    start: Point2D,
    end: Point2D,
    distance: f64,
    profile: &MotionProfile,
    rng: &mut impl Rng,
) -> Point2D {
    let mid = Point2D::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let angle = (end.y - start.y).atan2(end.x - start.x) - FRAC_PI_2;

    let max_deviation = (distance * profile.arc_factor).min(profile.max_arc);
    let deviation = max_deviation * rng.gen_range(-1.0..=1.0);

    Point2D::new(
        mid.x + deviation * angle.cos(),
        mid.y + deviation * angle.sin(),
    )
    .clamped()
}

fn bezier(start: Point2D, control: Point2D, end: Point2D, t: f64) -> Point2D {
    let u = 1.0 - t;
    Point2D::new(
        u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
        u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
    )
}
