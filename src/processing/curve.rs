//! Curved cursor paths for human-looking motion
//!
//! Replaces a point-to-point cursor jump with positions sampled along a
//! quadratic Bézier curve. The single control point is pushed off the straight
//! line by a random amount, so repeated moves between the same points share a
//! shape but not an exact path.

use crate::input::types::Point;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Shortest time between two cursor updates along a curve (~60Hz)
pub const DEFAULT_MIN_STEP_INTERVAL: f64 = 0.016;

/// Upper bound on the number of positions in one curve
pub const DEFAULT_MAX_STEPS: usize = 240;

/// Number of curve steps for a motion lasting `duration` seconds.
///
/// One step per `min_interval`, at least 1 and at most `max_steps`.
pub fn steps_for_duration(duration: f64, min_interval: f64, max_steps: usize) -> usize {
    if !duration.is_finite() || duration <= 0.0 || min_interval <= 0.0 {
        return 1;
    }
    let steps = (duration / min_interval).ceil();
    (steps as usize).clamp(1, max_steps.max(1))
}

/// Generate a curved path from `start` to `end` using a freshly seeded RNG.
///
/// `intensity` is the control point's offset as a fraction of the straight-line
/// distance. Returns `steps` positions excluding `start`; the last one is `end`.
/// If `start == end` the result is exactly `[start]`.
pub fn generate_curve(start: Point, end: Point, intensity: f64, steps: usize) -> Vec<Point> {
    let mut rng = SmallRng::from_entropy();
    generate_curve_with_rng(start, end, intensity, steps, &mut rng)
}

/// Same as [`generate_curve`] with a caller-provided RNG
pub fn generate_curve_with_rng<R: Rng>(
    start: Point,
    end: Point,
    intensity: f64,
    steps: usize,
    rng: &mut R,
) -> Vec<Point> {
    if start == end {
        return vec![start];
    }

    let steps = steps.max(1);
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let (x2, y2) = (f64::from(end.x), f64::from(end.y));
    let dx = x2 - x0;
    let dy = y2 - y0;
    let distance = (dx * dx + dy * dy).sqrt();

    // Unit normal to the chord
    let (nx, ny) = (-dy / distance, dx / distance);

    let intensity = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };
    let magnitude = if intensity > 0.0 {
        intensity * distance * rng.gen_range(0.5..=1.0)
    } else {
        0.0
    };
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let along = rng.gen_range(0.3..=0.7);

    let cx = x0 + dx * along + nx * magnitude * sign;
    let cy = y0 + dy * along + ny * magnitude * sign;

    let mut points = Vec::with_capacity(steps);
    for i in 1..=steps {
        if i == steps {
            points.push(end);
            break;
        }
        let t = i as f64 / steps as f64;
        let u = 1.0 - t;
        let x = u * u * x0 + 2.0 * u * t * cx + t * t * x2;
        let y = u * u * y0 + 2.0 * u * t * cy + t * t * y2;
        points.push(Point::new(x.round() as i32, y.round() as i32));
    }

    points
}
