//! Delivery deadlines for one pass over a recording
//!
//! Deadlines are absolute offsets from the start of the pass rather than
//! per-action sleeps, so time spent delivering an action (curve motion, typing)
//! is absorbed by the next gap instead of accumulating as drift.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Cap on a single wait, roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The instant `seconds` after `base`.
///
/// Delays too large to represent (tiny speeds, huge loop delays) saturate at
/// [`FAR_FUTURE`] so the wait stays cancellable instead of overflowing.
/// Non-positive and NaN delays resolve to `base`.
pub(crate) fn instant_after(base: Instant, seconds: f64) -> Instant {
    if !(seconds > 0.0) {
        return base;
    }
    let delay = Duration::try_from_secs_f64(seconds)
        .unwrap_or(FAR_FUTURE)
        .min(FAR_FUTURE);
    // Only fails on clocks that cannot represent FAR_FUTURE at all
    base.checked_add(delay).unwrap_or(base)
}

#[derive(Debug)]
pub struct Timeline {
    origin: Instant,
    speed: f64,
    jitter_fraction: f64,
    /// Extra seconds inserted by pauses so far
    shift: f64,
    /// Recording offset of the previous action
    last_offset: f64,
    /// Seconds from origin of the previous deadline
    last_deadline: f64,
}

impl Timeline {
    pub fn new(origin: Instant, speed: f64, jitter_fraction: f64) -> Self {
        Self {
            origin,
            speed,
            jitter_fraction,
            shift: 0.0,
            last_offset: 0.0,
            last_deadline: 0.0,
        }
    }

    /// Seconds from origin at which the action recorded at `offset` is due.
    ///
    /// The scaled gap since the previous action gets up to `±jitter_fraction` of
    /// itself added. Deadlines never move backwards.
    pub fn next_offset<R: Rng>(&mut self, offset: f64, rng: &mut R) -> f64 {
        let gap = ((offset - self.last_offset) / self.speed).max(0.0);
        let jitter = if self.jitter_fraction > 0.0 && gap > 0.0 {
            gap * rng.gen_range(-self.jitter_fraction..=self.jitter_fraction)
        } else {
            0.0
        };

        let base = offset / self.speed + self.shift;
        let due = (base + jitter).max(self.last_deadline);

        self.last_offset = offset;
        self.last_deadline = due;
        due
    }

    pub fn next_deadline<R: Rng>(&mut self, offset: f64, rng: &mut R) -> Instant {
        let due = self.next_offset(offset, rng);
        self.at(due)
    }

    /// Push every later deadline back by `seconds` (real time, already scaled)
    pub fn shift(&mut self, seconds: f64) {
        self.shift += seconds;
        self.last_deadline += seconds;
    }

    pub fn at(&self, seconds: f64) -> Instant {
        instant_after(self.origin, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_no_jitter_scales_offsets() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut timeline = Timeline::new(Instant::now(), 2.0, 0.0);

        assert_eq!(timeline.next_offset(0.0, &mut rng), 0.0);
        assert_eq!(timeline.next_offset(1.2, &mut rng), 0.6);
        assert_eq!(timeline.next_offset(3.0, &mut rng), 1.5);
    }

    #[test]
    fn test_jitter_is_bounded_by_gap() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut timeline = Timeline::new(Instant::now(), 1.0, 0.05);

        let mut previous = 0.0;
        for i in 1..=200 {
            let offset = i as f64;
            let due = timeline.next_offset(offset, &mut rng);
            // Each deadline stays within ±5% of the one-second gap around its target
            assert!((due - offset).abs() <= 0.05 + 1e-9, "due {} for {}", due, offset);
            assert!(due >= previous);
            previous = due;
        }
    }

    #[test]
    fn test_jitter_varies_intervals() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut timeline = Timeline::new(Instant::now(), 1.0, 0.05);

        let dues: Vec<f64> = (0..20).map(|i| timeline.next_offset(i as f64, &mut rng)).collect();
        let gaps: Vec<f64> = dues.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.iter().any(|g| (g - gaps[0]).abs() > 1e-6));
    }

    #[test]
    fn test_simultaneous_actions_get_no_jitter() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut timeline = Timeline::new(Instant::now(), 1.0, 0.2);

        let first = timeline.next_offset(1.0, &mut rng);
        let second = timeline.next_offset(1.0, &mut rng);
        assert!(second >= first);
        assert!((second - first).abs() < 0.2 + 1e-9);
    }

    #[test]
    fn test_unrepresentable_delays_saturate() {
        let origin = Instant::now();
        assert_eq!(instant_after(origin, 0.0), origin);
        assert_eq!(instant_after(origin, -3.0), origin);
        assert_eq!(instant_after(origin, f64::NAN), origin);
        assert_eq!(instant_after(origin, 1e300), origin + FAR_FUTURE);
        assert_eq!(instant_after(origin, f64::INFINITY), origin + FAR_FUTURE);
        assert_eq!(instant_after(origin, 1.5), origin + Duration::from_millis(1500));
    }

    #[test]
    fn test_tiny_speed_does_not_overflow() {
        let mut rng = SmallRng::seed_from_u64(1);
        let origin = Instant::now();
        let mut timeline = Timeline::new(origin, 1e-300, 0.05);

        assert_eq!(timeline.next_deadline(0.0, &mut rng), origin);
        assert_eq!(timeline.next_deadline(1.0, &mut rng), origin + FAR_FUTURE);
    }

    #[test]
    fn test_shift_delays_later_actions() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut timeline = Timeline::new(Instant::now(), 1.0, 0.0);

        assert_eq!(timeline.next_offset(1.0, &mut rng), 1.0);
        timeline.shift(0.5);
        assert_eq!(timeline.next_offset(2.0, &mut rng), 2.5);
    }
}
