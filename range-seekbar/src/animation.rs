//! Short tweens that move the displayed thumb fractions toward their targets.
//!
//! Both thumbs share one timeline so they always arrive together. The
//! timeline is cooperative: the clock starts when the transition is created
//! and the host calls `sample` from its frame callback to read it.

use std::time::{Duration, Instant};

/// Default length of a programmatic progress transition.
pub const PROGRESS_ANIMATION_DURATION: Duration = Duration::from_millis(80);

/// Easing curves applied to the linear timeline fraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    /// No easing.
    Linear,
    /// Starts fast and slows down quadratically.
    #[default]
    Decelerate,
    /// Material standard curve.
    FastOutSlowIn,
}

impl Easing {
    /// Apply the easing function to a linear fraction in `[0, 1]`.
    pub fn transform(&self, fraction: f32) -> f32 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Easing::Linear => fraction,
            Easing::Decelerate => {
                let inverse = 1.0 - fraction;
                1.0 - inverse * inverse
            }
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction),
        }
    }
}

/// Cubic bezier easing through (0, 0), (x1, y1), (x2, y2), (1, 1).
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    fn sample_curve(a: f32, b: f32, c: f32, t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    // Bisection on x; the curve is monotonic for the control points used here.
    let mut t0 = 0.0;
    let mut t1 = 1.0;
    let mut t = fraction;
    for _ in 0..24 {
        let delta = sample_curve(ax, bx, cx, t) - fraction;
        if delta.abs() < 1e-6 {
            break;
        }
        if delta > 0.0 {
            t1 = t;
        } else {
            t0 = t;
        }
        t = 0.5 * (t0 + t1);
    }

    sample_curve(ay, by, cy, t)
}

/// Duration and easing of a progress transition.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationSpec {
    /// Total length of the transition.
    pub duration: Duration,
    /// Curve applied to the timeline.
    pub easing: Easing,
}

impl AnimationSpec {
    /// Create a tween with the given duration and easing.
    pub fn tween(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::tween(PROGRESS_ANIMATION_DURATION, Easing::Decelerate)
    }
}

/// One sampled frame of a [`ProgressAnimation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Displayed start fraction.
    pub start: f32,
    /// Displayed end fraction.
    pub end: f32,
    /// Whether the timeline has reached its end.
    pub finished: bool,
}

/// A running transition of both thumb fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressAnimation {
    from: (f32, f32),
    to: (f32, f32),
    spec: AnimationSpec,
    started_at: Instant,
}

impl ProgressAnimation {
    /// Creates a transition from the currently displayed fractions to the
    /// target fractions, timed from `started_at`.
    pub fn new(from: (f32, f32), to: (f32, f32), spec: AnimationSpec, started_at: Instant) -> Self {
        Self {
            from,
            to,
            spec,
            started_at,
        }
    }

    /// Advances the timeline to `now`.
    ///
    /// The final frame reports the target fractions exactly.
    pub fn sample(&mut self, now: Instant) -> AnimationFrame {
        let elapsed = now.saturating_duration_since(self.started_at);

        let fraction = if self.spec.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.spec.duration.as_secs_f32()).min(1.0)
        };

        if fraction >= 1.0 {
            return AnimationFrame {
                start: self.to.0,
                end: self.to.1,
                finished: true,
            };
        }

        let eased = self.spec.easing.transform(fraction);
        AnimationFrame {
            start: self.from.0 + (self.to.0 - self.from.0) * eased,
            end: self.from.1 + (self.to.1 - self.from.1) * eased,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::Decelerate, Easing::FastOutSlowIn] {
            assert_eq!(easing.transform(0.0), 0.0);
            assert!((easing.transform(1.0) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn decelerate_is_ahead_of_linear() {
        assert!(Easing::Decelerate.transform(0.5) > 0.5);
        assert_eq!(Easing::Decelerate.transform(0.5), 0.75);
    }

    #[test]
    fn converges_exactly_after_duration() {
        let t0 = Instant::now();
        let mut animation =
            ProgressAnimation::new((0.2, 0.8), (0.5, 0.9), AnimationSpec::default(), t0);

        let first = animation.sample(t0);
        assert_eq!((first.start, first.end), (0.2, 0.8));
        assert!(!first.finished);

        let mid = animation.sample(t0 + PROGRESS_ANIMATION_DURATION / 2);
        assert!(mid.start > 0.2 && mid.start < 0.5);
        assert!(mid.end > 0.8 && mid.end < 0.9);
        assert!(!mid.finished);

        let last = animation.sample(t0 + PROGRESS_ANIMATION_DURATION);
        assert_eq!((last.start, last.end), (0.5, 0.9));
        assert!(last.finished);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let spec = AnimationSpec::tween(Duration::ZERO, Easing::Linear);
        let now = Instant::now();
        let mut animation = ProgressAnimation::new((0.0, 1.0), (0.3, 0.4), spec, now);
        let frame = animation.sample(now);
        assert!(frame.finished);
        assert_eq!((frame.start, frame.end), (0.3, 0.4));
    }

    #[test]
    fn late_first_frame_lands_on_the_target() {
        let requested = Instant::now();
        let mut animation =
            ProgressAnimation::new((0.2, 0.8), (0.5, 0.9), AnimationSpec::default(), requested);
        let frame = animation.sample(requested + Duration::from_millis(200));
        assert!(frame.finished);
        assert_eq!((frame.start, frame.end), (0.5, 0.9));
    }
}
