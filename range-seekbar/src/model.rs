//! The authoritative integer range `[start, end]` inside `[0, max]`.
//!
//! [`RangeModel`] is pure arithmetic: it owns the domain maximum, the two
//! endpoints, the quantization step and the separation policy between the
//! endpoints. It performs no I/O and knows nothing about threads; callers
//! wrap it in a lock.

use tracing::debug;

use crate::error::RangeError;

/// How far apart the two endpoints are kept.
///
/// The two policies are mutually exclusive: configuring one replaces the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GapPolicy {
    /// `end - start` never drops below the given difference. Zero disables
    /// the constraint apart from `start <= end`.
    MinDiff(i32),
    /// Explicit per-thumb limits: `start <= start_max` and `end >= end_min`.
    /// Either side may be left unset.
    Boundaries {
        /// Upper bound for the start endpoint.
        start_max: Option<i32>,
        /// Lower bound for the end endpoint.
        end_min: Option<i32>,
    },
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::MinDiff(0)
    }
}

/// Rounds `value` to the nearest multiple of `step`.
///
/// A remainder strictly greater than half a step rounds up; a remainder of
/// exactly half a step or less rounds down.
///
/// ```
/// use range_seekbar::model::quantize;
///
/// assert_eq!(quantize(24, 10), 20);
/// assert_eq!(quantize(77, 10), 80);
/// assert_eq!(quantize(25, 10), 20);
/// assert_eq!(quantize(7, 1), 7);
/// ```
pub fn quantize(value: i32, step: i32) -> i32 {
    if step <= 1 {
        return value;
    }
    let remainder = value.rem_euclid(step);
    if remainder == 0 {
        value
    } else if remainder > step - remainder {
        value.saturating_add(step - remainder)
    } else {
        value - remainder
    }
}

/// Snaps a non-zero gap down to a multiple of `step`, never below one step.
fn snap_gap(gap: i32, step: i32) -> i32 {
    if gap == 0 || step <= 1 || gap % step == 0 {
        gap
    } else {
        step.max(gap - gap % step)
    }
}

/// Integer range state guarded by the owner's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeModel {
    max: i32,
    start: i32,
    end: i32,
    step_size: i32,
    policy: GapPolicy,
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeModel {
    /// Creates a model spanning `[0, 100]` with the whole domain selected.
    pub fn new() -> Self {
        Self {
            max: 100,
            start: 0,
            end: 100,
            step_size: 1,
            policy: GapPolicy::default(),
        }
    }

    /// Upper bound of the domain.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Current start endpoint.
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Current end endpoint.
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Current quantization step.
    pub fn step_size(&self) -> i32 {
        self.step_size
    }

    /// Active separation policy.
    pub fn policy(&self) -> GapPolicy {
        self.policy
    }

    /// The fixed minimum difference, or `None` while explicit boundaries are
    /// in effect.
    pub fn min_gap(&self) -> Option<i32> {
        match self.policy {
            GapPolicy::MinDiff(diff) => Some(diff),
            GapPolicy::Boundaries { .. } => None,
        }
    }

    /// The configured start upper bound, if any.
    pub fn start_max(&self) -> Option<i32> {
        match self.policy {
            GapPolicy::Boundaries { start_max, .. } => start_max,
            GapPolicy::MinDiff(_) => None,
        }
    }

    /// The configured end lower bound, if any.
    pub fn end_min(&self) -> Option<i32> {
        match self.policy {
            GapPolicy::Boundaries { end_min, .. } => end_min,
            GapPolicy::MinDiff(_) => None,
        }
    }

    /// Largest value the start endpoint may take given the current end.
    pub fn start_max_value(&self) -> i32 {
        match self.policy {
            GapPolicy::Boundaries {
                start_max: Some(start_max),
                ..
            } => start_max,
            GapPolicy::Boundaries { start_max: None, .. } => self.end,
            GapPolicy::MinDiff(diff) => self.end - diff,
        }
    }

    /// Smallest value the end endpoint may take given the current start.
    pub fn end_min_value(&self) -> i32 {
        match self.policy {
            GapPolicy::Boundaries {
                end_min: Some(end_min),
                ..
            } => end_min,
            GapPolicy::Boundaries { end_min: None, .. } => self.start,
            GapPolicy::MinDiff(diff) => self.start.saturating_add(diff),
        }
    }

    /// Fraction of the domain covered by `value`, zero for an empty domain.
    pub fn fraction_of(&self, value: i32) -> f32 {
        crate::mapper::value_to_fraction(value, self.max)
    }

    /// Computes the stored pair `set_range(start, end)` would produce,
    /// without assigning it.
    ///
    /// The order is: clamp into the domain with `start <= end`, apply the
    /// gap policy, quantize each endpoint, then clamp once more so that
    /// quantization can never break `0 <= start <= end <= max`.
    pub fn normalize(&self, start: i32, end: i32) -> (i32, i32) {
        let max = self.max;
        let start = start.clamp(0, end.clamp(0, max));
        let end = end.clamp(start, max);

        let (start, end) = self.apply_gap(start, end);

        let (start, end) = if self.step_size > 1 {
            (
                quantize(start, self.step_size),
                quantize(end, self.step_size),
            )
        } else {
            (start, end)
        };

        let end = end.clamp(0, max);
        let start = start.clamp(0, end);
        (start, end)
    }

    fn apply_gap(&self, start: i32, end: i32) -> (i32, i32) {
        let max = self.max;
        match self.policy {
            GapPolicy::MinDiff(diff) if diff > 0 => {
                if end - start >= diff {
                    return (start, end);
                }
                let end = start.saturating_add(diff).min(max);
                let start = if end - start < diff {
                    (end - diff).max(0)
                } else {
                    start
                };
                (start, end)
            }
            GapPolicy::MinDiff(_) => (start, end),
            GapPolicy::Boundaries { start_max, end_min } => {
                let start = start_max.map_or(start, |limit| start.min(limit.max(0)));
                let end = end_min.map_or(end, |limit| end.max(limit)).min(max);
                (start.min(end), end)
            }
        }
    }

    /// Assigns a new range after normalizing it.
    ///
    /// Never fails. Returns `false` when the normalized pair equals the
    /// stored one, in which case nothing changes.
    pub fn set_range(&mut self, start: i32, end: i32) -> bool {
        let (start, end) = self.normalize(start, end);
        if start == self.start && end == self.end {
            return false;
        }
        self.start = start;
        self.end = end;
        true
    }

    /// Sets the domain maximum, pulling the endpoints down if needed.
    ///
    /// Negative values clamp to zero. Returns `true` when the maximum
    /// changed.
    pub fn set_max(&mut self, max: i32) -> bool {
        let max = max.max(0);
        if max == self.max {
            return false;
        }
        debug!(max, "set_max");
        self.max = max;
        if self.end > max {
            self.end = max;
        }
        if self.start > self.end {
            self.start = self.end;
        }
        true
    }

    /// Sets the quantization step. Values below one clamp to one.
    ///
    /// A fixed minimum gap is re-snapped to the new step. The stored range
    /// is not re-quantized here; callers re-apply it through `set_range`.
    pub fn set_step_size(&mut self, step_size: i32) {
        self.step_size = step_size.max(1);
        if let GapPolicy::MinDiff(diff) = self.policy {
            self.policy = GapPolicy::MinDiff(snap_gap(diff, self.step_size));
        }
        debug!(step_size = self.step_size, policy = ?self.policy, "set_step_size");
    }

    /// Switches to the fixed minimum gap policy, clearing any boundaries.
    ///
    /// Negative values clamp to zero. Fails without changing anything when
    /// the gap is wider than the domain.
    pub fn set_min_gap(&mut self, min_gap: i32) -> Result<(), RangeError> {
        let min_gap = min_gap.max(0);
        if min_gap > self.max {
            return Err(RangeError::MinGapExceedsMax {
                min_gap,
                max: self.max,
            });
        }
        self.policy = GapPolicy::MinDiff(snap_gap(min_gap, self.step_size));
        debug!(min_gap, policy = ?self.policy, "set_min_gap");
        Ok(())
    }

    /// Switches to the explicit boundaries policy, clearing any fixed gap.
    ///
    /// Passing `None` for both sides clears every separation constraint.
    /// Fails without changing anything when `start_max > end_min` or
    /// `start_max > max`.
    pub fn set_boundaries(
        &mut self,
        start_max: Option<i32>,
        end_min: Option<i32>,
    ) -> Result<(), RangeError> {
        if let (Some(start_max), Some(end_min)) = (start_max, end_min)
            && start_max > end_min
        {
            return Err(RangeError::InvalidBoundaries { start_max, end_min });
        }
        if let Some(start_max) = start_max
            && start_max > self.max
        {
            return Err(RangeError::StartMaxExceedsMax {
                start_max,
                max: self.max,
            });
        }

        self.policy = if start_max.is_none() && end_min.is_none() {
            GapPolicy::MinDiff(0)
        } else {
            GapPolicy::Boundaries { start_max, end_min }
        };
        debug!(?start_max, ?end_min, "set_boundaries");
        Ok(())
    }
}
