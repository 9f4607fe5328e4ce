//! Error types reported by the seek bar.
//!
//! Out-of-range or inverted values are never errors: they are normalized
//! silently. Errors are reserved for caller programming mistakes.

use thiserror::Error;

use crate::mapper::WhichThumb;

/// Errors returned by configuration and interaction entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RangeError {
    /// The start thumb's upper bound is above the end thumb's lower bound.
    #[error("start max value {start_max} cannot be greater than end min value {end_min}")]
    InvalidBoundaries {
        /// Requested upper bound for the start thumb.
        start_max: i32,
        /// Requested lower bound for the end thumb.
        end_min: i32,
    },
    /// The start thumb's upper bound lies outside the value domain.
    #[error("start max value {start_max} cannot be greater than max value {max}")]
    StartMaxExceedsMax {
        /// Requested upper bound for the start thumb.
        start_max: i32,
        /// Current domain maximum.
        max: i32,
    },
    /// The minimum gap is wider than the whole value domain.
    #[error("min gap {min_gap} cannot be greater than max value {max}")]
    MinGapExceedsMax {
        /// Requested minimum gap.
        min_gap: i32,
        /// Current domain maximum.
        max: i32,
    },
    /// A drag or draw was attempted before both thumbs were configured.
    #[error("missing {0:?} thumb")]
    MissingThumb(WhichThumb),
    /// An interaction-thread entry point was called from another thread.
    #[error("called off the interaction thread")]
    OffInteractionThread,
    /// A persisted state blob had the wrong length.
    #[error("saved state must be 8 bytes, got {len}")]
    InvalidSavedState {
        /// Length of the rejected blob.
        len: usize,
    },
}
