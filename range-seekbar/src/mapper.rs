//! Conversion between values, fractions and pixel offsets along the track.
//!
//! A thumb may overhang each end of the track by `thumb_offset` pixels, so
//! the distance a thumb can travel is
//! `track_width - thumb_width + 2 * thumb_offset`. When a right-to-left
//! layout asks for mirroring, the horizontal axis is flipped before any of
//! the mappings below apply.

use crate::px::{Px, PxSize};

/// Identifies one of the two thumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WhichThumb {
    /// The thumb controlling the lower endpoint.
    Start,
    /// The thumb controlling the upper endpoint.
    End,
}

/// Host layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// Padding around the track content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    /// Left padding.
    pub left: Px,
    /// Top padding.
    pub top: Px,
    /// Right padding.
    pub right: Px,
    /// Bottom padding.
    pub bottom: Px,
}

impl Padding {
    /// Horizontal and vertical padding.
    pub const fn symmetric(horizontal: Px, vertical: Px) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

/// Horizontal geometry of the control, recomputed whenever it is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackGeometry {
    /// Full size of the control.
    pub size: PxSize,
    /// Padding around the content box.
    pub padding: Padding,
    /// Pixels reserved between the two thumbs.
    pub progress_offset: Px,
    /// How far a thumb may overhang either end of the track.
    pub thumb_offset: Px,
    /// Host layout direction.
    pub layout_direction: LayoutDirection,
    /// Whether a right-to-left layout flips the horizontal axis.
    pub mirror_for_rtl: bool,
}

impl TrackGeometry {
    /// Width inside the horizontal padding.
    pub fn content_width(&self) -> Px {
        (self.size.width - self.padding.left - self.padding.right).max(Px::ZERO)
    }

    /// Height inside the vertical padding.
    pub fn content_height(&self) -> Px {
        (self.size.height - self.padding.top - self.padding.bottom).max(Px::ZERO)
    }

    /// Content width minus the gap reserved between the thumbs.
    pub fn track_width(&self) -> Px {
        self.content_width() - self.progress_offset
    }

    /// Whether the horizontal axis is flipped.
    pub fn is_mirrored(&self) -> bool {
        self.mirror_for_rtl && self.layout_direction == LayoutDirection::Rtl
    }
}

/// Fraction of `[0, max]` covered by `value`; zero when `max` is zero.
pub fn value_to_fraction(value: i32, max: i32) -> f32 {
    if max > 0 {
        value as f32 / max as f32
    } else {
        0.0
    }
}

/// Distance a thumb can travel along the track.
pub fn available_width(track_width: Px, thumb_width: Px, thumb_offset: Px) -> Px {
    track_width - thumb_width + thumb_offset * 2
}

/// Pixel offset of a thumb's leading edge for `fraction` of the travel.
pub fn fraction_to_pixel(
    fraction: f32,
    track_width: Px,
    thumb_width: Px,
    thumb_offset: Px,
) -> Px {
    let available = available_width(track_width, thumb_width, thumb_offset);
    Px::saturating_from_f32((fraction * available.to_f32()).round())
}

/// Inverse of [`fraction_to_pixel`], clamped to `[0, 1]`.
pub fn pixel_to_fraction(
    pixel_offset: f32,
    track_width: Px,
    thumb_width: Px,
    thumb_offset: Px,
) -> f32 {
    let available = available_width(track_width, thumb_width, thumb_offset);
    if available.0 <= 0 {
        return 0.0;
    }
    (pixel_offset / available.to_f32()).clamp(0.0, 1.0)
}

/// Maps between pointer coordinates, thumb positions and fractions for a
/// given [`TrackGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateMapper {
    geometry: TrackGeometry,
}

impl CoordinateMapper {
    /// Creates a mapper for the given geometry.
    pub fn new(geometry: TrackGeometry) -> Self {
        Self { geometry }
    }

    /// Current geometry.
    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Replaces the geometry, e.g. after a resize.
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
    }

    /// Leading edge of a thumb in control coordinates.
    pub fn thumb_left(&self, fraction: f32, which: WhichThumb, thumb_width: Px) -> Px {
        let g = &self.geometry;
        let mut left = g.padding.left - g.thumb_offset
            + fraction_to_pixel(fraction, g.track_width(), thumb_width, g.thumb_offset);
        if which == WhichThumb::End {
            left += g.progress_offset;
        }
        if g.is_mirrored() {
            g.size.width - (left + thumb_width)
        } else {
            left
        }
    }

    /// Fraction selected by a pointer at control x-coordinate `x` while
    /// dragging `which`.
    ///
    /// Positions at or before the left padding map to 0, positions past the
    /// right padding map to 1.
    pub fn touch_to_fraction(&self, x: f32, which: WhichThumb, thumb_width: Px) -> f32 {
        let g = &self.geometry;
        let width = g.size.width.to_f32();
        let mut x = if g.is_mirrored() { width - x } else { x };
        if which == WhichThumb::End {
            x -= g.progress_offset.to_f32();
        }
        x -= thumb_width.to_f32() / 2.0;
        x += g.thumb_offset.to_f32();

        if x < g.padding.left.to_f32() {
            0.0
        } else if x > width - g.padding.right.to_f32() {
            1.0
        } else {
            pixel_to_fraction(
                x - g.padding.left.to_f32(),
                g.track_width(),
                thumb_width,
                g.thumb_offset,
            )
        }
    }
}
