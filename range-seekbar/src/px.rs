//! Whole-pixel geometry in control coordinates.
//!
//! The origin is the control's top-left corner. Thumbs may overhang the
//! track, so coordinates are signed.
//!
//! ```
//! use range_seekbar::px::{Px, PxPosition, PxRect};
//!
//! let thumb = PxRect::new(Px(10), Px(0), Px(20), Px(20));
//! let hit_area = thumb.inset(Px(5), Px(5));
//! assert!(hit_area.contains(PxPosition::new(Px(15), Px(10))));
//! assert!(!hit_area.contains(PxPosition::new(Px(12), Px(10))));
//! ```

use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// A signed pixel distance or coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// The value as a float, for interpolation.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Truncates toward zero after clamping into the `i32` range. `NaN` maps
    /// to zero.
    ///
    /// ```
    /// use range_seekbar::px::Px;
    ///
    /// assert_eq!(Px::saturating_from_f32(37.9), Px(37));
    /// assert_eq!(Px::saturating_from_f32(f32::INFINITY), Px(i32::MAX));
    /// ```
    pub fn saturating_from_f32(value: f32) -> Self {
        Self(value.clamp(i32::MIN as f32, i32::MAX as f32) as i32)
    }
}

macro_rules! px_binop {
    ($trait:ident, $method:ident, $rhs:ty, |$a:ident, $b:ident| $body:expr) => {
        impl $trait<$rhs> for Px {
            type Output = Px;

            fn $method(self, rhs: $rhs) -> Px {
                let ($a, $b) = (self, rhs);
                $body
            }
        }
    };
}

px_binop!(Add, add, Px, |a, b| Px(a.0 + b.0));
px_binop!(Sub, sub, Px, |a, b| Px(a.0 - b.0));
px_binop!(Mul, mul, i32, |a, k| Px(a.0 * k));
px_binop!(Div, div, i32, |a, k| Px(a.0 / k));

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Px) {
        *self = *self + rhs;
    }
}

/// A point, such as a pointer location snapped to whole pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PxPosition {
    /// Horizontal coordinate.
    pub x: Px,
    /// Vertical coordinate.
    pub y: Px,
}

impl PxPosition {
    /// A point at `(x, y)`.
    pub const fn new(x: Px, y: Px) -> Self {
        Self { x, y }
    }

    /// Snaps a float pointer location with [`Px::saturating_from_f32`].
    pub fn from_f32(x: f32, y: f32) -> Self {
        Self::new(Px::saturating_from_f32(x), Px::saturating_from_f32(y))
    }
}

/// Width and height of a control or thumb.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PxSize {
    /// Horizontal extent.
    pub width: Px,
    /// Vertical extent.
    pub height: Px,
}

impl PxSize {
    /// An empty size.
    pub const ZERO: Self = Self::new(Px::ZERO, Px::ZERO);

    /// A `width` by `height` size.
    pub const fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PxRect {
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Horizontal extent.
    pub width: Px,
    /// Vertical extent.
    pub height: Px,
}

impl PxRect {
    /// A rectangle with its top-left corner at `(x, y)`.
    pub const fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle spanning the given edges.
    pub fn from_ltrb(left: Px, top: Px, right: Px, bottom: Px) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> Px {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> Px {
        self.y + self.height
    }

    /// Horizontal centre, rounded toward the left edge.
    pub fn center_x(&self) -> Px {
        self.x + self.width / 2
    }

    /// Shrinks by `dx` on both horizontal sides and `dy` on both vertical
    /// sides.
    pub fn inset(&self, dx: Px, dy: Px) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - dx * 2,
            self.height - dy * 2,
        )
    }

    /// Reflects across the vertical centre line of a `container_width` wide
    /// parent.
    pub fn mirror_horizontally(&self, container_width: Px) -> Self {
        Self {
            x: container_width - self.right(),
            ..*self
        }
    }

    /// Half-open containment: left and top inclusive, right and bottom
    /// exclusive.
    pub fn contains(&self, point: PxPosition) -> bool {
        (self.x..self.right()).contains(&point.x) && (self.y..self.bottom()).contains(&point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_conversion_truncates_and_saturates() {
        assert_eq!(Px::saturating_from_f32(-12.8), Px(-12));
        assert_eq!(Px::saturating_from_f32(f32::NEG_INFINITY), Px(i32::MIN));
        assert_eq!(Px::saturating_from_f32(f32::NAN), Px::ZERO);
    }

    #[test]
    fn edges_and_centre() {
        let rect = PxRect::from_ltrb(Px(10), Px(4), Px(31), Px(24));
        assert_eq!(rect.width, Px(21));
        assert_eq!((rect.right(), rect.bottom()), (Px(31), Px(24)));
        assert_eq!(rect.center_x(), Px(20));
    }

    #[test]
    fn inset_hit_area_is_half_open() {
        let shrunk = PxRect::new(Px::ZERO, Px::ZERO, Px(20), Px(20)).inset(Px(5), Px(5));
        assert_eq!(shrunk, PxRect::new(Px(5), Px(5), Px(10), Px(10)));
        assert!(shrunk.contains(PxPosition::new(Px(5), Px(14))));
        assert!(!shrunk.contains(PxPosition::new(Px(15), Px(10))));
    }

    #[test]
    fn mirroring_is_an_involution() {
        let rect = PxRect::new(Px(10), Px(0), Px(20), Px(8));
        let mirrored = rect.mirror_horizontally(Px(100));
        assert_eq!(mirrored.x, Px(70));
        assert_eq!(mirrored.mirror_horizontally(Px(100)), rect);
    }
}
