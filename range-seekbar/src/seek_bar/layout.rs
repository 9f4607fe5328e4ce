use crate::{
    mapper::{CoordinateMapper, TrackGeometry, WhichThumb},
    px::{Px, PxRect, PxSize},
};

/// Default cap on the track height, excluding padding.
pub const DEFAULT_MAX_TRACK_HEIGHT: Px = Px(48);

/// Vertical offsets below the top padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalPlacement {
    /// Top of the track.
    pub track_top: Px,
    /// Height of the track.
    pub track_height: Px,
    /// Top of both thumbs.
    pub thumb_top: Px,
}

/// Centres the taller of thumb and track in the padded height, then centres
/// the other one inside it.
pub fn vertical_placement(
    padded_height: Px,
    max_track_height: Px,
    thumb_height: Px,
) -> VerticalPlacement {
    let track_height = max_track_height.min(padded_height);
    if thumb_height > track_height {
        let offset = (padded_height - thumb_height) / 2;
        VerticalPlacement {
            track_top: offset + (thumb_height - track_height) / 2,
            track_height,
            thumb_top: offset,
        }
    } else {
        let offset = (padded_height - track_height) / 2;
        VerticalPlacement {
            track_top: offset,
            track_height,
            thumb_top: offset + (track_height - thumb_height) / 2,
        }
    }
}

/// Bounds of both thumbs in control coordinates, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThumbRects {
    /// Start thumb bounds.
    pub start: Option<PxRect>,
    /// End thumb bounds.
    pub end: Option<PxRect>,
}

/// Evenly spaced tick marks along the vertical centre of the control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMarks {
    /// X of the first mark.
    pub origin_x: f32,
    /// Y of every mark.
    pub center_y: f32,
    /// Distance between neighbouring marks.
    pub spacing: f32,
    /// Number of marks.
    pub count: usize,
}

impl TickMarks {
    /// X of every mark, left to right.
    pub fn positions(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.count).map(|i| self.origin_x + self.spacing * i as f32)
    }
}

/// One mark per value of `[0, max]`; none when `max <= 1`.
pub fn tick_marks(geometry: &TrackGeometry, max: i32) -> Option<TickMarks> {
    if max <= 1 {
        return None;
    }
    Some(TickMarks {
        origin_x: geometry.padding.left.to_f32(),
        center_y: geometry.size.height.to_f32() / 2.0,
        spacing: geometry.content_width().to_f32() / max as f32,
        count: max as usize + 1,
    })
}

/// Bounds of the full track in control coordinates.
pub fn track_rect(geometry: &TrackGeometry, placement: VerticalPlacement) -> PxRect {
    let rect = PxRect::new(
        geometry.padding.left,
        geometry.padding.top + placement.track_top,
        geometry.content_width(),
        placement.track_height,
    );
    if geometry.is_mirrored() {
        rect.mirror_horizontally(geometry.size.width)
    } else {
        rect
    }
}

/// Bounds of one thumb in control coordinates.
pub fn thumb_rect(
    mapper: &CoordinateMapper,
    fraction: f32,
    which: WhichThumb,
    size: PxSize,
    thumb_top: Px,
) -> PxRect {
    let left = mapper.thumb_left(fraction, which, size.width);
    PxRect::new(
        left,
        mapper.geometry().padding.top + thumb_top,
        size.width,
        size.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::Padding;

    #[test]
    fn tall_thumb_centres_the_track_inside_it() {
        let placement = vertical_placement(Px(40), DEFAULT_MAX_TRACK_HEIGHT, Px(30));
        assert_eq!(placement.track_height, Px(40));
        assert_eq!(placement.thumb_top, Px(5));

        let placement = vertical_placement(Px(100), Px(4), Px(20));
        assert_eq!(
            placement,
            VerticalPlacement {
                track_top: Px(48),
                track_height: Px(4),
                thumb_top: Px(40),
            }
        );
    }

    #[test]
    fn ticks_need_more_than_one_value() {
        let geometry = TrackGeometry {
            size: PxSize::new(Px(120), Px(40)),
            padding: Padding::symmetric(Px(10), Px(0)),
            ..Default::default()
        };
        assert!(tick_marks(&geometry, 1).is_none());

        let ticks = tick_marks(&geometry, 4).unwrap();
        assert_eq!(ticks.count, 5);
        assert_eq!(ticks.spacing, 25.0);
        assert_eq!(ticks.center_y, 20.0);
        let xs: Vec<f32> = ticks.positions().collect();
        assert_eq!(xs, vec![10.0, 35.0, 60.0, 85.0, 110.0]);
    }

    #[test]
    fn thumbs_sit_below_the_top_padding() {
        let geometry = TrackGeometry {
            size: PxSize::new(Px(100), Px(40)),
            padding: Padding {
                top: Px(6),
                ..Padding::default()
            },
            thumb_offset: Px(10),
            ..Default::default()
        };
        let mapper = CoordinateMapper::new(geometry);
        let rect = thumb_rect(
            &mapper,
            0.8,
            WhichThumb::End,
            PxSize::new(Px(20), Px(20)),
            Px(7),
        );
        assert_eq!(rect, PxRect::new(Px(70), Px(13), Px(20), Px(20)));
    }
}
