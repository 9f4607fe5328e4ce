use crate::{
    mapper::WhichThumb,
    px::{PxRect, PxSize},
};

use super::layout::TickMarks;

/// Paints what the seek bar computes.
///
/// The seek bar supplies bounds in control coordinates; the renderer owns
/// drawables, colours and the canvas.
pub trait RangeRenderer {
    /// Bounds of the track for a control of `size`. `computed` is the
    /// seek bar's own placement; override to substitute a different one.
    fn track_bounds(&self, size: PxSize, computed: PxRect) -> PxRect {
        let _ = size;
        computed
    }

    /// Draws the track and the active indicator between the thumbs.
    fn draw_track(&mut self, track: PxRect, indicator: PxRect);

    /// Draws tick marks. Only called when tick marks are enabled.
    fn draw_tick_marks(&mut self, ticks: &TickMarks) {
        let _ = ticks;
    }

    /// Draws one thumb. `active` is set for the thumb being dragged.
    fn draw_thumb(&mut self, which: WhichThumb, bounds: PxRect, active: bool);
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekBarFrame {
    /// Control size.
    pub size: PxSize,
    /// Computed track bounds.
    pub track: PxRect,
    /// Start thumb bounds.
    pub start_thumb: PxRect,
    /// End thumb bounds.
    pub end_thumb: PxRect,
    /// Thumb being dragged.
    pub active_thumb: Option<WhichThumb>,
    /// Tick marks, when enabled.
    pub tick_marks: Option<TickMarks>,
}

pub(super) fn render_track<R: RangeRenderer + ?Sized>(
    renderer: &mut R,
    track: PxRect,
    indicator: PxRect,
    tick_marks: Option<&TickMarks>,
) {
    renderer.draw_track(track, indicator);
    if let Some(ticks) = tick_marks {
        renderer.draw_tick_marks(ticks);
    }
}

pub(super) fn render_thumbs<R: RangeRenderer + ?Sized>(renderer: &mut R, frame: &SeekBarFrame) {
    let active = frame.active_thumb;
    renderer.draw_thumb(
        WhichThumb::Start,
        frame.start_thumb,
        active == Some(WhichThumb::Start),
    );
    renderer.draw_thumb(
        WhichThumb::End,
        frame.end_thumb,
        active == Some(WhichThumb::End),
    );
}
