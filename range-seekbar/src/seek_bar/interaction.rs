use smallvec::SmallVec;
use tracing::trace;

use crate::{
    error::RangeError,
    mapper::WhichThumb,
    px::{PxPosition, PxRect},
};

use super::layout::ThumbRects;

/// Default pointer travel, in pixels, before a press in a scrolling
/// container becomes a drag.
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// The pointer went down.
    Down,
    /// The pointer moved while down.
    Move,
    /// The pointer was released.
    Up,
    /// The gesture was taken away, e.g. by a scrolling ancestor.
    Cancel,
}

/// A single-pointer event in control coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub action: PointerAction,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl PointerEvent {
    /// Pointer pressed at `(x, y)`.
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            action: PointerAction::Down,
            x,
            y,
        }
    }

    /// Pointer moved to `(x, y)`.
    pub fn move_to(x: f32, y: f32) -> Self {
        Self {
            action: PointerAction::Move,
            x,
            y,
        }
    }

    /// Pointer released at `(x, y)`.
    pub fn up(x: f32, y: f32) -> Self {
        Self {
            action: PointerAction::Up,
            x,
            y,
        }
    }

    /// Gesture cancelled at `(x, y)`.
    pub fn cancel(x: f32, y: f32) -> Self {
        Self {
            action: PointerAction::Cancel,
            x,
            y,
        }
    }

    fn position(&self) -> PxPosition {
        PxPosition::from_f32(self.x, self.y)
    }
}

/// Keys understood by the discrete increment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Directional pad left; narrows the range.
    DpadLeft,
    /// Directional pad right; widens the range.
    DpadRight,
    /// Minus; narrows the range.
    Minus,
    /// Plus; widens the range.
    Plus,
    /// Equals, the unshifted plus key; widens the range.
    Equals,
    /// Any other key, identified by the host's key code.
    Other(u32),
}

impl KeyCode {
    /// `-1` for keys that narrow, `1` for keys that widen.
    pub(super) fn direction(self) -> Option<i32> {
        match self {
            KeyCode::DpadLeft | KeyCode::Minus => Some(-1),
            KeyCode::DpadRight | KeyCode::Plus | KeyCode::Equals => Some(1),
            KeyCode::Other(_) => None,
        }
    }
}

/// Result of feeding a pointer event to the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchResponse {
    /// Whether the control consumed the event.
    pub handled: bool,
    /// Whether ancestors should stop intercepting this gesture.
    pub disallow_intercept: bool,
}

/// Phase of the drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    /// No pointer down.
    #[default]
    Idle,
    /// Pointer down inside a scrolling container, not yet a drag.
    PendingSlop {
        /// Horizontal position of the press.
        down_x: f32,
    },
    /// A thumb follows the pointer.
    Dragging(WhichThumb),
}

/// Side effects requested by the drag state machine, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// Pressed state changed.
    Pressed(bool),
    /// Ancestors should stop intercepting the gesture.
    ClaimDrag,
    /// A tracking session began.
    StartTracking,
    /// Move `which` to follow the pointer at control x-coordinate `x`.
    Track {
        /// Thumb to move.
        which: WhichThumb,
        /// Pointer position.
        x: f32,
    },
    /// The tracking session ended.
    StopTracking,
}

/// Effects emitted for one event.
pub type DragEffects = SmallVec<[DragEffect; 6]>;

/// Picks the thumb a press at `point` belongs to.
///
/// Each thumb's bounds are shrunk by a quarter of their size on every side.
/// A point inside a shrunk rectangle selects that thumb, testing Start first.
/// Otherwise the thumb whose centre is horizontally nearer wins, with ties
/// going to Start.
pub fn nearest_thumb(start: PxRect, end: PxRect, point: PxPosition) -> WhichThumb {
    let start_hit = start.inset(start.width / 4, start.height / 4);
    let end_hit = end.inset(end.width / 4, end.height / 4);

    if start_hit.contains(point) {
        return WhichThumb::Start;
    }
    if end_hit.contains(point) {
        return WhichThumb::End;
    }

    let x = point.x.to_f32();
    let start_distance = (x - centre_x(start_hit)).abs();
    let end_distance = (x - centre_x(end_hit)).abs();
    if start_distance <= end_distance {
        WhichThumb::Start
    } else {
        WhichThumb::End
    }
}

fn centre_x(rect: PxRect) -> f32 {
    rect.x.to_f32() + rect.width.to_f32() / 2.0
}

fn hit_test(thumbs: &ThumbRects, point: PxPosition) -> Result<WhichThumb, RangeError> {
    match (thumbs.start, thumbs.end) {
        (Some(start), Some(end)) => Ok(nearest_thumb(start, end, point)),
        (None, _) => Err(RangeError::MissingThumb(WhichThumb::Start)),
        (Some(_), None) => Err(RangeError::MissingThumb(WhichThumb::End)),
    }
}

/// Single-pointer drag state machine.
///
/// The controller never touches the range itself. It turns pointer events
/// into [`DragEffect`]s which the owner applies once its locks are released.
#[derive(Debug, Clone, PartialEq)]
pub struct DragController {
    phase: DragPhase,
    touch_slop: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_TOUCH_SLOP)
    }
}

impl DragController {
    /// Creates an idle controller with the given touch slop in pixels.
    pub fn new(touch_slop: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            touch_slop: touch_slop.max(0.0),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Thumb being dragged, if any.
    pub fn active_thumb(&self) -> Option<WhichThumb> {
        match self.phase {
            DragPhase::Dragging(which) => Some(which),
            _ => None,
        }
    }

    /// Whether a thumb follows the pointer.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Touch slop in pixels.
    pub fn touch_slop(&self) -> f32 {
        self.touch_slop
    }

    /// Replaces the touch slop.
    pub fn set_touch_slop(&mut self, touch_slop: f32) {
        self.touch_slop = touch_slop.max(0.0);
    }

    /// Drops any gesture in progress without emitting effects.
    pub fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Feeds one pointer event.
    ///
    /// `in_scrolling_container` defers a press until the pointer travels
    /// further than the touch slop. A hit test against missing thumb bounds
    /// resets the gesture and fails with [`RangeError::MissingThumb`].
    pub fn handle(
        &mut self,
        event: PointerEvent,
        in_scrolling_container: bool,
        thumbs: &ThumbRects,
    ) -> Result<DragEffects, RangeError> {
        let mut effects = DragEffects::new();
        match (event.action, self.phase) {
            (PointerAction::Down, _) => {
                if in_scrolling_container {
                    self.phase = DragPhase::PendingSlop { down_x: event.x };
                } else {
                    self.start_drag(event, thumbs, &mut effects)?;
                }
            }
            (PointerAction::Move, DragPhase::Dragging(which)) => {
                effects.push(DragEffect::Track { which, x: event.x });
            }
            (PointerAction::Move, DragPhase::PendingSlop { down_x }) => {
                if (event.x - down_x).abs() > self.touch_slop {
                    self.start_drag(event, thumbs, &mut effects)?;
                }
            }
            (PointerAction::Up, DragPhase::Dragging(which)) => {
                self.phase = DragPhase::Idle;
                effects.push(DragEffect::Track { which, x: event.x });
                effects.push(DragEffect::StopTracking);
                effects.push(DragEffect::Pressed(false));
            }
            (PointerAction::Up, DragPhase::PendingSlop { .. }) => {
                self.phase = DragPhase::Idle;
                let which = hit_test(thumbs, event.position())?;
                trace!(?which, x = event.x, "tap seek");
                effects.push(DragEffect::StartTracking);
                effects.push(DragEffect::Track { which, x: event.x });
                effects.push(DragEffect::StopTracking);
            }
            (PointerAction::Cancel, DragPhase::Dragging(_)) => {
                self.phase = DragPhase::Idle;
                effects.push(DragEffect::StopTracking);
                effects.push(DragEffect::Pressed(false));
            }
            (PointerAction::Cancel, _) | (PointerAction::Up, DragPhase::Idle) => {
                self.phase = DragPhase::Idle;
            }
            (PointerAction::Move, DragPhase::Idle) => {}
        }
        Ok(effects)
    }

    fn start_drag(
        &mut self,
        event: PointerEvent,
        thumbs: &ThumbRects,
        effects: &mut DragEffects,
    ) -> Result<(), RangeError> {
        let which = match hit_test(thumbs, event.position()) {
            Ok(which) => which,
            Err(error) => {
                self.phase = DragPhase::Idle;
                return Err(error);
            }
        };
        trace!(?which, x = event.x, "start drag");
        self.phase = DragPhase::Dragging(which);
        effects.push(DragEffect::Pressed(true));
        effects.push(DragEffect::StartTracking);
        effects.push(DragEffect::Track { which, x: event.x });
        effects.push(DragEffect::ClaimDrag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::px::Px;

    /// Thumbs 20px square at fractions 0.2 and 0.8 of a 100px track with a
    /// 10px overhang.
    fn thumbs() -> ThumbRects {
        ThumbRects {
            start: Some(PxRect::new(Px(10), Px(0), Px(20), Px(20))),
            end: Some(PxRect::new(Px(70), Px(0), Px(20), Px(20))),
        }
    }

    fn pick(x: f32) -> WhichThumb {
        let rects = thumbs();
        nearest_thumb(
            rects.start.unwrap(),
            rects.end.unwrap(),
            PxPosition::from_f32(x, 10.0),
        )
    }

    #[test]
    fn hit_test_is_deterministic() {
        assert_eq!(pick(15.0), WhichThumb::Start);
        assert_eq!(pick(90.0), WhichThumb::End);
        assert_eq!(pick(50.0), WhichThumb::Start);
        assert_eq!(pick(49.0), WhichThumb::Start);
        assert_eq!(pick(51.0), WhichThumb::End);
    }

    #[test]
    fn coinciding_thumbs_resolve_to_start() {
        let rect = PxRect::new(Px(40), Px(0), Px(20), Px(20));
        let point = PxPosition::from_f32(50.0, 10.0);
        assert_eq!(nearest_thumb(rect, rect, point), WhichThumb::Start);
    }

    #[test]
    fn press_outside_scroller_starts_dragging_immediately() {
        let mut drag = DragController::default();
        let effects = drag
            .handle(PointerEvent::down(85.0, 10.0), false, &thumbs())
            .unwrap();
        assert_eq!(drag.phase(), DragPhase::Dragging(WhichThumb::End));
        assert_eq!(
            effects.as_slice(),
            &[
                DragEffect::Pressed(true),
                DragEffect::StartTracking,
                DragEffect::Track {
                    which: WhichThumb::End,
                    x: 85.0
                },
                DragEffect::ClaimDrag,
            ]
        );

        let effects = drag
            .handle(PointerEvent::up(60.0, 10.0), false, &thumbs())
            .unwrap();
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert_eq!(effects.len(), 3);
        assert_eq!(effects[1], DragEffect::StopTracking);
    }

    #[test]
    fn slop_gates_drags_inside_scrollers() {
        let mut drag = DragController::new(8.0);
        let rects = thumbs();
        assert!(
            drag.handle(PointerEvent::down(20.0, 10.0), true, &rects)
                .unwrap()
                .is_empty()
        );
        assert!(
            drag.handle(PointerEvent::move_to(27.0, 10.0), true, &rects)
                .unwrap()
                .is_empty()
        );
        assert!(!drag.is_dragging());

        let effects = drag
            .handle(PointerEvent::move_to(29.0, 10.0), true, &rects)
            .unwrap();
        assert_eq!(drag.active_thumb(), Some(WhichThumb::Start));
        assert!(effects.contains(&DragEffect::ClaimDrag));
    }

    #[test]
    fn release_without_slop_is_a_tap_seek() {
        let mut drag = DragController::default();
        let rects = thumbs();
        drag.handle(PointerEvent::down(88.0, 10.0), true, &rects)
            .unwrap();
        let effects = drag
            .handle(PointerEvent::up(88.0, 10.0), true, &rects)
            .unwrap();
        assert_eq!(
            effects.as_slice(),
            &[
                DragEffect::StartTracking,
                DragEffect::Track {
                    which: WhichThumb::End,
                    x: 88.0
                },
                DragEffect::StopTracking,
            ]
        );
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn cancel_stops_without_tracking() {
        let mut drag = DragController::default();
        drag.handle(PointerEvent::down(15.0, 10.0), false, &thumbs())
            .unwrap();
        let effects = drag
            .handle(PointerEvent::cancel(40.0, 10.0), false, &thumbs())
            .unwrap();
        assert_eq!(
            effects.as_slice(),
            &[DragEffect::StopTracking, DragEffect::Pressed(false)]
        );
    }

    #[test]
    fn missing_thumb_aborts_the_gesture() {
        let mut drag = DragController::default();
        let rects = ThumbRects {
            start: thumbs().start,
            end: None,
        };
        assert_eq!(
            drag.handle(PointerEvent::down(15.0, 10.0), false, &rects),
            Err(RangeError::MissingThumb(WhichThumb::End))
        );
        assert_eq!(drag.phase(), DragPhase::Idle);
    }
}
