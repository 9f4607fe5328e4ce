//! A dual-thumb seek bar for selecting an integer range.
//!
//! ## Usage
//!
//! Build a [`RangeSeekBar`] from [`RangeSeekBarArgs`], hand it an
//! [`InteractionExecutor`], feed it pointer and key events on the interaction
//! thread and let a [`RangeRenderer`] paint the bounds it computes.
//!
//! ```
//! use std::sync::Arc;
//!
//! use range_seekbar::{
//!     Looper, RangeChange, RangeSeekBar, RangeSeekBarArgs, SeekBarCallbacks,
//!     px::{Px, PxSize},
//! };
//!
//! let looper = Looper::new();
//! let seek_bar = RangeSeekBar::new(
//!     RangeSeekBarArgs::default()
//!         .max(50)
//!         .min_gap(5)
//!         .start_thumb(PxSize::new(Px(20), Px(20)))
//!         .end_thumb(PxSize::new(Px(20), Px(20))),
//!     Arc::new(looper.handle()),
//! )?;
//! seek_bar.set_callbacks(
//!     SeekBarCallbacks::default().progress_changed(|change: RangeChange| println!("{change:?}")),
//! );
//! seek_bar.attach()?;
//!
//! seek_bar.set_range(10, 12);
//! assert_eq!(seek_bar.range(), (10, 15));
//! # Ok::<(), range_seekbar::RangeError>(())
//! ```

use std::{sync::Arc, time::Instant};

use derive_setters::Setters;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use tracing::{debug, error, trace};

use crate::{
    animation::AnimationSpec,
    error::RangeError,
    looper::InteractionExecutor,
    mapper::{CoordinateMapper, LayoutDirection, Padding, TrackGeometry, WhichThumb},
    progress_bar::{RangeChange, RangeProgressBar, VisualProgress},
    prop::{Callback, CallbackWith},
    px::{Px, PxSize},
    state::SavedState,
};

use layout::{thumb_rect, tick_marks, track_rect};
use render::{render_thumbs, render_track};

pub use interaction::{
    DEFAULT_TOUCH_SLOP, DragController, DragEffect, DragEffects, DragPhase, KeyCode,
    PointerAction, PointerEvent, TouchResponse, nearest_thumb,
};
pub use layout::{
    DEFAULT_MAX_TRACK_HEIGHT, ThumbRects, TickMarks, VerticalPlacement, vertical_placement,
};
pub use render::{RangeRenderer, SeekBarFrame};

mod interaction;
mod layout;
mod render;

/// Key presses that roughly traverse the whole domain.
const KEY_STEPS: i32 = 20;

/// Keeps an explicit key increment unless it is zero or would need more than
/// [`KEY_STEPS`] presses to cross the domain, in which case `max / 20` is
/// used instead.
fn derive_key_increment(increment: i32, max: i32) -> i32 {
    let increment = increment.saturating_abs();
    if increment == 0 || max / increment > KEY_STEPS {
        max / KEY_STEPS
    } else {
        increment
    }
}

/// Construction arguments for [`RangeSeekBar`].
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RangeSeekBarArgs {
    /// Upper bound of the domain.
    pub max: i32,
    /// Initial start value.
    pub start: i32,
    /// Initial end value.
    pub end: i32,
    /// Quantization step; values below one mean no quantization.
    pub step_size: i32,
    /// Minimum distance between the endpoints. Ignored when either boundary
    /// is set.
    pub min_gap: i32,
    /// Upper bound of the start endpoint.
    #[setters(strip_option)]
    pub start_max: Option<i32>,
    /// Lower bound of the end endpoint.
    #[setters(strip_option)]
    pub end_min: Option<i32>,
    /// Whether pointer input may move the thumbs.
    pub user_seekable: bool,
    /// Whether the control reacts to input at all.
    pub enabled: bool,
    /// Host layout direction.
    pub layout_direction: LayoutDirection,
    /// Whether a right-to-left layout mirrors the control.
    pub mirror_for_rtl: bool,
    /// Pointer travel before a press inside a scrolling container becomes a
    /// drag.
    pub touch_slop: f32,
    /// Whether an ancestor may claim gestures for scrolling.
    pub in_scrolling_container: bool,
    /// Padding around the track.
    pub padding: Padding,
    /// Pixels reserved between the two thumbs.
    pub progress_offset: Px,
    /// Thumb overhang past either end of the track. Defaults to half the
    /// start thumb's width.
    #[setters(strip_option)]
    pub thumb_offset: Option<Px>,
    /// Value change per key press; zero derives it from `max`.
    pub key_increment: i32,
    /// Cap on the track height, excluding padding.
    pub max_track_height: Px,
    /// Size of the start thumb.
    #[setters(strip_option)]
    pub start_thumb: Option<PxSize>,
    /// Size of the end thumb.
    #[setters(strip_option)]
    pub end_thumb: Option<PxSize>,
    /// Transition used by animated updates.
    pub animation: AnimationSpec,
    /// Whether to hand tick marks to the renderer.
    pub show_tick_marks: bool,
}

impl Default for RangeSeekBarArgs {
    fn default() -> Self {
        Self {
            max: 100,
            start: 0,
            end: 100,
            step_size: 1,
            min_gap: 0,
            start_max: None,
            end_min: None,
            user_seekable: true,
            enabled: true,
            layout_direction: LayoutDirection::Ltr,
            mirror_for_rtl: false,
            touch_slop: DEFAULT_TOUCH_SLOP,
            in_scrolling_container: false,
            padding: Padding::default(),
            progress_offset: Px::ZERO,
            thumb_offset: None,
            key_increment: 0,
            max_track_height: DEFAULT_MAX_TRACK_HEIGHT,
            start_thumb: None,
            end_thumb: None,
            animation: AnimationSpec::default(),
            show_tick_marks: false,
        }
    }
}

/// Observer of range changes and drag sessions.
///
/// Every method has an empty default, so implementors override only what
/// they need. Methods run on the interaction thread with no internal lock
/// held.
pub trait RangeSeekBarListener: Send + Sync {
    /// The range changed. Called once per applied change.
    fn on_progress_changed(&self, seek_bar: &RangeSeekBar, start: i32, end: i32, from_user: bool) {
        let _ = (seek_bar, start, end, from_user);
    }

    /// A drag or tap began.
    fn on_start_tracking_touch(&self, seek_bar: &RangeSeekBar) {
        let _ = seek_bar;
    }

    /// A drag or tap ended.
    fn on_stop_tracking_touch(&self, seek_bar: &RangeSeekBar) {
        let _ = seek_bar;
    }
}

/// A [`RangeSeekBarListener`] assembled from callback handles.
#[derive(Debug, Clone, Default, PartialEq, Setters)]
#[setters(into)]
pub struct SeekBarCallbacks {
    /// Invoked for every applied range change.
    pub progress_changed: CallbackWith<RangeChange>,
    /// Invoked when a drag or tap begins.
    pub start_tracking: Callback,
    /// Invoked when a drag or tap ends.
    pub stop_tracking: Callback,
}

impl RangeSeekBarListener for SeekBarCallbacks {
    fn on_progress_changed(&self, _: &RangeSeekBar, start: i32, end: i32, from_user: bool) {
        self.progress_changed.call(RangeChange {
            start,
            end,
            from_user,
        });
    }

    fn on_start_tracking_touch(&self, _: &RangeSeekBar) {
        self.start_tracking.call();
    }

    fn on_stop_tracking_touch(&self, _: &RangeSeekBar) {
        self.stop_tracking.call();
    }
}

/// Work left for after the state lock is released.
#[derive(Debug, Clone, Copy)]
enum Outbound {
    StartTracking,
    Seek(WhichThumb, f32),
    StopTracking,
    Invalidate,
}

struct SeekState {
    drag: DragController,
    mapper: CoordinateMapper,
    explicit_thumb_offset: Option<Px>,
    start_thumb: Option<PxSize>,
    end_thumb: Option<PxSize>,
    max_track_height: Px,
    key_increment: i32,
    enabled: bool,
    user_seekable: bool,
    in_scrolling_container: bool,
    pressed: bool,
    show_tick_marks: bool,
    placement: VerticalPlacement,
    thumb_rects: ThumbRects,
}

impl SeekState {
    fn thumb_size(&self, which: WhichThumb) -> Option<PxSize> {
        match which {
            WhichThumb::Start => self.start_thumb,
            WhichThumb::End => self.end_thumb,
        }
    }

    /// Re-derives the thumb offset and vertical placement, then relays out
    /// the thumbs.
    fn resolve_geometry(&mut self, visual: VisualProgress) {
        let mut geometry = *self.mapper.geometry();
        geometry.thumb_offset = self
            .explicit_thumb_offset
            .unwrap_or_else(|| self.start_thumb.map_or(Px::ZERO, |thumb| thumb.width / 2));
        self.mapper.set_geometry(geometry);

        let thumb_height = self.start_thumb.map_or(Px::ZERO, |thumb| thumb.height);
        self.placement = vertical_placement(
            geometry.content_height(),
            self.max_track_height,
            thumb_height,
        );
        self.relayout(visual);
    }

    /// Recomputes the thumb bounds for the displayed fractions.
    fn relayout(&mut self, visual: VisualProgress) {
        let thumb_top = self.placement.thumb_top;
        let mapper = &self.mapper;
        self.thumb_rects = ThumbRects {
            start: self.start_thumb.map(|size| {
                thumb_rect(mapper, visual.start, WhichThumb::Start, size, thumb_top)
            }),
            end: self
                .end_thumb
                .map(|size| thumb_rect(mapper, visual.end, WhichThumb::End, size, thumb_top)),
        };
        trace!(?visual, rects = ?self.thumb_rects, "thumbs laid out");
    }

    fn frame(&self, max: i32) -> Result<SeekBarFrame, RangeError> {
        let start_thumb = self
            .thumb_rects
            .start
            .ok_or(RangeError::MissingThumb(WhichThumb::Start))?;
        let end_thumb = self
            .thumb_rects
            .end
            .ok_or(RangeError::MissingThumb(WhichThumb::End))?;
        let geometry = self.mapper.geometry();
        Ok(SeekBarFrame {
            size: geometry.size,
            track: track_rect(geometry, self.placement),
            start_thumb,
            end_thumb,
            active_thumb: self.drag.active_thumb(),
            tick_marks: if self.show_tick_marks {
                tick_marks(geometry, max)
            } else {
                None
            },
        })
    }
}

struct SeekShared {
    progress: RangeProgressBar,
    state: Mutex<SeekState>,
    listener: RwLock<Option<Arc<dyn RangeSeekBarListener>>>,
}

/// Thread-safe handle to a dual-thumb seek bar.
///
/// Range mutators may be called from any thread. Input, lifecycle, frame
/// and draw entry points belong to the interaction thread, the thread that
/// constructed the seek bar, and fail with
/// [`RangeError::OffInteractionThread`] elsewhere.
#[derive(Clone)]
pub struct RangeSeekBar {
    shared: Arc<SeekShared>,
}

impl std::fmt::Debug for RangeSeekBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSeekBar")
            .field("progress", &self.shared.progress)
            .finish_non_exhaustive()
    }
}

impl RangeSeekBar {
    /// Creates a detached seek bar. The calling thread becomes the
    /// interaction thread.
    ///
    /// Fails when the boundaries or the minimum gap in `args` are invalid
    /// for its `max`.
    pub fn new(
        args: RangeSeekBarArgs,
        executor: Arc<dyn InteractionExecutor>,
    ) -> Result<Self, RangeError> {
        let progress = RangeProgressBar::new(executor);
        progress.set_animation_spec(args.animation);
        progress.set_max(args.max);
        progress.set_step_size(args.step_size);
        if args.start_max.is_some() || args.end_min.is_some() {
            progress.set_boundaries(args.start_max, args.end_min)?;
        } else {
            progress.set_min_gap(args.min_gap)?;
        }
        let start = args.start_max.map_or(args.start, |limit| args.start.min(limit));
        let end = args.end_min.map_or(args.end, |limit| args.end.max(limit));
        progress.set_range(start, end);

        let geometry = TrackGeometry {
            size: PxSize::ZERO,
            padding: args.padding,
            progress_offset: args.progress_offset,
            thumb_offset: Px::ZERO,
            layout_direction: args.layout_direction,
            mirror_for_rtl: args.mirror_for_rtl,
        };
        let mut state = SeekState {
            drag: DragController::new(args.touch_slop),
            mapper: CoordinateMapper::new(geometry),
            explicit_thumb_offset: args.thumb_offset,
            start_thumb: args.start_thumb,
            end_thumb: args.end_thumb,
            max_track_height: args.max_track_height,
            key_increment: derive_key_increment(args.key_increment, progress.max()),
            enabled: args.enabled,
            user_seekable: args.user_seekable,
            in_scrolling_container: args.in_scrolling_container,
            pressed: false,
            show_tick_marks: args.show_tick_marks,
            placement: vertical_placement(Px::ZERO, args.max_track_height, Px::ZERO),
            thumb_rects: ThumbRects::default(),
        };
        state.resolve_geometry(progress.visual_progress());
        debug!(?args, "seek bar created");

        let shared = Arc::new(SeekShared {
            progress,
            state: Mutex::new(state),
            listener: RwLock::new(None),
        });

        let weak = Arc::downgrade(&shared);
        shared
            .progress
            .on_visual_progress_changed(move |visual: VisualProgress| {
                if let Some(shared) = weak.upgrade() {
                    shared.state.lock().relayout(visual);
                }
            });
        let weak = Arc::downgrade(&shared);
        shared
            .progress
            .on_progress_refresh(move |change: RangeChange| {
                if let Some(shared) = weak.upgrade() {
                    RangeSeekBar { shared }.notify_progress_changed(change);
                }
            });

        Ok(Self { shared })
    }

    /// The underlying progress layer.
    pub fn progress_bar(&self) -> &RangeProgressBar {
        &self.shared.progress
    }

    /// Current start value.
    pub fn start(&self) -> i32 {
        self.shared.progress.start()
    }

    /// Current end value.
    pub fn end(&self) -> i32 {
        self.shared.progress.end()
    }

    /// Current `(start, end)` pair.
    pub fn range(&self) -> (i32, i32) {
        self.shared.progress.range()
    }

    /// Upper bound of the domain.
    pub fn max(&self) -> i32 {
        self.shared.progress.max()
    }

    /// Sets the range without animation. Returns whether it changed.
    pub fn set_range(&self, start: i32, end: i32) -> bool {
        self.shared.progress.set_range(start, end)
    }

    /// Sets the range, tweening the thumbs when `animate` is set.
    pub fn set_range_with_animation(&self, start: i32, end: i32, animate: bool) -> bool {
        self.shared
            .progress
            .set_range_with_animation(start, end, animate)
    }

    /// Sets the domain maximum and re-derives the key increment.
    pub fn set_max(&self, max: i32) -> bool {
        let changed = self.shared.progress.set_max(max);
        let max = self.shared.progress.max();
        let mut state = self.shared.state.lock();
        state.key_increment = derive_key_increment(state.key_increment, max);
        changed
    }

    /// Sets the quantization step and re-quantizes the range.
    pub fn set_step_size(&self, step_size: i32) {
        self.shared.progress.set_step_size(step_size);
    }

    /// See [`RangeProgressBar::set_min_gap`].
    pub fn set_min_gap(&self, min_gap: i32) -> Result<(), RangeError> {
        self.shared.progress.set_min_gap(min_gap)
    }

    /// See [`RangeProgressBar::set_boundaries`].
    pub fn set_boundaries(
        &self,
        start_max: Option<i32>,
        end_min: Option<i32>,
    ) -> Result<(), RangeError> {
        self.shared.progress.set_boundaries(start_max, end_min)
    }

    /// Value change per key press.
    pub fn key_increment(&self) -> i32 {
        self.shared.state.lock().key_increment
    }

    /// Sets the value change per key press. The sign is ignored.
    pub fn set_key_increment(&self, increment: i32) {
        self.shared.state.lock().key_increment = increment.saturating_abs();
    }

    /// Installs the observer, replacing any previous one.
    pub fn set_listener(&self, listener: impl RangeSeekBarListener + 'static) {
        *self.shared.listener.write() = Some(Arc::new(listener));
    }

    /// Installs callback handles as the observer.
    pub fn set_callbacks(&self, callbacks: SeekBarCallbacks) {
        self.set_listener(callbacks);
    }

    /// Removes the observer.
    pub fn clear_listener(&self) {
        *self.shared.listener.write() = None;
    }

    fn listener(&self) -> Option<Arc<dyn RangeSeekBarListener>> {
        self.shared.listener.read().clone()
    }

    fn notify_progress_changed(&self, change: RangeChange) {
        if let Some(listener) = self.listener() {
            listener.on_progress_changed(self, change.start, change.end, change.from_user);
        }
    }

    fn update_state(
        &self,
        operation: &str,
        update: impl FnOnce(&mut SeekState),
    ) -> Result<(), RangeError> {
        self.shared.progress.ensure_interaction_thread(operation)?;
        let visual = self.shared.progress.visual_progress();
        {
            let mut state = self.shared.state.lock();
            update(&mut state);
            state.resolve_geometry(visual);
        }
        self.shared.progress.invalidate();
        Ok(())
    }

    /// Sets the size of both thumbs.
    pub fn set_thumbs(&self, start: PxSize, end: PxSize) -> Result<(), RangeError> {
        self.update_state("set_thumbs", |state| {
            state.start_thumb = Some(start);
            state.end_thumb = Some(end);
        })
    }

    /// Resizes the control.
    pub fn set_size(&self, size: PxSize) -> Result<(), RangeError> {
        debug!(?size, "set_size");
        self.update_state("set_size", |state| {
            let mut geometry = *state.mapper.geometry();
            geometry.size = size;
            state.mapper.set_geometry(geometry);
        })
    }

    /// Replaces the padding around the track.
    pub fn set_padding(&self, padding: Padding) -> Result<(), RangeError> {
        self.update_state("set_padding", |state| {
            let mut geometry = *state.mapper.geometry();
            geometry.padding = padding;
            state.mapper.set_geometry(geometry);
        })
    }

    /// Sets the host layout direction.
    pub fn set_layout_direction(&self, direction: LayoutDirection) -> Result<(), RangeError> {
        self.update_state("set_layout_direction", |state| {
            let mut geometry = *state.mapper.geometry();
            geometry.layout_direction = direction;
            state.mapper.set_geometry(geometry);
        })
    }

    /// Sets whether a right-to-left layout mirrors the control.
    pub fn set_mirror_for_rtl(&self, mirror: bool) -> Result<(), RangeError> {
        self.update_state("set_mirror_for_rtl", |state| {
            let mut geometry = *state.mapper.geometry();
            geometry.mirror_for_rtl = mirror;
            state.mapper.set_geometry(geometry);
        })
    }

    /// Sets the pixels reserved between the two thumbs.
    pub fn set_progress_offset(&self, offset: Px) -> Result<(), RangeError> {
        self.update_state("set_progress_offset", |state| {
            let mut geometry = *state.mapper.geometry();
            geometry.progress_offset = offset;
            state.mapper.set_geometry(geometry);
        })
    }

    /// Sets the thumb overhang; `None` restores half the start thumb width.
    pub fn set_thumb_offset(&self, offset: Option<Px>) -> Result<(), RangeError> {
        self.update_state("set_thumb_offset", |state| state.explicit_thumb_offset = offset)
    }

    /// Effective thumb overhang.
    pub fn thumb_offset(&self) -> Px {
        self.shared.state.lock().mapper.geometry().thumb_offset
    }

    /// Sets the cap on the track height.
    pub fn set_max_track_height(&self, height: Px) -> Result<(), RangeError> {
        self.update_state("set_max_track_height", |state| state.max_track_height = height)
    }

    /// Enables or disables tick marks.
    pub fn set_show_tick_marks(&self, show: bool) -> Result<(), RangeError> {
        self.update_state("set_show_tick_marks", |state| state.show_tick_marks = show)
    }

    /// Current geometry.
    pub fn geometry(&self) -> TrackGeometry {
        *self.shared.state.lock().mapper.geometry()
    }

    /// Bounds of both thumbs for the displayed progress.
    pub fn thumb_bounds(&self) -> ThumbRects {
        self.shared.state.lock().thumb_rects
    }

    /// Enables or disables input.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.state.lock().enabled = enabled;
        self.shared.progress.invalidate();
    }

    /// Whether the control reacts to input.
    pub fn is_enabled(&self) -> bool {
        self.shared.state.lock().enabled
    }

    /// Sets whether pointer input may move the thumbs.
    pub fn set_user_seekable(&self, seekable: bool) {
        self.shared.state.lock().user_seekable = seekable;
    }

    /// Whether pointer input may move the thumbs.
    pub fn is_user_seekable(&self) -> bool {
        self.shared.state.lock().user_seekable
    }

    /// Tells the control whether an ancestor scrolls, deferring presses until
    /// they exceed the touch slop.
    pub fn set_in_scrolling_container(&self, in_scrolling_container: bool) {
        self.shared.state.lock().in_scrolling_container = in_scrolling_container;
    }

    /// Replaces the touch slop.
    pub fn set_touch_slop(&self, touch_slop: f32) {
        self.shared.state.lock().drag.set_touch_slop(touch_slop);
    }

    /// Whether a drag holds the control pressed.
    pub fn is_pressed(&self) -> bool {
        self.shared.state.lock().pressed
    }

    /// Thumb being dragged.
    pub fn active_thumb(&self) -> Option<WhichThumb> {
        self.shared.state.lock().drag.active_thumb()
    }

    /// Current phase of the drag gesture.
    pub fn drag_phase(&self) -> DragPhase {
        self.shared.state.lock().drag.phase()
    }

    /// See [`RangeProgressBar::attach`].
    pub fn attach(&self) -> Result<(), RangeError> {
        self.shared.progress.attach()
    }

    /// See [`RangeProgressBar::detach`].
    pub fn detach(&self) -> Result<(), RangeError> {
        self.shared.progress.detach()
    }

    /// See [`RangeProgressBar::on_frame`].
    pub fn on_frame(&self, now: Instant) -> Result<bool, RangeError> {
        self.shared.progress.on_frame(now)
    }

    /// Snapshot of the range for persistence.
    pub fn save_state(&self) -> SavedState {
        self.shared.progress.save_state()
    }

    /// Re-applies a saved snapshot.
    pub fn restore_state(&self, state: SavedState) -> bool {
        self.shared.progress.restore_state(state)
    }

    /// Feeds a pointer event.
    ///
    /// A disabled or non-seekable control leaves the event unhandled. A press
    /// before both thumbs are sized aborts the gesture with
    /// [`RangeError::MissingThumb`].
    pub fn on_touch_event(&self, event: PointerEvent) -> Result<TouchResponse, RangeError> {
        self.shared.progress.ensure_interaction_thread("on_touch_event")?;
        let mut response = TouchResponse::default();

        let outbound = {
            let mut state = self.shared.state.lock();
            if !state.enabled || !state.user_seekable {
                return Ok(response);
            }
            let in_scrolling_container = state.in_scrolling_container;
            let rects = state.thumb_rects;
            let effects = state
                .drag
                .handle(event, in_scrolling_container, &rects)
                .inspect_err(|err| error!(%err, ?event, "gesture aborted"))?;
            response.handled = true;

            let mut outbound: SmallVec<[Outbound; 6]> = SmallVec::new();
            for effect in effects {
                match effect {
                    DragEffect::Pressed(pressed) => {
                        state.pressed = pressed;
                        outbound.push(Outbound::Invalidate);
                    }
                    DragEffect::ClaimDrag => response.disallow_intercept = true,
                    DragEffect::StartTracking => outbound.push(Outbound::StartTracking),
                    DragEffect::Track { which, x } => {
                        let Some(thumb) = state.thumb_size(which) else {
                            state.drag.reset();
                            state.pressed = false;
                            error!(?which, "missing thumb while tracking");
                            return Err(RangeError::MissingThumb(which));
                        };
                        let fraction = state.mapper.touch_to_fraction(x, which, thumb.width);
                        outbound.push(Outbound::Seek(which, fraction));
                    }
                    DragEffect::StopTracking => outbound.push(Outbound::StopTracking),
                }
            }
            outbound
        };

        for action in outbound {
            match action {
                Outbound::StartTracking => {
                    if let Some(listener) = self.listener() {
                        listener.on_start_tracking_touch(self);
                    }
                }
                Outbound::Seek(which, fraction) => {
                    self.shared.progress.track_thumb(which, fraction);
                }
                Outbound::StopTracking => {
                    if let Some(listener) = self.listener() {
                        listener.on_stop_tracking_touch(self);
                    }
                }
                Outbound::Invalidate => self.shared.progress.invalidate(),
            }
        }
        Ok(response)
    }

    /// Feeds a key press. Left and minus narrow the range by one key
    /// increment on each side; right, plus and equals widen it. The change
    /// is animated. Returns whether the range changed.
    ///
    /// A domain below twenty derives a zero increment, so keys change
    /// nothing until [`Self::set_key_increment`] supplies one.
    pub fn on_key_down(&self, key: KeyCode) -> Result<bool, RangeError> {
        self.shared.progress.ensure_interaction_thread("on_key_down")?;
        let (enabled, increment) = {
            let state = self.shared.state.lock();
            (state.enabled, state.key_increment)
        };
        let Some(direction) = key.direction() else {
            return Ok(false);
        };
        if !enabled {
            return Ok(false);
        }
        Ok(self.shared.progress.widen_range(increment * direction))
    }

    /// Hands the current frame to `renderer`: track, tick marks, then the
    /// start and end thumbs.
    pub fn draw<R: RangeRenderer + ?Sized>(&self, renderer: &mut R) -> Result<(), RangeError> {
        self.shared.progress.ensure_interaction_thread("draw")?;
        let max = self.shared.progress.max();
        let (frame, geometry) = {
            let state = self.shared.state.lock();
            let frame = state
                .frame(max)
                .inspect_err(|err| error!(%err, "draw skipped"))?;
            (frame, *state.mapper.geometry())
        };

        let track = renderer.track_bounds(frame.size, frame.track);
        let indicator = if geometry.is_mirrored() {
            let width = geometry.size.width;
            self.shared
                .progress
                .indicator_bounds(track.mirror_horizontally(width), geometry.progress_offset)
                .mirror_horizontally(width)
        } else {
            self.shared
                .progress
                .indicator_bounds(track, geometry.progress_offset)
        };
        trace!(?frame, ?indicator, "draw");

        render_track(renderer, track, indicator, frame.tick_marks.as_ref());
        render_thumbs(renderer, &frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        looper::Looper,
        px::PxRect,
    };

    const THUMB: PxSize = PxSize::new(Px(20), Px(20));

    fn seek_bar(looper: &Looper, args: RangeSeekBarArgs) -> RangeSeekBar {
        let bar = RangeSeekBar::new(
            args.start_thumb(THUMB).end_thumb(THUMB),
            Arc::new(looper.handle()),
        )
        .unwrap();
        bar.set_size(PxSize::new(Px(100), Px(20))).unwrap();
        bar.attach().unwrap();
        bar
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RangeSeekBarListener for Arc<Recorder> {
        fn on_progress_changed(&self, _: &RangeSeekBar, start: i32, end: i32, from_user: bool) {
            self.events
                .lock()
                .push(format!("progress {start} {end} {from_user}"));
        }

        fn on_start_tracking_touch(&self, _: &RangeSeekBar) {
            self.events.lock().push("start".to_owned());
        }

        fn on_stop_tracking_touch(&self, _: &RangeSeekBar) {
            self.events.lock().push("stop".to_owned());
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<String>,
    }

    impl RangeRenderer for RecordingRenderer {
        fn draw_track(&mut self, track: PxRect, indicator: PxRect) {
            self.calls.push(format!(
                "track {}..{} indicator {}..{}",
                track.x.0,
                track.right().0,
                indicator.x.0,
                indicator.right().0
            ));
        }

        fn draw_tick_marks(&mut self, ticks: &TickMarks) {
            self.calls.push(format!("ticks {}", ticks.count));
        }

        fn draw_thumb(&mut self, which: WhichThumb, bounds: PxRect, active: bool) {
            self.calls
                .push(format!("{which:?} {} {active}", bounds.x.0));
        }
    }

    #[test]
    fn default_thumb_offset_is_half_the_start_thumb() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        assert_eq!(bar.thumb_offset(), Px(10));
        bar.set_thumb_offset(Some(Px(4))).unwrap();
        assert_eq!(bar.thumb_offset(), Px(4));
    }

    #[test]
    fn thumb_bounds_follow_the_range() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        bar.set_range(20, 80);
        let rects = bar.thumb_bounds();
        assert_eq!(rects.start.map(|r| r.x), Some(Px(10)));
        assert_eq!(rects.end.map(|r| r.x), Some(Px(70)));
    }

    #[test]
    fn dragging_the_end_thumb_reports_user_changes() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        bar.set_range(20, 80);
        let recorder = Arc::new(Recorder::default());
        bar.set_listener(Arc::clone(&recorder));

        let response = bar.on_touch_event(PointerEvent::down(80.0, 10.0)).unwrap();
        assert!(response.handled && response.disallow_intercept);
        assert!(bar.is_pressed());
        assert_eq!(bar.active_thumb(), Some(WhichThumb::End));

        bar.on_touch_event(PointerEvent::move_to(60.0, 10.0)).unwrap();
        assert_eq!(bar.range(), (20, 60));
        bar.on_touch_event(PointerEvent::up(60.0, 10.0)).unwrap();
        assert!(!bar.is_pressed());
        assert_eq!(bar.active_thumb(), None);

        assert_eq!(
            *recorder.events.lock(),
            vec!["start", "progress 20 60 true", "stop"]
        );
    }

    #[test]
    fn drag_respects_min_gap() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default().min_gap(10));
        bar.set_range(20, 50);
        bar.on_touch_event(PointerEvent::down(20.0, 10.0)).unwrap();
        bar.on_touch_event(PointerEvent::move_to(95.0, 10.0)).unwrap();
        assert_eq!(bar.range(), (40, 50));
    }

    #[test]
    fn disabled_control_ignores_input() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default().enabled(false));
        let response = bar.on_touch_event(PointerEvent::down(50.0, 10.0)).unwrap();
        assert_eq!(response, TouchResponse::default());
        assert_eq!(bar.on_key_down(KeyCode::DpadRight), Ok(false));
    }

    #[test]
    fn missing_thumb_fails_touch_and_draw() {
        let looper = Looper::new();
        let bar = RangeSeekBar::new(
            RangeSeekBarArgs::default().start_thumb(THUMB),
            Arc::new(looper.handle()),
        )
        .unwrap();
        bar.set_size(PxSize::new(Px(100), Px(20))).unwrap();
        bar.attach().unwrap();

        assert_eq!(
            bar.on_touch_event(PointerEvent::down(50.0, 10.0)),
            Err(RangeError::MissingThumb(WhichThumb::End))
        );
        assert_eq!(bar.drag_phase(), DragPhase::Idle);
        let mut renderer = RecordingRenderer::default();
        assert_eq!(
            bar.draw(&mut renderer),
            Err(RangeError::MissingThumb(WhichThumb::End))
        );
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn keys_narrow_and_widen_symmetrically() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        assert_eq!(bar.key_increment(), 5);
        bar.set_range(20, 80);

        assert_eq!(bar.on_key_down(KeyCode::DpadLeft), Ok(true));
        assert_eq!(bar.range(), (25, 75));
        assert!(bar.progress_bar().is_animating());
        assert_eq!(bar.on_key_down(KeyCode::Equals), Ok(true));
        assert_eq!(bar.range(), (20, 80));
        assert_eq!(bar.on_key_down(KeyCode::Other(7)), Ok(false));
    }

    #[test]
    fn key_increment_is_rederived_for_large_domains() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default().key_increment(3));
        assert_eq!(bar.key_increment(), 5);
        bar.set_max(1000);
        assert_eq!(bar.key_increment(), 50);
        bar.set_key_increment(-7);
        assert_eq!(bar.key_increment(), 7);
    }

    #[test]
    fn small_domain_keys_need_an_explicit_increment() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default().max(10).start(2).end(8));
        assert_eq!(bar.key_increment(), 0);
        assert_eq!(bar.on_key_down(KeyCode::DpadLeft), Ok(false));
        assert_eq!(bar.range(), (2, 8));

        bar.set_key_increment(1);
        assert_eq!(bar.on_key_down(KeyCode::DpadLeft), Ok(true));
        assert_eq!(bar.range(), (3, 7));
    }

    #[test]
    fn draw_hands_bounds_to_the_renderer() {
        let looper = Looper::new();
        let bar = seek_bar(
            &looper,
            RangeSeekBarArgs::default().max(4).show_tick_marks(true),
        );
        bar.set_range(1, 3);
        let mut renderer = RecordingRenderer::default();
        bar.draw(&mut renderer).unwrap();
        assert_eq!(
            renderer.calls,
            vec![
                "track 0..100 indicator 25..75",
                "ticks 5",
                "Start 15 false",
                "End 65 false",
            ]
        );
    }

    #[test]
    fn repaint_requested_on_press() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&repaints);
        bar.progress_bar().on_invalidate(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bar.on_touch_event(PointerEvent::down(5.0, 10.0)).unwrap();
        assert!(repaints.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn interaction_entry_points_reject_other_threads() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        let remote = bar.clone();
        let result = std::thread::spawn(move || {
            (
                remote.on_touch_event(PointerEvent::down(5.0, 5.0)),
                remote.set_range(10, 20),
            )
        })
        .join()
        .unwrap();
        assert_eq!(result.0, Err(RangeError::OffInteractionThread));
        assert!(result.1);
        assert_eq!(looper.run_pending(), 1);
        assert_eq!(bar.progress_bar().visual_progress().start, 0.1);
    }

    #[test]
    fn geometry_setters_reject_other_threads() {
        let looper = Looper::new();
        let bar = seek_bar(&looper, RangeSeekBarArgs::default());
        let before = bar.thumb_bounds();
        let remote = bar.clone();
        let results = std::thread::spawn(move || {
            [
                remote.set_size(PxSize::new(Px(400), Px(40))),
                remote.set_thumbs(THUMB, PxSize::new(Px(8), Px(8))),
                remote.set_show_tick_marks(true),
            ]
        })
        .join()
        .unwrap();
        assert!(
            results
                .iter()
                .all(|result| *result == Err(RangeError::OffInteractionThread))
        );
        assert_eq!(bar.geometry().size, PxSize::new(Px(100), Px(20)));
        assert_eq!(bar.thumb_bounds(), before);
    }
}
