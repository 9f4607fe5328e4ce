//! The progress layer: authoritative range plus what is currently painted.
//!
//! [`RangeProgressBar`] owns the [`RangeModel`], the update queue and the
//! displayed ("visual") fractions of both endpoints. It has no pointer input;
//! [`crate::RangeSeekBar`] layers thumbs and gestures on top of it.
//!
//! Mutators may be called from any thread. Visual state only ever changes on
//! the interaction thread, which is the thread that created the bar:
//!
//! - On the interaction thread while attached, a change is applied before the
//!   call returns.
//! - Anywhere else, or while detached, the change is queued and a flush is
//!   posted through the [`InteractionExecutor`]. Queued changes are applied in
//!   order when the flush runs or when the bar is attached.
//!
//! Callbacks are invoked with no internal lock held, so they may call back
//! into the bar.

use std::{
    sync::{Arc, Weak},
    time::Instant,
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::{
    animation::{AnimationSpec, ProgressAnimation},
    error::RangeError,
    looper::InteractionExecutor,
    mapper::{WhichThumb, value_to_fraction},
    model::RangeModel,
    prop::{Callback, CallbackWith},
    px::{Px, PxRect},
    scheduler::{Dispatch, PendingUpdate, UpdateScheduler},
    state::SavedState,
};

/// Displayed position of both endpoints as fractions of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualProgress {
    /// Displayed start fraction.
    pub start: f32,
    /// Displayed end fraction.
    pub end: f32,
}

impl VisualProgress {
    /// Creates a visual progress pair.
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    fn as_pair(self) -> (f32, f32) {
        (self.start, self.end)
    }
}

/// An applied range change as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeChange {
    /// New start value.
    pub start: i32,
    /// New end value.
    pub end: i32,
    /// Whether the change came from user interaction.
    pub from_user: bool,
}

struct VisualState {
    current: VisualProgress,
    animation: Option<ProgressAnimation>,
    spec: AnimationSpec,
}

#[derive(Default, Clone)]
struct ProgressCallbacks {
    visual: Vec<CallbackWith<VisualProgress>>,
    refresh: Vec<CallbackWith<RangeChange>>,
    invalidate: Vec<Callback>,
}

struct ProgressInner {
    model: Mutex<RangeModel>,
    scheduler: UpdateScheduler,
    visual: Mutex<VisualState>,
    callbacks: RwLock<ProgressCallbacks>,
}

/// Thread-safe handle to a range progress bar.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct RangeProgressBar {
    inner: Arc<ProgressInner>,
}

impl std::fmt::Debug for RangeProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let model = self.inner.model.lock();
        f.debug_struct("RangeProgressBar")
            .field("max", &model.max())
            .field("start", &model.start())
            .field("end", &model.end())
            .finish_non_exhaustive()
    }
}

impl RangeProgressBar {
    /// Creates a detached bar spanning `[0, 100]` with the whole domain
    /// selected. The calling thread becomes the interaction thread.
    pub fn new(executor: Arc<dyn InteractionExecutor>) -> Self {
        let model = RangeModel::new();
        let current = VisualProgress::new(
            model.fraction_of(model.start()),
            model.fraction_of(model.end()),
        );
        Self {
            inner: Arc::new(ProgressInner {
                model: Mutex::new(model),
                scheduler: UpdateScheduler::new(executor),
                visual: Mutex::new(VisualState {
                    current,
                    animation: None,
                    spec: AnimationSpec::default(),
                }),
                callbacks: RwLock::new(ProgressCallbacks::default()),
            }),
        }
    }

    /// Current start value.
    pub fn start(&self) -> i32 {
        self.inner.model.lock().start()
    }

    /// Current end value.
    pub fn end(&self) -> i32 {
        self.inner.model.lock().end()
    }

    /// Current `(start, end)` pair, read atomically.
    pub fn range(&self) -> (i32, i32) {
        let model = self.inner.model.lock();
        (model.start(), model.end())
    }

    /// Upper bound of the domain.
    pub fn max(&self) -> i32 {
        self.inner.model.lock().max()
    }

    /// Quantization step.
    pub fn step_size(&self) -> i32 {
        self.inner.model.lock().step_size()
    }

    /// Fixed minimum gap, or `None` while explicit boundaries are set.
    pub fn min_gap(&self) -> Option<i32> {
        self.inner.model.lock().min_gap()
    }

    /// Configured upper bound of the start endpoint.
    pub fn start_max(&self) -> Option<i32> {
        self.inner.model.lock().start_max()
    }

    /// Configured lower bound of the end endpoint.
    pub fn end_min(&self) -> Option<i32> {
        self.inner.model.lock().end_min()
    }

    /// Largest value the start endpoint can currently take.
    pub fn start_max_value(&self) -> i32 {
        self.inner.model.lock().start_max_value()
    }

    /// Smallest value the end endpoint can currently take.
    pub fn end_min_value(&self) -> i32 {
        self.inner.model.lock().end_min_value()
    }

    /// A copy of the model.
    pub fn model(&self) -> RangeModel {
        self.inner.model.lock().clone()
    }

    /// Sets the range without animation. Returns whether it changed.
    pub fn set_range(&self, start: i32, end: i32) -> bool {
        self.update_range(start, end, false, false)
    }

    /// Sets the range, tweening the displayed thumbs when `animate` is set.
    pub fn set_range_with_animation(&self, start: i32, end: i32, animate: bool) -> bool {
        self.update_range(start, end, false, animate)
    }

    pub(crate) fn update_range(&self, start: i32, end: i32, from_user: bool, animate: bool) -> bool {
        let dispatch = {
            let mut model = self.inner.model.lock();
            if !model.set_range(start, end) {
                trace!(start, end, "set_range unchanged");
                return false;
            }
            debug!(
                start = model.start(),
                end = model.end(),
                from_user,
                animate,
                "set_range"
            );
            self.enqueue_current(&model, from_user, animate)
        };
        self.dispatch(dispatch);
        true
    }

    /// Moves one endpoint to `fraction` of the domain on behalf of a drag.
    ///
    /// Start is clamped to `[0, start_max_value]` and End to
    /// `[end_min_value, max]` before the usual normalization. The change is
    /// reported as user-driven and is never animated.
    pub(crate) fn track_thumb(&self, which: WhichThumb, fraction: f32) -> bool {
        let dispatch = {
            let mut model = self.inner.model.lock();
            let progress = fraction * model.max() as f32;
            let (start, end) = match which {
                WhichThumb::Start => {
                    let limit = model.start_max_value().max(0);
                    let start = round_half_up(progress.clamp(0.0, limit as f32));
                    (start, model.end())
                }
                WhichThumb::End => {
                    let floor = model.end_min_value().min(model.max());
                    let end = round_half_up(progress.clamp(floor as f32, model.max() as f32));
                    (model.start(), end)
                }
            };
            trace!(?which, fraction, start, end, "track thumb");
            if !model.set_range(start, end) {
                return false;
            }
            self.enqueue_current(&model, true, false)
        };
        self.dispatch(dispatch);
        true
    }

    /// Moves both endpoints outward by `delta`, or inward when `delta` is
    /// negative, as one user-driven animated change.
    pub(crate) fn widen_range(&self, delta: i32) -> bool {
        let dispatch = {
            let mut model = self.inner.model.lock();
            let start = model.start().saturating_sub(delta);
            let end = model.end().saturating_add(delta);
            if !model.set_range(start, end) {
                return false;
            }
            debug!(delta, start = model.start(), end = model.end(), "widen_range");
            self.enqueue_current(&model, true, true)
        };
        self.dispatch(dispatch);
        true
    }

    /// Sets the domain maximum, pulling the endpoints down when needed.
    ///
    /// A change always refreshes the displayed progress and notifies
    /// observers, even when the endpoints themselves did not move.
    pub fn set_max(&self, max: i32) -> bool {
        let dispatch = {
            let mut model = self.inner.model.lock();
            if !model.set_max(max) {
                return false;
            }
            self.enqueue_current(&model, false, false)
        };
        self.dispatch(dispatch);
        true
    }

    /// Sets the quantization step and re-quantizes the current range.
    pub fn set_step_size(&self, step_size: i32) {
        let dispatch = {
            let mut model = self.inner.model.lock();
            model.set_step_size(step_size);
            self.renormalize(&mut model)
        };
        self.dispatch(dispatch);
    }

    /// Keeps the endpoints at least `min_gap` apart, clearing any explicit
    /// boundaries.
    pub fn set_min_gap(&self, min_gap: i32) -> Result<(), RangeError> {
        let dispatch = {
            let mut model = self.inner.model.lock();
            model.set_min_gap(min_gap)?;
            self.renormalize(&mut model)
        };
        self.dispatch(dispatch);
        Ok(())
    }

    /// Bounds the start endpoint from above and the end endpoint from below,
    /// clearing any fixed minimum gap.
    pub fn set_boundaries(
        &self,
        start_max: Option<i32>,
        end_min: Option<i32>,
    ) -> Result<(), RangeError> {
        let dispatch = {
            let mut model = self.inner.model.lock();
            model.set_boundaries(start_max, end_min)?;
            self.renormalize(&mut model)
        };
        self.dispatch(dispatch);
        Ok(())
    }

    /// Re-applies the stored range under the current rules.
    fn renormalize(&self, model: &mut RangeModel) -> Dispatch {
        let (start, end) = (model.start(), model.end());
        if model.set_range(start, end) {
            self.enqueue_current(model, false, false)
        } else {
            Dispatch::Deferred
        }
    }

    fn enqueue_current(&self, model: &RangeModel, from_user: bool, animate: bool) -> Dispatch {
        self.inner.scheduler.enqueue(PendingUpdate {
            start: model.start(),
            end: model.end(),
            max: model.max(),
            from_user,
            animate,
        })
    }

    fn dispatch(&self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::FlushNow => self.flush(),
            Dispatch::Post => self.post_flush(),
            Dispatch::Deferred => {}
        }
    }

    fn post_flush(&self) {
        let weak: Weak<ProgressInner> = Arc::downgrade(&self.inner);
        self.inner.scheduler.post(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                let bar = RangeProgressBar { inner };
                if bar.inner.scheduler.is_attached() {
                    bar.flush();
                }
            }
        }));
    }

    fn flush(&self) {
        while let Some(update) = self.inner.scheduler.next() {
            self.apply(update);
        }
    }

    fn apply(&self, update: PendingUpdate) {
        let target = VisualProgress::new(
            value_to_fraction(update.start, update.max),
            value_to_fraction(update.end, update.max),
        );

        let shown = {
            let mut visual = self.inner.visual.lock();
            if update.animate {
                let animation = ProgressAnimation::new(
                    visual.current.as_pair(),
                    target.as_pair(),
                    visual.spec,
                    Instant::now(),
                );
                visual.animation = Some(animation);
            } else {
                visual.animation = None;
                visual.current = target;
            }
            visual.current
        };
        trace!(?update, ?target, ?shown, "applied update");

        self.notify_visual(shown);
        self.notify_refresh(RangeChange {
            start: update.start,
            end: update.end,
            from_user: update.from_user,
        });
    }

    fn notify_visual(&self, visual: VisualProgress) {
        let visual_callbacks = self.inner.callbacks.read().visual.clone();
        for callback in &visual_callbacks {
            callback.call(visual);
        }
        self.invalidate();
    }

    /// Asks the host to repaint without changing the displayed progress.
    pub(crate) fn invalidate(&self) {
        let invalidate = self.inner.callbacks.read().invalidate.clone();
        for callback in &invalidate {
            callback.call();
        }
    }

    fn notify_refresh(&self, change: RangeChange) {
        let refresh = self.inner.callbacks.read().refresh.clone();
        for callback in &refresh {
            callback.call(change);
        }
    }

    /// Marks the bar attached to its host surface and applies every update
    /// queued while it was detached.
    pub fn attach(&self) -> Result<(), RangeError> {
        self.inner.scheduler.ensure_interaction_thread("attach")?;
        self.inner.scheduler.set_attached(true);
        debug!(pending = self.inner.scheduler.pending(), "attached");
        self.flush();
        Ok(())
    }

    /// Marks the bar detached. Later updates queue until the next attach.
    pub fn detach(&self) -> Result<(), RangeError> {
        self.inner.scheduler.ensure_interaction_thread("detach")?;
        self.inner.scheduler.set_attached(false);
        debug!("detached");
        Ok(())
    }

    /// Whether the bar is attached.
    pub fn is_attached(&self) -> bool {
        self.inner.scheduler.is_attached()
    }

    /// Number of updates waiting to be applied.
    pub fn pending_updates(&self) -> usize {
        self.inner.scheduler.pending()
    }

    /// Whether calls are being made from the interaction thread.
    pub fn is_interaction_thread(&self) -> bool {
        self.inner.scheduler.is_interaction_thread()
    }

    pub(crate) fn ensure_interaction_thread(&self, operation: &str) -> Result<(), RangeError> {
        self.inner.scheduler.ensure_interaction_thread(operation)
    }

    /// Displayed fractions of both endpoints.
    pub fn visual_progress(&self) -> VisualProgress {
        self.inner.visual.lock().current
    }

    /// Whether a transition is in progress.
    pub fn is_animating(&self) -> bool {
        self.inner.visual.lock().animation.is_some()
    }

    /// Duration and easing used for animated updates.
    pub fn animation_spec(&self) -> AnimationSpec {
        self.inner.visual.lock().spec
    }

    /// Replaces the duration and easing used for later animated updates.
    pub fn set_animation_spec(&self, spec: AnimationSpec) {
        self.inner.visual.lock().spec = spec;
    }

    /// Advances a running transition to `now`.
    ///
    /// The timeline starts when the animated update is applied, so a first
    /// frame arriving after the full duration lands on the target. Call from
    /// the host's frame callback after a repaint request. Returns `true`
    /// while further frames are needed.
    pub fn on_frame(&self, now: Instant) -> Result<bool, RangeError> {
        self.inner.scheduler.ensure_interaction_thread("on_frame")?;
        let (shown, running) = {
            let mut visual = self.inner.visual.lock();
            let Some(animation) = visual.animation.as_mut() else {
                return Ok(false);
            };
            let frame = animation.sample(now);
            visual.current = VisualProgress::new(frame.start, frame.end);
            if frame.finished {
                visual.animation = None;
            }
            (visual.current, !frame.finished)
        };
        trace!(?shown, running, "animation frame");
        self.notify_visual(shown);
        Ok(running)
    }

    /// Bounds of the active track indicator inside `track`.
    ///
    /// The indicator spans `[start * w, progress_offset + end * w]` from the
    /// track's left edge, where `w` is the track width minus
    /// `progress_offset`, using the displayed fractions truncated to whole
    /// pixels.
    pub fn indicator_bounds(&self, track: PxRect, progress_offset: Px) -> PxRect {
        let visual = self.visual_progress();
        let width = (track.width - progress_offset).max(Px::ZERO).to_f32();
        let left = track.x + Px::saturating_from_f32(visual.start * width);
        let right = track.x + progress_offset + Px::saturating_from_f32(visual.end * width);
        PxRect::from_ltrb(left, track.y, right.max(left), track.bottom())
    }

    /// Registers a handler for every change of the displayed fractions.
    pub fn on_visual_progress_changed(&self, callback: impl Into<CallbackWith<VisualProgress>>) {
        self.inner.callbacks.write().visual.push(callback.into());
    }

    /// Registers a handler invoked once per applied range change.
    pub fn on_progress_refresh(&self, callback: impl Into<CallbackWith<RangeChange>>) {
        self.inner.callbacks.write().refresh.push(callback.into());
    }

    /// Registers a repaint request handler.
    pub fn on_invalidate(&self, callback: impl Into<Callback>) {
        self.inner.callbacks.write().invalidate.push(callback.into());
    }

    /// Snapshot of the current range for persistence.
    pub fn save_state(&self) -> SavedState {
        let (start, end) = self.range();
        SavedState::new(start, end)
    }

    /// Re-applies a snapshot taken by [`Self::save_state`].
    pub fn restore_state(&self, state: SavedState) -> bool {
        self.set_range(state.start, state.end)
    }
}

fn round_half_up(value: f32) -> i32 {
    Px::saturating_from_f32((value + 0.5).floor()).0
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        animation::PROGRESS_ANIMATION_DURATION,
        looper::{Looper, LooperHandle},
    };

    fn attached_bar(looper: &Looper) -> RangeProgressBar {
        let handle: LooperHandle = looper.handle();
        let bar = RangeProgressBar::new(Arc::new(handle));
        bar.attach().unwrap();
        bar
    }

    fn record_changes(bar: &RangeProgressBar) -> Arc<Mutex<Vec<RangeChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bar.on_progress_refresh(move |change: RangeChange| sink.lock().push(change));
        log
    }

    #[test]
    fn interaction_thread_updates_apply_immediately() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        let log = record_changes(&bar);

        assert!(bar.set_range(20, 60));
        assert_eq!(bar.visual_progress(), VisualProgress::new(0.2, 0.6));
        assert_eq!(
            *log.lock(),
            vec![RangeChange {
                start: 20,
                end: 60,
                from_user: false
            }]
        );
        assert_eq!(looper.pending(), 0);
    }

    #[test]
    fn unchanged_range_does_not_notify() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        let log = record_changes(&bar);
        assert!(bar.set_range(10, 40));
        assert!(!bar.set_range(10, 40));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn detached_updates_wait_for_attach() {
        let looper = Looper::new();
        let bar = RangeProgressBar::new(Arc::new(looper.handle()));
        let log = record_changes(&bar);

        bar.set_range(5, 10);
        bar.set_range(6, 11);
        assert!(log.lock().is_empty());
        assert_eq!(bar.pending_updates(), 2);

        bar.attach().unwrap();
        let starts: Vec<i32> = log.lock().iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![5, 6]);
    }

    #[test]
    fn set_max_notifies_even_without_endpoint_change() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(10, 20);
        let log = record_changes(&bar);

        assert!(bar.set_max(200));
        assert_eq!(bar.range(), (10, 20));
        assert_eq!(bar.visual_progress(), VisualProgress::new(0.05, 0.1));
        assert_eq!(log.lock().len(), 1);
        assert!(!log.lock()[0].from_user);
    }

    #[test]
    fn step_change_requantizes_range() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(24, 77);
        bar.set_step_size(10);
        assert_eq!(bar.range(), (20, 80));
    }

    #[test]
    fn rejected_configuration_keeps_range() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(10, 90);
        assert_eq!(
            bar.set_boundaries(Some(70), Some(60)),
            Err(RangeError::InvalidBoundaries {
                start_max: 70,
                end_min: 60
            })
        );
        assert_eq!(bar.range(), (10, 90));
        bar.set_boundaries(Some(30), Some(95)).unwrap();
        assert_eq!(bar.range(), (10, 95));
    }

    #[test]
    fn animated_update_converges_on_target() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(20, 80);
        let repaints = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&repaints);
        bar.on_invalidate(move || *counter.lock() += 1);

        assert!(bar.set_range_with_animation(50, 90, true));
        assert!(bar.is_animating());
        assert_eq!(bar.visual_progress(), VisualProgress::new(0.2, 0.8));

        let t0 = Instant::now();
        assert!(bar.on_frame(t0).unwrap());
        assert!(bar.on_frame(t0 + Duration::from_millis(40)).unwrap());
        let mid = bar.visual_progress();
        assert!(mid.start > 0.2 && mid.start < 0.5);

        assert!(!bar.on_frame(t0 + PROGRESS_ANIMATION_DURATION).unwrap());
        assert_eq!(bar.visual_progress(), VisualProgress::new(0.5, 0.9));
        assert!(!bar.is_animating());
        assert!(*repaints.lock() >= 4);
    }

    #[test]
    fn late_first_frame_finishes_the_transition() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(20, 80);
        bar.set_range_with_animation(50, 90, true);
        let late = Instant::now() + Duration::from_millis(200);
        assert!(!bar.on_frame(late).unwrap());
        assert_eq!(bar.visual_progress(), VisualProgress::new(0.5, 0.9));
    }

    #[test]
    fn queued_update_keeps_the_scale_it_was_made_at() {
        let looper = Looper::new();
        let bar = RangeProgressBar::new(Arc::new(looper.handle()));
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&shown);
        bar.on_visual_progress_changed(move |visual: VisualProgress| sink.lock().push(visual));

        bar.set_range(25, 75);
        bar.set_max(50);
        bar.attach().unwrap();
        assert_eq!(
            *shown.lock(),
            vec![VisualProgress::new(0.25, 0.75), VisualProgress::new(0.5, 1.0)]
        );
    }

    #[test]
    fn retargeting_keeps_the_displayed_position() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(0, 100);
        bar.set_range_with_animation(50, 100, true);
        let t0 = Instant::now();
        bar.on_frame(t0).unwrap();
        bar.on_frame(t0 + Duration::from_millis(40)).unwrap();
        let before = bar.visual_progress();

        bar.set_range_with_animation(10, 100, true);
        assert_eq!(bar.visual_progress(), before);
    }

    #[test]
    fn indicator_spans_visual_fractions() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(25, 75);
        let track = PxRect::new(Px(10), Px(0), Px(110), Px(4));
        let indicator = bar.indicator_bounds(track, Px(10));
        assert_eq!(indicator.x, Px(35));
        assert_eq!(indicator.right(), Px(95));
    }

    #[test]
    fn state_round_trips_through_set_range() {
        let looper = Looper::new();
        let bar = attached_bar(&looper);
        bar.set_range(12, 34);
        let saved = bar.save_state();
        bar.set_range(0, 100);
        assert!(bar.restore_state(saved));
        assert_eq!(bar.range(), (12, 34));
    }
}
