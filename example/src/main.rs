//! Drives a range seek bar the way a host event loop would: a worker thread
//! pushes values, the main thread feeds pointer and key input, runs
//! animation frames and paints through a logging renderer.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use range_seekbar::{
    KeyCode, LayoutDirection, Looper, Padding, PointerEvent, Px, PxRect, PxSize, RangeChange,
    RangeRenderer, RangeSeekBar, RangeSeekBarArgs, RangeSeekBarListener, TickMarks, WhichThumb,
};
use tracing::info;

const FRAME: Duration = Duration::from_millis(16);

struct LoggingRenderer;

impl RangeRenderer for LoggingRenderer {
    fn draw_track(&mut self, track: PxRect, indicator: PxRect) {
        info!(?track, ?indicator, "draw track");
    }

    fn draw_tick_marks(&mut self, ticks: &TickMarks) {
        let positions: Vec<f32> = ticks.positions().collect();
        info!(?positions, "draw ticks");
    }

    fn draw_thumb(&mut self, which: WhichThumb, bounds: PxRect, active: bool) {
        info!(?which, ?bounds, active, "draw thumb");
    }
}

#[derive(Default)]
struct LoggingListener {
    changes: Mutex<Vec<RangeChange>>,
}

/// Local handle so the listener can be shared with the seek bar (orphan rule).
struct SharedListener(Arc<LoggingListener>);

impl RangeSeekBarListener for SharedListener {
    fn on_progress_changed(&self, _: &RangeSeekBar, start: i32, end: i32, from_user: bool) {
        info!(start, end, from_user, "progress changed");
        self.0.changes.lock().push(RangeChange {
            start,
            end,
            from_user,
        });
    }

    fn on_start_tracking_touch(&self, seek_bar: &RangeSeekBar) {
        info!(thumb = ?seek_bar.active_thumb(), "start tracking");
    }

    fn on_stop_tracking_touch(&self, seek_bar: &RangeSeekBar) {
        info!(range = ?seek_bar.range(), "stop tracking");
    }
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("info,range_seekbar=debug") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("info"),
        },
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Runs animation frames until the transition settles.
fn run_frames(seek_bar: &RangeSeekBar) -> Result<usize, range_seekbar::RangeError> {
    let mut now = Instant::now();
    let mut frames = 0;
    while seek_bar.on_frame(now)? {
        now += FRAME;
        frames += 1;
    }
    Ok(frames)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let looper = Looper::new();
    let seek_bar = RangeSeekBar::new(
        RangeSeekBarArgs::default()
            .max(40)
            .start(10)
            .end(30)
            .min_gap(4)
            .padding(Padding::symmetric(Px(16), Px(4)))
            .start_thumb(PxSize::new(Px(24), Px(24)))
            .end_thumb(PxSize::new(Px(24), Px(24)))
            .max_track_height(Px(4))
            .show_tick_marks(true),
        Arc::new(looper.handle()),
    )?;
    let listener = Arc::new(LoggingListener::default());
    seek_bar.set_listener(SharedListener(Arc::clone(&listener)));
    seek_bar.set_size(PxSize::new(Px(232), Px(32)))?;
    seek_bar.attach()?;
    seek_bar.draw(&mut LoggingRenderer)?;

    let remote = seek_bar.clone();
    let worker = std::thread::spawn(move || {
        remote.set_range(5, 12);
        remote.set_range_with_animation(12, 36, true);
    });
    if worker.join().is_err() {
        return Err("worker thread panicked".into());
    }
    let tasks = looper.run_pending();
    info!(tasks, range = ?seek_bar.range(), "worker updates flushed");
    let frames = run_frames(&seek_bar)?;
    info!(frames, "animation settled");

    let end = seek_bar
        .thumb_bounds()
        .end
        .ok_or("end thumb not laid out")?;
    let grab_x = end.center_x().to_f32();
    seek_bar.on_touch_event(PointerEvent::down(grab_x, 16.0))?;
    seek_bar.on_touch_event(PointerEvent::move_to(grab_x - 60.0, 16.0))?;
    seek_bar.draw(&mut LoggingRenderer)?;
    seek_bar.on_touch_event(PointerEvent::up(grab_x - 60.0, 16.0))?;

    let narrowed = seek_bar.on_key_down(KeyCode::DpadLeft)?;
    info!(narrowed, increment = seek_bar.key_increment(), "key press");
    run_frames(&seek_bar)?;

    seek_bar.set_mirror_for_rtl(true)?;
    seek_bar.set_layout_direction(LayoutDirection::Rtl)?;
    seek_bar.draw(&mut LoggingRenderer)?;

    let saved = seek_bar.save_state();
    info!(bytes = ?saved.to_bytes(), "saved state");
    info!(
        changes = listener.changes.lock().len(),
        range = ?seek_bar.range(),
        "done"
    );
    Ok(())
}
