//! range-seekbar is a headless dual-thumb seek bar for picking an integer
//! range `[start, end]` inside `[0, max]`.
//!
//! The crate owns everything except pixels on screen: the value model with
//! its gap policies and quantization, pointer and key handling, the thumb
//! and track geometry, short progress animations and the delivery of
//! changes onto a single interaction thread. Painting is delegated to a
//! [`RangeRenderer`].
//!
//! # Layers
//!
//! - [`RangeModel`] normalizes every requested range. It never fails on out
//!   of range input.
//! - [`RangeProgressBar`] wraps the model in a lock, queues changes made on
//!   any thread and applies them on the interaction thread, animating the
//!   displayed fractions when asked to.
//! - [`RangeSeekBar`] adds thumbs, hit testing, drags, key presses and
//!   drawing on top of the progress layer.
//!
//! # Threads
//!
//! The thread that creates a bar is its interaction thread. Changes made
//! elsewhere are handed to the host through an [`InteractionExecutor`];
//! [`Looper`] is a ready-made one for hosts without their own event loop.
//!
//! ```
//! use std::sync::Arc;
//!
//! use range_seekbar::{Looper, RangeSeekBar, RangeSeekBarArgs};
//!
//! let looper = Looper::new();
//! let seek_bar = RangeSeekBar::new(RangeSeekBarArgs::default(), Arc::new(looper.handle()))?;
//! seek_bar.attach()?;
//!
//! let remote = seek_bar.clone();
//! std::thread::spawn(move || remote.set_range(30, 60))
//!     .join()
//!     .expect("worker thread panicked");
//!
//! // The value is stored right away; it is painted once the looper runs.
//! assert_eq!(seek_bar.range(), (30, 60));
//! assert_eq!(looper.run_pending(), 1);
//! assert_eq!(seek_bar.progress_bar().visual_progress().start, 0.3);
//! # Ok::<(), range_seekbar::RangeError>(())
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod animation;
pub mod error;
pub mod looper;
pub mod mapper;
pub mod model;
pub mod progress_bar;
pub mod prop;
pub mod px;
pub mod scheduler;
pub mod seek_bar;
pub mod state;

pub use crate::{
    animation::{AnimationSpec, Easing, ProgressAnimation},
    error::RangeError,
    looper::{InteractionExecutor, Looper, LooperHandle, Task},
    mapper::{CoordinateMapper, LayoutDirection, Padding, TrackGeometry, WhichThumb},
    model::{GapPolicy, RangeModel},
    progress_bar::{RangeChange, RangeProgressBar, VisualProgress},
    prop::{Callback, CallbackWith},
    px::{Px, PxPosition, PxRect, PxSize},
    seek_bar::{
        KeyCode, PointerAction, PointerEvent, RangeRenderer, RangeSeekBar, RangeSeekBarArgs,
        RangeSeekBarListener, SeekBarCallbacks, SeekBarFrame, ThumbRects, TickMarks,
        TouchResponse,
    },
    state::SavedState,
};
