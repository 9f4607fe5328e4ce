//! Task posting onto the interaction thread.
//!
//! The seek bar never spawns threads or blocks. When a change arrives from
//! another thread it posts a flush task through an [`InteractionExecutor`]
//! supplied by the host. Hosts with their own event loop implement the trait
//! on top of it; everyone else can use [`Looper`], a small FIFO drained by
//! the thread that created it.

use std::{collections::VecDeque, marker::PhantomData, rc::Rc, sync::Arc};

use parking_lot::Mutex;
use tracing::trace;

use crate::prop::Callback;

/// A unit of work to run on the interaction thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the interaction thread at the next opportunity.
///
/// Implementations must run tasks in the order they were posted.
pub trait InteractionExecutor: Send + Sync {
    /// Schedules `task` to run on the interaction thread.
    fn post(&self, task: Task);
}

#[derive(Default)]
struct LooperQueue {
    tasks: Mutex<VecDeque<Task>>,
    waker: Option<Callback>,
}

/// A FIFO task queue owned by one thread.
///
/// `Looper` is deliberately `!Send`: only the thread that created it can
/// drain it. Hand out [`LooperHandle`]s to post work from anywhere.
///
/// ```
/// use range_seekbar::looper::{InteractionExecutor, Looper};
///
/// let looper = Looper::new();
/// let handle = looper.handle();
/// std::thread::spawn(move || handle.post(Box::new(|| println!("on the loop"))))
///     .join()
///     .unwrap();
/// assert_eq!(looper.run_pending(), 1);
/// ```
pub struct Looper {
    queue: Arc<LooperQueue>,
    _not_send: PhantomData<Rc<()>>,
}

impl Default for Looper {
    fn default() -> Self {
        Self::new()
    }
}

impl Looper {
    /// Creates a looper bound to the current thread.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a looper that invokes `waker` after every post, so a host
    /// event loop can schedule a drain.
    pub fn with_waker(waker: Callback) -> Self {
        Self::build(Some(waker))
    }

    fn build(waker: Option<Callback>) -> Self {
        Self {
            queue: Arc::new(LooperQueue {
                tasks: Mutex::new(VecDeque::new()),
                waker,
            }),
            _not_send: PhantomData,
        }
    }

    /// A cloneable, thread-safe handle for posting tasks.
    pub fn handle(&self) -> LooperHandle {
        LooperHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.tasks.lock().len()
    }

    /// Runs queued tasks in order until the queue is empty, including tasks
    /// posted by the tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.tasks.lock().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        if ran > 0 {
            trace!(ran, "looper drained");
        }
        ran
    }
}

/// Posting side of a [`Looper`].
#[derive(Clone)]
pub struct LooperHandle {
    queue: Arc<LooperQueue>,
}

impl InteractionExecutor for LooperHandle {
    fn post(&self, task: Task) {
        self.queue.tasks.lock().push_back(task);
        if let Some(waker) = &self.queue.waker {
            waker.call();
        }
    }
}
