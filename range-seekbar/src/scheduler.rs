//! Serializes range changes onto the interaction thread.
//!
//! Every model change becomes a [`PendingUpdate`] pushed while the model lock
//! is still held, so the queue order is the order in which the model was
//! assigned. Only the interaction thread pops from the queue. Nothing is ever
//! coalesced or dropped: each update is applied, and observed, exactly once.

use std::{collections::VecDeque, sync::Arc, thread::ThreadId};

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::{
    error::RangeError,
    looper::{InteractionExecutor, Task},
};

/// Capacity the pending queue keeps allocated between bursts.
pub const PENDING_POOL_MAX: usize = 24;

/// A range change waiting to be applied on the interaction thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Normalized start value.
    pub start: i32,
    /// Normalized end value.
    pub end: i32,
    /// Domain maximum when the change was made.
    pub max: i32,
    /// Whether the change came from user interaction.
    pub from_user: bool,
    /// Whether the displayed thumbs should tween to the new values.
    pub animate: bool,
}

/// FIFO of pending updates plus the attach and posting flags.
#[derive(Debug)]
pub struct UpdateQueue {
    pending: VecDeque<PendingUpdate>,
    attached: bool,
    posted: bool,
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateQueue {
    /// An empty, detached queue.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(PENDING_POOL_MAX),
            attached: false,
            posted: false,
        }
    }

    /// Appends an update.
    pub fn push(&mut self, update: PendingUpdate) {
        self.pending.push_back(update);
    }

    /// Takes the oldest update.
    ///
    /// Once the queue runs dry the posted flag is cleared and any capacity a
    /// burst grew beyond [`PENDING_POOL_MAX`] is released.
    pub fn pop(&mut self) -> Option<PendingUpdate> {
        let update = self.pending.pop_front();
        if update.is_none() {
            self.posted = false;
            if self.pending.capacity() > PENDING_POOL_MAX {
                self.pending.shrink_to(PENDING_POOL_MAX);
            }
        }
        update
    }

    /// Number of updates waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the owner is attached to its host surface.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Marks the owner attached or detached. Detaching forgets any posted
    /// flush; updates keep accumulating until the next attach.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
        if !attached {
            self.posted = false;
        }
    }

    /// Claims the right to post a flush. Returns `false` when one is already
    /// in flight or the owner is detached.
    pub fn claim_post(&mut self) -> bool {
        if self.attached && !self.posted {
            self.posted = true;
            true
        } else {
            false
        }
    }
}

/// What the caller must do after releasing its locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// Drain the queue now; the caller is on the interaction thread.
    FlushNow,
    /// Post a flush task to the interaction thread.
    Post,
    /// Nothing yet; a flush is already pending or the owner is detached.
    Deferred,
}

/// Queue, thread affinity and executor of one progress bar.
pub(crate) struct UpdateScheduler {
    queue: Mutex<UpdateQueue>,
    executor: Arc<dyn InteractionExecutor>,
    thread: ThreadId,
}

impl UpdateScheduler {
    /// Binds the scheduler to the calling thread.
    pub(crate) fn new(executor: Arc<dyn InteractionExecutor>) -> Self {
        Self {
            queue: Mutex::new(UpdateQueue::new()),
            executor,
            thread: std::thread::current().id(),
        }
    }

    pub(crate) fn is_interaction_thread(&self) -> bool {
        std::thread::current().id() == self.thread
    }

    /// Rejects calls made from any thread other than the interaction thread.
    pub(crate) fn ensure_interaction_thread(&self, operation: &str) -> Result<(), RangeError> {
        if self.is_interaction_thread() {
            Ok(())
        } else {
            warn!(operation, "ignored call off the interaction thread");
            Err(RangeError::OffInteractionThread)
        }
    }

    /// Queues `update`. Call while holding the model lock.
    pub(crate) fn enqueue(&self, update: PendingUpdate) -> Dispatch {
        let mut queue = self.queue.lock();
        queue.push(update);
        trace!(?update, queued = queue.len(), "update queued");
        if !queue.is_attached() {
            Dispatch::Deferred
        } else if self.is_interaction_thread() {
            Dispatch::FlushNow
        } else if queue.claim_post() {
            Dispatch::Post
        } else {
            Dispatch::Deferred
        }
    }

    /// Pops the next update to apply.
    pub(crate) fn next(&self) -> Option<PendingUpdate> {
        self.queue.lock().pop()
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.queue.lock().is_attached()
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.queue.lock().set_attached(attached);
    }

    pub(crate) fn post(&self, task: Task) {
        self.executor.post(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(start: i32) -> PendingUpdate {
        PendingUpdate {
            start,
            end: 100,
            max: 100,
            from_user: false,
            animate: false,
        }
    }

    #[test]
    fn pops_in_arrival_order() {
        let mut queue = UpdateQueue::new();
        for start in [3, 1, 2] {
            queue.push(update(start));
        }
        let order: Vec<i32> = std::iter::from_fn(|| queue.pop()).map(|u| u.start).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn only_one_flush_is_posted_at_a_time() {
        let mut queue = UpdateQueue::new();
        assert!(!queue.claim_post());
        queue.set_attached(true);
        assert!(queue.claim_post());
        assert!(!queue.claim_post());
        assert_eq!(queue.pop(), None);
        assert!(queue.claim_post());
    }

    #[test]
    fn detaching_forgets_the_posted_flush() {
        let mut queue = UpdateQueue::new();
        queue.set_attached(true);
        assert!(queue.claim_post());
        queue.set_attached(false);
        queue.push(update(1));
        queue.set_attached(true);
        assert!(queue.claim_post());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn burst_capacity_is_released_when_drained() {
        let mut queue = UpdateQueue::new();
        for start in 0..(PENDING_POOL_MAX as i32 * 8) {
            queue.push(update(start));
        }
        while queue.pop().is_some() {}
        assert!(queue.pending.capacity() <= PENDING_POOL_MAX * 2);
    }
}
