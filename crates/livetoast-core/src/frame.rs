#![forbid(unsafe_code)]

//! Animation-frame batching.
//!
//! Work that reads layout is deferred to the next frame boundary instead of
//! running inside the event that caused it. [`FrameQueue`] holds that work
//! until the host reports a frame and [`FrameQueue::take`] hands it over as a
//! single [`FrameBatch`].
//!
//! # Design
//!
//! The queue uses a "latest wins" strategy:
//! - Recompute requests collapse into one boolean flag. Ten requests before
//!   a frame produce one recompute, which reads whatever state is current
//!   when the frame runs.
//! - Per-item tasks (for example "measure this element") are deduplicated and
//!   keep first-request order. A task can be withdrawn with
//!   [`FrameQueue::forget`] when its subject disappears before the frame.

/// Work collected for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBatch<K> {
    /// Whether a full recompute was requested since the last frame.
    pub recompute: bool,
    /// Per-item tasks in first-request order.
    pub tasks: Vec<K>,
    /// Index of the frame this batch belongs to.
    pub frame_idx: u64,
}

impl<K> FrameBatch<K> {
    /// Whether the batch carries no work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.recompute && self.tasks.is_empty()
    }
}

/// Pending frame work.
///
/// Not thread-safe; owned by the single event-loop context that also owns
/// the state the tasks refer to.
#[derive(Debug, Clone)]
pub struct FrameQueue<K> {
    recompute: bool,
    tasks: Vec<K>,
    frame_idx: u64,
}

impl<K> Default for FrameQueue<K> {
    fn default() -> Self {
        Self {
            recompute: false,
            tasks: Vec::new(),
            frame_idx: 0,
        }
    }
}

impl<K: PartialEq> FrameQueue<K> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a recompute at the next frame.
    pub fn request_recompute(&mut self) {
        self.recompute = true;
    }

    /// Queue a per-item task. Returns `false` if it was already queued.
    pub fn defer(&mut self, task: K) -> bool {
        if self.tasks.contains(&task) {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Withdraw a queued task. Returns `false` if it was not queued.
    pub fn forget(&mut self, task: &K) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|queued| queued != task);
        self.tasks.len() != before
    }

    /// Whether anything is waiting for the next frame.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.recompute || !self.tasks.is_empty()
    }

    /// Number of frames taken so far.
    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    /// Hand over everything collected since the previous frame.
    pub fn take(&mut self) -> FrameBatch<K> {
        self.frame_idx += 1;
        FrameBatch {
            recompute: std::mem::take(&mut self.recompute),
            tasks: std::mem::take(&mut self.tasks),
            frame_idx: self.frame_idx,
        }
    }

    /// Drop pending work without running it.
    pub fn clear(&mut self) {
        self.recompute = false;
        self.tasks.clear();
    }
}
