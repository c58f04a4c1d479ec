//! Registry of delayed work.
//!
//! Every deferred action is an entry here rather than a free-standing timer, so
//! teardown is one `cancel_all` instead of chasing individual callbacks.

use smallvec::SmallVec;

/// Identifies one scheduled entry for targeted cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    seq: u64,
    generation: u64,
}

struct Entry<T> {
    due_ms: u64,
    seq: u64,
    generation: u64,
    task: T,
}

pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_seq: u64,
    generation: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule_at(&mut self, due_ms: u64, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due_ms,
            seq,
            generation: self.generation,
            task,
        });
        TaskHandle {
            seq,
            generation: self.generation,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        handle.generation == self.generation && self.entries.iter().any(|e| e.seq == handle.seq)
    }

    /// Returns `false` if the task already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        match self.entries.iter().position(|e| e.seq == handle.seq) {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Invalidate every outstanding task and handle at once.
    pub fn cancel_all(&mut self) -> usize {
        self.generation += 1;
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.generation == self.generation)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| e.generation == self.generation)
            .map(|e| e.due_ms)
            .min()
    }

    /// Earliest task due at or before `now_ms`, ties broken by scheduling order.
    pub fn pop_next(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let generation = self.generation;
        let (i, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.generation == generation && e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))?;
        let entry = self.entries.swap_remove(i);
        Some((entry.due_ms, entry.task))
    }

    /// Drain everything due at or before `now_ms`, in due order.
    pub fn pop_due(&mut self, now_ms: u64) -> SmallVec<[(u64, T); 4]> {
        let mut due = SmallVec::new();
        while let Some(item) = self.pop_next(now_ms) {
            due.push(item);
        }
        due
    }
}
