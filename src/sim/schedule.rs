//! Deadline-keyed task queue
//!
//! Timed resumptions (respawn settle, hazard release delay) are entries in a
//! per-owner queue, checked once per tick against the owner's clock. Nothing
//! ever blocks; a tick just collects whatever has come due.

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    deadline: f64,
    task: T,
}

/// Pending tasks ordered by deadline, then by scheduling order
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to come due at `deadline`
    pub fn schedule(&mut self, deadline: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        // Insert after every entry due at or before this deadline (FIFO on ties)
        let at = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(at, Entry { id, deadline, task });
        id
    }

    /// Drop a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Pop the earliest task whose deadline is at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<T> {
        if self.entries.first().is_some_and(|e| e.deadline <= now) {
            Some(self.entries.remove(0).task)
        } else {
            None
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<f64> {
        self.entries.first().map(|e| e.deadline)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_deadline_order() {
        let mut queue = TaskQueue::new();
        queue.schedule(3.0, "c");
        queue.schedule(1.0, "a");
        queue.schedule(2.0, "b");

        assert_eq!(queue.pop_due(0.5), None);
        assert_eq!(queue.pop_due(5.0), Some("a"));
        assert_eq!(queue.pop_due(5.0), Some("b"));
        assert_eq!(queue.pop_due(5.0), Some("c"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut queue = TaskQueue::new();
        queue.schedule(1.0, 1);
        queue.schedule(1.0, 2);
        assert_eq!(queue.pop_due(1.0), Some(1));
        assert_eq!(queue.pop_due(1.0), Some(2));
    }

    #[test]
    fn test_cancel_prevents_resumption() {
        let mut queue = TaskQueue::new();
        let id = queue.schedule(1.0, "release");
        assert!(queue.is_pending(id));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert_eq!(queue.pop_due(10.0), None);
    }

    #[test]
    fn test_next_deadline() {
        let mut queue: TaskQueue<()> = TaskQueue::new();
        assert_eq!(queue.next_deadline(), None);
        queue.schedule(4.5, ());
        queue.schedule(1.5, ());
        assert_eq!(queue.next_deadline(), Some(1.5));
    }
}
