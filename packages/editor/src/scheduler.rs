//! Deferred work owned by one editor session.
//!
//! Two kinds of work are deferred:
//!
//! - tasks queued while an event is handled, run in FIFO order once that
//!   event's own operations have been committed;
//! - a trailing-edge debounce deadline, pushed back by every edit, that tells
//!   the session when the document has been quiet long enough to serialize.
//!
//! Time is passed in by the caller, so nothing here reads a clock.

use crate::{Editor, EditorResult};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::trace;

/// A task run against the editor after the current event
pub type DeferredTask = Box<dyn FnOnce(&mut Editor) -> EditorResult<()>>;

pub struct Scheduler {
    tasks: VecDeque<DeferredTask>,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl Scheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            tasks: VecDeque::new(),
            debounce,
            deadline: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn defer(&mut self, task: impl FnOnce(&mut Editor) -> EditorResult<()> + 'static) {
        self.tasks.push_back(Box::new(task));
    }

    pub fn has_deferred(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Run every queued task in order. Stops at the first failing task; the
    /// tasks after it stay queued.
    pub fn run_deferred(&mut self, editor: &mut Editor) -> EditorResult<usize> {
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_front() {
            task(editor)?;
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "ran deferred tasks");
        }
        Ok(ran)
    }

    /// Restart the debounce window at `now`
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has passed; the deadline is consumed
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop queued tasks and the pending deadline
    pub fn cancel(&mut self) {
        self.tasks.clear();
        self.deadline = None;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(700))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.tasks.len())
            .field("debounce", &self.debounce)
            .field("deadline", &self.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Node, Point};

    #[test]
    fn test_deferred_tasks_run_in_order() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("")]);
        editor.select(Point::new([0, 0], 0)).unwrap();
        let mut scheduler = Scheduler::default();
        scheduler.defer(|editor| editor.insert_text("a"));
        scheduler.defer(|editor| editor.insert_text("b"));

        assert_eq!(scheduler.run_deferred(&mut editor).unwrap(), 2);
        assert_eq!(editor.document().string(), "ab");
        assert!(!scheduler.has_deferred());
    }

    #[test]
    fn test_debounce_is_trailing_edge() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(Duration::from_millis(100));
        scheduler.touch(start);
        scheduler.touch(start + Duration::from_millis(60));

        assert!(!scheduler.due(start + Duration::from_millis(120)));
        assert!(scheduler.due(start + Duration::from_millis(160)));
        assert!(!scheduler.due(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_drops_everything() {
        let mut scheduler = Scheduler::default();
        scheduler.defer(|_| Ok(()));
        scheduler.touch(Instant::now());
        scheduler.cancel();
        assert!(!scheduler.has_deferred());
        assert!(scheduler.deadline().is_none());
    }
}
