//! Virtual-time scheduler.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use lazy_render_core::Scheduler;

struct ScheduledTask {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// [`Scheduler`] whose clock only moves when a test advances it.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    tasks: RefCell<Vec<ScheduledTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Moves the clock forward by `by`, running due tasks in order.
    ///
    /// Tasks scheduled by running tasks also run if they fall due within the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            self.now.set(task.due);
            (task.task)();
            ran += 1;
        }
        self.now.set(target);
        ran
    }

    /// Runs every pending task, advancing the clock as far as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next_due = self.tasks.borrow().iter().map(|task| task.due).max();
            let Some(due) = next_due else {
                return ran;
            };
            ran += self.advance(due.saturating_sub(self.now.get()));
        }
    }

    fn pop_due(&self, target: Duration) -> Option<ScheduledTask> {
        let mut tasks = self.tasks.borrow_mut();
        let index = tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= target)
            .min_by_key(|(_, task)| (task.due, task.seq))
            .map(|(index, _)| index)?;
        Some(tasks.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.tasks.borrow_mut().push(ScheduledTask {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_runs_tasks_in_due_order() {
        let scheduler = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let order = Rc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(20)), 3);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_nested_schedule_within_window() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        {
            let inner_scheduler = Rc::clone(&scheduler);
            let hits = Rc::clone(&hits);
            scheduler.schedule(
                Duration::from_millis(5),
                Box::new(move || {
                    let hits = Rc::clone(&hits);
                    inner_scheduler.schedule(
                        Duration::from_millis(5),
                        Box::new(move || hits.set(hits.get() + 1)),
                    );
                }),
            );
        }
        assert_eq!(scheduler.advance(Duration::from_millis(10)), 2);
        assert_eq!(hits.get(), 1);
    }
}
