use std::time::Duration;

/// Deferred task execution on the UI loop.
pub trait Scheduler {
    /// Runs `task` once, no earlier than `delay` from now.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Runs `task` right away when `delay` is `None`, otherwise schedules it.
pub fn run_after(scheduler: &dyn Scheduler, delay: Option<Duration>, task: impl FnOnce() + 'static) {
    match delay {
        Some(delay) => scheduler.schedule(delay, Box::new(task)),
        None => task(),
    }
}
