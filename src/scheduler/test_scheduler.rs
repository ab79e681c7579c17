//! Test Scheduler for deterministic testing of time-based operators.
//!
//! Virtual time only advances when explicitly instructed, and tasks run
//! synchronously on the thread that advances it.
//!
//! ```rust
//! use rxvar::prelude::*;
//!
//! let clock = TestScheduler::new();
//! let got = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
//! let g = got.clone();
//! let _d = Observable::interval_on(Duration::from_millis(10), clock.clone().into())
//!   .take(3)
//!   .subscribe(move |v| g.lock().push(v));
//!
//! clock.advance_by(Duration::from_millis(25));
//! assert_eq!(*got.lock(), vec![1, 2, 3]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Duration, PendingTask, Scheduler, SchedulerRef, TaskQueue};

/// A virtual time scheduler.
///
/// Clones share the same clock and task queue.
#[derive(Clone, Default)]
pub struct TestScheduler(Arc<Mutex<State>>);

#[derive(Default)]
struct State {
  now: Duration,
  tasks: TaskQueue<Duration>,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Virtual time elapsed since creation.
  pub fn now(&self) -> Duration { self.0.lock().now }

  pub fn pending_count(&self) -> usize { self.0.lock().tasks.len() }

  /// Moves the clock forward by `duration`, running every task that falls
  /// due on the way, in order. Tasks scheduled by those tasks run too when
  /// they fall due within the window.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  pub fn advance_to(&self, target: Duration) {
    loop {
      let next = {
        let mut state = self.0.lock();
        match state.tasks.pop_due(target) {
          Some((due, task)) => {
            state.now = state.now.max(due);
            task
          }
          None => {
            state.now = state.now.max(target);
            break;
          }
        }
      };
      next.run();
    }
  }

  /// Runs tasks until the queue is empty, jumping the clock to each due
  /// time. Never returns while a periodic task is active.
  pub fn flush(&self) {
    loop {
      let next = {
        let mut state = self.0.lock();
        let Some((due, task)) = state.tasks.pop() else { break };
        state.now = state.now.max(due);
        task
      };
      next.run();
    }
  }
}

impl Scheduler for TestScheduler {
  fn post(&self, task: PendingTask, delay: Option<Duration>) {
    let mut state = self.0.lock();
    let due = state.now + delay.unwrap_or_default();
    state.tasks.push(due, task);
  }
}

impl From<TestScheduler> for SchedulerRef {
  fn from(scheduler: TestScheduler) -> Self { SchedulerRef::new(scheduler) }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;

  #[rxvar_macro::test]
  fn runs_tasks_in_virtual_time_order() {
    let clock = TestScheduler::new();
    let scheduler = SchedulerRef::from(clock.clone());
    let log = Arc::new(Mutex::new(vec![]));
    for (delay, name) in [(30, "c"), (10, "a"), (20, "b")] {
      let l = log.clone();
      scheduler.schedule(move || l.lock().push(name), Some(Duration::from_millis(delay)));
    }
    clock.advance_by(Duration::from_millis(15));
    assert_eq!(*log.lock(), vec!["a"]);
    assert_eq!(clock.now(), Duration::from_millis(15));
    assert_eq!(clock.pending_count(), 2);
    clock.flush();
    assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    assert_eq!(clock.now(), Duration::from_millis(30));
  }

  #[rxvar_macro::test]
  fn tasks_scheduled_by_tasks() {
    let clock = TestScheduler::new();
    let scheduler = SchedulerRef::from(clock.clone());
    let log = Arc::new(Mutex::new(vec![]));
    let (l, s, c) = (log.clone(), scheduler.clone(), clock.clone());
    scheduler.schedule(
      move || {
        let l2 = l.clone();
        let c2 = c.clone();
        s.schedule(move || l2.lock().push(c2.now()), Some(Duration::from_millis(5)));
      },
      Some(Duration::from_millis(5)),
    );
    clock.advance_by(Duration::from_millis(20));
    assert_eq!(*log.lock(), vec![Duration::from_millis(10)]);
  }
}
