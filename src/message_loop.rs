//! A minimal host message loop.
//!
//! GUI toolkits deliver property-change notifications and "message thread"
//! callbacks from their event loop. [`MessageLoop`] models that loop: tasks
//! may be posted from any thread, and run only when the owning thread pumps
//! the loop.

use std::{fmt, sync::Arc};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::{
  scheduler::{Duration, Instant, PendingTask, TaskHandle, TaskQueue},
  subscription::SubscriptionLike,
};

#[derive(Clone)]
pub struct MessageLoop(Arc<Shared>);

struct Shared {
  tasks: Mutex<TaskQueue<Instant>>,
  wakeup: Condvar,
}

thread_local! {
  static CURRENT: MessageLoop = MessageLoop::new();
}

impl Default for MessageLoop {
  fn default() -> Self { Self::new() }
}

impl MessageLoop {
  /// A loop not bound to any thread; pump it from wherever it should run.
  pub fn new() -> Self {
    MessageLoop(Arc::new(Shared { tasks: Mutex::new(TaskQueue::default()), wakeup: Condvar::new() }))
  }

  /// The loop of the calling thread, created on first use.
  pub fn current() -> Self { CURRENT.with(MessageLoop::clone) }

  pub fn post(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
    self.post_delayed(task, Duration::ZERO)
  }

  pub fn post_delayed(&self, task: impl FnOnce() + Send + 'static, delay: Duration) -> TaskHandle {
    let handle = TaskHandle::default();
    self.post_task(PendingTask::new(task, handle.clone()), Some(delay));
    handle
  }

  pub(crate) fn post_task(&self, task: PendingTask, delay: Option<Duration>) {
    let due = Instant::now() + delay.unwrap_or_default();
    self.0.tasks.lock().push(due, task);
    self.0.wakeup.notify_all();
  }

  /// Tasks waiting in the loop, including delayed and cancelled ones.
  pub fn pending(&self) -> usize { self.0.tasks.lock().len() }

  /// Runs every task that is due, including tasks posted while running,
  /// and returns how many ran.
  pub fn run_until_idle(&self) -> usize {
    let mut count = 0;
    loop {
      let task = self.0.tasks.lock().pop_due(Instant::now());
      let Some((_, task)) = task else { break };
      if !task.is_cancelled() {
        count += 1;
      }
      task.run();
    }
    count
  }

  /// Pumps the loop for `duration`, sleeping while nothing is due.
  pub fn run_for(&self, duration: Duration) -> usize {
    let deadline = Instant::now() + duration;
    let mut count = 0;
    loop {
      count += self.run_until_idle();
      let tasks = self.0.tasks.lock();
      if !self.wait(tasks, deadline) {
        return count;
      }
    }
  }

  /// Pumps the loop until `done` returns `true` or `timeout` elapses.
  /// Returns whether `done` was satisfied.
  pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
      self.run_until_idle();
      if done() {
        return true;
      }
      let tasks = self.0.tasks.lock();
      if !self.wait(tasks, deadline) {
        return done();
      }
    }
  }

  /// Sleeps until the next task is due, something is posted, or `deadline`.
  /// Returns `false` once the deadline has passed.
  fn wait(&self, mut tasks: MutexGuard<'_, TaskQueue<Instant>>, deadline: Instant) -> bool {
    let now = Instant::now();
    if now >= deadline {
      return false;
    }
    let wake_at = tasks.next_due().map_or(deadline, |due| due.min(deadline));
    if wake_at > now {
      self.0.wakeup.wait_until(&mut tasks, wake_at);
    }
    true
  }
}

impl PartialEq for MessageLoop {
  fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Debug for MessageLoop {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageLoop").field("pending", &self.pending()).finish()
  }
}
