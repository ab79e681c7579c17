//! Execution contexts for time-based operators and `observe_on`.
//!
//! A [`Scheduler`] only has to accept a task and run it later. The crate
//! ships:
//!
//! | Factory | Runs tasks |
//! |---------|------------|
//! | [`SchedulerRef::current_thread`] | inline on the calling thread, trampolined |
//! | [`SchedulerRef::message_thread`] | on the calling thread's [`MessageLoop`] when it is pumped |
//! | [`SchedulerRef::background_thread`] | on one worker thread shared by the process |
//! | [`SchedulerRef::new_thread`] | on a dedicated worker, stopped once unreferenced |
//! | [`TestScheduler`] | on whoever advances its virtual clock |
//!
//! [`MessageLoop`]: crate::message_loop::MessageLoop

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

pub use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::subscription::SubscriptionLike;

mod current_thread;
mod message_thread;
mod task_queue;
mod test_scheduler;
mod worker;

pub(crate) use task_queue::TaskQueue;
pub use test_scheduler::TestScheduler;

/// Cancellation handle of a scheduled task.
///
/// Unsubscribing prevents the task from running if it hasn't started yet.
/// Periodic tasks share one handle across all their runs.
#[derive(Clone, Default, Debug)]
pub struct TaskHandle(Arc<AtomicBool>);

impl SubscriptionLike for TaskHandle {
  #[inline]
  fn unsubscribe(&self) { self.0.store(true, Ordering::Release) }

  #[inline]
  fn is_closed(&self) -> bool { self.0.load(Ordering::Acquire) }
}

/// A unit of work handed to a [`Scheduler`].
pub struct PendingTask {
  task: Box<dyn FnOnce() + Send>,
  handle: TaskHandle,
}

impl PendingTask {
  pub fn new(task: impl FnOnce() + Send + 'static, handle: TaskHandle) -> Self {
    PendingTask { task: Box::new(task), handle }
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.handle.is_closed() }

  /// Runs the task unless it was cancelled.
  pub fn run(self) {
    if !self.is_cancelled() {
      (self.task)()
    }
  }
}

impl fmt::Debug for PendingTask {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PendingTask").field("cancelled", &self.is_cancelled()).finish()
  }
}

pub trait Scheduler: Send + Sync {
  /// Queues `task` to run after `delay`, or as soon as possible.
  fn post(&self, task: PendingTask, delay: Option<Duration>);
}

/// Shared handle to a scheduler. Handles compare by identity.
#[derive(Clone)]
pub struct SchedulerRef(Arc<dyn Scheduler>);

static BACKGROUND: Lazy<SchedulerRef> =
  Lazy::new(|| SchedulerRef::new(worker::Worker::spawn("rxvar-background".into())));

static CURRENT_THREAD: Lazy<SchedulerRef> =
  Lazy::new(|| SchedulerRef::new(current_thread::CurrentThread));

impl SchedulerRef {
  pub fn new(scheduler: impl Scheduler + 'static) -> Self { SchedulerRef(Arc::new(scheduler)) }

  /// Runs tasks inline on the thread that schedules them. Tasks scheduled
  /// from inside a running task are queued and run after it, by due time.
  /// Delays block the thread.
  pub fn current_thread() -> Self { CURRENT_THREAD.clone() }

  /// Posts tasks to the [`MessageLoop`](crate::message_loop::MessageLoop)
  /// of the calling thread.
  pub fn message_thread() -> Self { message_thread::for_current_thread() }

  /// The process-wide background worker, started on first use.
  pub fn background_thread() -> Self { BACKGROUND.clone() }

  /// A fresh worker thread. Once the last handle is dropped it finishes the
  /// tasks already queued, then stops.
  pub fn new_thread() -> Self { SchedulerRef::new(worker::Worker::spawn_numbered()) }

  pub fn schedule(
    &self, task: impl FnOnce() + Send + 'static, delay: Option<Duration>,
  ) -> TaskHandle {
    let handle = TaskHandle::default();
    tracing::trace!(?delay, "task scheduled");
    self.0.post(PendingTask::new(task, handle.clone()), delay);
    handle
  }

  /// Runs `task` after `initial_delay`, then every `period`, until the
  /// returned handle is unsubscribed.
  pub fn schedule_periodic(
    &self, period: Duration, initial_delay: Option<Duration>, task: impl FnMut() + Send + 'static,
  ) -> TaskHandle {
    let handle = TaskHandle::default();
    repost_periodic(self.clone(), period, initial_delay, task, handle.clone());
    handle
  }
}

fn repost_periodic<F>(
  scheduler: SchedulerRef, period: Duration, delay: Option<Duration>, mut task: F,
  handle: TaskHandle,
) where
  F: FnMut() + Send + 'static,
{
  let next_handle = handle.clone();
  let next_scheduler = scheduler.clone();
  let run = move || {
    task();
    if !next_handle.is_closed() {
      repost_periodic(next_scheduler, period, Some(period), task, next_handle);
    }
  };
  scheduler.0.post(PendingTask::new(run, handle), delay);
}

impl PartialEq for SchedulerRef {
  fn eq(&self, other: &Self) -> bool {
    Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
  }
}

impl Eq for SchedulerRef {}

impl fmt::Debug for SchedulerRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("SchedulerRef").field(&Arc::as_ptr(&self.0)).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::mpsc, thread};

  use parking_lot::Mutex;

  use super::*;

  #[rxvar_macro::test]
  fn identity() {
    assert_eq!(SchedulerRef::background_thread(), SchedulerRef::background_thread());
    assert_eq!(SchedulerRef::current_thread(), SchedulerRef::current_thread());
    assert_eq!(SchedulerRef::message_thread(), SchedulerRef::message_thread());
    assert_ne!(SchedulerRef::new_thread(), SchedulerRef::new_thread());
    assert_ne!(SchedulerRef::background_thread(), SchedulerRef::current_thread());
  }

  #[rxvar_macro::test]
  fn background_runs_off_thread() {
    let (tx, rx) = mpsc::channel();
    SchedulerRef::background_thread().schedule(move || tx.send(thread::current().id()).unwrap(), None);
    let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, thread::current().id());
  }

  #[rxvar_macro::test]
  fn workers_keep_fifo_order() {
    let scheduler = SchedulerRef::new_thread();
    let (tx, rx) = mpsc::channel();
    for i in 0..20 {
      let tx = tx.clone();
      scheduler.schedule(move || tx.send(i).unwrap(), None);
    }
    let got: Vec<_> = (0..20).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert_eq!(got, (0..20).collect::<Vec<_>>());
  }

  #[rxvar_macro::test]
  fn dropped_new_thread_still_runs_queued_tasks() {
    let (tx, rx) = mpsc::channel();
    SchedulerRef::new_thread().schedule(move || tx.send("ran").unwrap(), Some(Duration::from_millis(10)));
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("ran"));
  }

  #[rxvar_macro::test]
  fn background_keeps_running_after_a_panic() {
    let (tx, rx) = mpsc::channel();
    let background = SchedulerRef::background_thread();
    background.schedule(|| panic!("background task failed"), None);
    background.schedule(move || tx.send("still alive").unwrap(), None);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("still alive"));
  }

  #[rxvar_macro::test]
  fn cancelled_task_never_runs() {
    let test = TestScheduler::new();
    let scheduler = SchedulerRef::from(test.clone());
    let ran = Arc::new(AtomicBool::new(false));
    let r = ran.clone();
    let handle = scheduler.schedule(move || r.store(true, Ordering::SeqCst), Some(Duration::from_millis(5)));
    handle.unsubscribe();
    test.advance_by(Duration::from_millis(10));
    assert!(!ran.load(Ordering::SeqCst));
  }

  #[rxvar_macro::test]
  fn periodic_until_cancelled() {
    let test = TestScheduler::new();
    let scheduler = SchedulerRef::from(test.clone());
    let ticks = Arc::new(Mutex::new(vec![]));
    let t = ticks.clone();
    let clock = test.clone();
    let handle = scheduler.schedule_periodic(Duration::from_millis(10), None, move || {
      t.lock().push(clock.now().as_millis())
    });
    test.advance_by(Duration::from_millis(35));
    handle.unsubscribe();
    test.advance_by(Duration::from_millis(100));
    assert_eq!(*ticks.lock(), vec![0, 10, 20, 30]);
  }
}
