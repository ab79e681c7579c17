use std::{cell::RefCell, thread};

use super::{Duration, Instant, PendingTask, Scheduler, TaskQueue};

thread_local! {
  /// `Some` while a trampoline is running on this thread.
  static TRAMPOLINE: RefCell<Option<TaskQueue<Instant>>> = const { RefCell::new(None) };
}

pub(crate) struct CurrentThread;

/// Clears the trampoline even if a task panics.
struct Running;

impl Drop for Running {
  fn drop(&mut self) { TRAMPOLINE.with(|t| t.borrow_mut().take()); }
}

fn sleep_until(due: Instant) {
  let now = Instant::now();
  if due > now {
    thread::sleep(due - now);
  }
}

impl Scheduler for CurrentThread {
  fn post(&self, task: PendingTask, delay: Option<Duration>) {
    let due = Instant::now() + delay.unwrap_or_default();
    let task = TRAMPOLINE.with(|t| match t.borrow_mut().as_mut() {
      Some(queue) => {
        queue.push(due, task);
        None
      }
      None => Some(task),
    });
    let Some(task) = task else { return };

    TRAMPOLINE.with(|t| *t.borrow_mut() = Some(TaskQueue::default()));
    let _running = Running;
    sleep_until(due);
    task.run();
    while let Some((due, task)) = TRAMPOLINE.with(|t| t.borrow_mut().as_mut().and_then(TaskQueue::pop)) {
      sleep_until(due);
      task.run();
    }
  }
}
