use std::{
  panic::{self, AssertUnwindSafe},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  thread,
};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{Duration, Instant, PendingTask, Scheduler, TaskQueue};

static WORKER_COUNT: AtomicUsize = AtomicUsize::new(0);

/// A scheduler owning one thread. Once the `Worker` is dropped the thread
/// finishes the tasks already queued, then exits.
pub(crate) struct Worker {
  shared: Arc<Shared>,
}

struct Shared {
  state: Mutex<State>,
  wakeup: Condvar,
}

#[derive(Default)]
struct State {
  tasks: TaskQueue<Instant>,
  shutdown: bool,
}

impl Worker {
  pub fn spawn(name: String) -> Self {
    let shared = Arc::new(Shared { state: Mutex::new(State::default()), wakeup: Condvar::new() });
    let s = shared.clone();
    let spawned = thread::Builder::new().name(name.clone()).spawn(move || run(s));
    if let Err(err) = spawned {
      // Same contract as `std::thread::spawn`.
      panic!("failed to spawn scheduler thread {name}: {err}");
    }
    tracing::debug!(thread = %name, "scheduler thread started");
    Worker { shared }
  }

  pub fn spawn_numbered() -> Self {
    let n = WORKER_COUNT.fetch_add(1, Ordering::Relaxed);
    Worker::spawn(format!("rxvar-worker-{n}"))
  }
}

fn run(shared: Arc<Shared>) {
  let mut state = shared.state.lock();
  loop {
    if let Some((_, task)) = state.tasks.pop_due(Instant::now()) {
      MutexGuard::unlocked(&mut state, || run_guarded(task));
      continue;
    }
    // Tasks queued before shutdown still run, delayed ones at their due time.
    if state.shutdown && state.tasks.is_empty() {
      break;
    }
    match state.tasks.next_due() {
      Some(due) => {
        shared.wakeup.wait_until(&mut state, due);
      }
      None => shared.wakeup.wait(&mut state),
    }
  }
  drop(state);
  tracing::debug!(thread = ?thread::current().name(), "scheduler thread stopped");
}

/// A panicking task must not take the thread, and every task queued
/// behind it, down with it.
fn run_guarded(task: PendingTask) {
  if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
    let message = payload
      .downcast_ref::<&str>()
      .map(|s| s.to_string())
      .or_else(|| payload.downcast_ref::<String>().cloned())
      .unwrap_or_default();
    tracing::error!(thread = ?thread::current().name(), panic = %message, "scheduled task panicked");
  }
}

impl Scheduler for Worker {
  fn post(&self, task: PendingTask, delay: Option<Duration>) {
    let due = Instant::now() + delay.unwrap_or_default();
    self.shared.state.lock().tasks.push(due, task);
    self.shared.wakeup.notify_one();
  }
}

impl Drop for Worker {
  fn drop(&mut self) {
    self.shared.state.lock().shutdown = true;
    self.shared.wakeup.notify_one();
  }
}
