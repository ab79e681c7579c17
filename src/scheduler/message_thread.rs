use super::{Duration, PendingTask, Scheduler, SchedulerRef};
use crate::message_loop::MessageLoop;

struct MessageThread(MessageLoop);

impl Scheduler for MessageThread {
  fn post(&self, task: PendingTask, delay: Option<Duration>) { self.0.post_task(task, delay) }
}

thread_local! {
  static MESSAGE_THREAD: SchedulerRef = SchedulerRef::new(MessageThread(MessageLoop::current()));
}

pub(super) fn for_current_thread() -> SchedulerRef { MESSAGE_THREAD.with(SchedulerRef::clone) }

impl MessageLoop {
  /// A scheduler posting to this loop.
  ///
  /// For the calling thread's own loop prefer
  /// [`SchedulerRef::message_thread`], which always returns the same handle.
  pub fn scheduler(&self) -> SchedulerRef {
    if *self == MessageLoop::current() {
      for_current_thread()
    } else {
      SchedulerRef::new(MessageThread(self.clone()))
    }
  }
}
