use std::{
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{Notification, Observer},
  scheduler::SchedulerRef,
  subscriber::Subscriber,
};

struct ObserveOnOp<Item> {
  source: Observable<Item>,
  scheduler: SchedulerRef,
}

/// Notifications waiting for the scheduler. At most one drain task is
/// scheduled at a time, which keeps delivery in order.
struct Mailbox<Item> {
  queue: Mutex<VecDeque<Notification<Item>>>,
  scheduled: AtomicBool,
}

impl<Item: Payload> Subscribable<Item> for ObserveOnOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let mailbox = Arc::new(Mailbox { queue: Mutex::new(VecDeque::new()), scheduled: AtomicBool::new(false) });
    let m = mailbox.clone();
    subscriber.subscription().add_teardown(move || m.queue.lock().clear());
    let observer =
      ObserveOnObserver { downstream: subscriber.clone(), mailbox, scheduler: self.scheduler.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct ObserveOnObserver<Item> {
  downstream: Subscriber<Item>,
  mailbox: Arc<Mailbox<Item>>,
  scheduler: SchedulerRef,
}

impl<Item: Payload> ObserveOnObserver<Item> {
  fn post(&self, notification: Notification<Item>) {
    if self.downstream.is_closed() {
      return;
    }
    self.mailbox.queue.lock().push_back(notification);
    if self.mailbox.scheduled.swap(true, Ordering::AcqRel) {
      return;
    }
    let (mailbox, downstream) = (self.mailbox.clone(), self.downstream.clone());
    self.scheduler.schedule(move || drain(&mailbox, &downstream), None);
  }
}

fn drain<Item: Payload>(mailbox: &Mailbox<Item>, downstream: &Subscriber<Item>) {
  loop {
    let notification = {
      let mut queue = mailbox.queue.lock();
      match queue.pop_front() {
        Some(n) if !downstream.is_closed() => n,
        _ => {
          queue.clear();
          mailbox.scheduled.store(false, Ordering::Release);
          return;
        }
      }
    };
    downstream.emit(notification);
  }
}

impl<Item: Payload> Observer<Item> for ObserveOnObserver<Item> {
  fn next(&mut self, value: Item) { self.post(Notification::Next(value)) }

  fn error(&mut self, err: RxError) { self.post(Notification::Error(err)) }

  fn complete(&mut self) { self.post(Notification::Complete) }
}

impl<Item: Payload> Observable<Item> {
  /// Delivers every notification to downstream observers on `scheduler`,
  /// in the order they were produced.
  ///
  /// Upstream work keeps running where it was triggered. Disposing the
  /// subscription drops notifications still waiting to be delivered.
  pub fn observe_on(&self, scheduler: SchedulerRef) -> Observable<Item> {
    Observable::new(ObserveOnOp { source: self.clone(), scheduler })
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, thread};

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn delivers_in_order_on_the_target_thread() {
    let caller = thread::current().id();
    let threads = Arc::new(Mutex::new(vec![]));
    let t = threads.clone();
    let result = Observable::from_iter(0..100)
      .observe_on(SchedulerRef::new_thread())
      .map(move |v| {
        t.lock().push(thread::current().id());
        v
      })
      .to_vec();
    assert_eq!(result, Ok((0..100).collect()));
    let threads = threads.lock();
    assert!(threads.iter().all(|id| *id != caller && *id == threads[0]));
  }

  #[rxvar_macro::test]
  fn message_thread_waits_for_the_loop() {
    let looper = MessageLoop::current();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = Observable::from_iter([1, 2, 3])
      .observe_on(SchedulerRef::message_thread())
      .subscribe(move |v| g.lock().push(v));
    assert!(got.lock().is_empty());
    looper.run_until_idle();
    assert_eq!(*got.lock(), vec![1, 2, 3]);
  }

  #[rxvar_macro::test]
  fn dispose_drops_queued_notifications() {
    let clock = TestScheduler::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let d = Observable::from_iter([1, 2, 3])
      .observe_on(clock.clone().into())
      .subscribe(move |v| g.lock().push(v));
    d.dispose();
    clock.flush();
    assert!(got.lock().is_empty());
  }

  #[rxvar_macro::test]
  fn temporary_chain_on_new_thread_delivers_everything() {
    for _ in 0..20 {
      let (tx, rx) = std::sync::mpsc::channel();
      let _d = Observable::from_iter([1, 2, 3])
        .observe_on(SchedulerRef::new_thread())
        .subscribe_all(
          {
            let tx = tx.clone();
            move |v| tx.send(Some(v)).unwrap()
          },
          |e| panic!("{e}"),
          move || tx.send(None).unwrap(),
        );
      let got: Vec<_> = (0..4).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
      assert_eq!(got, vec![Some(1), Some(2), Some(3), None]);
    }
  }

  #[rxvar_macro::test]
  fn unhandled_error_on_background_spares_later_tasks() {
    let _d = Observable::<i32>::error("boom").observe_on(SchedulerRef::background_thread()).subscribe(|_| {});
    let (tx, rx) = std::sync::mpsc::channel();
    SchedulerRef::background_thread().schedule(move || tx.send(()).unwrap(), None);
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(()));
  }

  #[rxvar_macro::test]
  fn errors_cross_too() {
    let o = Observable::<i32>::error("far away").observe_on(SchedulerRef::background_thread());
    assert_eq!(o.to_vec(), Err(RxError::new("far away")));
  }
}
