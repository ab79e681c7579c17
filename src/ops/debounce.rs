use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::Observer,
  scheduler::{Duration, SchedulerRef, TaskHandle},
  subscriber::Subscriber,
  subscription::SubscriptionLike,
};

struct DebounceOp<Item> {
  source: Observable<Item>,
  duration: Duration,
  scheduler: SchedulerRef,
}

struct DebounceState<Item> {
  pending: Option<Item>,
  timer: Option<TaskHandle>,
  seq: u64,
}

impl<Item> DebounceState<Item> {
  fn cancel_timer(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.unsubscribe();
    }
  }
}

impl<Item: Payload> Subscribable<Item> for DebounceOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let state = Arc::new(Mutex::new(DebounceState { pending: None, timer: None, seq: 0 }));
    let s = state.clone();
    subscriber.subscription().add_teardown(move || s.lock().cancel_timer());
    let observer = DebounceObserver {
      downstream: subscriber.clone(),
      state,
      duration: self.duration,
      scheduler: self.scheduler.clone(),
    };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct DebounceObserver<Item> {
  downstream: Subscriber<Item>,
  state: Arc<Mutex<DebounceState<Item>>>,
  duration: Duration,
  scheduler: SchedulerRef,
}

impl<Item: Payload> Observer<Item> for DebounceObserver<Item> {
  fn next(&mut self, value: Item) {
    let seq = {
      let mut state = self.state.lock();
      state.cancel_timer();
      state.pending = Some(value);
      state.seq += 1;
      state.seq
    };
    let (downstream, state) = (self.downstream.clone(), self.state.clone());
    let timer = self.scheduler.schedule(
      move || {
        let ready = {
          let mut state = state.lock();
          if state.seq == seq {
            state.timer = None;
            state.pending.take()
          } else {
            None
          }
        };
        if let Some(value) = ready {
          downstream.next(value);
        }
      },
      Some(self.duration),
    );
    let mut state = self.state.lock();
    if state.seq == seq && state.pending.is_some() {
      state.timer = Some(timer);
    }
  }

  fn error(&mut self, err: RxError) {
    self.state.lock().cancel_timer();
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    let pending = {
      let mut state = self.state.lock();
      state.cancel_timer();
      state.pending.take()
    };
    if let Some(value) = pending {
      self.downstream.next(value);
    }
    self.downstream.complete();
  }
}

impl<Item: Payload> Observable<Item> {
  /// Emits an item only once `duration` has passed without another item.
  /// A pending item is flushed when the source completes.
  ///
  /// Timers run on the background scheduler.
  pub fn debounce(&self, duration: Duration) -> Observable<Item> {
    self.debounce_on(duration, SchedulerRef::background_thread())
  }

  /// [`debounce`](Self::debounce) with timers on `scheduler`.
  pub fn debounce_on(&self, duration: Duration, scheduler: SchedulerRef) -> Observable<Item> {
    Observable::new(DebounceOp { source: self.clone(), duration, scheduler })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn emits_after_silence() {
    let clock = TestScheduler::new();
    let subject = PublishSubject::<i32>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = subject
      .debounce_on(Duration::from_millis(10), clock.clone().into())
      .subscribe(move |v| g.lock().push(v));

    subject.next(1);
    clock.advance_by(Duration::from_millis(5));
    subject.next(2);
    clock.advance_by(Duration::from_millis(5));
    assert!(got.lock().is_empty());
    clock.advance_by(Duration::from_millis(5));
    assert_eq!(*got.lock(), vec![2]);

    subject.next(3);
    clock.advance_by(Duration::from_millis(20));
    assert_eq!(*got.lock(), vec![2, 3]);
  }

  #[rxvar_macro::test]
  fn flushes_pending_on_complete() {
    let clock = TestScheduler::new();
    let o = Observable::from_iter([1, 2, 3]).debounce_on(Duration::from_secs(1), clock.clone().into());
    assert_eq!(o.to_vec(), Ok(vec![3]));
    clock.flush();
  }

  #[rxvar_macro::test]
  fn dispose_cancels_the_timer() {
    let clock = TestScheduler::new();
    let subject = PublishSubject::<i32>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let d = subject
      .debounce_on(Duration::from_millis(10), clock.clone().into())
      .subscribe(move |v| g.lock().push(v));
    subject.next(1);
    d.dispose();
    clock.advance_by(Duration::from_millis(50));
    assert!(got.lock().is_empty());
  }
}
