use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  scheduler::{Duration, SchedulerRef},
  subscriber::Subscriber,
};

struct SampleOp<Item> {
  source: Observable<Item>,
  period: Duration,
  scheduler: SchedulerRef,
}

impl<Item: Payload> Subscribable<Item> for SampleOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let latest = Arc::new(Mutex::new(None));
    let (l, downstream) = (latest.clone(), subscriber.clone());
    let ticker = self.scheduler.schedule_periodic(self.period, Some(self.period), move || {
      let sample = l.lock().take();
      if let Some(value) = sample {
        downstream.next(value);
      }
    });
    subscriber.add(ticker);
    let observer = SampleObserver { downstream: subscriber.clone(), latest };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct SampleObserver<Item> {
  downstream: Subscriber<Item>,
  latest: Arc<Mutex<Option<Item>>>,
}

impl<Item: Payload> Observer<Item> for SampleObserver<Item> {
  fn next(&mut self, value: Item) { *self.latest.lock() = Some(value) }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Every `period`, emits the latest item received since the previous
  /// tick, if there is one.
  ///
  /// Ticks run on the background scheduler.
  pub fn sample(&self, period: Duration) -> Observable<Item> {
    self.sample_on(period, SchedulerRef::background_thread())
  }

  /// [`sample`](Self::sample) with ticks on `scheduler`.
  pub fn sample_on(&self, period: Duration, scheduler: SchedulerRef) -> Observable<Item> {
    Observable::new(SampleOp { source: self.clone(), period, scheduler })
  }
}
