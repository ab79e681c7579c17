use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct TakeUntilOp<Item, N> {
  source: Observable<Item>,
  notifier: Observable<N>,
}

impl<Item: Payload, N: Payload> Subscribable<Item> for TakeUntilOp<Item, N> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let notifier = TakeUntilNotifier { downstream: subscriber.clone() };
    self.notifier.actual_subscribe(subscriber.chain(notifier));
    let observer = Forward { downstream: subscriber.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct TakeUntilNotifier<Item> {
  downstream: Subscriber<Item>,
}

impl<Item: Payload, N> Observer<N> for TakeUntilNotifier<Item> {
  fn next(&mut self, _: N) { self.downstream.complete() }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {}
}

struct Forward<Item> {
  downstream: Subscriber<Item>,
}

impl<Item: Payload> Observer<Item> for Forward<Item> {
  fn next(&mut self, value: Item) { self.downstream.next(value) }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

struct SkipUntilOp<Item, N> {
  source: Observable<Item>,
  notifier: Observable<N>,
}

impl<Item: Payload, N: Payload> Subscribable<Item> for SkipUntilOp<Item, N> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let open = Arc::new(AtomicBool::new(false));
    let notifier = SkipUntilNotifier { downstream: subscriber.clone(), open: open.clone() };
    self.notifier.actual_subscribe(subscriber.chain(notifier));
    let observer = SkipUntilObserver { downstream: subscriber.clone(), open };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct SkipUntilNotifier<Item> {
  downstream: Subscriber<Item>,
  open: Arc<AtomicBool>,
}

impl<Item: Payload, N> Observer<N> for SkipUntilNotifier<Item> {
  fn next(&mut self, _: N) { self.open.store(true, Ordering::Release) }

  fn error(&mut self, err: RxError) { self.downstream.error(err) }

  fn complete(&mut self) {}
}

struct SkipUntilObserver<Item> {
  downstream: Subscriber<Item>,
  open: Arc<AtomicBool>,
}

impl<Item: Payload> Observer<Item> for SkipUntilObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.open.load(Ordering::Acquire) {
      self.downstream.next(value);
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Mirrors this observable until `notifier` emits, then completes.
  ///
  /// `notifier` completing without an item has no effect; its errors fail
  /// the result.
  pub fn take_until<N: Payload>(&self, notifier: &Observable<N>) -> Observable<Item> {
    Observable::new(TakeUntilOp { source: self.clone(), notifier: notifier.clone() })
  }

  /// Drops items until `notifier` emits, then mirrors this observable.
  pub fn skip_until<N: Payload>(&self, notifier: &Observable<N>) -> Observable<Item> {
    Observable::new(SkipUntilOp { source: self.clone(), notifier: notifier.clone() })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn take_until_completes_on_signal() {
    let source = PublishSubject::<i32>::new();
    let stop = PublishSubject::<()>::new();
    let log = Arc::new(Mutex::new(vec![]));
    let (n, c) = (log.clone(), log.clone());
    let _d = source.take_until(&stop).subscribe_all(
      move |v| n.lock().push(v.to_string()),
      |e| panic!("{e}"),
      move || c.lock().push("completed".into()),
    );
    source.next(1);
    stop.next(());
    source.next(2);
    assert_eq!(*log.lock(), vec!["1", "completed"]);
    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(stop.subscriber_count(), 0);
  }

  #[rxvar_macro::test]
  fn early_signal_skips_the_source() {
    let source = PublishSubject::<i32>::new();
    let o = source.take_until(&Observable::just(()));
    assert_eq!(o.to_vec(), Ok(vec![]));
    assert_eq!(source.subscriber_count(), 0);
  }

  #[rxvar_macro::test]
  fn skip_until_opens_on_signal() {
    let source = PublishSubject::<i32>::new();
    let start = PublishSubject::<&str>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = source.skip_until(&start).subscribe(move |v| g.lock().push(v));
    source.next(1);
    start.next("go");
    source.next(2);
    source.next(3);
    assert_eq!(*got.lock(), vec![2, 3]);
  }
}
