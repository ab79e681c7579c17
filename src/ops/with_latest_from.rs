use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct WithLatestFromOp<A, B> {
  source: Observable<A>,
  other: Observable<B>,
}

impl<A: Payload, B: Payload> Subscribable<(A, B)> for WithLatestFromOp<A, B> {
  fn actual_subscribe(&self, subscriber: Subscriber<(A, B)>) {
    let latest = Arc::new(Mutex::new(None));
    // The other source goes first so values it emits synchronously are
    // already there when the source starts.
    let other = LatestObserver { downstream: subscriber.clone(), latest: latest.clone() };
    self.other.actual_subscribe(subscriber.chain(other));
    let source = WithLatestFromObserver { downstream: subscriber.clone(), latest };
    self.source.actual_subscribe(subscriber.chain(source));
  }
}

struct LatestObserver<A, B> {
  downstream: Subscriber<(A, B)>,
  latest: Arc<Mutex<Option<B>>>,
}

impl<A: Payload, B: Payload> Observer<B> for LatestObserver<A, B> {
  fn next(&mut self, value: B) { *self.latest.lock() = Some(value) }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {}
}

struct WithLatestFromObserver<A, B> {
  downstream: Subscriber<(A, B)>,
  latest: Arc<Mutex<Option<B>>>,
}

impl<A: Payload, B: Payload> Observer<A> for WithLatestFromObserver<A, B> {
  fn next(&mut self, value: A) {
    let latest = self.latest.lock().clone();
    if let Some(other) = latest {
      self.downstream.next((value, other));
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

pub(crate) fn with_latest_from_pair<A: Payload, B: Payload>(
  source: &Observable<A>, other: &Observable<B>,
) -> Observable<(A, B)> {
  Observable::new(WithLatestFromOp { source: source.clone(), other: other.clone() })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn emits_only_on_source_ticks() {
    let source = PublishSubject::<i32>::new();
    let other = PublishSubject::<char>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = source.with_latest_from(other.as_observable()).subscribe(move |v| g.lock().push(v));
    source.next(1);
    other.next('a');
    other.next('b');
    source.next(2);
    other.next('c');
    source.next(3);
    assert_eq!(*got.lock(), vec![(2, 'b'), (3, 'c')]);
  }

  #[rxvar_macro::test]
  fn other_completing_keeps_its_latest() {
    let o = Observable::from_iter([1, 2])
      .with_latest_from_with((Observable::just(10), Observable::just(100)), |(a, b, c)| a + b + c);
    assert_eq!(o.to_vec(), Ok(vec![111, 112]));
  }
}
