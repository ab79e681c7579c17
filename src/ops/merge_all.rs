use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct MergeAllOp<Item> {
  source: Observable<Observable<Item>>,
}

impl<Item: Payload> Subscribable<Item> for MergeAllOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    // The outer stream counts as one active source.
    let active = Arc::new(AtomicUsize::new(1));
    let observer = MergeAllObserver { downstream: subscriber.clone(), active };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct MergeAllObserver<Item> {
  downstream: Subscriber<Item>,
  active: Arc<AtomicUsize>,
}

impl<Item> MergeAllObserver<Item> {
  fn finish_one(&self) -> bool { self.active.fetch_sub(1, Ordering::AcqRel) == 1 }
}

impl<Item: Payload> Observer<Observable<Item>> for MergeAllObserver<Item> {
  fn next(&mut self, inner: Observable<Item>) {
    self.active.fetch_add(1, Ordering::AcqRel);
    let observer = InnerObserver(MergeAllObserver {
      downstream: self.downstream.clone(),
      active: self.active.clone(),
    });
    inner.actual_subscribe(self.downstream.chain(observer));
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    if self.finish_one() {
      self.downstream.complete();
    }
  }
}

struct InnerObserver<Item>(MergeAllObserver<Item>);

impl<Item: Payload> Observer<Item> for InnerObserver<Item> {
  fn next(&mut self, value: Item) { self.0.downstream.next(value) }

  fn error(&mut self, err: RxError) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    if self.0.finish_one() {
      self.0.downstream.complete();
    }
  }
}

impl<Item: Payload> Observable<Observable<Item>> {
  /// Subscribes to every inner observable as it arrives and interleaves
  /// their items. Completes once the outer and every inner observable have
  /// completed; any error fails the result.
  pub fn merge_all(&self) -> Observable<Item> { Observable::new(MergeAllOp { source: self.clone() }) }
}

impl<Item: Payload> Observable<Item> {
  /// Maps every item to an observable and merges them, see
  /// [`merge_all`](Observable::merge_all).
  pub fn flat_map<B, F>(&self, f: F) -> Observable<B>
  where
    B: Payload,
    F: Fn(Item) -> Observable<B> + Send + Sync + 'static,
  {
    self.map(f).merge_all()
  }

  /// Interleaves the items of this observable and `others` as they arrive.
  pub fn merge(&self, others: impl IntoIterator<Item = Observable<Item>>) -> Observable<Item> {
    Observable::from_iter(std::iter::once(self.clone()).chain(others)).merge_all()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn flat_map_flattens() {
    let o = Observable::just("hello").flat_map(|s| {
      Observable::from_iter([s.to_string(), format!("{}!", s.to_uppercase())])
    });
    assert_eq!(o.to_vec(), Ok(vec!["hello".to_string(), "HELLO!".to_string()]));
  }

  #[rxvar_macro::test]
  fn merge_interleaves_in_arrival_order() {
    let a = PublishSubject::new();
    let b = PublishSubject::new();
    let got = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (g, c) = (got.clone(), completed.clone());
    let _d = a.merge([b.as_observable()]).subscribe_all(
      move |v: i32| g.lock().push(v),
      |e| panic!("{e}"),
      move || *c.lock() = true,
    );
    a.next(1);
    b.next(2);
    a.next(3);
    a.complete();
    assert!(!*completed.lock());
    b.next(4);
    b.complete();
    assert_eq!(*got.lock(), vec![1, 2, 3, 4]);
    assert!(*completed.lock());
  }

  #[rxvar_macro::test]
  fn an_inner_error_fails_everything() {
    let a = PublishSubject::<i32>::new();
    let o = a.merge([Observable::error("inner failed")]);
    assert_eq!(o.to_vec(), Err(RxError::new("inner failed")));
    assert_eq!(a.subscriber_count(), 0);
  }
}
