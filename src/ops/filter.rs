use std::sync::Arc;

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct FilterOp<Item, F> {
  source: Observable<Item>,
  predicate: Arc<F>,
}

impl<Item, E, F> Subscribable<Item> for FilterOp<Item, F>
where
  Item: Payload,
  E: Into<RxError>,
  F: Fn(&Item) -> Result<bool, E> + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer = FilterObserver { downstream: subscriber.clone(), predicate: self.predicate.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct FilterObserver<Item, F> {
  downstream: Subscriber<Item>,
  predicate: Arc<F>,
}

impl<Item, E, F> Observer<Item> for FilterObserver<Item, F>
where
  Item: Payload,
  E: Into<RxError>,
  F: Fn(&Item) -> Result<bool, E>,
{
  fn next(&mut self, value: Item) {
    match (self.predicate)(&value) {
      Ok(true) => self.downstream.next(value),
      Ok(false) => {}
      Err(e) => self.downstream.error(e.into()),
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Emits only the items for which `predicate` returns `true`.
  pub fn filter<F>(&self, predicate: F) -> Observable<Item>
  where
    F: Fn(&Item) -> bool + Send + Sync + 'static,
  {
    self.try_filter(move |v| Ok::<_, RxError>(predicate(v)))
  }

  /// Like [`filter`](Self::filter), with a predicate that can fail.
  pub fn try_filter<E, F>(&self, predicate: F) -> Observable<Item>
  where
    E: Into<RxError>,
    F: Fn(&Item) -> Result<bool, E> + Send + Sync + 'static,
  {
    Observable::new(FilterOp { source: self.clone(), predicate: Arc::new(predicate) })
  }
}
